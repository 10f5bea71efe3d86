//! Analysis client with offline fallback
//!
//! Sends a captured frame to the gateway's analyze endpoint. A single
//! request, no retry: any failure substitutes a locally generated generic
//! description so the user is never left without a result.

use async_trait::async_trait;
use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::{Error, Result};

/// Outcome of analyzing one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Description text, spoken and displayed
    pub text: String,
    /// The user's question, when one was asked
    pub question: Option<String>,
    /// True when the text is a locally generated fallback rather than a live
    /// model response
    pub is_offline: bool,
}

/// Capability interface the session orchestrator analyzes frames through
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze a JPEG frame, optionally answering a question about it
    ///
    /// Never fails: implementations substitute an offline fallback on any
    /// error.
    async fn analyze(
        &self,
        jpeg: &[u8],
        question: Option<&str>,
        language: Language,
    ) -> AnalysisResult;
}

/// Request body for the gateway analyze endpoint
#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    /// Base64 JPEG, no data-URI prefix
    image: String,
    prompt: &'a str,
}

/// Success body from the gateway analyze endpoint
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    analysis: String,
}

/// HTTP client for the gateway's `/api/analyze-image` endpoint
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// Create a client for the gateway at `base_url`
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the analysis prompt: the language-appropriate description
    /// request, prefixed with the user's verbatim question when supplied
    #[must_use]
    pub fn build_prompt(question: Option<&str>, language: Language) -> String {
        let default = language.default_analysis_prompt();
        question.map_or_else(
            || default.to_string(),
            |q| format!("{q}. {default}"),
        )
    }

    async fn request_analysis(
        &self,
        jpeg: &[u8],
        question: Option<&str>,
        language: Language,
    ) -> Result<String> {
        let prompt = Self::build_prompt(question, language);
        let body = AnalyzeRequest {
            image: base64::engine::general_purpose::STANDARD.encode(jpeg),
            prompt: &prompt,
        };

        let response = self
            .client
            .post(format!("{}/api/analyze-image", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Vision(format!("analyze endpoint {status}: {body}")));
        }

        let result: AnalyzeResponse = response.json().await?;
        Ok(result.analysis)
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(
        &self,
        jpeg: &[u8],
        question: Option<&str>,
        language: Language,
    ) -> AnalysisResult {
        match self.request_analysis(jpeg, question, language).await {
            Ok(text) => {
                tracing::info!(chars = text.len(), "analysis complete");
                AnalysisResult {
                    text,
                    question: question.map(String::from),
                    is_offline: false,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "analysis failed, using offline fallback");
                offline_fallback(question, language)
            }
        }
    }
}

/// Build a locally generated fallback result
///
/// Picks pseudo-randomly from a fixed set of language-appropriate generic
/// descriptions; a supplied question is quoted verbatim in the text.
#[must_use]
pub fn offline_fallback(question: Option<&str>, language: Language) -> AnalysisResult {
    let pool = language.offline_responses();
    let mut text = pool[rand::thread_rng().gen_range(0..pool.len())].to_string();

    if let Some(question) = question {
        text.push_str(&language.offline_question_note(question));
    }

    AnalysisResult {
        text,
        question: question.map(String::from),
        is_offline: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_offline_and_non_empty() {
        let result = offline_fallback(None, Language::English);
        assert!(result.is_offline);
        assert!(!result.text.is_empty());
        assert!(result.question.is_none());
    }

    #[test]
    fn fallback_quotes_the_question_verbatim() {
        let result = offline_fallback(Some("is there a chair"), Language::English);
        assert!(result.text.contains("is there a chair"));
        assert_eq!(result.question.as_deref(), Some("is there a chair"));
    }

    #[test]
    fn tamil_fallback_draws_from_tamil_pool() {
        let result = offline_fallback(None, Language::Tamil);
        assert!(Language::Tamil.offline_responses().contains(&result.text.as_str()));
    }

    #[test]
    fn prompt_defaults_without_question() {
        let prompt = AnalysisClient::build_prompt(None, Language::English);
        assert_eq!(prompt, Language::English.default_analysis_prompt());
    }

    #[test]
    fn prompt_prefixes_the_question() {
        let prompt = AnalysisClient::build_prompt(Some("what color is the door"), Language::English);
        assert!(prompt.starts_with("what color is the door. "));
        assert!(prompt.ends_with(Language::English.default_analysis_prompt()));
    }
}
