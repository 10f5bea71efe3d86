//! Vision backend client for image analysis and chat
//!
//! Talks to the Google Gemini `generateContent` REST API.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default server-side description request, used when the caller supplies no
/// prompt of its own
pub const DEFAULT_IMAGE_PROMPT: &str = "Describe this image in detail, focusing on any potential \
     obstacles, surroundings, and important elements that would be helpful for a visually \
     impaired person to know about.";

/// One turn of a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

/// Client for the Gemini vision/chat API
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

/// `generateContent` request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

/// A content entry in the request
#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

/// Content part (text or inline image)
#[derive(Debug, Serialize)]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
}

impl<'a> Part<'a> {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(mime_type: &'a str, data: &'a str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type, data }),
        }
    }
}

/// Inline base64 image data
#[derive(Debug, Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a str,
}

/// `generateContent` response
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Google API key required for vision".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Create with a specific model
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Model identifier this client targets
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Describe an image
    ///
    /// # Arguments
    ///
    /// * `image_base64` - base64 JPEG data, no data-URI prefix
    /// * `prompt` - description request; empty falls back to
    ///   [`DEFAULT_IMAGE_PROMPT`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Vision`] if the API call fails or returns nothing
    pub async fn describe_image(&self, image_base64: &str, prompt: &str) -> Result<String> {
        let prompt = if prompt.trim().is_empty() {
            DEFAULT_IMAGE_PROMPT
        } else {
            prompt
        };

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::image("image/jpeg", image_base64), Part::text(prompt)],
            }],
        };

        self.generate(&request).await
    }

    /// Run a chat conversation
    ///
    /// Gemini has no separate system role; the system prompt is prepended to
    /// the first user turn. A default "Hello" user turn is inserted when the
    /// history starts with an assistant message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Vision`] if the API call fails or returns nothing
    pub async fn chat(&self, turns: &[ChatTurn], system_prompt: Option<&str>) -> Result<String> {
        let mut contents: Vec<Content<'_>> = turns
            .iter()
            .filter(|t| t.role != "system")
            .map(|t| Content {
                role: if t.role == "user" { "user" } else { "model" },
                parts: vec![Part::text(t.content.clone())],
            })
            .collect();

        if !contents.first().is_some_and(|c| c.role == "user") {
            contents.insert(
                0,
                Content {
                    role: "user",
                    parts: vec![Part::text("Hello")],
                },
            );
        }

        if let Some(system) = system_prompt {
            if let Some(first) = contents.first_mut() {
                let user_text = first.parts[0].text.take().unwrap_or_default();
                first.parts[0] = Part::text(format!("{system}\n\nUser: {user_text}"));
            }
        }

        let request = GenerateRequest { contents };
        self.generate(&request).await
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String> {
        let url = format!("{GEMINI_API_URL}/{}:generateContent", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Vision(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Vision(format!("API error {status}: {body}")));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Vision(format!("parse error: {e}")))?;

        let text = result
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join(" ");

        if text.is_empty() {
            return Err(Error::Vision("empty response from vision API".to_string()));
        }

        tracing::debug!(chars = text.len(), "vision response received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_a_config_error() {
        let err = GeminiClient::new(String::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn request_serializes_in_wire_format() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::image("image/jpeg", "QUJD"), Part::text("describe")],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["data"], "QUJD");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "describe");
        assert!(json["contents"][0]["parts"][1].get("inlineData").is_none());
    }

    #[test]
    fn response_text_joins_parts() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "A hallway" }, { "text": "with a door." }] }
            }]
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        let text = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(text, "A hallway with a door.");
    }
}
