//! Speech recognition capability

use std::time::Duration;

use async_trait::async_trait;

use crate::language::Language;
use crate::Result;

/// Events emitted by a recognition engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// An incremental transcript fragment
    Fragment(String),
    /// Recognition stopped (window elapsed or engine-side stop)
    Ended,
    /// The engine is unavailable or failed mid-recognition
    Error(String),
}

/// A continuous speech-to-text engine
///
/// Implementations emit [`RecognizerEvent`]s on the channel they were
/// constructed with. Only one recognition session may be active at a time;
/// the orchestrator guards re-entry.
#[async_trait]
pub trait SpeechRecognizer: Send {
    /// Begin continuous recognition for at most `window`
    ///
    /// Any prior transcript state is reset by the caller before starting.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Recognition`] if the engine is unavailable.
    /// The session stays usable through manual controls.
    async fn start(&mut self, window: Duration, language: Language) -> Result<()>;

    /// End recognition immediately. Idempotent.
    async fn stop(&mut self);

    /// Whether a recognition session is currently active
    fn is_listening(&self) -> bool;
}

/// Ordered accumulation of recognized fragments for one listening window
///
/// Consumed exactly once via [`TranscriptBuffer::take`]; the orchestrator
/// ignores fragments that arrive after the window closed.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    parts: Vec<String>,
}

impl TranscriptBuffer {
    /// Append a fragment. Blank fragments are dropped.
    pub fn push(&mut self, fragment: &str) {
        let fragment = fragment.trim();
        if !fragment.is_empty() {
            self.parts.push(fragment.to_string());
        }
    }

    /// Current accumulated text
    #[must_use]
    pub fn text(&self) -> String {
        self.parts.join(" ")
    }

    /// Consume the transcript, leaving the buffer empty
    #[must_use]
    pub fn take(&mut self) -> String {
        let text = self.text();
        self.parts.clear();
        text
    }

    /// Clear accumulated text without stopping recognition
    pub fn reset(&mut self) {
        self.parts.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
