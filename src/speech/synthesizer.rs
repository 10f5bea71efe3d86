//! Speech synthesis capability

use async_trait::async_trait;

use crate::language::Language;
use crate::Result;

/// Events emitted by a synthesis engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerEvent {
    /// An utterance began playing
    Started,
    /// Playback was paused mid-utterance
    Paused,
    /// Paused playback resumed
    Resumed,
    /// The current utterance finished or was cancelled
    Ended,
    /// Synthesis failed
    Error(String),
}

/// A text-to-speech engine
///
/// Implementations emit [`SpeakerEvent`]s on the channel they were
/// constructed with. Voice selection is best-effort: when no voice matches
/// the requested language the engine falls back to the platform default,
/// which is a quality degradation, not an error.
#[async_trait]
pub trait SpeechSynthesizer: Send {
    /// Cancel any in-flight utterance and begin speaking `text`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Speech`] if the engine rejects the utterance.
    async fn speak(&mut self, text: &str, language: Language) -> Result<()>;

    /// Cancel the current utterance immediately. Idempotent.
    async fn stop(&mut self);

    /// Pause playback. Only meaningful while speaking.
    async fn pause(&mut self);

    /// Resume paused playback. Only meaningful while paused.
    async fn resume(&mut self);
}
