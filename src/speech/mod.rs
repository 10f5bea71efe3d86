//! Speech capability interfaces
//!
//! Recognition and synthesis engines are external collaborators (platform or
//! browser engines). This module defines the capability traits the session
//! orchestrator is written against, plus terminal-backed implementations used
//! by the CLI harness. Engines report progress as events on plain channels,
//! never through callbacks.

mod recognizer;
mod synthesizer;
mod terminal;
mod voices;

pub use recognizer::{RecognizerEvent, SpeechRecognizer, TranscriptBuffer};
pub use synthesizer::{SpeakerEvent, SpeechSynthesizer};
pub use terminal::{ConsoleSynthesizer, LineFeeder, LineRecognizer};
pub use voices::{select_voice, VoiceInfo};
