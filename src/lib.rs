//! Vista Gateway - voice-driven vision assistant for visually impaired users
//!
//! This library provides the core functionality of the Vista gateway:
//! - The capture-analyze-speak session (speech in, frame capture, spoken
//!   description out)
//! - Bilingual voice command interpretation
//! - The HTTP API boundary in front of the vision model
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Interfaces                        │
//! │   Speech engines │ Camera / hardware stream │ UI    │
//! └────────────────────┬────────────────────────────────┘
//!                      │ events / signals
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Session Orchestrator                 │
//! │   Interpreter │ Frame Capture │ Analysis Client     │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST /api/analyze-image
//! ┌────────────────────▼────────────────────────────────┐
//! │              Vista API Server (axum)                 │
//! │        /api/analyze-image  │  /api/chat             │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//!               Gemini vision model
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod frame;
pub mod language;
pub mod prefs;
pub mod session;
pub mod speech;
pub mod vision;

pub use analysis::{offline_fallback, AnalysisClient, AnalysisResult, Analyzer};
pub use config::Config;
pub use error::{Error, Result};
pub use frame::{CaptureKind, FrameSource, RawFrame, SnapshotSource, TestPatternSource};
pub use language::{Language, Notice};
pub use prefs::{AccessibilityPrefs, PrefStore};
pub use session::{
    interpret, Intent, ListeningState, NavTarget, Session, SessionChannels, SessionCommand,
    SessionConfig, SessionEngines, SessionSignal,
};
pub use speech::{
    select_voice, ConsoleSynthesizer, LineFeeder, LineRecognizer, RecognizerEvent, SpeakerEvent,
    SpeechRecognizer, SpeechSynthesizer, TranscriptBuffer, VoiceInfo,
};
pub use vision::{ChatTurn, GeminiClient};
