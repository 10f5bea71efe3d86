//! Terminal-backed speech engines for the CLI session harness
//!
//! These stand in for platform speech engines so a full capture-analyze-speak
//! session can be driven from a terminal: typed lines play the role of
//! recognized speech, and utterances are printed instead of played.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::language::Language;
use crate::Result;

use super::{select_voice, RecognizerEvent, SpeakerEvent, SpeechRecognizer, SpeechSynthesizer, VoiceInfo};

/// Recognizer fed typed lines by the embedder
///
/// The harness owns the terminal and forwards lines through a [`LineFeeder`];
/// lines fed while not listening are dropped.
pub struct LineRecognizer {
    shared: Arc<LineRecognizerShared>,
}

struct LineRecognizerShared {
    listening: AtomicBool,
    events: mpsc::Sender<RecognizerEvent>,
}

/// Feeder half of a [`LineRecognizer`]
#[derive(Clone)]
pub struct LineFeeder {
    shared: Arc<LineRecognizerShared>,
}

impl LineRecognizer {
    /// Create a recognizer emitting events on `events`, plus its feeder
    #[must_use]
    pub fn new(events: mpsc::Sender<RecognizerEvent>) -> (Self, LineFeeder) {
        let shared = Arc::new(LineRecognizerShared {
            listening: AtomicBool::new(false),
            events,
        });
        (
            Self {
                shared: Arc::clone(&shared),
            },
            LineFeeder { shared },
        )
    }
}

impl LineFeeder {
    /// Forward a typed line as a transcript fragment
    ///
    /// Returns false when the recognizer was not listening and the line was
    /// dropped.
    pub fn feed(&self, line: &str) -> bool {
        if !self.shared.listening.load(Ordering::SeqCst) {
            return false;
        }
        self.shared
            .events
            .try_send(RecognizerEvent::Fragment(line.to_string()))
            .is_ok()
    }

    /// Whether the recognizer is currently listening
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechRecognizer for LineRecognizer {
    async fn start(&mut self, window: Duration, language: Language) -> Result<()> {
        self.shared.listening.store(true, Ordering::SeqCst);
        tracing::debug!(window_ms = window.as_millis(), language = language.tag(), "line recognizer listening");
        Ok(())
    }

    async fn stop(&mut self) {
        if self.shared.listening.swap(false, Ordering::SeqCst) {
            let _ = self.shared.events.send(RecognizerEvent::Ended).await;
        }
    }

    fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::SeqCst)
    }
}

/// Synthesizer that prints utterances to the terminal
///
/// Emits start/end events with a playback delay proportional to the text
/// length so speaking state is observable like a real engine's.
pub struct ConsoleSynthesizer {
    voices: Vec<VoiceInfo>,
    events: mpsc::Sender<SpeakerEvent>,
    playback: Option<JoinHandle<()>>,
    paused: bool,
}

impl ConsoleSynthesizer {
    /// Create a synthesizer emitting events on `events`
    #[must_use]
    pub fn new(events: mpsc::Sender<SpeakerEvent>) -> Self {
        Self {
            voices: vec![
                VoiceInfo::new("Terminal English", "en-US", true),
                VoiceInfo::new("Terminal Tamil", "ta-IN", true),
            ],
            events,
            playback: None,
            paused: false,
        }
    }

    fn cancel_playback(&mut self) -> bool {
        if let Some(task) = self.playback.take() {
            if !task.is_finished() {
                task.abort();
                return true;
            }
        }
        false
    }
}

#[async_trait]
impl SpeechSynthesizer for ConsoleSynthesizer {
    async fn speak(&mut self, text: &str, language: Language) -> Result<()> {
        if self.cancel_playback() || self.paused {
            self.paused = false;
            let _ = self.events.send(SpeakerEvent::Ended).await;
        }

        let voice = select_voice(&self.voices, language.tag())
            .map_or("platform default", |v| v.name.as_str());
        println!("[{voice}] {text}");

        let _ = self.events.send(SpeakerEvent::Started).await;

        // Roughly 300ms per word, bounded, so state transitions are visible
        let words = text.split_whitespace().count().max(1);
        let duration = Duration::from_millis((words as u64 * 300).clamp(500, 6000));
        let events = self.events.clone();
        self.playback = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = events.send(SpeakerEvent::Ended).await;
        }));

        Ok(())
    }

    async fn stop(&mut self) {
        let was_pending = self.cancel_playback();
        if was_pending || self.paused {
            self.paused = false;
            let _ = self.events.send(SpeakerEvent::Ended).await;
        }
    }

    async fn pause(&mut self) {
        if !self.paused && self.cancel_playback() {
            self.paused = true;
            let _ = self.events.send(SpeakerEvent::Paused).await;
        }
    }

    async fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        let _ = self.events.send(SpeakerEvent::Resumed).await;

        let events = self.events.clone();
        self.playback = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(800)).await;
            let _ = events.send(SpeakerEvent::Ended).await;
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn feeder_drops_lines_while_not_listening() {
        let (tx, mut rx) = mpsc::channel(8);
        let (mut recognizer, feeder) = LineRecognizer::new(tx);

        assert!(!feeder.feed("dropped"));

        recognizer
            .start(Duration::from_secs(5), Language::English)
            .await
            .unwrap();
        assert!(feeder.feed("take picture"));

        recognizer.stop().await;
        assert!(!feeder.feed("late line"));

        assert_eq!(
            rx.recv().await,
            Some(RecognizerEvent::Fragment("take picture".to_string()))
        );
        assert_eq!(rx.recv().await, Some(RecognizerEvent::Ended));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (tx, mut rx) = mpsc::channel(8);
        let (mut recognizer, _feeder) = LineRecognizer::new(tx);

        recognizer
            .start(Duration::from_secs(5), Language::English)
            .await
            .unwrap();
        recognizer.stop().await;
        recognizer.stop().await;

        assert_eq!(rx.recv().await, Some(RecognizerEvent::Ended));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn speak_emits_started_then_ended() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut synth = ConsoleSynthesizer::new(tx);

        synth.speak("hello there", Language::English).await.unwrap();
        assert_eq!(rx.recv().await, Some(SpeakerEvent::Started));

        synth.stop().await;
        assert_eq!(rx.recv().await, Some(SpeakerEvent::Ended));
    }

    #[tokio::test]
    async fn pause_and_resume_only_apply_while_speaking() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut synth = ConsoleSynthesizer::new(tx);

        // Not speaking yet: both are no-ops
        synth.pause().await;
        synth.resume().await;
        assert!(rx.try_recv().is_err());

        synth.speak("a longer utterance", Language::English).await.unwrap();
        assert_eq!(rx.recv().await, Some(SpeakerEvent::Started));

        synth.pause().await;
        assert_eq!(rx.recv().await, Some(SpeakerEvent::Paused));

        synth.resume().await;
        assert_eq!(rx.recv().await, Some(SpeakerEvent::Resumed));
        assert_eq!(rx.recv().await, Some(SpeakerEvent::Ended));
    }
}
