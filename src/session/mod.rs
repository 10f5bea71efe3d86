//! Capture-analyze-speak session orchestration
//!
//! One task owns the session state machine and consumes a single stream of
//! events: user commands, recognizer events, synthesizer events, and analysis
//! completions. Outward effects (navigation, notices, results, haptics) are
//! emitted on a signal channel; nothing here depends on a rendering layer.
//!
//! State machine:
//!
//! ```text
//!          toggle                    window elapsed / stop
//!   Idle ───────────► Listening ───────────────────────────► Idle
//!     ▲                                                        │ intent:
//!     │ spoken                              capture+analyze    │
//!     │                                                        ▼
//!   Speaking ◄─────────────── result (voice feedback) ──── Processing
//! ```
//!
//! Toggling while Speaking stops speech; it never starts a new window.

mod intent;

pub use intent::{interpret, Intent, NavTarget};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::analysis::{AnalysisResult, Analyzer};
use crate::frame::{self, CaptureKind, FrameSource};
use crate::language::{Language, Notice};
use crate::prefs::PrefStore;
use crate::speech::{
    RecognizerEvent, SpeakerEvent, SpeechRecognizer, SpeechSynthesizer, TranscriptBuffer,
};

/// Session listening state. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    Idle,
    Listening,
    Processing,
    Speaking,
}

/// Commands from the embedder (buttons, harness input, navigation shell)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// The microphone toggle
    ToggleListen,
    /// Activate a capture source (manual button path)
    StartCapture(CaptureKind),
    /// Deactivate a capture source
    StopCapture(CaptureKind),
    /// Capture and analyze the current frame (manual button path)
    Capture { question: Option<String> },
    /// Tear the session down, releasing camera and speech resources
    Close,
}

/// Outward session effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    StateChanged(ListeningState),
    SourceChanged(Option<CaptureKind>),
    /// Incremental transcript for display while listening
    TranscriptUpdated(String),
    Navigate(NavTarget),
    Notice(Notice),
    Analysis(AnalysisResult),
    Emergency,
    /// Short vibration cue on listen start
    Haptic,
    Closed,
}

/// Session parameters
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub language: Language,
    /// Hard listening window; recognition stops when it elapses
    pub listen_window: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            listen_window: Duration::from_secs(5),
        }
    }
}

/// The capability implementations a session runs against
pub struct SessionEngines {
    pub recognizer: Box<dyn SpeechRecognizer>,
    pub synthesizer: Box<dyn SpeechSynthesizer>,
    pub local_source: Box<dyn FrameSource>,
    pub remote_source: Box<dyn FrameSource>,
    pub analyzer: Arc<dyn Analyzer>,
}

/// Channel endpoints wiring a session to its embedder and engines
pub struct SessionChannels {
    pub commands: mpsc::Receiver<SessionCommand>,
    pub recognizer_events: mpsc::Receiver<RecognizerEvent>,
    pub speaker_events: mpsc::Receiver<SpeakerEvent>,
    pub signals: mpsc::UnboundedSender<SessionSignal>,
}

/// One voice interaction session
pub struct Session {
    id: Uuid,
    config: SessionConfig,
    prefs: PrefStore,
    state: ListeningState,
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    local_source: Box<dyn FrameSource>,
    remote_source: Box<dyn FrameSource>,
    analyzer: Arc<dyn Analyzer>,
    active_source: Option<CaptureKind>,
    transcript: TranscriptBuffer,
    last_transcript: String,
    last_question: Option<String>,
    last_analysis: Option<AnalysisResult>,
    listen_deadline: Option<Instant>,
    commands: mpsc::Receiver<SessionCommand>,
    recognizer_events: mpsc::Receiver<RecognizerEvent>,
    speaker_events: mpsc::Receiver<SpeakerEvent>,
    analysis_tx: mpsc::Sender<AnalysisResult>,
    analysis_results: mpsc::Receiver<AnalysisResult>,
    signals: mpsc::UnboundedSender<SessionSignal>,
}

/// One resolved step of the session event loop
enum Tick {
    Command(Option<SessionCommand>),
    Recognizer(RecognizerEvent),
    Speaker(SpeakerEvent),
    Analysis(AnalysisResult),
    WindowElapsed,
}

impl Session {
    #[must_use]
    pub fn new(
        config: SessionConfig,
        prefs: PrefStore,
        engines: SessionEngines,
        channels: SessionChannels,
    ) -> Self {
        let (analysis_tx, analysis_results) = mpsc::channel(4);
        Self {
            id: Uuid::new_v4(),
            config,
            prefs,
            state: ListeningState::Idle,
            recognizer: engines.recognizer,
            synthesizer: engines.synthesizer,
            local_source: engines.local_source,
            remote_source: engines.remote_source,
            analyzer: engines.analyzer,
            active_source: None,
            transcript: TranscriptBuffer::default(),
            last_transcript: String::new(),
            last_question: None,
            last_analysis: None,
            listen_deadline: None,
            commands: channels.commands,
            recognizer_events: channels.recognizer_events,
            speaker_events: channels.speaker_events,
            analysis_tx,
            analysis_results,
            signals: channels.signals,
        }
    }

    /// Current listening state
    #[must_use]
    pub const fn state(&self) -> ListeningState {
        self.state
    }

    /// Currently active capture source
    #[must_use]
    pub const fn active_source(&self) -> Option<CaptureKind> {
        self.active_source
    }

    /// Final transcript of the last closed listening window
    #[must_use]
    pub fn last_transcript(&self) -> &str {
        &self.last_transcript
    }

    /// Question attached to the most recent capture, if any
    #[must_use]
    pub fn last_question(&self) -> Option<&str> {
        self.last_question.as_deref()
    }

    /// Most recent analysis result, if any
    #[must_use]
    pub fn last_analysis(&self) -> Option<&AnalysisResult> {
        self.last_analysis.as_ref()
    }

    /// Run the session until a `Close` command arrives or the command channel
    /// drops, then release all resources
    pub async fn run(mut self) {
        tracing::info!(
            session = %self.id,
            language = self.config.language.tag(),
            "session started"
        );
        self.signal(SessionSignal::StateChanged(self.state));

        loop {
            let deadline = self.listen_deadline;
            let tick = tokio::select! {
                command = self.commands.recv() => Tick::Command(command),
                Some(event) = self.recognizer_events.recv() => Tick::Recognizer(event),
                Some(event) = self.speaker_events.recv() => Tick::Speaker(event),
                Some(result) = self.analysis_results.recv() => Tick::Analysis(result),
                () = listen_window_elapsed(deadline) => Tick::WindowElapsed,
            };

            match tick {
                Tick::Command(None | Some(SessionCommand::Close)) => break,
                Tick::Command(Some(command)) => self.handle_command(command).await,
                Tick::Recognizer(event) => self.handle_recognizer_event(event).await,
                Tick::Speaker(event) => self.handle_speaker_event(event).await,
                Tick::Analysis(result) => self.handle_analysis_done(result).await,
                Tick::WindowElapsed => self.finish_listening("window elapsed").await,
            }
        }

        self.close().await;
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::ToggleListen => self.toggle_listen().await,
            SessionCommand::StartCapture(kind) => self.start_capture(kind).await,
            SessionCommand::StopCapture(kind) => self.stop_capture(kind),
            SessionCommand::Capture { question } => self.request_capture(question).await,
            SessionCommand::Close => unreachable!("Close is handled by the run loop"),
        }
    }

    /// The microphone toggle
    ///
    /// While Speaking this means "stop speaking", never "start listening".
    /// While Processing it is ignored. While Listening it ends the window
    /// early without discarding the partial transcript.
    async fn toggle_listen(&mut self) {
        match self.state {
            ListeningState::Speaking => {
                self.synthesizer.stop().await;
                self.set_state(ListeningState::Idle);
            }
            ListeningState::Processing => {
                tracing::debug!("toggle ignored while processing");
            }
            ListeningState::Listening => {
                self.finish_listening("manual stop").await;
            }
            ListeningState::Idle => self.begin_listening().await,
        }
    }

    async fn begin_listening(&mut self) {
        self.transcript.reset();
        match self
            .recognizer
            .start(self.config.listen_window, self.config.language)
            .await
        {
            Ok(()) => {
                self.listen_deadline = Some(Instant::now() + self.config.listen_window);
                self.set_state(ListeningState::Listening);
                if self.prefs.get().haptic_feedback {
                    self.signal(SessionSignal::Haptic);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "recognizer unavailable");
                self.signal(SessionSignal::Notice(Notice::VoiceUnavailable));
            }
        }
    }

    /// Close the listening window and interpret whatever was heard
    ///
    /// The transcript is consumed exactly once here; fragments arriving after
    /// this transition are ignored. An empty transcript dispatches nothing.
    async fn finish_listening(&mut self, reason: &str) {
        if self.state != ListeningState::Listening {
            return;
        }
        self.listen_deadline = None;
        self.recognizer.stop().await;
        self.set_state(ListeningState::Idle);

        let transcript = self.transcript.take();
        self.last_transcript.clone_from(&transcript);
        tracing::debug!(transcript = %transcript, reason, "listening window closed");

        if transcript.trim().is_empty() {
            return;
        }

        let intent = interpret(&transcript, self.active_source, self.config.language);
        tracing::info!(?intent, "intent interpreted");
        self.dispatch(intent).await;
    }

    async fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::NavigateHome => self.signal(SessionSignal::Navigate(NavTarget::Home)),
            Intent::NavigateTo(target) => self.signal(SessionSignal::Navigate(target)),
            Intent::StartCapture(kind) => self.start_capture(kind).await,
            Intent::StopCapture(kind) => self.stop_capture(kind),
            Intent::CaptureAndAnalyze { question } => self.request_capture(question).await,
            Intent::FreeFormQuestion(question) => self.request_capture(Some(question)).await,
            Intent::Emergency => {
                self.signal(SessionSignal::Emergency);
                self.spoken_notice(Notice::EmergencyAlert).await;
            }
            Intent::Unrecognized => self.spoken_notice(Notice::DidNotUnderstand).await,
        }
    }

    /// Activate a capture source, releasing its counterpart first
    async fn start_capture(&mut self, kind: CaptureKind) {
        if self.active_source == Some(kind) && self.source_mut(kind).is_active() {
            tracing::debug!(source = %kind, "source already active");
            return;
        }

        let counterpart = kind.counterpart();
        if self.source_mut(counterpart).is_active() {
            self.source_mut(counterpart).release();
            tracing::info!(released = %counterpart, activating = %kind, "switched capture source");
        }
        if self.active_source == Some(counterpart) {
            self.active_source = None;
            self.signal(SessionSignal::SourceChanged(None));
        }

        match self.source_mut(kind).acquire().await {
            Ok(()) => {
                self.active_source = Some(kind);
                self.signal(SessionSignal::SourceChanged(Some(kind)));
                self.signal(SessionSignal::Notice(Notice::CameraStarted));
            }
            Err(e) => {
                tracing::warn!(error = %e, source = %kind, "capture source unavailable");
                self.signal(SessionSignal::Notice(Notice::CameraUnavailable));
            }
        }
    }

    fn stop_capture(&mut self, kind: CaptureKind) {
        if !self.source_mut(kind).is_active() {
            tracing::debug!(source = %kind, "stop requested for inactive source");
            return;
        }
        self.source_mut(kind).release();
        if self.active_source == Some(kind) {
            self.active_source = None;
            self.signal(SessionSignal::SourceChanged(None));
        }
        self.signal(SessionSignal::Notice(Notice::CameraStopped));
    }

    /// Grab a frame from the active source and hand it to the analyzer
    ///
    /// At most one analysis is outstanding; the Processing state gates
    /// further captures until the result arrives. The in-flight call is
    /// never cancelled.
    async fn request_capture(&mut self, question: Option<String>) {
        if self.state != ListeningState::Idle {
            tracing::debug!(state = ?self.state, "capture blocked");
            return;
        }
        let Some(kind) = self.active_source else {
            self.spoken_notice(Notice::CameraNotActive).await;
            return;
        };

        let frame = match self.source_mut(kind).grab().await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, source = %kind, "frame grab failed");
                self.spoken_notice(Notice::FrameNotReady).await;
                return;
            }
        };

        let jpeg = match frame::encode_jpeg(&frame, kind == CaptureKind::Local) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                tracing::warn!(error = %e, "frame encode failed");
                self.spoken_notice(Notice::FrameNotReady).await;
                return;
            }
        };

        self.last_question.clone_from(&question);
        self.set_state(ListeningState::Processing);

        let analyzer = Arc::clone(&self.analyzer);
        let results = self.analysis_tx.clone();
        let language = self.config.language;
        tokio::spawn(async move {
            let result = analyzer.analyze(&jpeg, question.as_deref(), language).await;
            let _ = results.send(result).await;
        });
    }

    async fn handle_analysis_done(&mut self, result: AnalysisResult) {
        if self.state != ListeningState::Processing {
            tracing::warn!(state = ?self.state, "analysis result arrived outside processing");
        }
        tracing::info!(offline = result.is_offline, "analysis result ready");

        self.last_analysis = Some(result.clone());
        self.signal(SessionSignal::Analysis(result.clone()));

        if self.prefs.get().voice_feedback {
            match self
                .synthesizer
                .speak(&result.text, self.config.language)
                .await
            {
                Ok(()) => self.set_state(ListeningState::Speaking),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to speak analysis");
                    self.set_state(ListeningState::Idle);
                }
            }
        } else {
            self.set_state(ListeningState::Idle);
        }
    }

    async fn handle_recognizer_event(&mut self, event: RecognizerEvent) {
        match event {
            RecognizerEvent::Fragment(fragment) => {
                if self.state == ListeningState::Listening {
                    self.transcript.push(&fragment);
                    self.signal(SessionSignal::TranscriptUpdated(self.transcript.text()));
                } else {
                    tracing::trace!(%fragment, "fragment after window closed, ignored");
                }
            }
            RecognizerEvent::Ended => self.finish_listening("engine ended").await,
            RecognizerEvent::Error(error) => {
                tracing::warn!(%error, "recognition error");
                self.signal(SessionSignal::Notice(Notice::VoiceUnavailable));
                self.finish_listening("engine error").await;
            }
        }
    }

    async fn handle_speaker_event(&mut self, event: SpeakerEvent) {
        match event {
            SpeakerEvent::Started => {
                if matches!(self.state, ListeningState::Idle | ListeningState::Processing) {
                    self.set_state(ListeningState::Speaking);
                }
            }
            SpeakerEvent::Paused | SpeakerEvent::Resumed => {
                // paused playback is still the Speaking state
                tracing::debug!("playback pause state changed");
            }
            SpeakerEvent::Ended => {
                if self.state == ListeningState::Speaking {
                    self.set_state(ListeningState::Idle);
                }
            }
            SpeakerEvent::Error(error) => {
                tracing::warn!(%error, "synthesis error");
                if self.state == ListeningState::Speaking {
                    self.set_state(ListeningState::Idle);
                }
            }
        }
    }

    /// Emit a notice, speaking it when voice feedback is enabled
    async fn spoken_notice(&mut self, notice: Notice) {
        self.signal(SessionSignal::Notice(notice));
        if self.prefs.get().voice_feedback && self.state == ListeningState::Idle {
            let text = notice.text(self.config.language);
            if self
                .synthesizer
                .speak(text, self.config.language)
                .await
                .is_ok()
            {
                self.set_state(ListeningState::Speaking);
            }
        }
    }

    async fn close(&mut self) {
        self.recognizer.stop().await;
        self.synthesizer.stop().await;
        self.local_source.release();
        self.remote_source.release();
        self.active_source = None;
        self.signal(SessionSignal::Closed);
        tracing::info!(session = %self.id, "session closed");
    }

    fn source_mut(&mut self, kind: CaptureKind) -> &mut dyn FrameSource {
        match kind {
            CaptureKind::Local => self.local_source.as_mut(),
            CaptureKind::Remote => self.remote_source.as_mut(),
        }
    }

    fn set_state(&mut self, state: ListeningState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "state transition");
            self.state = state;
            self.signal(SessionSignal::StateChanged(state));
        }
    }

    fn signal(&self, signal: SessionSignal) {
        if self.signals.send(signal).is_err() {
            tracing::trace!("signal receiver dropped");
        }
    }
}

async fn listen_window_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
