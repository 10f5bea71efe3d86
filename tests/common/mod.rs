//! Shared test utilities: scripted engine doubles and a session harness

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use vista_gateway::{
    AnalysisResult, Analyzer, CaptureKind, FrameSource, Language, PrefStore, RawFrame,
    RecognizerEvent, Session, SessionChannels, SessionCommand, SessionConfig, SessionEngines,
    SessionSignal, SpeakerEvent, SpeechRecognizer, SpeechSynthesizer,
};

/// Shared call log recording engine interactions in order
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn log_entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn record(log: &CallLog, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

/// Recognizer double driven entirely by injected events
pub struct ScriptedRecognizer {
    log: CallLog,
    listening: bool,
}

impl ScriptedRecognizer {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            listening: false,
        }
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn start(&mut self, _window: Duration, _language: Language) -> vista_gateway::Result<()> {
        record(&self.log, "recognizer start");
        self.listening = true;
        Ok(())
    }

    async fn stop(&mut self) {
        if self.listening {
            record(&self.log, "recognizer stop");
            self.listening = false;
        }
    }

    fn is_listening(&self) -> bool {
        self.listening
    }
}

/// Synthesizer double that stays "speaking" until stopped
pub struct ScriptedSynthesizer {
    log: CallLog,
    events: mpsc::Sender<SpeakerEvent>,
}

impl ScriptedSynthesizer {
    pub fn new(log: CallLog, events: mpsc::Sender<SpeakerEvent>) -> Self {
        Self { log, events }
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynthesizer {
    async fn speak(&mut self, text: &str, _language: Language) -> vista_gateway::Result<()> {
        record(&self.log, format!("speak: {text}"));
        let _ = self.events.send(SpeakerEvent::Started).await;
        Ok(())
    }

    async fn stop(&mut self) {
        record(&self.log, "synthesizer stop");
        let _ = self.events.send(SpeakerEvent::Ended).await;
    }

    async fn pause(&mut self) {
        record(&self.log, "synthesizer pause");
    }

    async fn resume(&mut self) {
        record(&self.log, "synthesizer resume");
    }
}

/// Frame source double with scriptable acquire/readiness behavior
pub struct StubSource {
    kind: CaptureKind,
    log: CallLog,
    active: bool,
    pub fail_acquire: bool,
    pub ready: bool,
}

impl StubSource {
    pub fn new(kind: CaptureKind, log: CallLog) -> Self {
        Self {
            kind,
            log,
            active: false,
            fail_acquire: false,
            ready: true,
        }
    }
}

#[async_trait]
impl FrameSource for StubSource {
    fn kind(&self) -> CaptureKind {
        self.kind
    }

    async fn acquire(&mut self) -> vista_gateway::Result<()> {
        if self.fail_acquire {
            record(&self.log, format!("acquire failed {}", self.kind));
            return Err(vista_gateway::Error::Media("permission denied".to_string()));
        }
        record(&self.log, format!("acquire {}", self.kind));
        self.active = true;
        Ok(())
    }

    async fn grab(&mut self) -> vista_gateway::Result<RawFrame> {
        if !self.active {
            return Err(vista_gateway::Error::Media("not active".to_string()));
        }
        if !self.ready {
            return Err(vista_gateway::Error::Media("frame not ready".to_string()));
        }
        record(&self.log, format!("grab {}", self.kind));
        Ok(RawFrame {
            width: 8,
            height: 8,
            pixels: vec![128; 8 * 8 * 3],
        })
    }

    fn release(&mut self) {
        if self.active {
            record(&self.log, format!("release {}", self.kind));
            self.active = false;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Analyzer double returning a fixed live result
pub struct StubAnalyzer {
    log: CallLog,
}

impl StubAnalyzer {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(
        &self,
        _jpeg: &[u8],
        question: Option<&str>,
        _language: Language,
    ) -> AnalysisResult {
        record(
            &self.log,
            format!("analyze q={}", question.unwrap_or("<none>")),
        );
        AnalysisResult {
            text: "A tidy room with a chair near the door.".to_string(),
            question: question.map(String::from),
            is_offline: false,
        }
    }
}

/// Options for spawning a test session
pub struct HarnessOptions {
    pub voice_feedback: bool,
    pub local_ready: bool,
    pub fail_local_acquire: bool,
    pub listen_window: Duration,
    pub language: Language,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            voice_feedback: true,
            local_ready: true,
            fail_local_acquire: false,
            listen_window: Duration::from_secs(60),
            language: Language::English,
        }
    }
}

/// A running session wired to doubles
pub struct Harness {
    pub commands: mpsc::Sender<SessionCommand>,
    pub recognizer_events: mpsc::Sender<RecognizerEvent>,
    pub signals: mpsc::UnboundedReceiver<SessionSignal>,
    pub log: CallLog,
    pub task: JoinHandle<()>,
}

/// Spawn a session against scripted doubles
pub fn spawn_session(options: HarnessOptions) -> Harness {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));

    let (recognizer_tx, recognizer_rx) = mpsc::channel(32);
    let (speaker_tx, speaker_rx) = mpsc::channel(32);
    let (command_tx, command_rx) = mpsc::channel(32);
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();

    let prefs_path = std::env::temp_dir().join(format!(
        "vista-harness-{}.json",
        uuid::Uuid::new_v4()
    ));
    let prefs = PrefStore::load_or_default(&prefs_path);
    prefs
        .update(|p| p.voice_feedback = options.voice_feedback)
        .expect("failed to set test preferences");

    let mut local = StubSource::new(CaptureKind::Local, log.clone());
    local.ready = options.local_ready;
    local.fail_acquire = options.fail_local_acquire;
    let remote = StubSource::new(CaptureKind::Remote, log.clone());

    let session = Session::new(
        SessionConfig {
            language: options.language,
            listen_window: options.listen_window,
        },
        prefs,
        SessionEngines {
            recognizer: Box::new(ScriptedRecognizer::new(log.clone())),
            synthesizer: Box::new(ScriptedSynthesizer::new(log.clone(), speaker_tx)),
            local_source: Box::new(local),
            remote_source: Box::new(remote),
            analyzer: Arc::new(StubAnalyzer::new(log.clone())),
        },
        SessionChannels {
            commands: command_rx,
            recognizer_events: recognizer_rx,
            speaker_events: speaker_rx,
            signals: signal_tx,
        },
    );

    Harness {
        commands: command_tx,
        recognizer_events: recognizer_tx,
        signals: signal_rx,
        log,
        task: tokio::spawn(session.run()),
    }
}

/// Wait for the first signal matching `pred`, skipping others
pub async fn wait_for_signal(
    signals: &mut mpsc::UnboundedReceiver<SessionSignal>,
    pred: impl Fn(&SessionSignal) -> bool,
) -> SessionSignal {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let signal = signals.recv().await.expect("signal channel closed");
            if pred(&signal) {
                return signal;
            }
        }
    })
    .await
    .expect("timed out waiting for signal")
}

/// Let the session loop drain pending events
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(80)).await;
}

impl Harness {
    /// Speak a full utterance: toggle on, feed fragments, end recognition
    pub async fn say(&mut self, fragments: &[&str]) {
        self.commands
            .send(SessionCommand::ToggleListen)
            .await
            .unwrap();
        settle().await;
        for fragment in fragments {
            self.recognizer_events
                .send(RecognizerEvent::Fragment((*fragment).to_string()))
                .await
                .unwrap();
        }
        self.recognizer_events
            .send(RecognizerEvent::Ended)
            .await
            .unwrap();
        settle().await;
    }
}
