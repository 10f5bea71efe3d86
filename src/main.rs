use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use vista_gateway::api::ApiServer;
use vista_gateway::{
    AnalysisClient, CaptureKind, Config, ConsoleSynthesizer, FrameSource, Language, LineRecognizer,
    PrefStore, Session, SessionChannels, SessionCommand, SessionConfig, SessionEngines,
    SessionSignal, SnapshotSource, TestPatternSource,
};

/// Vista - voice-driven vision assistant gateway for visually impaired users
#[derive(Parser)]
#[command(name = "vista", version, about)]
struct Cli {
    /// Port to listen on (overrides config and VISTA_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a terminal-driven capture-analyze-speak session
    ///
    /// Typed lines stand in for recognized speech; utterances are printed.
    Session {
        /// Snapshot URL for the local camera source (test pattern if omitted)
        #[arg(long)]
        camera_url: Option<String>,

        /// Snapshot URL for the remote "hardware" source (test pattern if omitted)
        #[arg(long)]
        hardware_url: Option<String>,

        /// Session language tag (e.g. "en", "ta")
        #[arg(long)]
        lang: Option<String>,
    },
    /// Analyze an image file through the gateway
    Analyze {
        /// Path to a JPEG/PNG image
        image: PathBuf,

        /// Question about the image
        #[arg(short, long)]
        question: Option<String>,
    },
    /// Ask the assistant a question through the gateway
    Ask {
        /// Question text
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,vista_gateway=info",
        1 => "info,vista_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.api_server.port = port;
    }

    match cli.command {
        None => serve(config).await,
        Some(Command::Session {
            camera_url,
            hardware_url,
            lang,
        }) => {
            if let Some(language) = lang.as_deref().and_then(Language::from_tag) {
                config.language = language;
            }
            run_session(config, camera_url, hardware_url).await
        }
        Some(Command::Analyze { image, question }) => analyze_file(&config, &image, question).await,
        Some(Command::Ask { text }) => ask(&config, &text).await,
    }
}

/// Run the gateway API server until interrupted
async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        port = config.api_server.port,
        vision_configured = config.api_keys.google.is_some(),
        "starting vista gateway"
    );

    let server = ApiServer::new(&config);
    let handle = server.spawn();

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    handle.abort();

    Ok(())
}

/// Run a terminal-driven capture-analyze-speak session
async fn run_session(
    config: Config,
    camera_url: Option<String>,
    hardware_url: Option<String>,
) -> anyhow::Result<()> {
    let prefs = PrefStore::load_or_default(&config.prefs_path());

    let (recognizer_tx, recognizer_rx) = mpsc::channel(32);
    let (speaker_tx, speaker_rx) = mpsc::channel(32);
    let (command_tx, command_rx) = mpsc::channel(32);
    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();

    let (recognizer, feeder) = LineRecognizer::new(recognizer_tx);
    let synthesizer = ConsoleSynthesizer::new(speaker_tx);

    let local_source: Box<dyn FrameSource> = match camera_url.as_deref() {
        Some(url) => Box::new(SnapshotSource::new(CaptureKind::Local, url)),
        None => Box::new(TestPatternSource::new(CaptureKind::Local, 640, 480)),
    };
    let remote_source: Box<dyn FrameSource> = match hardware_url.as_deref() {
        Some(url) => Box::new(SnapshotSource::new(CaptureKind::Remote, url)),
        None => Box::new(TestPatternSource::new(CaptureKind::Remote, 640, 480)),
    };

    let session = Session::new(
        SessionConfig {
            language: config.language,
            listen_window: Duration::from_millis(config.listen_window_ms),
        },
        prefs,
        SessionEngines {
            recognizer: Box::new(recognizer),
            synthesizer: Box::new(synthesizer),
            local_source,
            remote_source,
            analyzer: Arc::new(AnalysisClient::new(&config.gateway_url)),
        },
        SessionChannels {
            commands: command_rx,
            recognizer_events: recognizer_rx,
            speaker_events: speaker_rx,
            signals: signal_tx,
        },
    );
    let session_task = tokio::spawn(session.run());

    println!("Vista session ({})", config.language.tag());
    println!("  Enter        toggle the microphone");
    println!("  <text>       what you'd say while the mic is on");
    println!("  /camera      start the local camera");
    println!("  /hardware    start the hardware stream");
    println!("  /stop        stop the active capture source");
    println!("  /snap        capture and analyze the current frame");
    println!("  quit         end the session");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            signal = signal_rx.recv() => {
                let Some(signal) = signal else { break };
                let closed = matches!(signal, SessionSignal::Closed);
                let navigated = matches!(signal, SessionSignal::Navigate(_));
                render_signal(&signal, config.language);
                if closed {
                    break;
                }
                if navigated {
                    // navigating away destroys the session
                    let _ = command_tx.send(SessionCommand::Close).await;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    let _ = command_tx.send(SessionCommand::Close).await;
                    continue;
                };
                match line.trim() {
                    "" => command_tx.send(SessionCommand::ToggleListen).await?,
                    "quit" | "exit" => command_tx.send(SessionCommand::Close).await?,
                    "/camera" => command_tx.send(SessionCommand::StartCapture(CaptureKind::Local)).await?,
                    "/hardware" => command_tx.send(SessionCommand::StartCapture(CaptureKind::Remote)).await?,
                    "/stop" => {
                        command_tx.send(SessionCommand::StopCapture(CaptureKind::Local)).await?;
                        command_tx.send(SessionCommand::StopCapture(CaptureKind::Remote)).await?;
                    }
                    "/snap" => command_tx.send(SessionCommand::Capture { question: None }).await?,
                    text => {
                        if !feeder.feed(text) {
                            println!("(mic is off - press Enter to toggle it)");
                        }
                    }
                }
            }
        }
    }

    let _ = session_task.await;
    Ok(())
}

/// Print a session signal for the terminal harness
fn render_signal(signal: &SessionSignal, language: Language) {
    match signal {
        SessionSignal::StateChanged(state) => println!("[{state:?}]"),
        SessionSignal::SourceChanged(Some(kind)) => println!("capture source: {kind}"),
        SessionSignal::SourceChanged(None) => println!("capture source: none"),
        SessionSignal::TranscriptUpdated(text) => println!("heard: {text}"),
        SessionSignal::Navigate(target) => println!("navigate: {target:?}"),
        SessionSignal::Notice(notice) => println!("note: {}", notice.text(language)),
        SessionSignal::Analysis(result) => {
            if result.is_offline {
                println!("(offline fallback)");
            }
            println!("{}", result.text);
        }
        SessionSignal::Emergency => println!("EMERGENCY ALERT"),
        SessionSignal::Haptic => {}
        SessionSignal::Closed => println!("session closed"),
    }
}

/// Analyze an image file through the gateway's client path
async fn analyze_file(
    config: &Config,
    path: &std::path::Path,
    question: Option<String>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(path)?;

    // Re-encode through the capture path so the payload matches a live frame
    let frame = vista_gateway::frame::decode(&bytes)?;
    let jpeg = vista_gateway::frame::encode_jpeg(&frame, false)?;

    let client = AnalysisClient::new(&config.gateway_url);
    let result = vista_gateway::Analyzer::analyze(
        &client,
        &jpeg,
        question.as_deref(),
        config.language,
    )
    .await;

    if result.is_offline {
        println!("(offline fallback - the gateway was unreachable)");
    }
    println!("{}", result.text);

    Ok(())
}

/// Ask the assistant one question through the gateway chat endpoint
async fn ask(config: &Config, text: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/chat", config.gateway_url))
        .json(&serde_json::json!({
            "messages": [{ "role": "user", "content": text }]
        }))
        .send()
        .await?;

    let status = response.status();
    let body: serde_json::Value = response.json().await?;

    if !status.is_success() {
        anyhow::bail!(
            "chat failed ({status}): {}",
            body.get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error")
        );
    }

    println!(
        "{}",
        body.get("response")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
    );

    Ok(())
}
