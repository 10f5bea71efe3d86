//! Configuration management for the Vista gateway

pub mod file;

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::language::Language;
use crate::{Error, Result};

/// Default API server port
pub const DEFAULT_PORT: u16 = 18890;

/// Default listening window in milliseconds
pub const DEFAULT_LISTEN_WINDOW_MS: u64 = 5000;

/// Vista gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (preferences, caches)
    pub data_dir: PathBuf,

    /// Session language
    pub language: Language,

    /// Listening window for voice commands, in milliseconds
    pub listen_window_ms: u64,

    /// Base URL of the gateway the analysis client talks to
    pub gateway_url: String,

    /// Vision model identifier
    pub vision_model: String,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Google API key (for Gemini vision and chat)
    pub google: Option<String>,
}

impl Config {
    /// Load configuration: defaults, overlaid by the TOML config file,
    /// overlaid by environment variables
    ///
    /// # Errors
    ///
    /// Returns error if the platform directories cannot be determined or an
    /// env override fails to parse
    pub fn load() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "vista", "vista")
            .ok_or_else(|| Error::Config("could not determine platform directories".to_string()))?;

        let file = file::load(&dirs.config_dir().join("config.toml"));

        let language = std::env::var("VISTA_LANG")
            .ok()
            .or(file.language)
            .and_then(|tag| Language::from_tag(&tag))
            .unwrap_or_default();

        let port = match std::env::var("VISTA_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("invalid VISTA_PORT: {e}")))?,
            Err(_) => file.server.port.unwrap_or(DEFAULT_PORT),
        };

        let gateway_url = std::env::var("VISTA_GATEWAY_URL")
            .ok()
            .or(file.gateway_url)
            .unwrap_or_else(|| format!("http://127.0.0.1:{port}"));

        let data_dir = std::env::var("VISTA_DATA_DIR")
            .ok()
            .map_or_else(|| dirs.data_dir().to_path_buf(), PathBuf::from);

        let google = std::env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or(file.api_keys.google);

        Ok(Self {
            data_dir,
            language,
            listen_window_ms: file.listen_window_ms.unwrap_or(DEFAULT_LISTEN_WINDOW_MS),
            gateway_url,
            vision_model: file
                .server
                .vision_model
                .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            api_server: ApiServerConfig { port },
            api_keys: ApiKeys { google },
        })
    }

    /// Path of the accessibility preferences file
    #[must_use]
    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }
}
