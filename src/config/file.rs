//! TOML configuration file loading
//!
//! Supports a `config.toml` in the platform config directory as a persistent
//! config source. All fields are optional; the file is a partial overlay on
//! top of defaults.

use std::path::Path;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VistaConfigFile {
    /// Session language tag (e.g. "en", "ta-IN")
    #[serde(default)]
    pub language: Option<String>,

    /// Listening window in milliseconds
    #[serde(default)]
    pub listen_window_ms: Option<u64>,

    /// Gateway base URL for the analysis client
    #[serde(default)]
    pub gateway_url: Option<String>,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Vision model identifier (e.g. "gemini-1.5-flash")
    pub vision_model: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub google: Option<String>,
}

/// Load the TOML config file from `path`
///
/// Returns `VistaConfigFile::default()` if the file doesn't exist or can't be
/// parsed; a malformed file is logged, never fatal.
#[must_use]
pub fn load(path: &Path) -> VistaConfigFile {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return VistaConfigFile::default();
    };

    match toml::from_str(&contents) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            VistaConfigFile::default()
        }
    }
}
