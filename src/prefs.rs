//! Accessibility preference store
//!
//! Process-wide settings loaded once at startup and written through to disk
//! on every change. Consumers hold a [`PrefStore`] handle (cheap to clone)
//! and can subscribe to change notifications.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{Error, Result};

/// User accessibility settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityPrefs {
    /// Base font size in pixels
    pub font_size: u32,
    /// High-contrast rendering
    pub high_contrast: bool,
    /// Speak analysis results and notices aloud
    pub voice_feedback: bool,
    /// Vibrate on listen start (mobile devices)
    pub haptic_feedback: bool,
    /// Gesture-based controls
    pub gesture_control: bool,
}

impl Default for AccessibilityPrefs {
    fn default() -> Self {
        Self {
            font_size: 16,
            high_contrast: false,
            voice_feedback: true,
            haptic_feedback: true,
            gesture_control: false,
        }
    }
}

/// Handle to the preference store
///
/// Reads come from an in-memory snapshot; writes persist to the backing file
/// before notifying subscribers.
#[derive(Clone)]
pub struct PrefStore {
    path: Arc<PathBuf>,
    tx: Arc<watch::Sender<AccessibilityPrefs>>,
}

impl PrefStore {
    /// Load preferences from `path`, falling back to defaults when the file
    /// is missing or unreadable
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        let prefs = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(prefs) => prefs,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed preferences file");
                    AccessibilityPrefs::default()
                }
            },
            Err(_) => AccessibilityPrefs::default(),
        };

        tracing::debug!(path = %path.display(), ?prefs, "preferences loaded");

        let (tx, _rx) = watch::channel(prefs);
        Self {
            path: Arc::new(path.to_path_buf()),
            tx: Arc::new(tx),
        }
    }

    /// Current preference snapshot
    #[must_use]
    pub fn get(&self) -> AccessibilityPrefs {
        self.tx.borrow().clone()
    }

    /// Replace the preferences and persist them
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written. The in-memory
    /// state is only updated after a successful write.
    pub fn set(&self, prefs: AccessibilityPrefs) -> Result<()> {
        self.persist(&prefs)?;
        self.tx.send_replace(prefs);
        Ok(())
    }

    /// Apply a mutation to the current preferences and persist the result
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written.
    pub fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut AccessibilityPrefs),
    {
        let mut prefs = self.get();
        mutate(&mut prefs);
        self.set(prefs)
    }

    /// Subscribe to preference changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AccessibilityPrefs> {
        self.tx.subscribe()
    }

    fn persist(&self, prefs: &AccessibilityPrefs) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(prefs)?;
        std::fs::write(self.path.as_ref(), json)
            .map_err(|e| Error::Config(format!("failed to write preferences: {e}")))?;
        tracing::debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}
