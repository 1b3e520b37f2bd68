//! Settings loaded from `settings.json`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::XdgDirs;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/chat";
pub const DEFAULT_PROTOCOL: &str = "data";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unsupported protocol {0:?}: only \"data\" streams can be rendered")]
    UnsupportedProtocol(String),
}

/// User settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chat endpoint URL.
    pub endpoint: String,
    /// Value sent as the `protocol` query parameter.
    pub protocol: String,
    /// ANSI colors in the transcript.
    pub color: bool,
    /// Redraw the transcript in place while a reply streams.
    pub live_redraw: bool,
    /// Pause between chunks when replaying a recorded stream.
    pub replay_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
            color: true,
            live_redraw: true,
            replay_delay_ms: 0,
        }
    }
}

impl Settings {
    /// Load from the XDG config directory.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&XdgDirs::new().settings_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Reject values the client cannot honour.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.protocol != DEFAULT_PROTOCOL {
            return Err(SettingsError::UnsupportedProtocol(self.protocol.clone()));
        }
        Ok(())
    }

    pub fn replay_delay(&self) -> Duration {
        Duration::from_millis(self.replay_delay_ms)
    }
}
