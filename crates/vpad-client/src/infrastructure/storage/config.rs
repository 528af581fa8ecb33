//! TOML configuration for the translator client.
//!
//! The file is optional.  Every field has a default, so an empty file, a
//! partial file, or no file at all all produce a usable configuration:
//!
//! ```toml
//! [relay]
//! url = "ws://localhost:5000/ws"
//! reconnect_delay_secs = 3
//!
//! [device]
//! kind = "uinput"          # or "dry-run"
//! name = "vpad Virtual Gamepad"
//! ```
//!
//! Command-line flags are applied on top of whatever this module loads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::device::{DeviceKind, DEFAULT_DEVICE_NAME};
use crate::infrastructure::network::{RelayConnectionConfig, DEFAULT_RELAY_URL};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A zero reconnect delay would hammer the relay with connect attempts.
    #[error("reconnect delay must be at least 1 second")]
    ZeroReconnectDelay,
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level translator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub relay: RelaySection,
    #[serde(default)]
    pub device: DeviceSection,
}

/// Where the relay is and how to reconnect to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelaySection {
    #[serde(default = "default_url")]
    pub url: String,
    /// Seconds to wait before reconnecting after the connection drops.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

/// Which virtual device to drive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceSection {
    #[serde(default)]
    pub kind: DeviceKind,
    /// Name the uinput device is registered under.
    #[serde(default = "default_device_name")]
    pub name: String,
}

fn default_url() -> String {
    DEFAULT_RELAY_URL.to_string()
}
fn default_reconnect_delay_secs() -> u64 {
    3
}
fn default_device_name() -> String {
    DEFAULT_DEVICE_NAME.to_string()
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            kind: DeviceKind::default(),
            name: default_device_name(),
        }
    }
}

impl ClientConfig {
    /// Checks values that parse fine but cannot be run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroReconnectDelay`] if `reconnect_delay_secs`
    /// is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.reconnect_delay_secs == 0 {
            return Err(ConfigError::ZeroReconnectDelay);
        }
        Ok(())
    }

    /// Settings for the relay connection supervisor.
    pub fn connection_config(&self) -> RelayConnectionConfig {
        RelayConnectionConfig {
            url: self.relay.url.clone(),
            reconnect_interval: Duration::from_secs(self.relay.reconnect_delay_secs),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads a config file.  `None` yields the defaults.
///
/// An explicitly named file must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(ClientConfig::default());
    };
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
