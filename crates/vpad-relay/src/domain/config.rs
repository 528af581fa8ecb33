//! Relay configuration types.
//!
//! [`RelayConfig`] is the single source of truth for all runtime settings.
//! It is populated from CLI arguments in `main.rs` or from defaults in tests;
//! nothing in this module reads the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Request paths reserved for the entry page.
pub const PAGE_PATHS: [&str; 2] = ["/", "/index.html"];

/// A configuration value the relay cannot run with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid WebSocket path {path:?}: {reason}")]
    InvalidWsPath { path: String, reason: &'static str },
}

/// All runtime configuration for the relay.
///
/// # Example
///
/// ```rust
/// use vpad_relay::domain::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 5000);
/// assert_eq!(cfg.ws_path, "/ws");
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// The address and port the HTTP/WebSocket listener binds to.
    pub bind_addr: SocketAddr,

    /// Request path that is upgraded to the relay WebSocket.
    pub ws_path: String,

    /// HTML file served at `/`.  `None` serves the built-in page.
    pub page: Option<PathBuf>,

    /// Outbound frames buffered per peer before new frames for that peer are
    /// dropped.  A slow peer loses frames; it never slows the others down.
    pub queue_depth: usize,

    /// Interval between WebSocket Ping frames sent to each peer.  `None`
    /// disables keepalive pings.
    pub ping_interval: Option<Duration>,
}

impl RelayConfig {
    /// Checks that `ws_path` is a literal absolute path that does not shadow
    /// the entry page.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWsPath`] describing the problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ws_path(&self.ws_path)
    }
}

/// Validates a WebSocket upgrade path.
///
/// Only unreserved URL characters and `/` are accepted, so the path is always
/// matched literally by the router.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidWsPath`] describing the problem.
pub fn check_ws_path(path: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidWsPath {
        path: path.to_string(),
        reason,
    };
    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if PAGE_PATHS.contains(&path) {
        return Err(invalid("reserved for the entry page"));
    }
    let literal = path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '~'));
    if !literal {
        return Err(invalid("only letters, digits, '/', '-', '_', '.' and '~' are allowed"));
    }
    Ok(())
}

impl Default for RelayConfig {
    /// | Field          | Default        |
    /// |----------------|----------------|
    /// | bind_addr      | `0.0.0.0:5000` |
    /// | ws_path        | `/ws`          |
    /// | page           | built-in       |
    /// | queue_depth    | 64             |
    /// | ping_interval  | 20 seconds     |
    fn default() -> Self {
        Self {
            // Compile-time-known valid socket address.
            bind_addr: "0.0.0.0:5000".parse().unwrap(),
            ws_path: "/ws".to_string(),
            page: None,
            queue_depth: 64,
            ping_interval: Some(Duration::from_secs(20)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
