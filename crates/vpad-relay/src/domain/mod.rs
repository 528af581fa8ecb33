//! Domain layer for vpad-relay.
//!
//! - Configuration structures
//! - The relayed frame type, which the relay never inspects

pub mod config;
pub mod frame;

pub use config::{check_ws_path, ConfigError, RelayConfig, PAGE_PATHS};
pub use frame::RelayFrame;
