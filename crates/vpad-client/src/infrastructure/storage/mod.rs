//! Configuration persistence for the translator client.

pub mod config;

pub use config::{load_config, ClientConfig, ConfigError, DeviceSection, RelaySection};
