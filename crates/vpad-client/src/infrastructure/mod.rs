//! Infrastructure layer for the translator client.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `vpad_core`, but MUST NOT be imported by the application layer.
//!
//! # Sub-modules
//!
//! - **`device`**: implementations of `VirtualGamepad`.  `uinput` creates a
//!   real Linux gamepad; `dry-run` only records and logs frames.
//! - **`network`**: WebSocket client for the relay with an automatic
//!   reconnect loop.
//! - **`storage`**: the optional TOML configuration file.

pub mod device;
pub mod network;
pub mod storage;
