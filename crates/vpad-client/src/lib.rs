//! vpad-client library entry point.
//!
//! The translator client connects to the relay, receives the controller
//! snapshots the browser page broadcasts, and drives a virtual gamepad so
//! that games on this machine see a physical controller.
//!
//! 1. Connects to the relay over WebSocket and reconnects after a fixed delay
//!    whenever the connection drops.
//! 2. Decodes each message into an [`vpad_core::InputSnapshot`].
//! 3. Diffs it against the buttons currently held and issues the resulting
//!    presses, releases, stick and trigger updates as one device frame.
//!
//! # Layout
//!
//! ```text
//! [vpad-client]
//!   ├── application/     StateTranslator, VirtualGamepad trait
//!   └── infrastructure/
//!         ├── device/    uinput (Linux) and dry-run gamepads
//!         ├── network/   relay connection supervisor
//!         └── storage/   TOML configuration
//! ```

/// Application layer: the translate-snapshot use case.
pub mod application;

/// Infrastructure layer: devices, network, and configuration.
pub mod infrastructure;
