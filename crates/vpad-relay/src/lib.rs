//! vpad-relay library crate.
//!
//! A blind broadcast relay: every WebSocket message received from one peer is
//! forwarded verbatim to every *other* connected peer.  In the usual
//! deployment there are exactly two peers (the browser controller page and the
//! translator client), but nothing in the relay depends on that.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Browser controller ─┐                     ┌─ vpad-client (translator)
//!                     ↕  WebSocket (/ws)    ↕
//! [vpad-relay]
//!   ├── domain/           RelayConfig, RelayFrame
//!   ├── application/      RelayHub: membership + fan-out
//!   └── infrastructure/
//!         ├── ws_server/  axum router, per-peer reader/writer tasks
//!         └── http_page/  the entry page and 404 responses
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `tokio::sync` only; it never sees a
//!   socket or a WebSocket type.
//! - `infrastructure` depends on all other layers plus `axum`.

/// Domain layer: configuration and the opaque relayed frame.
pub mod domain;

/// Application layer: the relay hub.
pub mod application;

/// Infrastructure layer: WebSocket server and page serving.
pub mod infrastructure;
