//! Infrastructure layer for vpad-relay.
//!
//! # Responsibilities
//!
//! - Binding the TCP listener and serving the `axum` router
//! - Routing each request: WebSocket upgrade, entry page, or 404
//! - Spawning the per-peer reader and writer tasks
//! - Handling the graceful shutdown signal
//!
//! # What does NOT belong here?
//!
//! - Membership and fan-out rules (application layer)
//! - Configuration parsing (done in `main.rs`)

pub mod http_page;
pub mod ws_server;

pub use ws_server::{build_router, run_server, serve, RelayState};
