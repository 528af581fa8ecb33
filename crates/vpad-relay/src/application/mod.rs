//! Application layer for vpad-relay.
//!
//! # Responsibilities
//!
//! - Tracking which peers are connected
//! - Fanning each received frame out to every other peer
//! - Isolating per-peer delivery failures
//!
//! # What does NOT belong here?
//!
//! - Sockets, WebSocket framing, or HTTP (infrastructure)
//! - Task spawning (infrastructure)

pub mod hub;

pub use hub::{DeliveryError, FanOutReport, PeerId, PeerMailbox, RelayHub};
