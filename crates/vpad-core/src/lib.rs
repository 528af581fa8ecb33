//! # vpad-core
//!
//! Shared library for vpad containing the snapshot wire format, the fixed
//! gamepad button tables, and the pure frame-planning logic that turns an
//! absolute controller snapshot into the minimal list of device actions.
//!
//! This crate is used by both the relay and the translator client.  It has
//! zero dependencies on OS APIs, sockets, or async runtimes.
//!
//! # Architecture overview
//!
//! A browser page acts as a virtual controller.  Roughly sixty times a second
//! it serialises the *complete* controller state (sticks, shoulders, triggers,
//! held face buttons, held d-pad directions) and sends it to the relay, which
//! forwards it to the translator client.  The translator drives a virtual
//! gamepad device that only understands *edges*: "press A", "release A".
//!
//! - **`domain`** – Button enumerations and their static lookup tables, the
//!   [`InputSnapshot`] type, and [`DeviceState`]: the memory of which buttons
//!   are currently held and the diffing that produces a [`FramePlan`].
//!
//! - **`protocol`** – JSON encoding and decoding of snapshots.  A snapshot is
//!   either decoded completely or rejected; it is never partially applied.

pub mod domain;
pub mod protocol;

pub use domain::buttons::{DPadButton, FaceButton, GamepadButton, HeldButton};
pub use domain::snapshot::{InputSnapshot, StickVector};
pub use domain::state::{DeviceState, FramePlan, GamepadAction};
pub use protocol::codec::{decode_snapshot, decode_snapshot_bytes, encode_snapshot, SnapshotError};
