//! Domain entities for vpad.
//!
//! Pure business logic with no I/O: what a controller snapshot looks like,
//! which buttons exist, and how two consecutive snapshots turn into device
//! actions.  Everything here can be unit-tested without a network or a
//! virtual device driver.

/// Fixed button enumerations and their wire-name lookup tables.
pub mod buttons;

/// The decoded controller snapshot.
pub mod snapshot;

/// Held-button memory and frame planning.
pub mod state;
