//! Application layer use cases for the translator client.
//!
//! - **`translate_snapshot`**: turns each received controller snapshot into
//!   calls on a [`translate_snapshot::VirtualGamepad`], remembering which
//!   buttons are held so that face buttons and d-pad directions are pressed
//!   and released exactly once per transition.  The device is injected at
//!   construction time.

pub mod translate_snapshot;

pub use translate_snapshot::{GamepadError, StateTranslator, TranslateError, VirtualGamepad};
