//! The controller snapshot sent by the browser UI.
//!
//! A snapshot is the *complete* instantaneous controller state, not a delta.
//! Field names follow the JSON the UI produces:
//!
//! ```json
//! {
//!   "playerID": 1,
//!   "leftStick":  {"x": 0.0, "y": 0.5},
//!   "rightStick": {"x": -1.0, "y": 0.0},
//!   "L1": false, "R1": true, "L2": false, "R2": false,
//!   "faceButtons": ["a"],
//!   "DPadButtons": []
//! }
//! ```
//!
//! Every field except `playerID` is required.  `playerID` is kept as whatever
//! JSON value the UI sent (number, string, ...) and never fails a decode.  The held-sets stay as raw
//! strings at this level so that one unknown identifier does not make the
//! whole snapshot undecodable; [`InputSnapshot::held_face_buttons`] and
//! [`InputSnapshot::held_dpad_buttons`] filter them through the button tables.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::buttons::{DPadButton, FaceButton, HeldButton};

/// A 2-D analog stick position.  Each component is nominally in `[-1.0, 1.0]`,
/// positive `y` pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StickVector {
    pub x: f32,
    pub y: f32,
}

impl StickVector {
    /// The resting position.
    pub const CENTER: StickVector = StickVector { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the vector with both components clamped into `[-1.0, 1.0]`.
    ///
    /// NaN collapses to `0.0` (centred) rather than propagating to the device.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_axis(self.x),
            y: clamp_axis(self.y),
        }
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// One decoded controller snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Informational player tag assigned by the UI, kept verbatim.  Not acted
    /// upon.
    #[serde(rename = "playerID", default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<Value>,

    #[serde(rename = "leftStick")]
    pub left_stick: StickVector,

    #[serde(rename = "rightStick")]
    pub right_stick: StickVector,

    /// Left shoulder held.
    #[serde(rename = "L1")]
    pub l1: bool,

    /// Right shoulder held.
    #[serde(rename = "R1")]
    pub r1: bool,

    /// Left trigger pulled.  Binary; mapped to the full analog range.
    #[serde(rename = "L2")]
    pub l2: bool,

    /// Right trigger pulled.
    #[serde(rename = "R2")]
    pub r2: bool,

    /// Identifiers of the face buttons currently held.
    #[serde(rename = "faceButtons")]
    pub face_buttons: Vec<String>,

    /// Identifiers of the d-pad directions currently held.
    #[serde(rename = "DPadButtons")]
    pub dpad_buttons: Vec<String>,
}

impl InputSnapshot {
    /// A snapshot with centred sticks and nothing held.
    pub fn neutral() -> Self {
        Self {
            player_id: None,
            left_stick: StickVector::CENTER,
            right_stick: StickVector::CENTER,
            l1: false,
            r1: false,
            l2: false,
            r2: false,
            face_buttons: Vec::new(),
            dpad_buttons: Vec::new(),
        }
    }

    /// Recognized face buttons in the held-set.  Duplicates collapse.
    pub fn held_face_buttons(&self) -> BTreeSet<FaceButton> {
        recognized(&self.face_buttons)
    }

    /// Recognized d-pad directions in the held-set.
    pub fn held_dpad_buttons(&self) -> BTreeSet<DPadButton> {
        recognized(&self.dpad_buttons)
    }

    /// Held-set entries that match neither button table.
    pub fn unrecognized_identifiers(&self) -> Vec<&str> {
        let face = self
            .face_buttons
            .iter()
            .filter(|id| FaceButton::from_wire(id).is_none());
        let dpad = self
            .dpad_buttons
            .iter()
            .filter(|id| DPadButton::from_wire(id).is_none());
        face.chain(dpad).map(String::as_str).collect()
    }
}

fn recognized<T: HeldButton>(ids: &[String]) -> BTreeSet<T> {
    ids.iter().filter_map(|id| T::from_wire(id)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
