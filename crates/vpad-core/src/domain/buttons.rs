//! Gamepad button enumerations and their static wire-name tables.
//!
//! The virtual device exposes ten digital buttons ([`GamepadButton`]).  Two of
//! the snapshot fields carry *sets* of held identifiers as plain strings
//! (`"a"`, `"up"`, ...); [`FaceButton`] and [`DPadButton`] are the typed views
//! of those strings.  The string-to-button mappings are `const` tables that
//! are never mutated at runtime.
//!
//! Identifiers are matched exactly (`"A"` is not `"a"`).  Anything missing
//! from a table is an unrecognized identifier and is ignored by callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every digital button the virtual device understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GamepadButton {
    LeftShoulder,
    RightShoulder,
    FaceA,
    FaceB,
    FaceX,
    FaceY,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

impl GamepadButton {
    /// All buttons, in declaration order.
    pub const ALL: [GamepadButton; 10] = [
        GamepadButton::LeftShoulder,
        GamepadButton::RightShoulder,
        GamepadButton::FaceA,
        GamepadButton::FaceB,
        GamepadButton::FaceX,
        GamepadButton::FaceY,
        GamepadButton::DPadUp,
        GamepadButton::DPadDown,
        GamepadButton::DPadLeft,
        GamepadButton::DPadRight,
    ];

    /// Short human-readable name used in log output.
    pub fn name(self) -> &'static str {
        match self {
            GamepadButton::LeftShoulder => "left-shoulder",
            GamepadButton::RightShoulder => "right-shoulder",
            GamepadButton::FaceA => "face-a",
            GamepadButton::FaceB => "face-b",
            GamepadButton::FaceX => "face-x",
            GamepadButton::FaceY => "face-y",
            GamepadButton::DPadUp => "dpad-up",
            GamepadButton::DPadDown => "dpad-down",
            GamepadButton::DPadLeft => "dpad-left",
            GamepadButton::DPadRight => "dpad-right",
        }
    }
}

impl fmt::Display for GamepadButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A button that is reported as a member of a held-set rather than as a
/// named boolean.
///
/// Both button groups share the same edge-triggered diffing, so the planner
/// is written once against this trait.
pub trait HeldButton: Copy + Ord + fmt::Debug + 'static {
    /// Wire identifier → button.  Order is irrelevant; lookups are linear
    /// over at most four entries.
    const TABLE: &'static [(&'static str, Self)];

    /// The device button this identifier drives.
    fn gamepad_button(self) -> GamepadButton;

    /// Looks up a wire identifier.  Returns `None` for unrecognized values.
    fn from_wire(id: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == id)
            .map(|&(_, button)| button)
    }
}

// ── Face buttons ──────────────────────────────────────────────────────────────

/// The four face buttons (Xbox layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaceButton {
    A,
    B,
    X,
    Y,
}

const FACE_BUTTON_TABLE: &[(&str, FaceButton)] = &[
    ("a", FaceButton::A),
    ("b", FaceButton::B),
    ("x", FaceButton::X),
    ("y", FaceButton::Y),
];

impl HeldButton for FaceButton {
    const TABLE: &'static [(&'static str, Self)] = FACE_BUTTON_TABLE;

    fn gamepad_button(self) -> GamepadButton {
        match self {
            FaceButton::A => GamepadButton::FaceA,
            FaceButton::B => GamepadButton::FaceB,
            FaceButton::X => GamepadButton::FaceX,
            FaceButton::Y => GamepadButton::FaceY,
        }
    }
}

// ── D-pad ─────────────────────────────────────────────────────────────────────

/// The four d-pad directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DPadButton {
    Up,
    Down,
    Left,
    Right,
}

const DPAD_BUTTON_TABLE: &[(&str, DPadButton)] = &[
    ("up", DPadButton::Up),
    ("down", DPadButton::Down),
    ("left", DPadButton::Left),
    ("right", DPadButton::Right),
];

impl HeldButton for DPadButton {
    const TABLE: &'static [(&'static str, Self)] = DPAD_BUTTON_TABLE;

    fn gamepad_button(self) -> GamepadButton {
        match self {
            DPadButton::Up => GamepadButton::DPadUp,
            DPadButton::Down => GamepadButton::DPadDown,
            DPadButton::Left => GamepadButton::DPadLeft,
            DPadButton::Right => GamepadButton::DPadRight,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
