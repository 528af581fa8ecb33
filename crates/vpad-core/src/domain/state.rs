//! Held-button memory and frame planning.
//!
//! The virtual device is stateful: once a button is pressed it stays pressed
//! until it is released.  Snapshots, on the other hand, are absolute.  This
//! module bridges the two.
//!
//! # Two kinds of controls
//!
//! - **Level-triggered**: sticks, shoulders and triggers.  They are re-asserted
//!   on every frame.  Setting a stick to the same position twice, or pressing
//!   an already-pressed shoulder, is harmless.
//! - **Edge-triggered**: face buttons and d-pad directions.  These arrive as
//!   held-*sets*, and re-pressing them every frame would look like a fresh
//!   press to some device APIs.  [`DeviceState`] remembers the previously
//!   applied sets and only emits a `Press` when an identifier enters the set
//!   and a `Release` when it leaves.
//!
//! # Plan, then commit
//!
//! [`DeviceState::plan`] is pure: it returns a [`FramePlan`] holding the
//! ordered actions *and* the state that becomes current once those actions
//! are committed.  The caller swaps the state in only after the device
//! accepted the whole frame, so a rejected snapshot or a failed commit never
//! leaves the memory out of step with what was actually applied.

use std::collections::BTreeSet;

use crate::domain::buttons::{DPadButton, FaceButton, GamepadButton, HeldButton};
use crate::domain::snapshot::InputSnapshot;

/// Analog trigger value for a released trigger.
pub const TRIGGER_MIN: u8 = 0;

/// Analog trigger value for a fully pulled trigger.
pub const TRIGGER_MAX: u8 = 255;

/// Maps a binary trigger flag onto the analog trigger range.
pub fn trigger_value(pulled: bool) -> u8 {
    if pulled {
        TRIGGER_MAX
    } else {
        TRIGGER_MIN
    }
}

/// One device-facing operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GamepadAction {
    SetLeftStick { x: f32, y: f32 },
    SetRightStick { x: f32, y: f32 },
    SetLeftTrigger(u8),
    SetRightTrigger(u8),
    Press(GamepadButton),
    Release(GamepadButton),
}

/// Buttons that changed between two held-sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonEdges<T> {
    /// In `current` but not in `previous`, ascending.
    pub pressed: Vec<T>,
    /// In `previous` but not in `current`, ascending.
    pub released: Vec<T>,
}

/// Computes the press and release edges between two held-sets.
pub fn diff_held<T: Ord + Copy>(previous: &BTreeSet<T>, current: &BTreeSet<T>) -> ButtonEdges<T> {
    ButtonEdges {
        pressed: current.difference(previous).copied().collect(),
        released: previous.difference(current).copied().collect(),
    }
}

/// Which face buttons and d-pad directions are held on the device as of the
/// last committed frame.
///
/// A fresh state holds nothing, matching a just-created virtual device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    pressed_face: BTreeSet<FaceButton>,
    pressed_dpad: BTreeSet<DPadButton>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pressed_face(&self) -> &BTreeSet<FaceButton> {
        &self.pressed_face
    }

    pub fn pressed_dpad(&self) -> &BTreeSet<DPadButton> {
        &self.pressed_dpad
    }

    /// `true` when no edge-triggered button is held.
    pub fn is_idle(&self) -> bool {
        self.pressed_face.is_empty() && self.pressed_dpad.is_empty()
    }

    /// Plans the actions that converge the device onto `snapshot`.
    ///
    /// Action order: left stick, right stick, shoulders, triggers, face
    /// presses, face releases, d-pad presses, d-pad releases.
    pub fn plan(&self, snapshot: &InputSnapshot) -> FramePlan {
        let mut actions = Vec::with_capacity(8);

        let left = snapshot.left_stick.clamped();
        let right = snapshot.right_stick.clamped();
        actions.push(GamepadAction::SetLeftStick { x: left.x, y: left.y });
        actions.push(GamepadAction::SetRightStick { x: right.x, y: right.y });

        actions.push(level(snapshot.l1, GamepadButton::LeftShoulder));
        actions.push(level(snapshot.r1, GamepadButton::RightShoulder));

        actions.push(GamepadAction::SetLeftTrigger(trigger_value(snapshot.l2)));
        actions.push(GamepadAction::SetRightTrigger(trigger_value(snapshot.r2)));

        let face = snapshot.held_face_buttons();
        push_edges(&mut actions, diff_held(&self.pressed_face, &face));

        let dpad = snapshot.held_dpad_buttons();
        push_edges(&mut actions, diff_held(&self.pressed_dpad, &dpad));

        FramePlan {
            actions,
            next_state: DeviceState {
                pressed_face: face,
                pressed_dpad: dpad,
            },
        }
    }

    /// Plans a frame that returns the device to rest: sticks centred,
    /// triggers at zero, shoulders released and every held button released.
    pub fn release_plan(&self) -> FramePlan {
        self.plan(&InputSnapshot::neutral())
    }
}

fn level(held: bool, button: GamepadButton) -> GamepadAction {
    if held {
        GamepadAction::Press(button)
    } else {
        GamepadAction::Release(button)
    }
}

fn push_edges<T: HeldButton>(actions: &mut Vec<GamepadAction>, edges: ButtonEdges<T>) {
    actions.extend(
        edges
            .pressed
            .into_iter()
            .map(|b| GamepadAction::Press(b.gamepad_button())),
    );
    actions.extend(
        edges
            .released
            .into_iter()
            .map(|b| GamepadAction::Release(b.gamepad_button())),
    );
}

/// The result of planning one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    actions: Vec<GamepadAction>,
    next_state: DeviceState,
}

impl FramePlan {
    /// Actions to issue, in order, before committing.
    pub fn actions(&self) -> &[GamepadAction] {
        &self.actions
    }

    /// State that becomes current once the frame is committed.
    pub fn next_state(&self) -> &DeviceState {
        &self.next_state
    }

    pub fn into_next_state(self) -> DeviceState {
        self.next_state
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
