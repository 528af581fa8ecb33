//! StateTranslator: applies controller snapshots to a virtual gamepad.
//!
//! This use case sits at the application layer and delegates to a
//! [`VirtualGamepad`] trait object for the actual device calls.  The
//! platform implementations live in the infrastructure layer.
//!
//! Each snapshot is handled as one frame:
//!
//! 1. Decode.  A malformed snapshot is rejected before the device is touched.
//! 2. Plan the frame against the held-button memory ([`DeviceState::plan`]).
//! 3. Issue every planned action, then `commit()` them as one device update.
//! 4. Only once the commit succeeded does the planned state become current.
//!
//! A device failure anywhere in steps 3 and 4 abandons the frame and leaves
//! the held-button memory as it was, so the next snapshot is diffed against
//! what the device last accepted.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use vpad_core::{
    decode_snapshot, decode_snapshot_bytes, DeviceState, FramePlan, GamepadAction, GamepadButton,
    InputSnapshot, SnapshotError,
};

/// Error type for virtual gamepad operations.
#[derive(Debug, Error)]
pub enum GamepadError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("virtual gamepads are not supported on this platform")]
    Unsupported,
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform-agnostic virtual gamepad.
///
/// Setters and button calls queue changes; [`VirtualGamepad::commit`] applies
/// everything queued since the last commit as a single device update.
#[cfg_attr(test, mockall::automock)]
pub trait VirtualGamepad: Send + Sync {
    /// Sets the left stick.  Both components are in [-1, 1], +y is up.
    fn set_left_stick(&self, x: f32, y: f32) -> Result<(), GamepadError>;

    /// Sets the right stick.  Both components are in [-1, 1], +y is up.
    fn set_right_stick(&self, x: f32, y: f32) -> Result<(), GamepadError>;

    fn set_left_trigger(&self, value: u8) -> Result<(), GamepadError>;

    fn set_right_trigger(&self, value: u8) -> Result<(), GamepadError>;

    fn press(&self, button: GamepadButton) -> Result<(), GamepadError>;

    fn release(&self, button: GamepadButton) -> Result<(), GamepadError>;

    /// Applies all queued changes.
    fn commit(&self) -> Result<(), GamepadError>;
}

/// Why a received message did not change the device.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("discarding snapshot: {0}")]
    Decode(#[from] SnapshotError),
    #[error("device rejected frame: {0}")]
    Device(#[from] GamepadError),
}

/// The translate-snapshot use case.
///
/// Owned by a single consumer; it is not shared between tasks.
pub struct StateTranslator {
    device: Arc<dyn VirtualGamepad>,
    state: DeviceState,
}

impl StateTranslator {
    /// Creates a translator for a freshly created device with nothing held.
    pub fn new(device: Arc<dyn VirtualGamepad>) -> Self {
        Self {
            device,
            state: DeviceState::new(),
        }
    }

    /// Held-button memory as of the last committed frame.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Applies one decoded snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError`] if any device call or the commit fails.  The
    /// held-button memory is unchanged in that case.
    pub fn apply(&mut self, snapshot: &InputSnapshot) -> Result<(), GamepadError> {
        let plan = self.state.plan(snapshot);
        self.commit_plan(plan)
    }

    /// Decodes a text message and applies it.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Decode`] for malformed snapshots (the device
    /// is not touched) and [`TranslateError::Device`] for device failures.
    pub fn handle_text(&mut self, text: &str) -> Result<(), TranslateError> {
        let snapshot = decode_snapshot(text)?;
        self.apply_decoded(&snapshot)
    }

    /// Decodes a binary message carrying UTF-8 JSON and applies it.
    ///
    /// # Errors
    ///
    /// Same as [`StateTranslator::handle_text`], plus a decode error when the
    /// bytes are not UTF-8.
    pub fn handle_bytes(&mut self, bytes: &[u8]) -> Result<(), TranslateError> {
        let snapshot = decode_snapshot_bytes(bytes)?;
        self.apply_decoded(&snapshot)
    }

    /// Returns the device to rest: sticks centred, triggers at zero and every
    /// button released.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError`] if the device rejects the frame.
    pub fn release_all(&mut self) -> Result<(), GamepadError> {
        let plan = self.state.release_plan();
        self.commit_plan(plan)
    }

    fn apply_decoded(&mut self, snapshot: &InputSnapshot) -> Result<(), TranslateError> {
        if let Some(player) = &snapshot.player_id {
            debug!("snapshot from player {player}");
        }
        for id in snapshot.unrecognized_identifiers() {
            debug!("ignoring unknown button identifier {id:?}");
        }
        self.apply(snapshot)?;
        Ok(())
    }

    fn commit_plan(&mut self, plan: FramePlan) -> Result<(), GamepadError> {
        for action in plan.actions() {
            execute(self.device.as_ref(), *action)?;
        }
        self.device.commit()?;
        self.state = plan.into_next_state();
        Ok(())
    }
}

/// Issues one planned action against the device.
pub fn execute(device: &dyn VirtualGamepad, action: GamepadAction) -> Result<(), GamepadError> {
    match action {
        GamepadAction::SetLeftStick { x, y } => device.set_left_stick(x, y),
        GamepadAction::SetRightStick { x, y } => device.set_right_stick(x, y),
        GamepadAction::SetLeftTrigger(value) => device.set_left_trigger(value),
        GamepadAction::SetRightTrigger(value) => device.set_right_trigger(value),
        GamepadAction::Press(button) => device.press(button),
        GamepadAction::Release(button) => device.release(button),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
