//! Dry-run gamepad: records and logs frames instead of emitting input.
//!
//! Useful on machines without uinput access, for checking what the browser
//! page sends, and in tests.  Every call is queued; `commit` moves the queue
//! into the list of committed frames and logs the button edges in it.
//!
//! Set `fail_commits` to simulate a device that rejects frames.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use tracing::{debug, info};
use vpad_core::{GamepadAction, GamepadButton};

use crate::application::{GamepadError, VirtualGamepad};

/// A gamepad that only records what it is asked to do.
#[derive(Debug, Default)]
pub struct DryRunGamepad {
    pending: Mutex<Vec<GamepadAction>>,
    frames: Mutex<Vec<Vec<GamepadAction>>>,
    /// When `true`, `commit` discards the queued frame and returns an error.
    pub fail_commits: AtomicBool,
}

impl DryRunGamepad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every committed frame, oldest first.
    pub fn frames(&self) -> Vec<Vec<GamepadAction>> {
        lock(&self.frames).clone()
    }

    /// All committed actions flattened in order.
    pub fn committed_actions(&self) -> Vec<GamepadAction> {
        lock(&self.frames).iter().flatten().copied().collect()
    }

    /// Committed `Press`/`Release` actions for face buttons and the d-pad.
    pub fn committed_edges(&self) -> Vec<GamepadAction> {
        self.committed_actions()
            .into_iter()
            .filter(is_edge)
            .collect()
    }

    fn queue(&self, action: GamepadAction) -> Result<(), GamepadError> {
        lock(&self.pending).push(action);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn is_edge(action: &GamepadAction) -> bool {
    match action {
        GamepadAction::Press(b) | GamepadAction::Release(b) => {
            !matches!(b, GamepadButton::LeftShoulder | GamepadButton::RightShoulder)
        }
        _ => false,
    }
}

impl VirtualGamepad for DryRunGamepad {
    fn set_left_stick(&self, x: f32, y: f32) -> Result<(), GamepadError> {
        self.queue(GamepadAction::SetLeftStick { x, y })
    }

    fn set_right_stick(&self, x: f32, y: f32) -> Result<(), GamepadError> {
        self.queue(GamepadAction::SetRightStick { x, y })
    }

    fn set_left_trigger(&self, value: u8) -> Result<(), GamepadError> {
        self.queue(GamepadAction::SetLeftTrigger(value))
    }

    fn set_right_trigger(&self, value: u8) -> Result<(), GamepadError> {
        self.queue(GamepadAction::SetRightTrigger(value))
    }

    fn press(&self, button: GamepadButton) -> Result<(), GamepadError> {
        self.queue(GamepadAction::Press(button))
    }

    fn release(&self, button: GamepadButton) -> Result<(), GamepadError> {
        self.queue(GamepadAction::Release(button))
    }

    fn commit(&self) -> Result<(), GamepadError> {
        let frame = std::mem::take(&mut *lock(&self.pending));
        if self.fail_commits.load(Ordering::Relaxed) {
            return Err(GamepadError::Platform("dry-run commit rejected".to_string()));
        }

        for action in frame.iter().filter(|a| is_edge(a)) {
            match action {
                GamepadAction::Press(b) => info!("[dry-run] press {b}"),
                GamepadAction::Release(b) => info!("[dry-run] release {b}"),
                _ => {}
            }
        }
        debug!("[dry-run] frame: {frame:?}");

        lock(&self.frames).push(frame);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
