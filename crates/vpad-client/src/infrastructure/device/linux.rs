//! Linux uinput gamepad via `evdev`.
//!
//! Creates a virtual input device through `/dev/uinput` that advertises an
//! Xbox-style layout, so games and SDL pick it up like a physical pad.
//!
//! | Control        | evdev code                      | Range            |
//! |----------------|---------------------------------|------------------|
//! | Left stick     | `ABS_X`, `ABS_Y`                | -32768..=32767   |
//! | Right stick    | `ABS_RX`, `ABS_RY`              | -32768..=32767   |
//! | L2 / R2        | `ABS_Z`, `ABS_RZ`               | 0..=255          |
//! | L1 / R1        | `BTN_TL`, `BTN_TR`              | key              |
//! | A / B / X / Y  | `BTN_SOUTH` / `EAST` / `WEST` / `NORTH` | key      |
//! | D-pad          | `BTN_DPAD_UP` / `DOWN` / `LEFT` / `RIGHT` | key    |
//!
//! evdev's Y axes grow downwards, so stick Y is inverted on the way out.
//!
//! Calls only append to a pending event buffer; `commit` writes the buffer
//! followed by a single `SYN_REPORT`.  The buffer is taken before writing, so
//! a failed write drops that frame rather than leaking it into the next one.
//!
//! # Permissions
//!
//! The process needs write access to `/dev/uinput` (root, or a udev rule
//! granting the `input` group access).  Otherwise `create` fails with an I/O
//! error.

use std::sync::{Mutex, MutexGuard, PoisonError};

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, BusType, EventType, InputEvent, InputId, Key,
    UinputAbsSetup,
};
use tracing::info;
use vpad_core::GamepadButton;

use crate::application::{GamepadError, VirtualGamepad};

pub const STICK_MIN: i32 = -32768;
pub const STICK_MAX: i32 = 32767;
const STICK_FUZZ: i32 = 16;
const STICK_FLAT: i32 = 128;

/// USB ids of a wired Xbox 360 pad.
const XBOX_VENDOR: u16 = 0x045e;
const XBOX_PRODUCT: u16 = 0x028e;
const XBOX_VERSION: u16 = 0x0110;

/// A uinput gamepad.
pub struct UinputGamepad {
    device: Mutex<VirtualDevice>,
    pending: Mutex<Vec<InputEvent>>,
}

impl UinputGamepad {
    /// Registers a new virtual gamepad with the kernel.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError::Io`] if `/dev/uinput` cannot be opened or the
    /// device cannot be created.
    pub fn create(name: &str) -> Result<Self, GamepadError> {
        let mut keys = AttributeSet::<Key>::new();
        for button in GamepadButton::ALL {
            keys.insert(key_for(button));
        }

        let stick = |axis| {
            UinputAbsSetup::new(
                axis,
                AbsInfo::new(0, STICK_MIN, STICK_MAX, STICK_FUZZ, STICK_FLAT, 0),
            )
        };
        let trigger = |axis| UinputAbsSetup::new(axis, AbsInfo::new(0, 0, 255, 0, 0, 0));

        let device = VirtualDeviceBuilder::new()?
            .name(name)
            .input_id(InputId::new(
                BusType::BUS_USB,
                XBOX_VENDOR,
                XBOX_PRODUCT,
                XBOX_VERSION,
            ))
            .with_keys(&keys)?
            .with_absolute_axis(&stick(AbsoluteAxisType::ABS_X))?
            .with_absolute_axis(&stick(AbsoluteAxisType::ABS_Y))?
            .with_absolute_axis(&stick(AbsoluteAxisType::ABS_RX))?
            .with_absolute_axis(&stick(AbsoluteAxisType::ABS_RY))?
            .with_absolute_axis(&trigger(AbsoluteAxisType::ABS_Z))?
            .with_absolute_axis(&trigger(AbsoluteAxisType::ABS_RZ))?
            .build()?;

        info!("created uinput gamepad {name:?}");

        Ok(Self {
            device: Mutex::new(device),
            pending: Mutex::new(Vec::with_capacity(16)),
        })
    }

    fn queue_abs(&self, axis: AbsoluteAxisType, value: i32) {
        lock(&self.pending).push(InputEvent::new(EventType::ABSOLUTE, axis.0, value));
    }

    fn queue_key(&self, button: GamepadButton, pressed: bool) {
        let event = InputEvent::new(EventType::KEY, key_for(button).code(), i32::from(pressed));
        lock(&self.pending).push(event);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The evdev key code for each gamepad button.
pub fn key_for(button: GamepadButton) -> Key {
    match button {
        GamepadButton::LeftShoulder => Key::BTN_TL,
        GamepadButton::RightShoulder => Key::BTN_TR,
        GamepadButton::FaceA => Key::BTN_SOUTH,
        GamepadButton::FaceB => Key::BTN_EAST,
        GamepadButton::FaceX => Key::BTN_WEST,
        GamepadButton::FaceY => Key::BTN_NORTH,
        GamepadButton::DPadUp => Key::BTN_DPAD_UP,
        GamepadButton::DPadDown => Key::BTN_DPAD_DOWN,
        GamepadButton::DPadLeft => Key::BTN_DPAD_LEFT,
        GamepadButton::DPadRight => Key::BTN_DPAD_RIGHT,
    }
}

/// Scales a stick component in [-1, 1] onto the evdev axis range.
pub fn axis_value(component: f32) -> i32 {
    let c = if component.is_nan() {
        0.0
    } else {
        component.clamp(-1.0, 1.0)
    };
    (c * STICK_MAX as f32).round() as i32
}

impl VirtualGamepad for UinputGamepad {
    fn set_left_stick(&self, x: f32, y: f32) -> Result<(), GamepadError> {
        self.queue_abs(AbsoluteAxisType::ABS_X, axis_value(x));
        self.queue_abs(AbsoluteAxisType::ABS_Y, axis_value(-y));
        Ok(())
    }

    fn set_right_stick(&self, x: f32, y: f32) -> Result<(), GamepadError> {
        self.queue_abs(AbsoluteAxisType::ABS_RX, axis_value(x));
        self.queue_abs(AbsoluteAxisType::ABS_RY, axis_value(-y));
        Ok(())
    }

    fn set_left_trigger(&self, value: u8) -> Result<(), GamepadError> {
        self.queue_abs(AbsoluteAxisType::ABS_Z, i32::from(value));
        Ok(())
    }

    fn set_right_trigger(&self, value: u8) -> Result<(), GamepadError> {
        self.queue_abs(AbsoluteAxisType::ABS_RZ, i32::from(value));
        Ok(())
    }

    fn press(&self, button: GamepadButton) -> Result<(), GamepadError> {
        self.queue_key(button, true);
        Ok(())
    }

    fn release(&self, button: GamepadButton) -> Result<(), GamepadError> {
        self.queue_key(button, false);
        Ok(())
    }

    fn commit(&self) -> Result<(), GamepadError> {
        let events = std::mem::take(&mut *lock(&self.pending));
        if events.is_empty() {
            return Ok(());
        }
        // `emit` appends the SYN_REPORT.
        lock(&self.device).emit(&events)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_axis_value_extremes() {
        assert_eq!(axis_value(1.0), STICK_MAX);
        assert_eq!(axis_value(-1.0), -STICK_MAX);
        assert_eq!(axis_value(0.0), 0);
    }

    #[test]
    fn test_axis_value_clamps_out_of_range() {
        assert_eq!(axis_value(4.0), STICK_MAX);
        assert_eq!(axis_value(-4.0), -STICK_MAX);
    }

    #[test]
    fn test_axis_value_nan_is_centre() {
        assert_eq!(axis_value(f32::NAN), 0);
    }

    #[test]
    fn test_axis_value_half_deflection() {
        assert_eq!(axis_value(0.5), 16384);
    }

    #[test]
    fn test_every_button_has_a_distinct_key() {
        let keys: HashSet<u16> = GamepadButton::ALL
            .iter()
            .map(|b| key_for(*b).code())
            .collect();
        assert_eq!(keys.len(), GamepadButton::ALL.len());
    }

    #[test]
    fn test_face_a_is_south() {
        assert_eq!(key_for(GamepadButton::FaceA), Key::BTN_SOUTH);
    }
}
