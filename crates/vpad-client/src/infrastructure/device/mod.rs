//! Virtual gamepad implementations.
//!
//! The device is chosen at runtime from the configuration:
//!
//! | Kind      | Implementation    | Platforms |
//! |-----------|-------------------|-----------|
//! | `uinput`  | [`linux::UinputGamepad`] | Linux, needs write access to `/dev/uinput` |
//! | `dry-run` | [`dry_run::DryRunGamepad`] | any |

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::{GamepadError, VirtualGamepad};

pub mod dry_run;

#[cfg(target_os = "linux")]
pub mod linux;

/// Name the uinput device is registered under unless configured otherwise.
pub const DEFAULT_DEVICE_NAME: &str = "vpad Virtual Gamepad";

/// Which [`VirtualGamepad`] to create.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    /// Kernel uinput gamepad.
    #[default]
    Uinput,
    /// Log frames instead of emitting input.
    DryRun,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceKind::Uinput => "uinput",
            DeviceKind::DryRun => "dry-run",
        })
    }
}

/// Creates the configured device.
///
/// # Errors
///
/// Returns [`GamepadError::Unsupported`] for `uinput` on non-Linux targets,
/// or the underlying error if the kernel refuses to create the device.
pub fn open_device(kind: DeviceKind, name: &str) -> Result<Arc<dyn VirtualGamepad>, GamepadError> {
    match kind {
        DeviceKind::DryRun => Ok(Arc::new(dry_run::DryRunGamepad::new())),
        DeviceKind::Uinput => open_uinput(name),
    }
}

#[cfg(target_os = "linux")]
fn open_uinput(name: &str) -> Result<Arc<dyn VirtualGamepad>, GamepadError> {
    Ok(Arc::new(linux::UinputGamepad::create(name)?))
}

#[cfg(not(target_os = "linux"))]
fn open_uinput(_name: &str) -> Result<Arc<dyn VirtualGamepad>, GamepadError> {
    Err(GamepadError::Unsupported)
}
