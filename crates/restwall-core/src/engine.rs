use crate::control::ControlMode;

/// Action the scheduler should take after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Create the overlay session and show the surface.
    Show,
    /// Destroy the overlay session and hide the surface.
    Hide,
    /// Leave things as they are.
    None,
}

/// Whether `minute` falls inside a scheduled break window.
///
/// The windows are `0..=5` and `30..=35`, bounds inclusive: six minutes
/// each, matching the deployed behavior.
#[must_use]
pub const fn in_lock_window(minute: u32) -> bool {
    matches!(minute, 0..=5 | 30..=35)
}

/// Maps the current mode, wall-clock minute and overlay visibility to an
/// action. Pure: takes no locks, performs no I/O.
#[must_use]
pub fn decide(mode: ControlMode, minute_of_hour: u32, overlay_active: bool) -> Decision {
    match mode {
        ControlMode::ForceLock => {
            if overlay_active {
                Decision::None
            } else {
                Decision::Show
            }
        }
        ControlMode::ForceUnlock => {
            if overlay_active {
                Decision::Hide
            } else {
                Decision::None
            }
        }
        ControlMode::Auto => {
            let in_window = in_lock_window(minute_of_hour);
            if in_window && !overlay_active {
                Decision::Show
            } else if !in_window && overlay_active {
                Decision::Hide
            } else {
                Decision::None
            }
        }
    }
}
