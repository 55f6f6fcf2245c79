pub mod control;
pub mod engine;
pub mod scheduler;
pub mod surface;

pub use control::{ControlMode, ControlState, ControlStore, ListenerId};
pub use engine::{decide, in_lock_window, Decision};
pub use scheduler::{OverlaySession, Scheduler};
pub use surface::{LogSurface, OverlayContent, OverlaySurface, SurfaceError};
