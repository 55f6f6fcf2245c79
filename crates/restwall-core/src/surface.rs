use thiserror::Error;

/// Failure reported by a platform overlay adapter. Always transient from
/// the scheduler's point of view: logged and swallowed, never fatal.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("overlay surface rejected show: {0}")]
    Show(String),
    #[error("overlay surface rejected hide: {0}")]
    Hide(String),
}

/// Data handed to the surface when a break session starts. The surface owns
/// all rendering; this is just what it needs to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
    pub title: String,
    pub body: String,
    /// Seed for the surface's own countdown display.
    pub countdown_seconds: u32,
}

impl OverlayContent {
    /// Builds break content, substituting `message` for the default body
    /// text when the operator supplied one.
    #[must_use]
    pub fn for_break(message: Option<&str>, countdown_seconds: u32) -> Self {
        Self {
            title: "Time for a break".to_string(),
            body: message
                .unwrap_or("You have been looking at the screen for a while.\nRest your eyes for a bit.")
                .to_string(),
            countdown_seconds,
        }
    }
}

/// Capability interface for the externally-owned full-screen blocking
/// surface. The scheduler depends only on this trait, never on a concrete
/// platform call, so the core is testable with a fake adapter.
pub trait OverlaySurface: Send {
    /// Makes the blocking surface visible with the given content.
    fn show(&mut self, content: &OverlayContent) -> Result<(), SurfaceError>;

    /// Removes the blocking surface. May fail transiently, e.g. when the
    /// host already tore the surface down.
    fn hide(&mut self) -> Result<(), SurfaceError>;
}

/// Adapter that only logs transitions. Used where no platform surface is
/// wired up (headless runs, development).
pub struct LogSurface;

impl OverlaySurface for LogSurface {
    fn show(&mut self, content: &OverlayContent) -> Result<(), SurfaceError> {
        log::info!(
            "overlay show: \"{}\" ({}s countdown)",
            content.title,
            content.countdown_seconds
        );
        Ok(())
    }

    fn hide(&mut self) -> Result<(), SurfaceError> {
        log::info!("overlay hide");
        Ok(())
    }
}
