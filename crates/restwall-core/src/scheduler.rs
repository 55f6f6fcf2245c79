use crate::control::{ControlMode, ControlState, ControlStore};
use crate::engine::{decide, in_lock_window, Decision};
use crate::surface::{OverlayContent, OverlaySurface};
use chrono::{DateTime, Local, Timelike};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};

/// The one live break session. At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySession {
    pub remaining_seconds: u32,
    /// Mode that created the session. A timed force-lock reverts the store
    /// to auto when its countdown finishes; an auto session does not.
    pub originating_mode: ControlMode,
}

/// Seconds left until the end of the break window containing `minute`.
///
/// The target is minute 5 for the first window and minute 35 for the
/// second. Computed once at session start and never recomputed while the
/// session runs, even if the clock drifts across a window boundary.
fn auto_remaining_seconds(minute: u32, second: u32) -> u32 {
    let target: u32 = if minute < 30 { 5 } else { 35 };
    (target.saturating_sub(minute) * 60).saturating_sub(second)
}

/// Turns decisions into overlay lifecycle transitions and owns the
/// countdown. All surface mutation happens from the single task running
/// [`Scheduler::run`]; the store is the only resource shared with the HTTP
/// handler pool.
pub struct Scheduler {
    store: Arc<ControlStore>,
    surface: Box<dyn OverlaySurface>,
    session: Option<OverlaySession>,
}

impl Scheduler {
    #[must_use]
    pub fn new(store: Arc<ControlStore>, surface: Box<dyn OverlaySurface>) -> Self {
        Self {
            store,
            surface,
            session: None,
        }
    }

    #[must_use]
    pub fn overlay_active(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<&OverlaySession> {
        self.session.as_ref()
    }

    /// One evaluation pass: read the store, decide, apply.
    pub fn evaluate(&mut self, now: DateTime<Local>) {
        let state = self.store.state();
        match decide(state.mode, now.minute(), self.session.is_some()) {
            Decision::Show => self.start_overlay(now, &state),
            Decision::Hide => self.stop_overlay(),
            Decision::None => {}
        }
    }

    fn start_overlay(&mut self, now: DateTime<Local>, state: &ControlState) {
        if self.session.is_some() {
            return;
        }
        let remaining_seconds = match state.mode {
            ControlMode::ForceLock => state.force_lock_minutes * 60,
            _ => auto_remaining_seconds(now.minute(), now.second()),
        };
        let content = OverlayContent::for_break(state.custom_message.as_deref(), remaining_seconds);
        if let Err(e) = self.surface.show(&content) {
            log::warn!("overlay show failed, skipping session: {e}");
            return;
        }
        log::info!(
            "overlay session started ({}, {remaining_seconds}s)",
            state.mode.as_str()
        );
        self.session = Some(OverlaySession {
            remaining_seconds,
            originating_mode: state.mode,
        });
    }

    /// One second of countdown. Re-reads the current mode and minute every
    /// call: a force-unlock or a window exit ends the session immediately,
    /// without waiting for the countdown to run out.
    pub fn countdown_tick(&mut self, now: DateTime<Local>) {
        if self.session.is_none() {
            return;
        }
        let state = self.store.state();
        let interrupted = match state.mode {
            ControlMode::ForceUnlock => true,
            ControlMode::Auto => !in_lock_window(now.minute()),
            ControlMode::ForceLock => false,
        };
        if interrupted {
            self.stop_overlay();
            return;
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.remaining_seconds > 0 {
            session.remaining_seconds -= 1;
            if session.remaining_seconds > 0 {
                return;
            }
        }

        let originating = session.originating_mode;
        self.stop_overlay();
        if originating == ControlMode::ForceLock {
            log::info!("force-lock countdown finished, reverting to auto");
            self.store.reset_to_auto();
        }
    }

    /// Idempotent teardown of the current session. A transient hide failure
    /// from the surface is logged and otherwise ignored.
    pub fn stop_overlay(&mut self) {
        if self.session.take().is_none() {
            return;
        }
        if let Err(e) = self.surface.hide() {
            log::warn!("overlay hide failed: {e}");
        }
        log::info!("overlay session ended");
    }

    /// Drives the scheduler until `shutdown` fires: wakes on whichever
    /// comes first of the periodic evaluation tick, a store change
    /// notification, or (while a session runs) the one-second countdown.
    /// Shutdown tears down any active overlay through the normal
    /// [`Scheduler::stop_overlay`] path.
    pub async fn run(mut self, tick_seconds: u64, mut shutdown: watch::Receiver<bool>) {
        let (wake_tx, mut wake_rx) = mpsc::unbounded_channel::<()>();
        let listener_id = self.store.subscribe(Box::new(move |_, _, _| {
            let _ = wake_tx.send(());
        }));

        let mut eval = interval(Duration::from_secs(tick_seconds.max(1)));
        let mut countdown = interval(Duration::from_secs(1));
        countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!("scheduler started ({tick_seconds}s evaluation tick)");
        loop {
            let had_session = self.session.is_some();
            tokio::select! {
                _ = eval.tick() => self.evaluate(Local::now()),
                Some(()) = wake_rx.recv() => self.evaluate(Local::now()),
                _ = countdown.tick(), if had_session => self.countdown_tick(Local::now()),
                _ = shutdown.changed() => break,
            }
            // Re-arm the countdown so a fresh session gets a full first second.
            if !had_session && self.session.is_some() {
                countdown.reset();
            }
        }

        self.store.unsubscribe(listener_id);
        self.stop_overlay();
        log::info!("scheduler stopped");
    }
}
