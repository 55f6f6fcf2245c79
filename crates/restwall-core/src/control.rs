use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Shortest force-lock the remote operator may request, in minutes.
pub const MIN_LOCK_MINUTES: u32 = 1;
/// Longest force-lock the remote operator may request, in minutes.
pub const MAX_LOCK_MINUTES: u32 = 60;
/// Force-lock duration applied when the operator does not specify one.
pub const DEFAULT_LOCK_MINUTES: u32 = 5;

/// The sole authority over overlay visibility intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMode {
    /// Show the overlay only during the scheduled break windows.
    Auto,
    /// Show the overlay now, for the configured duration, regardless of time.
    ForceLock,
    /// Hide the overlay now and keep it hidden regardless of time.
    ForceUnlock,
}

impl ControlMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::ForceLock => "FORCE_LOCK",
            Self::ForceUnlock => "FORCE_UNLOCK",
        }
    }
}

/// Snapshot of the control state. Volatile: a process restart resets it
/// to `{Auto, 5, None}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub mode: ControlMode,
    /// Always within `[MIN_LOCK_MINUTES, MAX_LOCK_MINUTES]`.
    pub force_lock_minutes: u32,
    /// Only meaningful under `ForceLock`; cleared on any other transition.
    pub custom_message: Option<String>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            mode: ControlMode::Auto,
            force_lock_minutes: DEFAULT_LOCK_MINUTES,
            custom_message: None,
        }
    }
}

impl ControlState {
    /// Human-readable status line for the control panel and logs.
    #[must_use]
    pub fn status_text(&self) -> String {
        match self.mode {
            ControlMode::Auto => "auto (scheduled windows)".to_string(),
            ControlMode::ForceLock => {
                format!("force-locked for {} min", self.force_lock_minutes)
            }
            ControlMode::ForceUnlock => "force-unlocked".to_string(),
        }
    }
}

/// Callback invoked synchronously on every committed state change, on the
/// thread that performed the mutation.
pub type Listener = Box<dyn Fn(ControlMode, u32, Option<&str>) + Send + Sync>;

/// Handle returned by [`ControlStore::subscribe`]; pass it back to
/// [`ControlStore::unsubscribe`] to stop receiving change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
struct ListenerTable {
    entries: BTreeMap<u64, Listener>,
    next_id: u64,
}

/// Single source of truth for the current control mode and its parameters.
///
/// Constructed once at process start and shared by `Arc` between the HTTP
/// handler pool and the scheduler task. All read-modify-write happens under
/// one lock, so readers always observe a fully committed `(mode, duration,
/// message)` triple, never a torn one.
#[derive(Default)]
pub struct ControlStore {
    state: Mutex<ControlState>,
    listeners: Mutex<ListenerTable>,
}

impl ControlStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a consistent snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ControlState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies a new mode. The duration is clamped to
    /// `[MIN_LOCK_MINUTES, MAX_LOCK_MINUTES]` and the message is kept only
    /// under `ForceLock` (blank messages count as absent). If the resulting
    /// state equals the current one this is a no-op and no listener fires.
    pub fn set_mode(&self, mode: ControlMode, minutes: u32, message: Option<&str>) {
        let next = ControlState {
            mode,
            force_lock_minutes: minutes.clamp(MIN_LOCK_MINUTES, MAX_LOCK_MINUTES),
            custom_message: if mode == ControlMode::ForceLock {
                message
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(ToString::to_string)
            } else {
                None
            },
        };

        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == next {
                return;
            }
            *state = next.clone();
        }

        log::info!("control state changed: {}", next.status_text());
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.entries.values() {
            listener(
                next.mode,
                next.force_lock_minutes,
                next.custom_message.as_deref(),
            );
        }
    }

    /// Show the overlay immediately for `minutes`, with an optional message
    /// displayed on it.
    pub fn force_lock(&self, minutes: u32, message: Option<&str>) {
        self.set_mode(ControlMode::ForceLock, minutes, message);
    }

    /// Hide the overlay immediately and keep it hidden.
    pub fn force_unlock(&self) {
        self.set_mode(ControlMode::ForceUnlock, DEFAULT_LOCK_MINUTES, None);
    }

    /// Return to the scheduled-window behavior.
    pub fn reset_to_auto(&self) {
        self.set_mode(ControlMode::Auto, DEFAULT_LOCK_MINUTES, None);
    }

    /// Registers a change listener and returns its handle.
    pub fn subscribe(&self, listener: Listener) -> ListenerId {
        let mut table = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = table.next_id;
        table.next_id += 1;
        table.entries.insert(id, listener);
        log::debug!("listener {id} registered, total: {}", table.entries.len());
        ListenerId(id)
    }

    /// Removes a change listener. Safe to call with an already removed id.
    pub fn unsubscribe(&self, id: ListenerId) {
        let mut table = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        table.entries.remove(&id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_listener(count: Arc<AtomicUsize>) -> Listener {
        Box::new(move |_, _, _| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_initial_state_is_auto_with_defaults() {
        let store = ControlStore::new();
        let state = store.state();
        assert_eq!(state.mode, ControlMode::Auto);
        assert_eq!(state.force_lock_minutes, DEFAULT_LOCK_MINUTES);
        assert_eq!(state.custom_message, None);
    }

    #[test]
    fn test_force_lock_duration_is_clamped() {
        let store = ControlStore::new();
        for (requested, stored) in [(0, 1), (1, 1), (30, 30), (60, 60), (61, 60), (999, 60)] {
            store.force_lock(requested, None);
            assert_eq!(store.state().force_lock_minutes, stored, "requested {requested}");
        }
    }

    #[test]
    fn test_message_kept_only_under_force_lock() {
        let store = ControlStore::new();
        store.force_lock(10, Some("dinner time"));
        assert_eq!(store.state().custom_message.as_deref(), Some("dinner time"));

        store.force_unlock();
        assert_eq!(store.state().custom_message, None);

        store.force_lock(10, Some("homework"));
        store.reset_to_auto();
        assert_eq!(store.state().custom_message, None);
    }

    #[test]
    fn test_blank_message_treated_as_absent() {
        let store = ControlStore::new();
        store.force_lock(10, Some("   "));
        assert_eq!(store.state().custom_message, None);
    }

    #[test]
    fn test_identical_state_does_not_fire_listeners() {
        let store = ControlStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        store.subscribe(counting_listener(count.clone()));

        store.force_lock(10, None);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Second reset is a no-op: state already Auto with defaults.
        store.reset_to_auto();
        store.reset_to_auto();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_receives_committed_triple() {
        let store = ControlStore::new();
        let seen: Arc<Mutex<Option<(ControlMode, u32, Option<String>)>>> =
            Arc::new(Mutex::new(None));
        let seen_in_listener = seen.clone();
        store.subscribe(Box::new(move |mode, minutes, message| {
            *seen_in_listener.lock().unwrap() =
                Some((mode, minutes, message.map(ToString::to_string)));
        }));

        store.force_lock(999, Some("bed time"));
        let triple = seen.lock().unwrap().clone().unwrap();
        assert_eq!(
            triple,
            (ControlMode::ForceLock, 60, Some("bed time".to_string()))
        );
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let store = ControlStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let id = store.subscribe(counting_listener(count.clone()));

        store.unsubscribe(id);
        store.unsubscribe(id);
        store.force_lock(5, None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_force_unlock_clears_message_and_keeps_duration_default() {
        let store = ControlStore::new();
        store.force_lock(42, Some("note"));
        store.force_unlock();
        let state = store.state();
        assert_eq!(state.mode, ControlMode::ForceUnlock);
        assert_eq!(state.custom_message, None);
        assert_eq!(state.force_lock_minutes, DEFAULT_LOCK_MINUTES);
    }
}
