//! Single-slot debounce timer.
//!
//! A [`DebounceTimer`] holds at most one scheduled callback. Starting a new
//! timer always cancels the previous one first.
//!
//! Aborting a tokio task cannot stop a callback that has already woken up and
//! is waiting for the owner's lock. The firing callback therefore receives its
//! [`TimerId`] and must [`claim`](DebounceTimer::claim) it under the owner's
//! lock before acting; a superseded or cancelled id can never be claimed.

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::logging::targets;

/// Identifies one scheduled timer within its [`DebounceTimer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[derive(Debug)]
struct PendingTimer {
    id: TimerId,
    task: AbortHandle,
}

/// A timer slot that keeps at most one live deferred callback.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    pending: Option<PendingTimer>,
    next_id: u64,
}

impl DebounceTimer {
    /// Create an empty timer slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `on_fire` to run after `delay`, cancelling any pending timer.
    pub fn start<F>(&mut self, handle: &Handle, delay: Duration, on_fire: F) -> TimerId
    where
        F: FnOnce(TimerId) + Send + 'static,
    {
        self.cancel();

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(id);
        });

        tracing::trace!(target: targets::TIMER, %id, ?delay, "timer started");
        self.pending = Some(PendingTimer {
            id,
            task: task.abort_handle(),
        });
        id
    }

    /// Cancel the pending timer, if any.
    ///
    /// Returns `true` if a timer was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.task.abort();
                tracing::trace!(target: targets::TIMER, id = %pending.id, "timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Check whether a timer is scheduled and not yet claimed.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Claim a fired timer.
    ///
    /// Returns `true` and clears the slot only if `id` is the live timer.
    pub fn claim(&mut self, id: TimerId) -> bool {
        match &self.pending {
            Some(pending) if pending.id == id => {
                self.pending = None;
                true
            }
            _ => {
                tracing::trace!(target: targets::TIMER, %id, "stale timer ignored");
                false
            }
        }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut timer = DebounceTimer::new();

        let fired_clone = fired.clone();
        let id = timer.start(&Handle::current(), Duration::from_millis(250), move |id| {
            fired_clone.lock().push(id);
        });
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(249)).await;
        assert!(fired.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*fired.lock(), vec![id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut timer = DebounceTimer::new();

        let first = fired.clone();
        let first_id = timer.start(&Handle::current(), Duration::from_millis(100), move |id| {
            first.lock().push(id);
        });

        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = fired.clone();
        let second_id = timer.start(&Handle::current(), Duration::from_millis(100), move |id| {
            second.lock().push(id);
        });
        assert_ne!(first_id, second_id);
        assert!(!timer.claim(first_id));
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(*fired.lock(), vec![second_id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let fired = Arc::new(Mutex::new(0));
        let mut timer = DebounceTimer::new();

        let fired_clone = fired.clone();
        timer.start(&Handle::current(), Duration::from_millis(10), move |_| {
            *fired_clone.lock() += 1;
        });
        assert!(timer.cancel());
        assert!(!timer.cancel());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*fired.lock(), 0);
    }

    #[test]
    fn test_claim_only_live_timer() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let mut timer = DebounceTimer::new();

        let stale = timer.start(runtime.handle(), Duration::from_secs(60), |_| {});
        let live = timer.start(runtime.handle(), Duration::from_secs(60), |_| {});

        assert!(!timer.claim(stale));
        assert!(timer.is_pending());
        assert!(timer.claim(live));
        assert!(!timer.is_pending());
        assert!(!timer.claim(live));
    }
}
