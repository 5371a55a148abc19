//! # Shutdown Signal
//!
//! One-way cancellation flag for long-lived workers.
//!
//! The flag is an atomic so the hot loop can check it without locking.
//! `sleep()` parks on a condvar instead of `thread::sleep`, so a worker with
//! a long poll interval still notices shutdown immediately.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Cancellation flag observed by a background worker.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    /// Set once, never cleared.
    requested: AtomicBool,
    /// Pairs with `condvar` for interruptible sleeps.
    mutex: Mutex<()>,
    /// Notified on trigger.
    condvar: Condvar,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown and wakes every sleeper.
    ///
    /// Idempotent.
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::Release);
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }

    /// Returns true once [`ShutdownSignal::trigger`] has been called.
    #[inline]
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Sleeps for `duration` or until triggered, whichever comes first.
    ///
    /// Returns true if shutdown was requested.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return true;
        }
        let mut guard = self.mutex.lock();
        // Re-check under the lock: trigger() notifies while holding it.
        if self.is_triggered() {
            return true;
        }
        self.condvar.wait_for(&mut guard, duration);
        self.is_triggered()
    }
}
