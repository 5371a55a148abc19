//! # Latest-Value Mailbox
//!
//! Blocking single-slot queue between one producer and its consumers.
//!
//! ## Contract
//!
//! - `send()` appends under the lock, wakes ONE waiter, and returns. It never blocks.
//! - `receive()` sleeps until the backlog is non-empty, takes the NEWEST entry,
//!   and discards everything older. The backlog is empty when it returns.
//! - `receive()` has no timeout. If nothing is ever sent it waits forever.
//!   Use `receive_timeout()` or `receive_until_closed()` when that matters.
//!
//! ## Thread Safety
//!
//! ```text
//!   Producer ──send()──┐
//!                      ├──> Mutex<Backlog> ──notify_one──> Condvar ──> Receiver
//!   close() ───────────┘                     (notify_all on close)
//! ```
//!
//! Every wait re-checks the backlog after waking, so spurious wakeups are harmless.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::MailboxClosed;

/// Pending values plus the closed flag, guarded together.
struct Backlog<T> {
    entries: Vec<T>,
    closed: bool,
}

/// Counters for a mailbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MailboxStats {
    /// Values handed to `send()`.
    pub sent: u64,
    /// Values returned by any receive call.
    pub received: u64,
    /// Values dropped because a newer one arrived before they were received.
    pub superseded: u64,
}

/// Blocking mailbox that always delivers the most recently sent value.
///
/// ## Usage
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use crossroads_core::Mailbox;
///
/// let mailbox = Arc::new(Mailbox::new());
///
/// let producer = Arc::clone(&mailbox);
/// let handle = thread::spawn(move || {
///     producer.send("red");
///     producer.send("green");
/// });
/// handle.join().unwrap();
///
/// // Red was superseded before anyone looked.
/// assert_eq!(mailbox.receive(), "green");
/// ```
pub struct Mailbox<T> {
    /// Backlog and closed flag.
    backlog: Mutex<Backlog<T>>,
    /// Signalled on every send (one waiter) and on close (all waiters).
    not_empty: Condvar,
    /// Total sends.
    sent: AtomicU64,
    /// Total successful receives.
    received: AtomicU64,
    /// Total values discarded by drain-to-latest.
    superseded: AtomicU64,
}

impl<T> Mailbox<T> {
    /// Creates an empty, open mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backlog: Mutex::new(Backlog {
                entries: Vec::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            sent: AtomicU64::new(0),
            received: AtomicU64::new(0),
            superseded: AtomicU64::new(0),
        }
    }

    /// Publishes a value and wakes one waiting receiver.
    ///
    /// Never blocks beyond the short critical section. Sends after
    /// [`Mailbox::close`] are still accepted and can be drained.
    pub fn send(&self, value: T) {
        let mut backlog = self.backlog.lock();
        backlog.entries.push(value);
        self.sent.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(pending = backlog.entries.len(), "value added to mailbox");
        self.not_empty.notify_one();
    }

    /// Blocks until a value is available and returns the newest one.
    ///
    /// All older pending values are discarded. Blocks forever if nothing is
    /// ever sent, including on a closed mailbox.
    pub fn receive(&self) -> T {
        let mut backlog = self.backlog.lock();
        loop {
            if let Some(value) = self.take_latest(&mut backlog) {
                return value;
            }
            self.not_empty.wait(&mut backlog);
        }
    }

    /// Like [`Mailbox::receive`], but returns once the mailbox is closed.
    ///
    /// A value that was pending at close time is still delivered.
    ///
    /// # Errors
    ///
    /// Returns [`MailboxClosed`] if the mailbox is closed and empty.
    pub fn receive_until_closed(&self) -> Result<T, MailboxClosed> {
        let mut backlog = self.backlog.lock();
        loop {
            if let Some(value) = self.take_latest(&mut backlog) {
                return Ok(value);
            }
            if backlog.closed {
                return Err(MailboxClosed);
            }
            self.not_empty.wait(&mut backlog);
        }
    }

    /// Waits at most `timeout` for a value.
    ///
    /// Returns `None` on timeout, or if the mailbox is closed and empty.
    /// A timeout too large to express as a deadline waits until a value
    /// arrives or the mailbox closes.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.receive_until_closed().ok();
        };
        let mut backlog = self.backlog.lock();
        loop {
            if let Some(value) = self.take_latest(&mut backlog) {
                return Some(value);
            }
            if backlog.closed {
                return None;
            }
            if self.not_empty.wait_until(&mut backlog, deadline).timed_out() {
                return self.take_latest(&mut backlog);
            }
        }
    }

    /// Takes the newest value without waiting.
    #[must_use]
    pub fn try_receive(&self) -> Option<T> {
        let mut backlog = self.backlog.lock();
        self.take_latest(&mut backlog)
    }

    /// Closes the mailbox and wakes every waiter.
    ///
    /// Waiters in [`Mailbox::receive_until_closed`] and
    /// [`Mailbox::receive_timeout`] return once the backlog is drained.
    pub fn close(&self) {
        let mut backlog = self.backlog.lock();
        backlog.closed = true;
        self.not_empty.notify_all();
    }

    /// Returns true once [`Mailbox::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.backlog.lock().closed
    }

    /// Number of values waiting to be drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backlog.lock().entries.len()
    }

    /// Returns true if no value is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backlog.lock().entries.is_empty()
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> MailboxStats {
        MailboxStats {
            sent: self.sent.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
        }
    }

    /// Pops the newest entry and clears the rest. Caller holds the lock.
    fn take_latest(&self, backlog: &mut MutexGuard<'_, Backlog<T>>) -> Option<T> {
        let latest = backlog.entries.pop()?;
        let dropped = backlog.entries.len() as u64;
        backlog.entries.clear();

        self.received.fetch_add(1, Ordering::Relaxed);
        if dropped > 0 {
            self.superseded.fetch_add(dropped, Ordering::Relaxed);
        }
        tracing::trace!(superseded = dropped, "value received from mailbox");
        Some(latest)
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backlog = self.backlog.lock();
        f.debug_struct("Mailbox")
            .field("pending", &backlog.entries.len())
            .field("closed", &backlog.closed)
            .field("stats", &self.stats())
            .finish()
    }
}
