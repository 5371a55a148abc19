//! # Green Waiter
//!
//! Consumer side of a light: block until the light turns GREEN.
//!
//! RED values are consumed and ignored. Because the mailbox only keeps the
//! newest value, a consumer that was busy during a RED -> GREEN -> RED burst
//! sees only the final RED and keeps waiting. That is intended: a vehicle
//! cares about the light NOW, not about the phases it missed.

use std::time::{Duration, Instant};

use crossroads_core::{Mailbox, MailboxClosed};
use crossroads_shared::Phase;

use crate::error::{CrossroadsError, CrossroadsResult};
use crate::light::TrafficLight;

/// Something a vehicle can wait on.
pub trait GreenWaiter {
    /// Blocks until a GREEN phase is received.
    ///
    /// No timeout. Blocks forever on a light that never turns green.
    ///
    /// # Errors
    ///
    /// Returns [`CrossroadsError::ShutDown`] if the light is shut down first.
    fn wait_for_green(&self) -> CrossroadsResult<()>;

    /// Like [`GreenWaiter::wait_for_green`], giving up after `timeout`.
    ///
    /// Returns `Ok(false)` on timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CrossroadsError::ShutDown`] if the light is shut down first.
    fn wait_for_green_timeout(&self, timeout: Duration) -> CrossroadsResult<bool>;

    /// Snapshot of the current phase. Never blocks.
    fn current_phase(&self) -> Phase;
}

/// Drains `mailbox` until a GREEN value arrives.
///
/// # Errors
///
/// Returns [`MailboxClosed`] if the mailbox closes first.
pub fn wait_for_green_on(mailbox: &Mailbox<Phase>) -> Result<(), MailboxClosed> {
    loop {
        if mailbox.receive_until_closed()?.is_green() {
            return Ok(());
        }
    }
}

/// Drains `mailbox` until GREEN arrives or `timeout` expires.
///
/// Returns `Ok(false)` on timeout. Once the deadline has passed a timeout
/// is reported even if the mailbox was closed in the meantime. A timeout
/// too large to express as a deadline behaves like [`wait_for_green_on`].
///
/// # Errors
///
/// Returns [`MailboxClosed`] if the mailbox closes before the deadline.
pub fn wait_for_green_on_timeout(
    mailbox: &Mailbox<Phase>,
    timeout: Duration,
) -> Result<bool, MailboxClosed> {
    let Some(deadline) = Instant::now().checked_add(timeout) else {
        return wait_for_green_on(mailbox).map(|()| true);
    };
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match mailbox.receive_timeout(remaining) {
            Some(phase) if phase.is_green() => return Ok(true),
            Some(_) => {}
            None if Instant::now() >= deadline => return Ok(false),
            None if mailbox.is_closed() => return Err(MailboxClosed),
            None => return Ok(false),
        }
    }
}

impl GreenWaiter for TrafficLight {
    fn wait_for_green(&self) -> CrossroadsResult<()> {
        wait_for_green_on(self.mailbox())
            .map_err(|MailboxClosed| CrossroadsError::ShutDown(self.name().to_string()))
    }

    fn wait_for_green_timeout(&self, timeout: Duration) -> CrossroadsResult<bool> {
        wait_for_green_on_timeout(self.mailbox(), timeout)
            .map_err(|MailboxClosed| CrossroadsError::ShutDown(self.name().to_string()))
    }

    fn current_phase(&self) -> Phase {
        TrafficLight::current_phase(self)
    }
}
