//! # Synchronization Primitives
//!
//! ## The Problem
//!
//! ```text
//! Light worker:  toggles every 4-6s, must NEVER block on consumers
//! Consumers:     sleep until something new happens, only care about NOW
//! ```
//!
//! ## The Solution: Latest-Value Mailbox
//!
//! ```text
//!   send(Red) ──┐
//!   send(Green) ┼──> [Backlog: Red, Green] ──> receive() = Green, backlog = []
//!               │      (mutex + condvar)
//! ```
//!
//! The backlog is the only state under mutual exclusion. Each mailbox owns
//! its own lock, so unrelated lights never contend.
//!
//! ## Single consumer
//!
//! Drain-to-latest only makes sense for one consumer (or several consumers
//! with identical interest). Two receivers racing on one mailbox split the
//! published values between them; neither is guaranteed to see every phase.

mod mailbox;
mod shutdown;

pub use mailbox::{Mailbox, MailboxStats};
pub use shutdown::ShutdownSignal;
