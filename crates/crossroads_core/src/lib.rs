//! # CROSSROADS Core
//!
//! Thread hand-off primitives for the traffic light simulation.
//!
//! ## Architecture Rules
//!
//! 1. **Per-instance synchronization** - every mailbox owns its mutex and condvar
//! 2. **Freshness over history** - a receiver gets the latest value, older ones are dropped
//! 3. **Explicit lifecycle** - blocked receivers are released by closing, not by process exit
//!
//! ## Example
//!
//! ```rust
//! use crossroads_core::Mailbox;
//!
//! let mailbox = Mailbox::new();
//! mailbox.send(1);
//! mailbox.send(2);
//! assert_eq!(mailbox.receive(), 2);
//! assert!(mailbox.is_empty());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod sync;

pub use error::MailboxClosed;
pub use sync::{Mailbox, MailboxStats, ShutdownSignal};
