//! # CROSSROADS
//!
//! Two-phase traffic light simulation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        TrafficLight                          │
//! │                                                              │
//! │   ┌──────────────┐   send()    ┌──────────────────────────┐  │
//! │   │ light worker │ ──────────> │ Mailbox<Phase>           │  │
//! │   │ (own thread) │             │ (latest value wins)      │  │
//! │   └──────┬───────┘             └────────────┬─────────────┘  │
//! │          │ store                            │ receive()      │
//! │          ▼                                  ▼                │
//! │   ┌──────────────┐             ┌──────────────────────────┐  │
//! │   │ AtomicU8     │             │ GreenWaiter              │  │
//! │   │ current phase│             │ wait_for_green()         │  │
//! │   └──────────────┘             └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML-backed timing configuration
//! - `dwell`: uniform dwell-time sampling
//! - `light`: the state machine and its worker
//! - `waiter`: the consumer contract

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod dwell;
pub mod error;
pub mod light;
pub mod waiter;

// Re-export the lower layers
pub use crossroads_core as core;
pub use crossroads_shared as shared;

// Re-export commonly used types
pub use config::{IntersectionConfig, LightConfig};
pub use crossroads_core::{Mailbox, MailboxClosed, MailboxStats};
pub use crossroads_shared::Phase;
pub use dwell::DwellSampler;
pub use error::{CrossroadsError, CrossroadsResult};
pub use light::TrafficLight;
pub use waiter::{wait_for_green_on, wait_for_green_on_timeout, GreenWaiter};
