//! # CROSSROADS Shared
//!
//! Common types used by the light controller and by its consumers.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on threading or synchronization crates.
//! If you need a lock, put it in `crossroads_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod phase;

pub use constants::{
    DEFAULT_MAX_DWELL_MS, DEFAULT_MIN_DWELL_MS, DEFAULT_OVERSHOOT_WARN_MS, DEFAULT_POLL_INTERVAL_MS,
};
pub use phase::Phase;
