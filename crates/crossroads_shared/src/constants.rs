//! # Timing Constants
//!
//! Default cadence of a traffic light.
//!
//! These are only defaults. Every value can be overridden through
//! `LightConfig` in the `crossroads` crate.

// =============================================================================
// DWELL TIME
// =============================================================================

/// Shortest time a phase is held before toggling (milliseconds, inclusive).
pub const DEFAULT_MIN_DWELL_MS: u64 = 4000;

/// Longest time a phase is held before toggling (milliseconds, inclusive).
pub const DEFAULT_MAX_DWELL_MS: u64 = 6000;

// =============================================================================
// POLLING
// =============================================================================

/// Sleep between two elapsed-time checks in the toggle loop.
///
/// Not part of the external contract. Only the 4-6s cadence is.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1;

/// Overshoot past the sampled dwell that gets logged as a warning.
pub const DEFAULT_OVERSHOOT_WARN_MS: u64 = 100;
