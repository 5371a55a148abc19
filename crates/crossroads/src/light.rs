//! # Traffic Light State Machine
//!
//! A light alternates RED -> GREEN -> RED forever, holding each phase for a
//! dwell time drawn uniformly from the configured range.
//!
//! ## States
//!
//! - **RED**: initial state.
//! - **GREEN**: consumers blocked in `wait_for_green()` are released.
//!
//! There is no terminal state. The worker runs until `shutdown()` or drop.
//!
//! ## Architecture
//!
//! ```text
//!   simulate() ──spawn──> [light-<name> worker]
//!                              │  every poll_interval:
//!                              │    elapsed >= dwell ?
//!                              │      phase.toggle()      (AtomicU8)
//!                              │      mailbox.send(phase) (never blocks)
//!                              │      dwell = sample()
//!                              ▼
//!   current_phase() <── AtomicU8     Mailbox<Phase> ──> wait_for_green()
//! ```
//!
//! Readers of `current_phase()` may lag the worker by at most one toggle.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossroads_core::{Mailbox, ShutdownSignal};
use crossroads_shared::Phase;

use crate::config::LightConfig;
use crate::dwell::DwellSampler;
use crate::error::{CrossroadsError, CrossroadsResult};

/// State shared between the light handle and its worker thread.
struct LightShared {
    /// Current phase, encoded with [`Phase::as_u8`]. Written by the worker only.
    phase: AtomicU8,
    /// Toggles performed since start.
    toggles: AtomicU64,
    /// Every toggle is published here.
    mailbox: Mailbox<Phase>,
    /// Stops the worker.
    shutdown: ShutdownSignal,
}

impl LightShared {
    fn new() -> Self {
        Self {
            phase: AtomicU8::new(Phase::Red.as_u8()),
            toggles: AtomicU64::new(0),
            mailbox: Mailbox::new(),
            shutdown: ShutdownSignal::new(),
        }
    }

    #[inline]
    fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Flips the phase and publishes it. Called by the worker only.
    fn toggle(&self) -> Phase {
        let next = self.phase().toggled();
        self.phase.store(next.as_u8(), Ordering::Release);
        self.toggles.fetch_add(1, Ordering::Relaxed);
        self.mailbox.send(next);
        next
    }
}

/// A two-phase traffic light driven by its own worker thread.
///
/// ## Usage
///
/// ```rust,no_run
/// use crossroads::{GreenWaiter, LightConfig, Phase, TrafficLight};
///
/// let light = TrafficLight::with_config(LightConfig::default().named("main-st"))?;
/// assert_eq!(light.current_phase(), Phase::Red);
///
/// light.simulate()?;
/// light.wait_for_green()?; // blocks roughly 4-6 seconds
/// # Ok::<(), crossroads::CrossroadsError>(())
/// ```
pub struct TrafficLight {
    /// Timing configuration (validated).
    config: LightConfig,
    /// State shared with the worker.
    shared: Arc<LightShared>,
    /// Set by the first `simulate()`.
    started: AtomicBool,
    /// Worker handle, taken on shutdown.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TrafficLight {
    /// Creates a RED light with the production cadence (4-6s).
    #[must_use]
    pub fn new() -> Self {
        Self::from_validated(LightConfig::default())
    }

    /// Creates a RED light with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CrossroadsError::InvalidConfig`] if the config is out of range.
    pub fn with_config(config: LightConfig) -> CrossroadsResult<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: LightConfig) -> Self {
        Self {
            config,
            shared: Arc::new(LightShared::new()),
            started: AtomicBool::new(false),
            worker: Mutex::new(None),
        }
    }

    /// Starts the toggle worker. Returns immediately.
    ///
    /// # Errors
    ///
    /// - [`CrossroadsError::AlreadySimulating`] on a second call.
    /// - [`CrossroadsError::ShutDown`] if the light was already shut down.
    /// - [`CrossroadsError::WorkerSpawn`] if the OS refuses a new thread.
    pub fn simulate(&self) -> CrossroadsResult<()> {
        if self.shared.shutdown.is_triggered() {
            return Err(CrossroadsError::ShutDown(self.config.name.clone()));
        }
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(CrossroadsError::AlreadySimulating(self.config.name.clone()));
        }

        let sampler = DwellSampler::from_config(&self.config)?;
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name(format!("light-{}", self.config.name))
            .spawn(move || cycle_through_phases(&shared, sampler, &config));

        match spawned {
            Ok(handle) => {
                *self.worker.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.started.store(false, Ordering::Release);
                Err(CrossroadsError::WorkerSpawn {
                    name: self.config.name.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Snapshot of the current phase. Never blocks.
    ///
    /// May be stale by up to one toggle.
    #[inline]
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.shared.phase()
    }

    /// Mailbox every toggle is published to.
    ///
    /// Intended for a single consumer. See `crossroads_core::sync`.
    #[must_use]
    pub fn mailbox(&self) -> &Mailbox<Phase> {
        &self.shared.mailbox
    }

    /// Toggles performed since `simulate()`.
    #[must_use]
    pub fn toggle_count(&self) -> u64 {
        self.shared.toggles.load(Ordering::Relaxed)
    }

    /// True between `simulate()` and `shutdown()`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire) && !self.shared.shutdown.is_triggered()
    }

    /// True once `shutdown()` has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.is_triggered()
    }

    /// Name from the config.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Configuration this light runs with.
    #[must_use]
    pub const fn config(&self) -> &LightConfig {
        &self.config
    }

    /// Stops the worker, releases blocked consumers, and joins the thread.
    ///
    /// Idempotent. Also called on drop.
    pub fn shutdown(&self) {
        self.shared.shutdown.trigger();
        self.shared.mailbox.close();

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!(light = %self.config.name, "light worker panicked");
            }
        }
    }
}

impl Default for TrafficLight {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TrafficLight {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for TrafficLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrafficLight")
            .field("name", &self.config.name)
            .field("phase", &self.current_phase())
            .field("toggles", &self.toggle_count())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Worker main loop.
///
/// Polls elapsed time with a short interruptible sleep instead of sleeping
/// for the whole dwell, so shutdown is noticed within one poll interval.
fn cycle_through_phases(shared: &LightShared, mut sampler: DwellSampler, config: &LightConfig) {
    let poll = config.poll_interval();
    let overshoot_warn = config.overshoot_warn();

    tracing::info!(
        light = %config.name,
        seed = sampler.seed(),
        min_dwell_ms = config.min_dwell_ms,
        max_dwell_ms = config.max_dwell_ms,
        "light worker started"
    );

    let mut dwell = sampler.sample();
    let mut cycle_start = Instant::now();

    while !shared.shutdown.sleep(poll) {
        let elapsed = cycle_start.elapsed();
        if elapsed < dwell {
            continue;
        }

        let phase = shared.toggle();
        cycle_start = Instant::now();

        tracing::debug!(
            light = %config.name,
            phase = %phase,
            dwell_ms = dwell.as_millis() as u64,
            elapsed_ms = elapsed.as_millis() as u64,
            "phase toggled"
        );

        if elapsed > dwell + overshoot_warn {
            tracing::warn!(
                light = %config.name,
                "toggle overshot dwell by {} ms",
                (elapsed - dwell).as_millis()
            );
        }

        dwell = sampler.sample();
    }

    tracing::info!(
        light = %config.name,
        toggles = shared.toggles.load(Ordering::Relaxed),
        "light worker stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_starts_red() {
        let light = TrafficLight::new();
        assert_eq!(light.current_phase(), Phase::Red);
        assert_eq!(light.toggle_count(), 0);
        assert!(!light.is_running());
        assert!(light.mailbox().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LightConfig {
            poll_interval_ms: 0,
            ..LightConfig::default()
        };
        assert!(matches!(
            TrafficLight::with_config(config),
            Err(CrossroadsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_second_simulate_rejected() {
        let light = TrafficLight::with_config(LightConfig::fast().named("twice")).unwrap();
        light.simulate().unwrap();
        assert_eq!(
            light.simulate(),
            Err(CrossroadsError::AlreadySimulating("twice".to_string()))
        );
        assert!(light.is_running());
    }

    #[test]
    fn test_simulate_after_shutdown_rejected() {
        let light = TrafficLight::with_config(LightConfig::fast()).unwrap();
        light.shutdown();
        assert!(matches!(light.simulate(), Err(CrossroadsError::ShutDown(_))));
    }

    #[test]
    fn test_toggles_publish_to_mailbox() {
        let light = TrafficLight::with_config(LightConfig::fast().with_seed(3)).unwrap();
        light.simulate().unwrap();

        let first = light.mailbox().receive_timeout(Duration::from_secs(5));
        assert_eq!(first, Some(Phase::Green));
        assert!(light.toggle_count() >= 1);
    }

    #[test]
    fn test_shutdown_stops_toggling() {
        let light = TrafficLight::with_config(LightConfig::fast()).unwrap();
        light.simulate().unwrap();
        thread::sleep(Duration::from_millis(150));

        light.shutdown();
        assert!(light.is_shut_down());
        assert!(!light.is_running());

        let toggles = light.toggle_count();
        thread::sleep(Duration::from_millis(150));
        assert_eq!(light.toggle_count(), toggles, "worker kept toggling after shutdown");

        // Idempotent.
        light.shutdown();
    }

    #[test]
    fn test_phase_matches_toggle_parity() {
        let light = TrafficLight::with_config(LightConfig::fast()).unwrap();
        light.simulate().unwrap();
        thread::sleep(Duration::from_millis(300));
        light.shutdown();

        let expected = if light.toggle_count() % 2 == 0 { Phase::Red } else { Phase::Green };
        assert_eq!(light.current_phase(), expected);
    }

    #[test]
    fn test_debug_output() {
        let light = TrafficLight::with_config(LightConfig::fast().named("dbg")).unwrap();
        let text = format!("{light:?}");
        assert!(text.contains("dbg"));
        assert!(text.contains("Red"));
    }
}
