//! # Light Configuration
//!
//! All timing data lives in TOML, loaded once at startup.
//!
//! ```toml
//! name = "main-st"
//! min_dwell_ms = 4000
//! max_dwell_ms = 6000
//! poll_interval_ms = 1
//! seed = 42
//! ```
//!
//! Every field is optional; missing fields take the production defaults.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crossroads_shared::{
    DEFAULT_MAX_DWELL_MS, DEFAULT_MIN_DWELL_MS, DEFAULT_OVERSHOOT_WARN_MS,
    DEFAULT_POLL_INTERVAL_MS,
};

use crate::error::{CrossroadsError, CrossroadsResult};

/// Configuration for a single traffic light.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig {
    /// Name used in logs and errors.
    pub name: String,
    /// Shortest dwell time (ms, inclusive).
    pub min_dwell_ms: u64,
    /// Longest dwell time (ms, inclusive).
    pub max_dwell_ms: u64,
    /// Sleep between elapsed-time checks (ms).
    pub poll_interval_ms: u64,
    /// Overshoot past the sampled dwell that is logged as a warning (ms).
    pub overshoot_warn_ms: u64,
    /// Fixed RNG seed. `None` derives a fresh seed per light.
    pub seed: Option<u64>,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            name: "light".to_string(),
            min_dwell_ms: DEFAULT_MIN_DWELL_MS,
            max_dwell_ms: DEFAULT_MAX_DWELL_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            overshoot_warn_ms: DEFAULT_OVERSHOOT_WARN_MS,
            seed: None,
        }
    }
}

impl LightConfig {
    /// Fast cadence (40-60ms) for tests and demos.
    ///
    /// Same 2:3 ratio as production, one hundred times quicker.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            min_dwell_ms: 40,
            max_dwell_ms: 60,
            overshoot_warn_ms: 20,
            ..Self::default()
        }
    }

    /// Returns a copy with a different name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a copy with a fixed seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CrossroadsError::ConfigParse`] for malformed TOML and
    /// [`CrossroadsError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> CrossroadsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CrossroadsError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CrossroadsError::ConfigIo`] if the file cannot be read,
    /// otherwise the same errors as [`LightConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> CrossroadsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CrossroadsError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CrossroadsError::InvalidConfig`] if a dwell bound is zero,
    /// the bounds are inverted, or the poll interval is zero.
    pub fn validate(&self) -> CrossroadsResult<()> {
        if self.min_dwell_ms == 0 {
            return Err(CrossroadsError::InvalidConfig(
                "min_dwell_ms must be greater than zero".to_string(),
            ));
        }
        if self.min_dwell_ms > self.max_dwell_ms {
            return Err(CrossroadsError::InvalidConfig(format!(
                "min_dwell_ms ({}) exceeds max_dwell_ms ({})",
                self.min_dwell_ms, self.max_dwell_ms
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(CrossroadsError::InvalidConfig(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Overshoot warning threshold as a [`Duration`].
    #[must_use]
    pub const fn overshoot_warn(&self) -> Duration {
        Duration::from_millis(self.overshoot_warn_ms)
    }
}

/// Configuration for the `intersection` harness.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntersectionConfig {
    /// Number of lights to run.
    pub lights: usize,
    /// Vehicles released by each green phase.
    pub vehicles_per_green: usize,
    /// Wall-clock length of the run (seconds).
    pub run_secs: u64,
    /// Template for every light. Names and seeds are derived per light.
    pub light: LightConfig,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            lights: 4,
            vehicles_per_green: 3,
            run_secs: 20,
            light: LightConfig::default(),
        }
    }
}

impl IntersectionConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Same as [`LightConfig::from_toml_str`], plus
    /// [`CrossroadsError::InvalidConfig`] if `lights` is zero.
    pub fn from_toml_str(text: &str) -> CrossroadsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CrossroadsError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML file.
    ///
    /// # Errors
    ///
    /// See [`IntersectionConfig::from_toml_str`] and [`LightConfig::load`].
    pub fn load(path: impl AsRef<Path>) -> CrossroadsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CrossroadsError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CrossroadsError::InvalidConfig`] on zero lights or an
    /// invalid light template.
    pub fn validate(&self) -> CrossroadsResult<()> {
        if self.lights == 0 {
            return Err(CrossroadsError::InvalidConfig(
                "an intersection needs at least one light".to_string(),
            ));
        }
        self.light.validate()
    }

    /// Config for light number `index`: name suffixed, seed offset.
    #[must_use]
    pub fn light_config(&self, index: usize) -> LightConfig {
        let mut config = self.light.clone().named(format!("{}-{index}", self.light.name));
        config.seed = self.light.seed.map(|s| s.wrapping_add(index as u64));
        config
    }
}
