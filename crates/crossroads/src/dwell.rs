//! # Dwell Time Sampling
//!
//! Each toggle draws a fresh dwell time uniformly from
//! `[min_dwell_ms, max_dwell_ms]` (integer milliseconds, both ends inclusive).
//! Draws are independent; the only memory is the RNG state itself.
//!
//! ChaCha8 is used so that a fixed seed reproduces a light's exact cadence.

use rand::distributions::Uniform;
use rand::rngs::OsRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

use crate::config::LightConfig;
use crate::error::{CrossroadsError, CrossroadsResult};

/// Uniform dwell-time sampler owned by one light worker.
#[derive(Clone, Debug)]
pub struct DwellSampler {
    rng: ChaCha8Rng,
    range: Uniform<u64>,
    seed: u64,
}

impl DwellSampler {
    /// Creates a sampler over `[min_ms, max_ms]` with a fixed seed.
    ///
    /// # Panics
    ///
    /// Panics if `min_ms > max_ms`. Use [`DwellSampler::from_config`] for
    /// validated construction.
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            range: Uniform::new_inclusive(min_ms, max_ms),
            seed,
        }
    }

    /// Creates a sampler from a light config.
    ///
    /// Uses `config.seed` when set, otherwise draws one from the OS.
    ///
    /// # Errors
    ///
    /// Returns [`CrossroadsError::InvalidConfig`] if the dwell bounds are
    /// invalid, or [`CrossroadsError::Entropy`] if the OS has no entropy
    /// to give.
    pub fn from_config(config: &LightConfig) -> CrossroadsResult<Self> {
        config.validate()?;
        let seed = match config.seed {
            Some(seed) => seed,
            None => fresh_seed()?,
        };
        Ok(Self::new(config.min_dwell_ms, config.max_dwell_ms, seed))
    }

    /// Draws the next dwell time.
    pub fn sample(&mut self) -> Duration {
        Duration::from_millis(self.rng.sample(self.range))
    }

    /// Seed this sampler was created with (for reproducing a run).
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Draws a seed from the operating system's entropy source.
fn fresh_seed() -> CrossroadsResult<u64> {
    let mut bytes = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CrossroadsError::Entropy(e.to_string()))?;
    Ok(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_stay_in_bounds() {
        let mut sampler = DwellSampler::new(4000, 6000, 7);
        for _ in 0..10_000 {
            let dwell = sampler.sample();
            assert!(dwell >= Duration::from_millis(4000), "{dwell:?} below minimum");
            assert!(dwell <= Duration::from_millis(6000), "{dwell:?} above maximum");
        }
    }

    #[test]
    fn test_both_ends_reachable() {
        let mut sampler = DwellSampler::new(10, 12, 1);
        let mut seen = [false; 3];
        for _ in 0..1000 {
            let ms = sampler.sample().as_millis() as usize;
            seen[ms - 10] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_roughly_uniform() {
        let mut sampler = DwellSampler::new(4000, 6000, 99);
        let draws = 20_000;
        let mut low_half = 0;
        let mut sum = 0u64;
        for _ in 0..draws {
            let ms = sampler.sample().as_millis() as u64;
            sum += ms;
            if ms < 5000 {
                low_half += 1;
            }
        }

        let mean = sum as f64 / f64::from(draws);
        println!("Dwell mean over {draws} draws: {mean:.1} ms");
        assert!((mean - 5000.0).abs() < 50.0, "mean {mean} too far from 5000");
        let share = f64::from(low_half) / f64::from(draws);
        assert!((share - 0.5).abs() < 0.03, "low-half share {share}");
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = DwellSampler::new(4000, 6000, 1234);
        let mut b = DwellSampler::new(4000, 6000, 1234);
        for _ in 0..100 {
            assert_eq!(a.sample(), b.sample());
        }
        assert_eq!(a.seed(), 1234);
    }

    #[test]
    fn test_degenerate_range() {
        let mut sampler = DwellSampler::new(50, 50, 0);
        assert_eq!(sampler.sample(), Duration::from_millis(50));
    }

    #[test]
    fn test_from_config_rejects_inverted_bounds() {
        let config = LightConfig {
            min_dwell_ms: 10,
            max_dwell_ms: 5,
            ..LightConfig::default()
        };
        assert!(DwellSampler::from_config(&config).is_err());
    }

    #[test]
    fn test_unseeded_samplers_differ() {
        let config = LightConfig::default();
        let a = DwellSampler::from_config(&config).unwrap();
        let b = DwellSampler::from_config(&config).unwrap();
        assert_ne!(a.seed(), b.seed());
    }

    #[test]
    fn test_drawn_seed_reproduces_cadence() {
        let mut drawn = DwellSampler::from_config(&LightConfig::default()).unwrap();
        let mut replay =
            DwellSampler::from_config(&LightConfig::default().with_seed(drawn.seed())).unwrap();
        for _ in 0..50 {
            assert_eq!(drawn.sample(), replay.sample());
        }
    }
}
