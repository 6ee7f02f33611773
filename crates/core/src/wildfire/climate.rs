//! Diurnal temperature cycle.
//!
//! A 24-entry table is generated once: a sinusoid peaking at midday
//! (`mean + amplitude * sin(2π h / 24 - π/2)`) plus gaussian noise from a
//! seeded generator. Each automaton frame is one hour.

use crate::error::{ensure_finite, ensure_range, SimResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};

pub const HOURS_PER_DAY: usize = 24;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClimateConfig {
    /// Daily mean temperature, °C.
    pub mean: f32,
    /// Half the peak-to-trough swing, °C.
    pub amplitude: f32,
    /// Standard deviation of the per-hour noise, °C.
    pub noise_level: f32,
    pub seed: u64,
    /// Hours strictly above this are hot.
    pub hot_threshold: f32,
    /// Factor applied to the flammability roll during hot hours.
    pub hot_roll_multiplier: f32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            mean: 20.0,
            amplitude: 5.0,
            noise_level: 2.0,
            seed: 0,
            hot_threshold: 25.0,
            hot_roll_multiplier: 2.0,
        }
    }
}

impl ClimateConfig {
    /// # Errors
    ///
    /// Rejects non-finite values, a negative noise level, or a negative
    /// roll multiplier.
    pub fn validate(&self) -> SimResult<()> {
        ensure_finite("climate.mean", self.mean)?;
        ensure_finite("climate.amplitude", self.amplitude)?;
        ensure_range("climate.noise_level", self.noise_level, 0.0, f32::MAX)?;
        ensure_finite("climate.hot_threshold", self.hot_threshold)?;
        ensure_range(
            "climate.hot_roll_multiplier",
            self.hot_roll_multiplier,
            0.0,
            f32::MAX,
        )
    }
}

/// Hourly temperature table.
#[derive(Clone, Debug, PartialEq)]
pub struct DiurnalClimate {
    hourly: [f32; HOURS_PER_DAY],
    hot_threshold: f32,
    hot_roll_multiplier: f32,
}

impl DiurnalClimate {
    #[must_use]
    pub fn new(config: &ClimateConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut hourly = [0.0; HOURS_PER_DAY];
        for (hour, slot) in hourly.iter_mut().enumerate() {
            let phase = TAU * hour as f32 / HOURS_PER_DAY as f32 - FRAC_PI_2;
            *slot = config.mean
                + config.amplitude * phase.sin()
                + config.noise_level * rng.sample::<f32, _>(StandardNormal);
        }
        Self {
            hourly,
            hot_threshold: config.hot_threshold,
            hot_roll_multiplier: config.hot_roll_multiplier,
        }
    }

    /// Temperature at `frame`, one frame per hour.
    #[must_use]
    pub fn temperature(&self, frame: u64) -> f32 {
        self.hourly[(frame % HOURS_PER_DAY as u64) as usize]
    }

    #[must_use]
    pub fn is_hot(&self, frame: u64) -> bool {
        self.temperature(frame) > self.hot_threshold
    }

    /// Multiplier for the flammability roll at `frame`.
    #[must_use]
    pub fn roll_multiplier(&self, frame: u64) -> f32 {
        if self.is_hot(frame) {
            self.hot_roll_multiplier
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn hourly(&self) -> &[f32; HOURS_PER_DAY] {
        &self.hourly
    }
}
