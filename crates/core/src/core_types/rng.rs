//! Stateless coordinate + time keyed random numbers.
//!
//! The automaton never carries RNG state between cells or ticks: every roll
//! is a pure hash of `(seed, stream, x, y, time)`. That makes a step
//! bit-reproducible regardless of how rayon splits the grid.

use serde::{Deserialize, Serialize};

// Prime multipliers for coordinate mixing
const SEED_X: u32 = 1619;
const SEED_Y: u32 = 31337;
const SEED_Z: u32 = 6971;

/// 2^24, the resolution of a roll.
const ROLL_SCALE: f32 = 16_777_216.0;

/// Independent decision streams.
///
/// Each decision a cell makes during one tick draws from its own stream, so
/// the ignition roll and the flammability roll of the same cell are
/// uncorrelated even when `time` is zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollStream {
    Ignition,
    Flammability,
    GrassRegrow,
    TreeRegrow,
    Spread,
    BurnOut,
    TreeGrowth,
}

impl RollStream {
    #[inline]
    fn salt(self) -> u32 {
        match self {
            Self::Ignition => 0x68E3_1DA4,
            Self::Flammability => 0xB529_7A4D,
            Self::GrassRegrow => 0x1B56_C4E9,
            Self::TreeRegrow => 0x7F4A_7C15,
            Self::Spread => 0x2545_F491,
            Self::BurnOut => 0x9E37_79B9,
            Self::TreeGrowth => 0xD35A_2D97,
        }
    }
}

/// Hash-based generator producing rolls in `[0, 1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRng {
    seed: u32,
}

impl CellRng {
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    #[must_use]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Uniform roll in `[0, 1)` for cell `(x, y)` at `time`.
    ///
    /// `time` is keyed by its bit pattern, so `0.0` and `-0.0` are distinct
    /// keys and any two different times give unrelated rolls.
    #[inline]
    #[must_use]
    pub fn roll(&self, x: u32, y: u32, time: f32, stream: RollStream) -> f32 {
        let mut h = fmix32(self.seed ^ stream.salt());
        h = fmix32(h.wrapping_add(x.wrapping_mul(SEED_X)));
        h = fmix32(h.wrapping_add(y.wrapping_mul(SEED_Y)));
        h = fmix32(h.wrapping_add(time.to_bits().wrapping_mul(SEED_Z)));
        (h >> 8) as f32 / ROLL_SCALE
    }
}

/// Murmur3 finalizer.
#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}
