//! Seeded 2D gradient noise.
//!
//! Drives the time-varying wind field of the fluid solver and the height
//! map used by terrain generation. The permutation table is shuffled from a
//! seed so every run with the same seed sees the same gusts and the same
//! terrain.
//!
//! # References
//!
//! - Perlin, K. (2002). Improving noise. ACM Transactions on Graphics, 21(3), 681-682.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_1_SQRT_2;

/// Permutation table size (must be power of 2).
#[allow(dead_code)]
const PERM_SIZE: usize = 256;

/// Unit gradients in 8 equally spaced directions.
const GRADIENTS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (0.0, -1.0),
    (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// One layer of a fractal sum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseOctave {
    /// Spatial frequency multiplier (higher = finer detail).
    pub frequency: f32,
    /// Weight of this layer in the normalized sum.
    pub amplitude: f32,
}

impl NoiseOctave {
    #[must_use]
    pub fn new(frequency: f32, amplitude: f32) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }
}

/// Gradient noise generator with a seeded permutation table.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    seed: u64,
    perm: Vec<u8>,
}

impl NoiseGenerator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(&mut StdRng::seed_from_u64(seed));

        // Doubled so `perm[perm[x] + y]` never needs a modulo
        let mut perm = table.clone();
        perm.extend_from_slice(&table);

        Self { seed, perm }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Single-octave gradient noise, roughly in [-0.71, 0.71].
    ///
    /// Zero at every integer lattice point.
    #[must_use]
    pub fn perlin(&self, x: f32, y: f32) -> f32 {
        let xf = x.floor();
        let yf = y.floor();
        let x0 = xf as i32;
        let y0 = yf as i32;

        let fx = x - xf;
        let fy = y - yf;
        let sx = smoothstep(fx);
        let sy = smoothstep(fy);

        let n00 = self.gradient_dot(x0, y0, fx, fy);
        let n10 = self.gradient_dot(x0 + 1, y0, fx - 1.0, fy);
        let n01 = self.gradient_dot(x0, y0 + 1, fx, fy - 1.0);
        let n11 = self.gradient_dot(x0 + 1, y0 + 1, fx - 1.0, fy - 1.0);

        lerp(lerp(n00, n10, sx), lerp(n01, n11, sx), sy)
    }

    /// Fractal sum of `octaves`, normalized by total amplitude to [-1, 1].
    #[must_use]
    pub fn fbm(&self, x: f32, y: f32, octaves: &[NoiseOctave]) -> f32 {
        let mut total = 0.0_f32;
        let mut amplitude_sum = 0.0_f32;
        for octave in octaves {
            total += self.perlin(x * octave.frequency, y * octave.frequency) * octave.amplitude;
            amplitude_sum += octave.amplitude;
        }

        if amplitude_sum > 0.0 {
            (total / amplitude_sum).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Row-major (`y * width + x`) fractal field over a `width x height` lattice.
    #[must_use]
    pub fn field(&self, width: u32, height: u32, octaves: &[NoiseOctave]) -> Vec<f32> {
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| self.fbm(x as f32, y as f32, octaves))
            .collect()
    }

    fn gradient_dot(&self, ix: i32, iy: i32, dx: f32, dy: f32) -> f32 {
        let px = (ix & 0xFF) as usize;
        let py = (iy & 0xFF) as usize;
        let (gx, gy) = GRADIENTS[usize::from(self.perm[usize::from(self.perm[px]) + py]) & 0x07];
        gx * dx + gy * dy
    }
}

/// Quintic fade `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn smoothstep(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}
