//! External forces and sources: buoyancy, wind, gusts, the emitter and
//! the flame-to-smoke conversion.
//!
//! Each stage touches only the cell it is evaluating, so they run in place.
//! Obstacle cells are never written.

use super::config::{Emitter, WindGust, WindNoise};
use super::grid::{par_update, GridSize};
use crate::core_types::{NoiseGenerator, Vec2, Vec3};
use rayon::prelude::*;

/// Hot gas rises, dense smoke sinks.
///
/// Applied only where `temperature > ambient`:
/// `v += dt * ((T - ambient) * buoyancy - density * weight) * up`.
#[expect(clippy::too_many_arguments)]
pub fn apply_buoyancy(
    velocity: &mut [Vec3],
    temperature: &[f32],
    density: &[f32],
    obstacles: &[bool],
    dt: f32,
    buoyancy: f32,
    weight: f32,
    ambient: f32,
    up: Vec3,
) {
    velocity.par_iter_mut().enumerate().for_each(|(i, v)| {
        let t = temperature[i];
        if obstacles[i] || t <= ambient {
            return;
        }
        *v += up * (dt * ((t - ambient) * buoyancy - density[i] * weight));
    });
}

/// Time-varying noise wind.
///
/// The noise is read along two axes, `(x * f + time, 0)` and
/// `(0, y * f + time)`, the pair normalized and scaled to `wind.speed`. The
/// first component pushes along z, the second along y. Cells where both
/// components vanish get no wind.
pub fn apply_wind(
    velocity: &mut [Vec3],
    obstacles: &[bool],
    size: GridSize,
    noise: &NoiseGenerator,
    wind: &WindNoise,
    time: f32,
) {
    par_update(size, velocity, |idx, x, y, _z, v| {
        if obstacles[idx] {
            return;
        }
        let sx = x as f32 * wind.frequency + time;
        let sy = y as f32 * wind.frequency + time;
        let w = Vec2::new(noise.perlin(sx, 0.0), noise.perlin(0.0, sy));
        let norm = w.norm();
        if norm <= f32::EPSILON {
            return;
        }
        let w = w * (wind.speed / norm);
        v.z += w.x;
        v.y += w.y;
    });
}

/// Gaussian velocity impulse around `gust.position`.
pub fn apply_gust(
    velocity: &mut [Vec3],
    obstacles: &[bool],
    size: GridSize,
    gust: &WindGust,
    dt: f32,
) {
    let r2 = gust.radius * gust.radius;
    par_update(size, velocity, |idx, x, y, z, v| {
        if obstacles[idx] {
            return;
        }
        let d = Vec3::new(x as f32, y as f32, z as f32) - gust.position;
        *v += gust.strength * ((-d.norm_squared() / r2).exp() * dt);
    });
}

/// Inject reaction and heat with a gaussian falloff around the emitter.
///
/// Cell positions are normalized by `dim - 1` so the emitter is specified
/// in `[0, 1]³` independent of resolution. Reaction is capped at 1.
pub fn apply_emitter(
    reaction: &mut [f32],
    temperature: &mut [f32],
    obstacles: &[bool],
    size: GridSize,
    emitter: &Emitter,
    dt: f32,
) {
    let span = size.max_coord().map(|m| m.max(1.0));
    let r2 = emitter.radius * emitter.radius;
    let falloff = |x: usize, y: usize, z: usize| {
        let p = Vec3::new(x as f32, y as f32, z as f32).component_div(&span) - emitter.position;
        (-p.norm_squared() / r2).exp() * dt
    };

    par_update(size, reaction, |idx, x, y, z, r| {
        if !obstacles[idx] {
            *r = (*r + falloff(x, y, z) * emitter.reaction_amount).clamp(0.0, 1.0);
        }
    });
    par_update(size, temperature, |idx, x, y, z, t| {
        if !obstacles[idx] {
            *t += falloff(x, y, z) * emitter.temperature_amount;
        }
    });
}

/// Dying flame leaves smoke: while `0 < reaction < threshold`, density grows
/// by `density_amount * reaction`.
pub fn apply_extinguishment(
    density: &mut [f32],
    reaction: &[f32],
    obstacles: &[bool],
    density_amount: f32,
    threshold: f32,
) {
    density.par_iter_mut().enumerate().for_each(|(i, d)| {
        let r = reaction[i];
        if !obstacles[i] && r > 0.0 && r < threshold {
            *d = (*d + density_amount * r).max(0.0);
        }
    });
}
