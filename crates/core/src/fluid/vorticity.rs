//! Vorticity confinement.
//!
//! Numerical dissipation smears out the small eddies that make flame look
//! alive. Confinement measures the curl, then pushes velocity along
//! `N × ω`, where `N` points towards stronger rotation.

use super::grid::{par_fill, par_update, GridSize};
use crate::core_types::Vec3;

/// Offset keeping `N` well defined where `∇|ω|` vanishes.
const GRADIENT_BIAS: f32 = 0.001;

/// Central-difference curl with edge-clamped neighbours.
pub fn compute_vorticity(velocity: &[Vec3], size: GridSize, out: &mut [Vec3]) {
    par_fill(size, out, |_, x, y, z| {
        let [l, r, b, t, d, u] = size.neighbors(x, y, z).map(|i| velocity[i]);
        Vec3::new(
            (t.z - b.z) - (u.y - d.y),
            (u.x - d.x) - (r.z - l.z),
            (r.y - l.y) - (t.x - b.x),
        ) * 0.5
    });
}

/// `v += dt * epsilon * (normalize(∇|ω| + bias) × ω)` on fluid cells.
pub fn apply_confinement(
    velocity: &mut [Vec3],
    vorticity: &[Vec3],
    obstacles: &[bool],
    size: GridSize,
    dt: f32,
    epsilon: f32,
) {
    if epsilon == 0.0 {
        return;
    }
    par_update(size, velocity, |idx, x, y, z, v| {
        if obstacles[idx] {
            return;
        }
        let [l, r, b, t, d, u] = size.neighbors(x, y, z).map(|i| vorticity[i].norm());
        let eta = Vec3::new(r - l, t - b, u - d) * 0.5 + Vec3::repeat(GRADIENT_BIAS);
        let len = eta.norm();
        if len <= f32::EPSILON {
            return;
        }
        *v += (eta / len).cross(&vorticity[idx]) * (dt * epsilon);
    });
}
