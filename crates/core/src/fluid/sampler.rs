//! Trilinear interpolation over lattice fields.

use super::grid::GridSize;
use crate::core_types::Vec3;
use std::ops::{Add, Mul};

/// Values that can be blended linearly: `f32` and `Vec3`.
pub trait Lerp: Copy + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync {}

impl<T> Lerp for T where T: Copy + Add<Output = T> + Mul<f32, Output = T> + Send + Sync {}

#[inline]
fn lerp<T: Lerp>(a: T, b: T, t: f32) -> T {
    a * (1.0 - t) + b * t
}

/// Clamp one coordinate into `[0, max]` and split it into lower index,
/// upper index and fraction. NaN is treated as zero.
#[inline]
fn split_axis(p: f32, max: f32) -> (usize, usize, f32) {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, max) };
    let lo = p.floor();
    let i0 = lo as usize;
    (i0, (i0 + 1).min(max as usize), p - lo)
}

/// Sample `field` at a continuous lattice `position`.
///
/// The position is clamped to `[0, dim - 1]` on every axis before
/// interpolation, so any input yields a value blended from real cells and
/// integer positions return the stored value exactly. Blending runs along x
/// for the four (y, z) edges, then along z, then along y.
#[must_use]
pub fn sample<T: Lerp>(field: &[T], position: Vec3, size: GridSize) -> T {
    let max = size.max_coord();
    let (x0, x1, fx) = split_axis(position.x, max.x);
    let (y0, y1, fy) = split_axis(position.y, max.y);
    let (z0, z1, fz) = split_axis(position.z, max.z);

    let at = |x: usize, y: usize, z: usize| field[size.index(x, y, z)];

    let e00 = lerp(at(x0, y0, z0), at(x1, y0, z0), fx);
    let e01 = lerp(at(x0, y0, z1), at(x1, y0, z1), fx);
    let e10 = lerp(at(x0, y1, z0), at(x1, y1, z0), fx);
    let e11 = lerp(at(x0, y1, z1), at(x1, y1, z1), fx);

    let lower = lerp(e00, e01, fz);
    let upper = lerp(e10, e11, fz);
    lerp(lower, upper, fy)
}
