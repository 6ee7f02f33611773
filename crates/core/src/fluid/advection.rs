//! Field transport along the velocity field.
//!
//! All traces in one step read the velocity as it was when the step began;
//! the solver only swaps the advected velocity in after every scalar has
//! been moved.
//!
//! The higher-order schemes need two scratch buffers (`forward`, `backward`)
//! for the intermediate predictions. Within [`BOUNDARY_MARGIN`] cells of any
//! face they fall back to the plain semi-Lagrangian value, on all three axes.
//!
//! [`trace`] is direction-agnostic: a negative `dt` carries the field
//! forward along the flow instead of back-tracing it, which is how the
//! reverse pass of both corrections is produced.

use super::config::AdvectionScheme;
use super::grid::{par_fill, GridSize};
use super::sampler::sample;
use crate::core_types::Vec3;

/// Width of the band next to each face where corrections are skipped.
pub const BOUNDARY_MARGIN: usize = 4;

/// Dissipation and additive decay applied to an advected scalar.
///
/// The result is kept within `[0, ceiling]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub dissipation: f32,
    pub decay: f32,
    pub ceiling: f32,
}

impl Attenuation {
    #[must_use]
    pub fn new(dissipation: f32, decay: f32) -> Self {
        Self {
            dissipation,
            decay,
            ceiling: f32::INFINITY,
        }
    }

    #[must_use]
    pub fn with_ceiling(self, ceiling: f32) -> Self {
        Self { ceiling, ..self }
    }

    #[inline]
    fn apply(self, value: f32) -> f32 {
        (value * self.dissipation - self.decay).clamp(0.0, self.ceiling)
    }
}

/// Lattice position of the cell centre.
#[inline]
fn cell_position(x: usize, y: usize, z: usize) -> Vec3 {
    Vec3::new(x as f32, y as f32, z as f32)
}

/// True inside the fallback band.
#[inline]
#[must_use]
pub fn near_boundary(x: usize, y: usize, z: usize, size: GridSize) -> bool {
    let m = BOUNDARY_MARGIN;
    x < m
        || y < m
        || z < m
        || x + m >= size.x() as usize
        || y + m >= size.y() as usize
        || z + m >= size.z() as usize
}

/// Self-advect velocity with dissipation. Obstacle cells become zero.
pub fn advect_velocity(
    velocity: &[Vec3],
    obstacles: &[bool],
    size: GridSize,
    dt: f32,
    dissipation: f32,
    out: &mut [Vec3],
) {
    par_fill(size, out, |idx, x, y, z| {
        if obstacles[idx] {
            return Vec3::zeros();
        }
        let p = cell_position(x, y, z) - velocity[idx] * dt;
        sample(velocity, p, size) * dissipation
    });
}

/// Transport `src` one step along `velocity` with the chosen scheme.
#[expect(clippy::too_many_arguments)]
pub fn advect_scalar(
    scheme: AdvectionScheme,
    src: &[f32],
    velocity: &[Vec3],
    obstacles: &[bool],
    size: GridSize,
    dt: f32,
    attenuation: Attenuation,
    forward: &mut [f32],
    backward: &mut [f32],
    out: &mut [f32],
) {
    match scheme {
        AdvectionScheme::SemiLagrangian => {
            semi_lagrangian(src, velocity, obstacles, size, dt, attenuation, out);
        }
        AdvectionScheme::Bfecc => {
            predict(src, velocity, obstacles, size, dt, forward, backward);
            let backward = &*backward;
            par_fill(size, out, |idx, x, y, z| {
                if obstacles[idx] {
                    return 0.0;
                }
                let p = cell_position(x, y, z) - velocity[idx] * dt;
                let value = if near_boundary(x, y, z, size) {
                    sample(src, p, size)
                } else {
                    // Advect the corrected field phi + (phi - phi_hat) / 2
                    1.5 * sample(src, p, size) - 0.5 * sample(backward, p, size)
                };
                attenuation.apply(value)
            });
        }
        AdvectionScheme::MacCormack => {
            predict(src, velocity, obstacles, size, dt, forward, backward);
            let (forward, backward) = (&*forward, &*backward);
            par_fill(size, out, |idx, x, y, z| {
                if obstacles[idx] {
                    return 0.0;
                }
                let p = cell_position(x, y, z) - velocity[idx] * dt;
                let value = if near_boundary(x, y, z, size) {
                    sample(src, p, size)
                } else {
                    let corrected = forward[idx] + 0.5 * (src[idx] - backward[idx]);
                    let (lo, hi) = diagonal_bounds(src, x, y, z, size);
                    corrected.clamp(lo, hi)
                };
                attenuation.apply(value)
            });
        }
    }
}

/// Smallest and largest of `field` at the eight diagonal neighbours
/// `(x ± 1, y ± 1, z ± 1)` of a cell at least one cell in from every face.
#[must_use]
pub fn diagonal_bounds(field: &[f32], x: usize, y: usize, z: usize, size: GridSize) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for nz in [z - 1, z + 1] {
        for ny in [y - 1, y + 1] {
            for nx in [x - 1, x + 1] {
                let v = field[size.index(nx, ny, nz)];
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    (lo, hi)
}

/// Plain semi-Lagrangian transport with attenuation.
pub fn semi_lagrangian(
    src: &[f32],
    velocity: &[Vec3],
    obstacles: &[bool],
    size: GridSize,
    dt: f32,
    attenuation: Attenuation,
    out: &mut [f32],
) {
    trace(src, velocity, obstacles, size, dt, out);
    for value in out.iter_mut() {
        *value = attenuation.apply(*value);
    }
}

/// Forward prediction into `forward`, then its reverse trace into `backward`.
fn predict(
    src: &[f32],
    velocity: &[Vec3],
    obstacles: &[bool],
    size: GridSize,
    dt: f32,
    forward: &mut [f32],
    backward: &mut [f32],
) {
    trace(src, velocity, obstacles, size, dt, forward);
    trace(forward, velocity, obstacles, size, -dt, backward);
}

/// Unattenuated back-trace of `src` by `dt`; negative `dt` traces forward.
pub fn trace(
    src: &[f32],
    velocity: &[Vec3],
    obstacles: &[bool],
    size: GridSize,
    dt: f32,
    out: &mut [f32],
) {
    par_fill(size, out, |idx, x, y, z| {
        if obstacles[idx] {
            return 0.0;
        }
        sample(src, cell_position(x, y, z) - velocity[idx] * dt, size)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::grid::{FluidGrid, ObstacleMask};
    use approx::assert_relative_eq;

    const SCHEMES: [AdvectionScheme; 3] = [
        AdvectionScheme::SemiLagrangian,
        AdvectionScheme::Bfecc,
        AdvectionScheme::MacCormack,
    ];

    fn run(
        scheme: AdvectionScheme,
        src: &[f32],
        velocity: &[Vec3],
        grid: &FluidGrid,
        attenuation: Attenuation,
    ) -> Vec<f32> {
        let n = grid.size().cell_count();
        let (mut fwd, mut bwd, mut out) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        advect_scalar(
            scheme,
            src,
            velocity,
            grid.obstacles(),
            grid.size(),
            0.5,
            attenuation,
            &mut fwd,
            &mut bwd,
            &mut out,
        );
        out
    }

    #[test]
    fn test_uniform_field_is_preserved_by_every_scheme() {
        let grid = FluidGrid::new(GridSize::cube(12).unwrap(), ObstacleMask::BoundaryShell);
        let n = grid.size().cell_count();
        let src = vec![2.0; n];
        let velocity = vec![Vec3::new(0.7, -0.3, 0.4); n];
        for scheme in SCHEMES {
            let out = run(scheme, &src, &velocity, &grid, Attenuation::new(1.0, 0.0));
            for (i, &v) in out.iter().enumerate() {
                let expected = if grid.obstacles()[i] { 0.0 } else { 2.0 };
                assert_relative_eq!(v, expected, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_attenuation_floors_at_zero() {
        let grid = FluidGrid::new(GridSize::cube(6).unwrap(), ObstacleMask::Open);
        let n = grid.size().cell_count();
        let src = vec![0.5; n];
        let velocity = vec![Vec3::zeros(); n];
        let out = run(
            AdvectionScheme::SemiLagrangian,
            &src,
            &velocity,
            &grid,
            Attenuation::new(0.5, 0.2),
        );
        assert!(out.iter().all(|&v| (v - 0.05).abs() < 1e-6));

        let out = run(
            AdvectionScheme::SemiLagrangian,
            &src,
            &velocity,
            &grid,
            Attenuation::new(0.5, 1.0),
        );
        assert!(out.iter().all(|&v| v == 0.0));
    }

    fn spike_shifted_one_cell(scheme: AdvectionScheme) -> (GridSize, Vec<f32>) {
        let size = GridSize::new(12, 12, 12).unwrap();
        let grid = FluidGrid::new(size, ObstacleMask::BoundaryShell);
        let mut src = vec![0.0; size.cell_count()];
        src[size.index(5, 6, 6)] = 1.0;
        // dt = 0.5, so speed 2 is exactly one cell along +x
        let velocity = vec![Vec3::new(2.0, 0.0, 0.0); size.cell_count()];
        let out = run(scheme, &src, &velocity, &grid, Attenuation::new(1.0, 0.0));
        (size, out)
    }

    #[test]
    fn test_whole_cell_shift_moves_values() {
        for scheme in [AdvectionScheme::SemiLagrangian, AdvectionScheme::Bfecc] {
            let (size, out) = spike_shifted_one_cell(scheme);
            assert_relative_eq!(out[size.index(6, 6, 6)], 1.0, epsilon = 1e-5);
            assert_relative_eq!(out[size.index(5, 6, 6)], 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_maccormack_clamps_to_destination_diagonals() {
        // None of the diagonal neighbours of (6, 6, 6) hold the spike,
        // so the limiter flattens it
        let (size, out) = spike_shifted_one_cell(AdvectionScheme::MacCormack);
        assert_eq!(out[size.index(6, 6, 6)], 0.0);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_diagonal_bounds_skip_face_neighbours() {
        let size = GridSize::cube(3).unwrap();
        let mut field = vec![5.0; size.cell_count()];
        field[size.index(1, 1, 1)] = 100.0;
        field[size.index(2, 1, 1)] = -100.0;
        field[size.index(0, 0, 0)] = 1.0;
        field[size.index(2, 2, 2)] = 9.0;
        assert_eq!(diagonal_bounds(&field, 1, 1, 1, size), (1.0, 9.0));
    }

    #[test]
    fn test_negative_dt_traces_forward() {
        let size = GridSize::cube(12).unwrap();
        let grid = FluidGrid::new(size, ObstacleMask::BoundaryShell);
        let n = size.cell_count();
        let mut src = vec![0.0; n];
        src[size.index(6, 6, 6)] = 1.0;
        let velocity = vec![Vec3::new(2.0, 0.0, 0.0); n];
        let mut out = vec![0.0; n];
        trace(&src, &velocity, grid.obstacles(), size, -0.5, &mut out);
        assert_eq!(out[size.index(5, 6, 6)], 1.0);
        assert_eq!(out[size.index(6, 6, 6)], 0.0);
    }

    #[test]
    fn test_maccormack_stays_within_source_range() {
        let size = GridSize::cube(14).unwrap();
        let grid = FluidGrid::new(size, ObstacleMask::BoundaryShell);
        let src: Vec<f32> = (0..size.cell_count())
            .map(|i| if size.coords(i).0 % 2 == 0 { 1.0 } else { 0.0 })
            .collect();
        let velocity = vec![Vec3::new(0.37, 0.11, -0.23); size.cell_count()];
        let out = run(
            AdvectionScheme::MacCormack,
            &src,
            &velocity,
            &grid,
            Attenuation::new(1.0, 0.0),
        );
        assert!(out.iter().all(|&v| (-1e-6..=1.0 + 1e-6).contains(&v)));
    }

    #[test]
    fn test_margin_is_symmetric() {
        let size = GridSize::cube(10).unwrap();
        for axis_value in [0, 3, 6, 9] {
            assert!(near_boundary(axis_value, 5, 5, size));
            assert!(near_boundary(5, axis_value, 5, size));
            assert!(near_boundary(5, 5, axis_value, size));
        }
        assert!(!near_boundary(4, 5, 5, size));
        assert!(!near_boundary(5, 5, 5, size));
    }

    #[test]
    fn test_velocity_obstacles_zeroed() {
        let grid = FluidGrid::new(GridSize::cube(5).unwrap(), ObstacleMask::BoundaryShell);
        let n = grid.size().cell_count();
        let velocity = vec![Vec3::new(1.0, 1.0, 1.0); n];
        let mut out = vec![Vec3::zeros(); n];
        advect_velocity(&velocity, grid.obstacles(), grid.size(), 0.1, 0.9, &mut out);
        for (i, v) in out.iter().enumerate() {
            if grid.obstacles()[i] {
                assert_eq!(*v, Vec3::zeros());
            } else {
                assert_relative_eq!(*v, Vec3::new(0.9, 0.9, 0.9), epsilon = 1e-6);
            }
        }
    }
}
