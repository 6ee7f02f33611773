//! Pressure projection: divergence, Jacobi relaxation, gradient subtraction.
//!
//! Solid neighbours act as walls: they contribute zero velocity to the
//! divergence, the cell's own pressure in the Poisson stencil, and zero out
//! the velocity component on that axis during projection.

use super::grid::{par_fill, par_update, GridSize};
use crate::core_types::Vec3;

/// Central-difference divergence. Zero on obstacle cells.
pub fn compute_divergence(
    velocity: &[Vec3],
    obstacles: &[bool],
    size: GridSize,
    out: &mut [f32],
) {
    par_fill(size, out, |idx, x, y, z| {
        if obstacles[idx] {
            return 0.0;
        }
        let [l, r, b, t, d, u] = size.neighbors(x, y, z).map(|i| {
            if obstacles[i] {
                Vec3::zeros()
            } else {
                velocity[i]
            }
        });
        0.5 * ((r.x - l.x) + (t.y - b.y) + (u.z - d.z))
    });
}

/// One synchronous Jacobi sweep reading only `pressure`, writing `out`.
pub fn jacobi_sweep(
    pressure: &[f32],
    divergence: &[f32],
    obstacles: &[bool],
    size: GridSize,
    out: &mut [f32],
) {
    par_fill(size, out, |idx, x, y, z| {
        let c = pressure[idx];
        if obstacles[idx] {
            return c;
        }
        let sum: f32 = size
            .neighbors(x, y, z)
            .iter()
            .map(|&i| if obstacles[i] { c } else { pressure[i] })
            .sum();
        (sum - divergence[idx]) / 6.0
    });
}

/// Run `iterations` sweeps, ping-ponging between `pressure` and `scratch`.
///
/// On return `pressure` holds the newest iterate.
pub fn solve_pressure(
    pressure: &mut Vec<f32>,
    scratch: &mut Vec<f32>,
    divergence: &[f32],
    obstacles: &[bool],
    size: GridSize,
    iterations: u32,
) {
    for _ in 0..iterations {
        jacobi_sweep(pressure, divergence, obstacles, size, scratch);
        std::mem::swap(pressure, scratch);
    }
}

/// Subtract the pressure gradient and enforce no-through-flow at walls.
pub fn project(velocity: &mut [Vec3], pressure: &[f32], obstacles: &[bool], size: GridSize) {
    par_update(size, velocity, |idx, x, y, z, v| {
        if obstacles[idx] {
            *v = Vec3::zeros();
            return;
        }
        let n = size.neighbors(x, y, z);
        let [l, r, b, t, d, u] = n.map(|i| pressure[i]);
        let open = |lo: usize, hi: usize| {
            if obstacles[n[lo]] || obstacles[n[hi]] {
                0.0
            } else {
                1.0
            }
        };
        let mask = Vec3::new(open(0, 1), open(2, 3), open(4, 5));
        let gradient = Vec3::new(r - l, t - b, u - d) * 0.5;
        *v = (*v - gradient).component_mul(&mask);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::grid::{FluidGrid, ObstacleMask};
    use approx::assert_relative_eq;

    #[test]
    fn test_divergence_of_linear_field() {
        let size = GridSize::cube(5).unwrap();
        let grid = FluidGrid::new(size, ObstacleMask::Open);
        // v = (x, 2y, -z): div = 2
        let velocity: Vec<Vec3> = (0..size.cell_count())
            .map(|i| {
                let (x, y, z) = size.coords(i);
                Vec3::new(x as f32, 2.0 * y as f32, -(z as f32))
            })
            .collect();
        let mut div = vec![0.0; size.cell_count()];
        compute_divergence(&velocity, grid.obstacles(), size, &mut div);
        assert_relative_eq!(div[size.index(2, 2, 2)], 2.0);
    }

    #[test]
    fn test_divergence_zero_on_obstacles() {
        let grid = FluidGrid::new(GridSize::cube(4).unwrap(), ObstacleMask::BoundaryShell);
        let size = grid.size();
        let velocity = vec![Vec3::new(1.0, 2.0, 3.0); size.cell_count()];
        let mut div = vec![7.0; size.cell_count()];
        compute_divergence(&velocity, grid.obstacles(), size, &mut div);
        for (i, &d) in div.iter().enumerate() {
            if grid.obstacles()[i] {
                assert_eq!(d, 0.0);
            }
        }
        // Interior cell (1,1,1) sees a wall at x=0 and fluid at x=2
        assert_relative_eq!(div[size.index(1, 1, 1)], 0.5 * (1.0 + 2.0 + 3.0));
    }

    #[test]
    fn test_jacobi_reads_previous_sweep_only() {
        let size = GridSize::new(3, 1, 1).unwrap();
        let obstacles = [false; 3];
        let pressure = [1.0, 2.0, 4.0];
        let divergence = [0.0, 0.6, 0.0];
        let mut out = [0.0; 3];
        jacobi_sweep(&pressure, &divergence, &obstacles, size, &mut out);
        // Middle: l=1, r=4, b=t=d=u=2 (clamped to self)
        assert_relative_eq!(out[1], (1.0 + 4.0 + 4.0 * 2.0 - 0.6) / 6.0);
        // Left edge: l clamps to self (1), r = 2, four more selfs
        assert_relative_eq!(out[0], (1.0 + 2.0 + 4.0 * 1.0) / 6.0);
    }

    #[test]
    fn test_jacobi_obstacle_neighbours_use_centre() {
        let size = GridSize::new(3, 1, 1).unwrap();
        let obstacles = [true, false, true];
        let pressure = [100.0, 3.0, -100.0];
        let mut out = [0.0; 3];
        jacobi_sweep(&pressure, &[0.0; 3], &obstacles, size, &mut out);
        assert_relative_eq!(out[1], 3.0);
        assert_eq!(out[0], 100.0);
    }

    #[test]
    fn test_projection_masks_wall_axes() {
        let grid = FluidGrid::new(GridSize::cube(4).unwrap(), ObstacleMask::BoundaryShell);
        let size = grid.size();
        let mut velocity = vec![Vec3::new(1.0, 1.0, 1.0); size.cell_count()];
        let pressure = vec![0.0; size.cell_count()];
        project(&mut velocity, &pressure, grid.obstacles(), size);
        // In a 4^3 box every fluid cell touches a wall on every axis
        assert!(velocity.iter().all(|v| *v == Vec3::zeros()));

        let grid = FluidGrid::new(GridSize::new(6, 4, 4).unwrap(), ObstacleMask::BoundaryShell);
        let size = grid.size();
        let mut velocity = vec![Vec3::new(1.0, 1.0, 1.0); size.cell_count()];
        let pressure = vec![0.0; size.cell_count()];
        project(&mut velocity, &pressure, grid.obstacles(), size);
        assert_eq!(velocity[size.index(2, 1, 1)], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(velocity[size.index(1, 1, 1)], Vec3::zeros());
    }

    #[test]
    fn test_projection_subtracts_gradient() {
        let size = GridSize::cube(3).unwrap();
        let grid = FluidGrid::new(size, ObstacleMask::Open);
        let mut velocity = vec![Vec3::zeros(); size.cell_count()];
        let pressure: Vec<f32> = (0..size.cell_count())
            .map(|i| 2.0 * size.coords(i).0 as f32)
            .collect();
        project(&mut velocity, &pressure, grid.obstacles(), size);
        assert_relative_eq!(velocity[size.index(1, 1, 1)], Vec3::new(-2.0, 0.0, 0.0));
    }
}
