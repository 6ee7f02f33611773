//! Vector type aliases for lattice positions, velocities and directions.

use nalgebra::{Vector2, Vector3};

/// 3D vector type for fluid positions, velocities and vorticity.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`. Positions are in
/// grid units, so `(1.0, 0.0, 0.0)` is exactly one cell along x.
pub type Vec3 = Vector3<f32>;

/// 2D vector type for wildfire wind directions and neighbour offsets.
pub type Vec2 = Vector2<f32>;
