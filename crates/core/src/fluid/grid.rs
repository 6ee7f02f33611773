//! 3D lattice storage for the fire/smoke solver.
//!
//! Fields are stored structure-of-arrays, one `Vec` per quantity, indexed by
//! `x + y * sx + z * sx * sy`. A z-slab (`sx * sy` cells) is the unit of
//! parallel work for every stage.

use crate::core_types::Vec3;
use crate::error::{ConfigError, SimResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated lattice extent. Every axis is at least one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u32; 3]", into = "[u32; 3]")]
pub struct GridSize {
    x: u32,
    y: u32,
    z: u32,
}

impl GridSize {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDimensions`] if any extent is zero.
    pub fn new(x: u32, y: u32, z: u32) -> SimResult<Self> {
        if x == 0 || y == 0 || z == 0 {
            return Err(ConfigError::InvalidDimensions { x, y, z });
        }
        Ok(Self { x, y, z })
    }

    /// Cubic lattice of `n` cells per side.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDimensions`] if `n` is zero.
    pub fn cube(n: u32) -> SimResult<Self> {
        Self::new(n, n, n)
    }

    #[must_use]
    pub fn x(&self) -> u32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> u32 {
        self.y
    }

    #[must_use]
    pub fn z(&self) -> u32 {
        self.z
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.layer_size() * self.z as usize
    }

    /// Cells in one z-slab.
    #[must_use]
    pub fn layer_size(&self) -> usize {
        self.x as usize * self.y as usize
    }

    #[inline]
    #[must_use]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.x as usize + z * self.layer_size()
    }

    /// Inverse of [`GridSize::index`].
    #[must_use]
    pub fn coords(&self, idx: usize) -> (usize, usize, usize) {
        let sx = self.x as usize;
        let layer = self.layer_size();
        (idx % sx, (idx % layer) / sx, idx / layer)
    }

    #[must_use]
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.x as usize && y < self.y as usize && z < self.z as usize
    }

    /// [`GridSize::index`], or `None` outside the lattice.
    #[inline]
    #[must_use]
    pub fn checked_index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        self.contains(x, y, z).then(|| self.index(x, y, z))
    }

    /// True when any coordinate lies on the outermost layer.
    #[must_use]
    pub fn is_boundary(&self, x: usize, y: usize, z: usize) -> bool {
        x == 0
            || y == 0
            || z == 0
            || x + 1 == self.x as usize
            || y + 1 == self.y as usize
            || z + 1 == self.z as usize
    }

    /// Largest valid coordinate on each axis, `dim - 1`.
    #[must_use]
    pub fn max_coord(&self) -> Vec3 {
        Vec3::new(
            (self.x - 1) as f32,
            (self.y - 1) as f32,
            (self.z - 1) as f32,
        )
    }

    /// Clamped neighbour indices `[l, r, b, t, d, u]` of `(x, y, z)`.
    ///
    /// Out-of-range neighbours collapse onto the cell itself.
    #[inline]
    #[must_use]
    pub fn neighbors(&self, x: usize, y: usize, z: usize) -> [usize; 6] {
        let mx = self.x as usize - 1;
        let my = self.y as usize - 1;
        let mz = self.z as usize - 1;
        [
            self.index(x.saturating_sub(1), y, z),
            self.index((x + 1).min(mx), y, z),
            self.index(x, y.saturating_sub(1), z),
            self.index(x, (y + 1).min(my), z),
            self.index(x, y, z.saturating_sub(1)),
            self.index(x, y, (z + 1).min(mz)),
        ]
    }
}

impl TryFrom<[u32; 3]> for GridSize {
    type Error = ConfigError;

    fn try_from([x, y, z]: [u32; 3]) -> SimResult<Self> {
        Self::new(x, y, z)
    }
}

impl From<GridSize> for [u32; 3] {
    fn from(size: GridSize) -> Self {
        [size.x, size.y, size.z]
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// How the obstacle flags are initialised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleMask {
    /// Every cell on the outer layer is solid.
    #[default]
    BoundaryShell,
    /// No solid cells; edges are handled purely by index clamping.
    Open,
}

/// Snapshot of every field at one lattice point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidCell {
    pub velocity: Vec3,
    pub density: f32,
    pub temperature: f32,
    pub reaction: f32,
    pub pressure: f32,
    pub divergence: f32,
    pub vorticity: Vec3,
    pub obstacle: bool,
}

/// Fire/smoke state over a 3D lattice.
///
/// The obstacle flags are fixed at construction; every other field is
/// rewritten by [`crate::fluid::FluidSolver::step`].
#[derive(Clone, Debug)]
pub struct FluidGrid {
    size: GridSize,
    pub(crate) velocity: Vec<Vec3>,
    pub(crate) density: Vec<f32>,
    pub(crate) temperature: Vec<f32>,
    pub(crate) reaction: Vec<f32>,
    pub(crate) pressure: Vec<f32>,
    pub(crate) divergence: Vec<f32>,
    pub(crate) vorticity: Vec<Vec3>,
    pub(crate) obstacles: Vec<bool>,
}

impl FluidGrid {
    /// Quiescent grid with the given obstacle layout.
    #[must_use]
    pub fn new(size: GridSize, mask: ObstacleMask) -> Self {
        let obstacles = match mask {
            ObstacleMask::BoundaryShell => (0..size.cell_count())
                .map(|idx| {
                    let (x, y, z) = size.coords(idx);
                    size.is_boundary(x, y, z)
                })
                .collect(),
            ObstacleMask::Open => vec![false; size.cell_count()],
        };
        Self::with_obstacles(size, obstacles)
    }

    /// Boundary shell plus any interior cell for which `solid` returns true.
    #[must_use]
    pub fn with_interior_obstacles<F>(size: GridSize, solid: F) -> Self
    where
        F: Fn(usize, usize, usize) -> bool,
    {
        let obstacles = (0..size.cell_count())
            .map(|idx| {
                let (x, y, z) = size.coords(idx);
                size.is_boundary(x, y, z) || solid(x, y, z)
            })
            .collect();
        Self::with_obstacles(size, obstacles)
    }

    fn with_obstacles(size: GridSize, obstacles: Vec<bool>) -> Self {
        let n = size.cell_count();
        Self {
            size,
            velocity: vec![Vec3::zeros(); n],
            density: vec![0.0; n],
            temperature: vec![0.0; n],
            reaction: vec![0.0; n],
            pressure: vec![0.0; n],
            divergence: vec![0.0; n],
            vorticity: vec![Vec3::zeros(); n],
            obstacles,
        }
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// All fields at `(x, y, z)`, or `None` outside the lattice.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize, z: usize) -> Option<FluidCell> {
        let i = self.size.checked_index(x, y, z)?;
        Some(FluidCell {
            velocity: self.velocity[i],
            density: self.density[i],
            temperature: self.temperature[i],
            reaction: self.reaction[i],
            pressure: self.pressure[i],
            divergence: self.divergence[i],
            vorticity: self.vorticity[i],
            obstacle: self.obstacles[i],
        })
    }

    // Per-field reads return `None` outside the lattice, like `cell`.

    #[must_use]
    pub fn velocity_at(&self, x: usize, y: usize, z: usize) -> Option<Vec3> {
        self.size.checked_index(x, y, z).map(|i| self.velocity[i])
    }

    #[must_use]
    pub fn density_at(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.size.checked_index(x, y, z).map(|i| self.density[i])
    }

    #[must_use]
    pub fn temperature_at(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.size.checked_index(x, y, z).map(|i| self.temperature[i])
    }

    #[must_use]
    pub fn reaction_at(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.size.checked_index(x, y, z).map(|i| self.reaction[i])
    }

    #[must_use]
    pub fn pressure_at(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.size.checked_index(x, y, z).map(|i| self.pressure[i])
    }

    #[must_use]
    pub fn divergence_at(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.size.checked_index(x, y, z).map(|i| self.divergence[i])
    }

    #[must_use]
    pub fn vorticity_at(&self, x: usize, y: usize, z: usize) -> Option<Vec3> {
        self.size.checked_index(x, y, z).map(|i| self.vorticity[i])
    }

    #[must_use]
    pub fn is_obstacle(&self, x: usize, y: usize, z: usize) -> Option<bool> {
        self.size.checked_index(x, y, z).map(|i| self.obstacles[i])
    }

    #[must_use]
    pub fn velocity(&self) -> &[Vec3] {
        &self.velocity
    }

    #[must_use]
    pub fn density(&self) -> &[f32] {
        &self.density
    }

    #[must_use]
    pub fn temperature(&self) -> &[f32] {
        &self.temperature
    }

    #[must_use]
    pub fn reaction(&self) -> &[f32] {
        &self.reaction
    }

    #[must_use]
    pub fn pressure(&self) -> &[f32] {
        &self.pressure
    }

    #[must_use]
    pub fn divergence(&self) -> &[f32] {
        &self.divergence
    }

    #[must_use]
    pub fn vorticity(&self) -> &[Vec3] {
        &self.vorticity
    }

    #[must_use]
    pub fn obstacles(&self) -> &[bool] {
        &self.obstacles
    }

    // Setters leave solid cells untouched and report whether they wrote.

    pub fn set_velocity(&mut self, x: usize, y: usize, z: usize, value: Vec3) -> bool {
        let Some(i) = self.writable(x, y, z) else {
            return false;
        };
        self.velocity[i] = value;
        true
    }

    pub fn set_density(&mut self, x: usize, y: usize, z: usize, value: f32) -> bool {
        let Some(i) = self.writable(x, y, z) else {
            return false;
        };
        self.density[i] = value.max(0.0);
        true
    }

    pub fn set_temperature(&mut self, x: usize, y: usize, z: usize, value: f32) -> bool {
        let Some(i) = self.writable(x, y, z) else {
            return false;
        };
        self.temperature[i] = value;
        true
    }

    pub fn set_reaction(&mut self, x: usize, y: usize, z: usize, value: f32) -> bool {
        let Some(i) = self.writable(x, y, z) else {
            return false;
        };
        self.reaction[i] = value.clamp(0.0, 1.0);
        true
    }

    fn writable(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let i = self.size.checked_index(x, y, z)?;
        (!self.obstacles[i]).then_some(i)
    }

    /// Largest velocity magnitude anywhere on the grid.
    #[must_use]
    pub fn max_speed(&self) -> f32 {
        self.velocity.iter().map(|v| v.norm()).fold(0.0, f32::max)
    }

    /// Sum of density over all cells.
    #[must_use]
    pub fn total_density(&self) -> f64 {
        self.density.iter().map(|&d| f64::from(d)).sum()
    }
}

/// Evaluate `kernel(idx, x, y, z)` for every cell into `out`, one z-slab per task.
pub(crate) fn par_fill<T, F>(size: GridSize, out: &mut [T], kernel: F)
where
    T: Send,
    F: Fn(usize, usize, usize, usize) -> T + Sync,
{
    let layer = size.layer_size();
    let sx = size.x() as usize;
    out.par_chunks_mut(layer)
        .enumerate()
        .for_each(|(z, slab)| {
            for (i, cell) in slab.iter_mut().enumerate() {
                *cell = kernel(z * layer + i, i % sx, i / sx, z);
            }
        });
}

/// Update every cell of `field` in place from `kernel(idx, x, y, z, &mut value)`.
///
/// Only for stages whose kernel reads other buffers, never `field` itself at
/// another index.
pub(crate) fn par_update<T, F>(size: GridSize, field: &mut [T], kernel: F)
where
    T: Send,
    F: Fn(usize, usize, usize, usize, &mut T) + Sync,
{
    let layer = size.layer_size();
    let sx = size.x() as usize;
    field
        .par_chunks_mut(layer)
        .enumerate()
        .for_each(|(z, slab)| {
            for (i, cell) in slab.iter_mut().enumerate() {
                kernel(z * layer + i, i % sx, i / sx, z, cell);
            }
        });
}
