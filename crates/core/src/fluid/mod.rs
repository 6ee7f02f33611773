//! 3D Eulerian fire and smoke.
//!
//! [`FluidGrid`] holds the state, [`FluidSolver`] advances it. The stage
//! functions are public so a driver can run or test them individually.

pub mod advection;
pub mod config;
pub mod forces;
pub mod grid;
pub mod pressure;
pub mod sampler;
pub mod solver;
pub mod vorticity;

pub use config::{AdvectionScheme, Emitter, FluidConfig, WindGust, WindNoise};
pub use grid::{FluidCell, FluidGrid, GridSize, ObstacleMask};
pub use sampler::{sample, Lerp};
pub use solver::{FluidSolver, FluidStepStats};
