//! Fire and smoke simulation core.
//!
//! Two independent engines share this crate:
//!
//! - [`fluid`]: a 3D Eulerian solver on a collocated grid. Each step
//!   advects velocity, density, temperature and reaction, applies buoyancy,
//!   noisy wind, an emitter and vorticity confinement, then projects the
//!   velocity towards zero divergence with a Jacobi pressure solve.
//! - [`wildfire`]: a 2D cellular automaton of grass, trees, water and
//!   bedrock where fire spreads through the Moore neighbourhood under a
//!   compass wind, with regrowth and a diurnal climate.
//!
//! [`simulation::FireSimulation`] drives both on one clock. Every stage is
//! data-parallel over disjoint output buffers, so results do not depend on
//! how rayon schedules the work.

pub mod core_types;
pub mod error;
pub mod fluid;
pub mod profiler;
pub mod simulation;
pub mod wildfire;

pub use core_types::{CellRng, NoiseGenerator, RollStream, Vec2, Vec3};
pub use error::{ConfigError, SimResult};
pub use fluid::{FluidConfig, FluidGrid, FluidSolver, FluidStepStats, GridSize, ObstacleMask};
pub use profiler::{FrameTimer, ProfilerScope};
pub use simulation::{FireSimulation, QualityPreset, SimulationConfig, TickReport};
pub use wildfire::{
    BurnState, Clock, Material, WildfireAutomaton, WildfireCell, WildfireConfig, WildfireGrid,
    WindDirection,
};
