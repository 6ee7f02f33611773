//! Combined driver running both engines on one clock.
//!
//! Each [`FireSimulation::tick`] advances the fluid solver first and then
//! the wildfire automaton, both keyed by the same [`Clock`]. The engines do
//! not exchange state.

use crate::error::{ConfigError, SimResult};
use crate::fluid::{
    AdvectionScheme, FluidConfig, FluidGrid, FluidSolver, FluidStepStats, GridSize, ObstacleMask,
};
use crate::profiler::{FrameTimer, ProfilerScope};
use crate::wildfire::{
    Clock, IgnitionSet, StateCounts, TerrainConfig, TransitionCounts, WildfireAutomaton,
    WildfireConfig, WildfireGrid, WindDirection,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Grid resolution and solver effort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityPreset {
    /// 32³ fluid, 64×64 terrain, semi-Lagrangian scalars.
    Low,
    /// 64³ fluid, 128×128 terrain, BFECC scalars.
    #[default]
    Medium,
    /// 128³ fluid, 256×256 terrain, MacCormack scalars.
    High,
}

impl QualityPreset {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Fluid cells per axis.
    #[must_use]
    pub const fn fluid_resolution(&self) -> u32 {
        match self {
            Self::Low => 32,
            Self::Medium => 64,
            Self::High => 128,
        }
    }

    /// Wildfire grid `(width, height)`.
    #[must_use]
    pub const fn terrain_extent(&self) -> (u32, u32) {
        match self {
            Self::Low => (64, 64),
            Self::Medium => (128, 128),
            Self::High => (256, 256),
        }
    }

    #[must_use]
    pub const fn jacobi_iterations(&self) -> u32 {
        match self {
            Self::Low => 10,
            Self::Medium => 20,
            Self::High => 40,
        }
    }

    #[must_use]
    pub const fn advection_scheme(&self) -> AdvectionScheme {
        match self {
            Self::Low => AdvectionScheme::SemiLagrangian,
            Self::Medium => AdvectionScheme::Bfecc,
            Self::High => AdvectionScheme::MacCormack,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Full configuration for this preset.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in resolutions; the result type comes from
    /// [`GridSize::cube`].
    pub fn config(&self) -> SimResult<SimulationConfig> {
        let scheme = self.advection_scheme();
        let (width, height) = self.terrain_extent();
        Ok(SimulationConfig {
            fluid_size: GridSize::cube(self.fluid_resolution())?,
            fluid: FluidConfig {
                jacobi_iterations: self.jacobi_iterations(),
                density_scheme: scheme,
                reaction_scheme: scheme,
                ..FluidConfig::default()
            },
            wildfire_width: width,
            wildfire_height: height,
            wildfire: WildfireConfig::default(),
            terrain: TerrainConfig::default(),
        })
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QualityPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownName {
                kind: "quality preset",
                name: s.to_string(),
            })
    }
}

/// Everything needed to build a [`FireSimulation`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub fluid_size: GridSize,
    pub fluid: FluidConfig,
    pub wildfire_width: u32,
    pub wildfire_height: u32,
    pub wildfire: WildfireConfig,
    pub terrain: TerrainConfig,
}

impl SimulationConfig {
    /// Reseed every random source: wind noise, automaton rolls, climate
    /// noise and terrain.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        if let Some(wind) = &mut self.fluid.wind {
            wind.seed = seed;
        }
        self.wildfire.seed = seed as u32;
        if let Some(climate) = &mut self.wildfire.climate {
            climate.seed = seed;
        }
        self.terrain.seed = seed;
        self
    }

    /// # Errors
    ///
    /// Propagates the fluid and wildfire validation errors.
    pub fn validate(&self) -> SimResult<()> {
        self.fluid.validate()?;
        self.wildfire.validate()
    }
}

/// Outcome of one [`FireSimulation::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// Clock the tick ran at.
    pub clock: Clock,
    pub fluid: FluidStepStats,
    pub wildfire: TransitionCounts,
    /// Wildfire census after the tick.
    pub states: StateCounts,
    pub elapsed_ms: f64,
}

/// Fluid solver and wildfire automaton sharing one clock.
#[derive(Debug)]
pub struct FireSimulation {
    fluid_grid: FluidGrid,
    fluid_solver: FluidSolver,
    wildfire_grid: WildfireGrid,
    automaton: WildfireAutomaton,
    ignition: IgnitionSet,
    clock: Clock,
    timer: FrameTimer,
}

impl FireSimulation {
    /// # Errors
    ///
    /// Returns the first configuration problem found by either engine.
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        let fluid_grid = FluidGrid::new(config.fluid_size, ObstacleMask::BoundaryShell);
        let wildfire_grid = WildfireGrid::generate(
            config.wildfire_width,
            config.wildfire_height,
            &config.terrain,
        )?;
        info!(
            fluid = %config.fluid_size,
            wildfire_width = config.wildfire_width,
            wildfire_height = config.wildfire_height,
            "Creating fire simulation"
        );
        Ok(Self {
            fluid_grid,
            fluid_solver: FluidSolver::new(config.fluid)?,
            wildfire_grid,
            automaton: WildfireAutomaton::new(config.wildfire)?,
            ignition: IgnitionSet::new(),
            clock: Clock::default(),
            timer: FrameTimer::new(),
        })
    }

    /// Build from a preset.
    ///
    /// # Errors
    ///
    /// Same as [`FireSimulation::new`].
    pub fn from_preset(preset: QualityPreset, seed: u64) -> SimResult<Self> {
        Self::new(preset.config()?.with_seed(seed))
    }

    /// Advance both engines by `dt`.
    ///
    /// # Errors
    ///
    /// Rejects a negative or non-finite `dt`. Neither engine nor the clock is
    /// touched when the tick is rejected.
    pub fn tick(&mut self, dt: f32) -> SimResult<TickReport> {
        let scope = ProfilerScope::new("tick");
        let clock = self.clock;

        let fluid = self.fluid_solver.step(&mut self.fluid_grid, dt, clock.time)?;
        let wildfire = self
            .automaton
            .step(&mut self.wildfire_grid, clock, &self.ignition)?;

        self.clock = clock.next(dt);
        let elapsed_ms = scope.elapsed_ms();
        self.timer.record(elapsed_ms);

        let states = self.wildfire_grid.state_counts();
        debug!(
            frame = clock.frame,
            time = clock.time,
            max_speed = fluid.max_speed,
            on_fire = states.on_fire,
            destroyed = states.destroyed,
            elapsed_ms,
            "Tick complete"
        );

        Ok(TickReport {
            clock,
            fluid,
            wildfire,
            states,
            elapsed_ms,
        })
    }

    /// Set a wildfire cell alight now. Returns `false` outside the grid.
    pub fn ignite(&mut self, x: u32, y: u32) -> bool {
        let lit = self.wildfire_grid.ignite(x, y);
        if lit {
            info!(x, y, frame = self.clock.frame, "Manual ignition");
        }
        lit
    }

    /// Cells that attempt ignition every tick until removed.
    pub fn ignition_sources_mut(&mut self) -> &mut IgnitionSet {
        &mut self.ignition
    }

    #[must_use]
    pub fn ignition_sources(&self) -> &IgnitionSet {
        &self.ignition
    }

    pub fn set_wind(&mut self, wind: WindDirection) {
        self.automaton.set_wind(wind);
    }

    /// # Errors
    ///
    /// Returns the validation error and keeps the previous configuration.
    pub fn set_fluid_config(&mut self, config: FluidConfig) -> SimResult<()> {
        self.fluid_solver.set_config(config)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn fluid_grid(&self) -> &FluidGrid {
        &self.fluid_grid
    }

    pub fn fluid_grid_mut(&mut self) -> &mut FluidGrid {
        &mut self.fluid_grid
    }

    #[must_use]
    pub fn fluid_solver(&self) -> &FluidSolver {
        &self.fluid_solver
    }

    #[must_use]
    pub fn wildfire_grid(&self) -> &WildfireGrid {
        &self.wildfire_grid
    }

    pub fn wildfire_grid_mut(&mut self) -> &mut WildfireGrid {
        &mut self.wildfire_grid
    }

    #[must_use]
    pub fn automaton(&self) -> &WildfireAutomaton {
        &self.automaton
    }

    #[must_use]
    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            fluid_size: GridSize::cube(8).unwrap(),
            wildfire_width: 12,
            wildfire_height: 10,
            ..QualityPreset::Low.config().unwrap()
        }
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("HIGH".parse::<QualityPreset>().unwrap(), QualityPreset::High);
        assert_eq!(QualityPreset::Low.to_string(), "low");
        assert!(matches!(
            "ultra".parse::<QualityPreset>(),
            Err(ConfigError::UnknownName { .. })
        ));
    }

    #[test]
    fn test_presets_scale_up() {
        let low = QualityPreset::Low.config().unwrap();
        let high = QualityPreset::High.config().unwrap();
        assert!(high.fluid_size.cell_count() > low.fluid_size.cell_count());
        assert!(high.fluid.jacobi_iterations > low.fluid.jacobi_iterations);
        assert_eq!(high.fluid.density_scheme, AdvectionScheme::MacCormack);
        for preset in QualityPreset::ALL {
            assert!(preset.config().unwrap().validate().is_ok());
        }
    }

    #[test]
    fn test_with_seed_reaches_every_source() {
        let config = small_config().with_seed(42);
        assert_eq!(config.fluid.wind.unwrap().seed, 42);
        assert_eq!(config.wildfire.seed, 42);
        assert_eq!(config.wildfire.climate.unwrap().seed, 42);
        assert_eq!(config.terrain.seed, 42);
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut sim = FireSimulation::new(small_config()).unwrap();
        let first = sim.tick(0.1).unwrap();
        let second = sim.tick(0.1).unwrap();
        assert_eq!(first.clock, Clock::new(0.0, 0));
        assert_eq!(second.clock.frame, 1);
        assert!((second.clock.time - 0.1).abs() < 1e-6);
        assert_eq!(sim.clock().frame, 2);
        assert_eq!(sim.frame_timer().samples(), 2);
        assert_eq!(sim.fluid_solver().steps(), 2);
    }

    #[test]
    fn test_rejected_tick_keeps_clock() {
        let mut sim = FireSimulation::new(small_config()).unwrap();
        assert!(sim.tick(f32::NAN).is_err());
        assert_eq!(sim.clock(), Clock::default());
        assert_eq!(sim.fluid_solver().steps(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.fluid.jacobi_iterations = 0;
        assert_eq!(
            FireSimulation::new(config).unwrap_err(),
            ConfigError::ZeroIterations
        );

        let config = SimulationConfig {
            wildfire_width: 0,
            ..small_config()
        };
        assert!(matches!(
            FireSimulation::new(config),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_manual_ignition_reported() {
        let mut config = small_config();
        config.wildfire = WildfireConfig::spread_only();
        let mut sim = FireSimulation::new(config).unwrap();
        assert!(sim.ignite(3, 3));
        assert!(!sim.ignite(100, 3));
        let report = sim.tick(0.05).unwrap();
        assert_eq!(report.wildfire.burned_out, 1);
        assert_eq!(report.states.destroyed, 1);
    }
}
