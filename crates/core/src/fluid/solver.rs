//! Per-step fire/smoke pipeline.
//!
//! Stage order is fixed:
//! advect → buoyancy → wind/gust → emitter → extinguishment →
//! vorticity confinement → divergence → pressure → projection.
//! Every stage reads a complete snapshot of the previous one; the scratch
//! buffers owned by the solver play the role of the write side.

use super::advection::{advect_scalar, advect_velocity, semi_lagrangian, Attenuation};
use super::config::FluidConfig;
use super::forces::{
    apply_buoyancy, apply_emitter, apply_extinguishment, apply_gust, apply_wind,
};
use super::grid::FluidGrid;
use super::pressure::{compute_divergence, project, solve_pressure};
use super::vorticity::{apply_confinement, compute_vorticity};
use crate::core_types::{NoiseGenerator, Vec3};
use crate::error::{ensure_finite, ensure_range, SimResult};
use crate::profiler::ProfilerScope;
use tracing::{debug, info, warn};

/// Summary of one completed step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluidStepStats {
    pub max_speed: f32,
    pub total_density: f64,
    pub max_reaction: f32,
    pub max_temperature: f32,
    /// Largest |divergence| left after projection.
    pub residual_divergence: f32,
}

/// Write-side buffers, resized lazily to the grid being stepped.
#[derive(Debug, Default)]
struct Scratch {
    forward: Vec<f32>,
    backward: Vec<f32>,
    scalar: Vec<f32>,
    vector: Vec<Vec3>,
}

impl Scratch {
    fn ensure(&mut self, n: usize) {
        if self.scalar.len() != n {
            self.forward = vec![0.0; n];
            self.backward = vec![0.0; n];
            self.scalar = vec![0.0; n];
            self.vector = vec![Vec3::zeros(); n];
        }
    }
}

/// Eulerian fire/smoke solver.
#[derive(Debug)]
pub struct FluidSolver {
    config: FluidConfig,
    noise: Option<NoiseGenerator>,
    scratch: Scratch,
    steps: u64,
}

impl FluidSolver {
    /// # Errors
    ///
    /// Returns the first problem found by [`FluidConfig::validate`].
    pub fn new(config: FluidConfig) -> SimResult<Self> {
        config.validate()?;
        let config = config.normalized();
        info!(
            jacobi_iterations = config.jacobi_iterations,
            density_scheme = ?config.density_scheme,
            reaction_scheme = ?config.reaction_scheme,
            wind = config.wind.is_some(),
            "Fluid solver initialized"
        );
        Ok(Self {
            noise: config.wind.map(|w| NoiseGenerator::new(w.seed)),
            config,
            scratch: Scratch::default(),
            steps: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    /// Replace the configuration between steps.
    ///
    /// # Errors
    ///
    /// Returns the validation error and keeps the previous configuration.
    pub fn set_config(&mut self, config: FluidConfig) -> SimResult<()> {
        config.validate()?;
        let config = config.normalized();
        let reseed = config.wind.map(|w| w.seed) != self.config.wind.map(|w| w.seed);
        if reseed {
            self.noise = config.wind.map(|w| NoiseGenerator::new(w.seed));
        }
        info!(reseed, "Fluid solver reconfigured");
        self.config = config;
        Ok(())
    }

    /// Steps taken so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance `grid` by `dt` at simulation time `time`.
    ///
    /// # Errors
    ///
    /// Rejects a negative or non-finite `dt` or a non-finite `time`; the grid
    /// is left untouched in that case.
    pub fn step(&mut self, grid: &mut FluidGrid, dt: f32, time: f32) -> SimResult<FluidStepStats> {
        if let Err(e) = ensure_range("dt", dt, 0.0, f32::MAX).and(ensure_finite("time", time)) {
            warn!(dt, time, error = %e, "Rejected fluid step");
            return Err(e);
        }

        let size = grid.size();
        let config = &self.config;
        let obstacles = &grid.obstacles;
        self.scratch.ensure(size.cell_count());
        let Scratch {
            forward,
            backward,
            scalar,
            vector,
        } = &mut self.scratch;

        {
            let _scope = ProfilerScope::new("advect");
            advect_scalar(
                config.density_scheme,
                &grid.density,
                &grid.velocity,
                obstacles,
                size,
                dt,
                Attenuation::new(config.density_dissipation, 0.0),
                forward,
                backward,
                scalar,
            );
            std::mem::swap(&mut grid.density, scalar);

            semi_lagrangian(
                &grid.temperature,
                &grid.velocity,
                obstacles,
                size,
                dt,
                Attenuation::new(config.temperature_dissipation, config.temperature_decay),
                scalar,
            );
            std::mem::swap(&mut grid.temperature, scalar);

            advect_scalar(
                config.reaction_scheme,
                &grid.reaction,
                &grid.velocity,
                obstacles,
                size,
                dt,
                Attenuation::new(config.reaction_dissipation, config.reaction_decay)
                    .with_ceiling(1.0),
                forward,
                backward,
                scalar,
            );
            std::mem::swap(&mut grid.reaction, scalar);

            // Velocity last so every trace above used the start-of-step field
            advect_velocity(
                &grid.velocity,
                obstacles,
                size,
                dt,
                config.velocity_dissipation,
                vector,
            );
            std::mem::swap(&mut grid.velocity, vector);
        }

        {
            let _scope = ProfilerScope::new("forces");
            apply_buoyancy(
                &mut grid.velocity,
                &grid.temperature,
                &grid.density,
                obstacles,
                dt,
                config.buoyancy,
                config.weight,
                config.ambient_temperature,
                config.up,
            );
            if let (Some(wind), Some(noise)) = (&config.wind, &self.noise) {
                apply_wind(&mut grid.velocity, obstacles, size, noise, wind, time);
            }
            if let Some(gust) = &config.gust {
                apply_gust(&mut grid.velocity, obstacles, size, gust, dt);
            }
            if let Some(emitter) = &config.emitter {
                apply_emitter(
                    &mut grid.reaction,
                    &mut grid.temperature,
                    obstacles,
                    size,
                    emitter,
                    dt,
                );
            }
            apply_extinguishment(
                &mut grid.density,
                &grid.reaction,
                obstacles,
                config.density_amount,
                config.extinguishment,
            );
        }

        {
            let _scope = ProfilerScope::new("vorticity");
            compute_vorticity(&grid.velocity, size, &mut grid.vorticity);
            apply_confinement(
                &mut grid.velocity,
                &grid.vorticity,
                obstacles,
                size,
                dt,
                config.vorticity_strength,
            );
        }

        {
            let _scope = ProfilerScope::new("pressure");
            compute_divergence(&grid.velocity, obstacles, size, &mut grid.divergence);
            if !config.warm_start_pressure {
                grid.pressure.fill(0.0);
            }
            solve_pressure(
                &mut grid.pressure,
                scalar,
                &grid.divergence,
                obstacles,
                size,
                config.jacobi_iterations,
            );
            project(&mut grid.velocity, &grid.pressure, obstacles, size);
        }

        compute_divergence(&grid.velocity, obstacles, size, scalar);
        let stats = FluidStepStats {
            max_speed: grid.max_speed(),
            total_density: grid.total_density(),
            max_reaction: grid.reaction.iter().copied().fold(0.0, f32::max),
            max_temperature: grid
                .temperature
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max),
            residual_divergence: scalar.iter().map(|d| d.abs()).fold(0.0, f32::max),
        };

        self.steps += 1;
        debug!(
            step = self.steps,
            time,
            max_speed = stats.max_speed,
            total_density = stats.total_density,
            residual_divergence = stats.residual_divergence,
            "Fluid step complete"
        );
        Ok(stats)
    }

    /// Pure form of [`FluidSolver::step`]: returns the next grid and leaves
    /// `grid` as it was.
    ///
    /// # Errors
    ///
    /// Same as [`FluidSolver::step`].
    pub fn advance(
        &mut self,
        grid: &FluidGrid,
        dt: f32,
        time: f32,
    ) -> SimResult<(FluidGrid, FluidStepStats)> {
        let mut next = grid.clone();
        let stats = self.step(&mut next, dt, time)?;
        Ok((next, stats))
    }
}
