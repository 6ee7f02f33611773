//! Wildfire cellular automaton.
//!
//! Each tick reads a frozen snapshot of the grid and writes a fresh one, so
//! a cell's fate depends only on the previous tick. All randomness comes
//! from [`CellRng`] keyed by cell coordinate and clock time.

use super::cell::{BurnState, Material, TreeStage, WildfireCell};
use super::climate::DiurnalClimate;
use super::config::{BurnOut, SpreadModel, WildfireConfig};
use super::grid::{Neighborhood, WildfireGrid};
use super::ignition::IgnitionSource;
use super::wind::{WindDirection, NEIGHBOR_OFFSETS};
use super::Clock;
use crate::core_types::{CellRng, RollStream};
use crate::error::{ensure_finite, SimResult};
use crate::profiler::ProfilerScope;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCounts {
    pub ignited: usize,
    pub burned_out: usize,
    pub regrown: usize,
    pub trees_planted: usize,
    pub trees_grown: usize,
}

impl TransitionCounts {
    fn record(&mut self, before: &WildfireCell, after: &WildfireCell) {
        match (before.state, after.state) {
            (BurnState::NotOnFire, BurnState::OnFire) => self.ignited += 1,
            (BurnState::OnFire, BurnState::Destroyed) => self.burned_out += 1,
            (BurnState::Destroyed, BurnState::NotOnFire) => self.regrown += 1,
            _ => {}
        }
        match (before.material, after.material) {
            (Material::Grass, Material::Tree(_)) => self.trees_planted += 1,
            (Material::Tree(a), Material::Tree(b)) if b > a => self.trees_grown += 1,
            _ => {}
        }
    }
}

/// Everything [`transition`] needs besides the cell and its neighbours.
#[derive(Clone, Copy, Debug)]
pub struct TransitionContext<'a> {
    pub config: &'a WildfireConfig,
    pub rng: CellRng,
    pub clock: Clock,
    /// Flammability roll multiplier for this tick.
    pub roll_multiplier: f32,
}

impl TransitionContext<'_> {
    #[inline]
    fn roll(&self, n: &Neighborhood, stream: RollStream) -> f32 {
        self.rng.roll(n.x, n.y, self.clock.time, stream)
    }
}

/// Chance that burning neighbours pass fire to the cell.
#[must_use]
pub fn spread_probability(wind: WindDirection, neighborhood: &Neighborhood) -> f32 {
    neighborhood
        .burning_offsets()
        .map(|offset| wind.neighbor_weight(offset))
        .sum()
}

fn neighbor_on_fire(n: &Neighborhood, ctx: &TransitionContext<'_>) -> bool {
    match ctx.config.spread {
        SpreadModel::Moore => n.any_burning(),
        SpreadModel::WindOffsets => {
            let upwind = ctx.config.wind.upwind_offsets();
            NEIGHBOR_OFFSETS
                .iter()
                .zip(n.burning)
                .any(|(o, burning)| burning && upwind.contains(o))
        }
        SpreadModel::WindWeighted => {
            n.any_burning()
                && spread_probability(ctx.config.wind, n) > ctx.roll(n, RollStream::Spread)
        }
    }
}

/// Next state of one cell.
///
/// Pure: the result depends only on the arguments.
#[must_use]
pub fn transition(
    cell: WildfireCell,
    neighborhood: &Neighborhood,
    external_ignition: bool,
    ctx: &TransitionContext<'_>,
) -> WildfireCell {
    let config = ctx.config;
    let mut next = cell;

    match cell.state {
        BurnState::NotOnFire => {
            match cell.material {
                Material::Grass
                    if config.regrowth.tree > ctx.roll(neighborhood, RollStream::TreeRegrow) =>
                {
                    next.material = Material::Tree(TreeStage::Sapling);
                    return next;
                }
                Material::Tree(stage) => {
                    if let Some(grown) = stage.next() {
                        if config.regrowth.tree_growth
                            > ctx.roll(neighborhood, RollStream::TreeGrowth)
                        {
                            next.material = Material::Tree(grown);
                        }
                    }
                }
                _ => {}
            }

            let attempt = external_ignition
                || neighbor_on_fire(neighborhood, ctx)
                || config.ambient_ignition > ctx.roll(neighborhood, RollStream::Ignition);
            if attempt {
                let roll = ctx.roll(neighborhood, RollStream::Flammability) * ctx.roll_multiplier;
                if config.flammability.of(next.material) > roll {
                    next.state = BurnState::OnFire;
                }
            }
        }
        BurnState::OnFire => {
            let done = match config.burn_out {
                BurnOut::Immediate => true,
                BurnOut::Stochastic { probability } => {
                    probability > ctx.roll(neighborhood, RollStream::BurnOut)
                }
            };
            if done {
                next.state = BurnState::Destroyed;
            }
        }
        BurnState::Destroyed => {
            if config.regrowth.grass > ctx.roll(neighborhood, RollStream::GrassRegrow) {
                next.state = BurnState::NotOnFire;
                next.material = Material::Grass;
            }
        }
    }

    next
}

/// Steps a [`WildfireGrid`] one tick at a time.
#[derive(Debug, Clone)]
pub struct WildfireAutomaton {
    config: WildfireConfig,
    climate: Option<DiurnalClimate>,
    rng: CellRng,
}

impl WildfireAutomaton {
    /// # Errors
    ///
    /// Returns the first problem found by [`WildfireConfig::validate`].
    pub fn new(config: WildfireConfig) -> SimResult<Self> {
        config.validate()?;
        info!(
            wind = %config.wind,
            spread = ?config.spread,
            burn_out = ?config.burn_out,
            climate = config.climate.is_some(),
            "Wildfire automaton initialized"
        );
        Ok(Self {
            climate: config.climate.as_ref().map(DiurnalClimate::new),
            rng: CellRng::new(config.seed),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &WildfireConfig {
        &self.config
    }

    #[must_use]
    pub fn climate(&self) -> Option<&DiurnalClimate> {
        self.climate.as_ref()
    }

    pub fn set_wind(&mut self, wind: WindDirection) {
        if wind != self.config.wind {
            info!(from = %self.config.wind, to = %wind, "Wind direction changed");
            self.config.wind = wind;
        }
    }

    /// Temperature at `frame`, if a climate is configured.
    #[must_use]
    pub fn temperature(&self, frame: u64) -> Option<f32> {
        self.climate.as_ref().map(|c| c.temperature(frame))
    }

    #[must_use]
    pub fn is_hot(&self, frame: u64) -> bool {
        self.climate.as_ref().is_some_and(|c| c.is_hot(frame))
    }

    /// Advance `grid` one tick in place.
    ///
    /// # Errors
    ///
    /// Rejects a non-finite clock time; the grid is left untouched.
    pub fn step(
        &self,
        grid: &mut WildfireGrid,
        clock: Clock,
        ignition: &dyn IgnitionSource,
    ) -> SimResult<TransitionCounts> {
        let (next, counts) = self.advance(grid, clock, ignition)?;
        grid.cells = next.cells;
        Ok(counts)
    }

    /// Next grid for `clock`, leaving `grid` unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`WildfireAutomaton::step`].
    pub fn advance(
        &self,
        grid: &WildfireGrid,
        clock: Clock,
        ignition: &dyn IgnitionSource,
    ) -> SimResult<(WildfireGrid, TransitionCounts)> {
        if let Err(e) = ensure_finite("clock.time", clock.time) {
            warn!(time = clock.time, "Rejected wildfire step");
            return Err(e);
        }
        let _scope = ProfilerScope::new("wildfire");

        let ctx = TransitionContext {
            config: &self.config,
            rng: self.rng,
            clock,
            roll_multiplier: self
                .climate
                .as_ref()
                .map_or(1.0, |c| c.roll_multiplier(clock.frame)),
        };

        let width = grid.width() as usize;
        let mut next = grid.clone();
        next.cells
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let (x, y) = (x as u32, y as u32);
                    let neighborhood = grid.neighborhood(x, y);
                    let external = ignition.ignites(x, y, clock);
                    *out = transition(*out, &neighborhood, external, &ctx);
                }
            });

        let mut counts = TransitionCounts::default();
        for (before, after) in grid.cells().iter().zip(next.cells()) {
            counts.record(before, after);
        }

        debug!(
            frame = clock.frame,
            time = clock.time,
            hot = ctx.roll_multiplier != 1.0,
            ignited = counts.ignited,
            burned_out = counts.burned_out,
            regrown = counts.regrown,
            "Wildfire step complete"
        );
        Ok((next, counts))
    }
}
