//! 2D wildfire cellular automaton.
//!
//! A [`WildfireGrid`] of terrain cells is advanced by [`WildfireAutomaton`]
//! one tick at a time. Fire spreads through the Moore neighbourhood, biased
//! by a compass [`WindDirection`], and burnt ground may regrow.

pub mod automaton;
pub mod cell;
pub mod climate;
pub mod config;
pub mod grid;
pub mod ignition;
pub mod wind;

use serde::{Deserialize, Serialize};

pub use automaton::{transition, TransitionContext, TransitionCounts, WildfireAutomaton};
pub use cell::{BurnState, Material, TreeStage, WildfireCell};
pub use climate::{ClimateConfig, DiurnalClimate};
pub use config::{BurnOut, Flammability, Regrowth, SpreadModel, WildfireConfig};
pub use grid::{Neighborhood, StateCounts, TerrainConfig, WildfireGrid};
pub use ignition::{IgnitionSet, IgnitionSource, NoIgnition};
pub use wind::WindDirection;

/// Simulation time handed to each automaton tick.
///
/// `time` keys the per-cell random rolls; `frame` selects the climate hour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    pub time: f32,
    pub frame: u64,
}

impl Clock {
    #[must_use]
    pub fn new(time: f32, frame: u64) -> Self {
        Self { time, frame }
    }

    /// The clock one tick of length `dt` later.
    #[must_use]
    pub fn next(self, dt: f32) -> Self {
        Self {
            time: self.time + dt,
            frame: self.frame + 1,
        }
    }
}
