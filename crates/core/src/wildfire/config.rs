//! Automaton parameters.

use super::cell::{Material, TreeStage};
use super::climate::ClimateConfig;
use super::wind::WindDirection;
use crate::error::{ensure_range, SimResult};
use serde::{Deserialize, Serialize};

/// Chance that an ignition attempt succeeds, per material.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flammability {
    pub grass: f32,
    pub water: f32,
    pub bedrock: f32,
    pub sapling: f32,
    pub young_tree: f32,
    pub mature_tree: f32,
}

impl Default for Flammability {
    fn default() -> Self {
        Self {
            grass: 0.75,
            water: 0.0,
            bedrock: 0.1,
            sapling: 0.4,
            young_tree: 0.6,
            mature_tree: 0.75,
        }
    }
}

impl Flammability {
    /// Every material ignites on any attempt.
    #[must_use]
    pub fn uniform(p: f32) -> Self {
        Self {
            grass: p,
            water: p,
            bedrock: p,
            sapling: p,
            young_tree: p,
            mature_tree: p,
        }
    }

    #[must_use]
    pub fn of(&self, material: Material) -> f32 {
        match material {
            Material::Grass => self.grass,
            Material::Water => self.water,
            Material::Bedrock => self.bedrock,
            Material::Tree(TreeStage::Sapling) => self.sapling,
            Material::Tree(TreeStage::Young) => self.young_tree,
            Material::Tree(TreeStage::Mature) => self.mature_tree,
        }
    }

    fn validate(&self) -> SimResult<()> {
        for (name, p) in [
            ("flammability.grass", self.grass),
            ("flammability.water", self.water),
            ("flammability.bedrock", self.bedrock),
            ("flammability.sapling", self.sapling),
            ("flammability.young_tree", self.young_tree),
            ("flammability.mature_tree", self.mature_tree),
        ] {
            ensure_range(name, p, 0.0, 1.0)?;
        }
        Ok(())
    }
}

/// Per-tick recovery probabilities.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Regrowth {
    /// Destroyed → unburnt grass.
    pub grass: f32,
    /// Unburnt grass → sapling.
    pub tree: f32,
    /// Sapling → young → mature, one stage at a time.
    pub tree_growth: f32,
}

impl Default for Regrowth {
    fn default() -> Self {
        Self {
            grass: 0.1,
            tree: 0.2,
            tree_growth: 0.05,
        }
    }
}

impl Regrowth {
    /// Burnt ground stays burnt and vegetation never changes.
    #[must_use]
    pub fn none() -> Self {
        Self {
            grass: 0.0,
            tree: 0.0,
            tree_growth: 0.0,
        }
    }
}

/// How long a cell burns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum BurnOut {
    /// Destroyed on the tick after ignition.
    #[default]
    Immediate,
    /// Destroyed with this probability each tick.
    Stochastic { probability: f32 },
}

/// How burning neighbours feed the ignition check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadModel {
    /// Any of the eight neighbours burning triggers the check.
    Moore,
    /// Any burning neighbour in [`WindDirection::upwind_offsets`] triggers it.
    WindOffsets,
    /// The summed [`WindDirection::neighbor_weight`] of burning neighbours is
    /// compared against a roll.
    #[default]
    WindWeighted,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WildfireConfig {
    pub flammability: Flammability,
    pub regrowth: Regrowth,
    pub burn_out: BurnOut,
    pub spread: SpreadModel,
    pub wind: WindDirection,
    /// Chance per tick that an unburnt cell attempts ignition on its own.
    pub ambient_ignition: f32,
    /// `None` disables hot-hour effects.
    pub climate: Option<ClimateConfig>,
    pub seed: u32,
}

impl Default for WildfireConfig {
    fn default() -> Self {
        Self {
            flammability: Flammability::default(),
            regrowth: Regrowth::default(),
            burn_out: BurnOut::Immediate,
            spread: SpreadModel::WindWeighted,
            wind: WindDirection::Calm,
            ambient_ignition: 0.01,
            climate: Some(ClimateConfig::default()),
            seed: 0,
        }
    }
}

impl WildfireConfig {
    /// Deterministic spread only: no ambient fires, regrowth or climate.
    #[must_use]
    pub fn spread_only() -> Self {
        Self {
            regrowth: Regrowth::none(),
            ambient_ignition: 0.0,
            climate: None,
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`crate::ConfigError::OutOfRange`] for any probability outside
    /// `[0, 1]` and propagates climate validation errors.
    pub fn validate(&self) -> SimResult<()> {
        self.flammability.validate()?;
        ensure_range("regrowth.grass", self.regrowth.grass, 0.0, 1.0)?;
        ensure_range("regrowth.tree", self.regrowth.tree, 0.0, 1.0)?;
        ensure_range("regrowth.tree_growth", self.regrowth.tree_growth, 0.0, 1.0)?;
        ensure_range("ambient_ignition", self.ambient_ignition, 0.0, 1.0)?;
        if let BurnOut::Stochastic { probability } = self.burn_out {
            ensure_range("burn_out.probability", probability, 0.0, 1.0)?;
        }
        if let Some(climate) = &self.climate {
            climate.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_defaults_validate() {
        assert!(WildfireConfig::default().validate().is_ok());
        assert!(WildfireConfig::spread_only().validate().is_ok());
    }

    #[test]
    fn test_probabilities_must_be_unit_interval() {
        let config = WildfireConfig {
            ambient_ignition: 1.5,
            ..WildfireConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                name: "ambient_ignition",
                ..
            })
        ));

        let config = WildfireConfig {
            burn_out: BurnOut::Stochastic {
                probability: f32::NAN,
            },
            ..WildfireConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteParameter { .. })
        ));
    }

    #[test]
    fn test_flammability_lookup() {
        let f = Flammability::default();
        assert_eq!(f.of(Material::Water), 0.0);
        assert_eq!(f.of(Material::Tree(TreeStage::Young)), 0.6);
        assert_eq!(Flammability::uniform(1.0).of(Material::Bedrock), 1.0);
    }
}
