//! Wildfire cell state.

use serde::{Deserialize, Serialize};

/// Growth stage of a tree cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TreeStage {
    Sapling,
    Young,
    Mature,
}

impl TreeStage {
    /// Next stage, or `None` once mature.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Sapling => Some(Self::Young),
            Self::Young => Some(Self::Mature),
            Self::Mature => None,
        }
    }
}

/// What covers the ground in a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Grass,
    Water,
    Bedrock,
    Tree(TreeStage),
}

impl Material {
    /// Single-character map glyph.
    #[must_use]
    pub fn glyph(self) -> char {
        match self {
            Self::Grass => '.',
            Self::Water => '~',
            Self::Bedrock => '^',
            Self::Tree(TreeStage::Sapling) => ',',
            Self::Tree(TreeStage::Young) => 't',
            Self::Tree(TreeStage::Mature) => 'T',
        }
    }
}

/// Fire lifecycle. Only `NotOnFire → OnFire → Destroyed → NotOnFire` is legal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BurnState {
    #[default]
    NotOnFire,
    OnFire,
    Destroyed,
}

impl BurnState {
    /// Whether `self → next` is a permitted single-tick change.
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotOnFire, Self::NotOnFire | Self::OnFire)
                | (Self::OnFire, Self::OnFire | Self::Destroyed)
                | (Self::Destroyed, Self::Destroyed | Self::NotOnFire)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WildfireCell {
    pub material: Material,
    pub state: BurnState,
    /// Terrain height; carried through every step unchanged.
    pub height: f32,
}

impl WildfireCell {
    #[must_use]
    pub fn new(material: Material) -> Self {
        Self {
            material,
            state: BurnState::NotOnFire,
            height: 0.0,
        }
    }

    #[must_use]
    pub fn with_height(self, height: f32) -> Self {
        Self { height, ..self }
    }

    #[must_use]
    pub fn is_burning(&self) -> bool {
        self.state == BurnState::OnFire
    }

    #[must_use]
    pub fn glyph(&self) -> char {
        match self.state {
            BurnState::OnFire => '*',
            BurnState::Destroyed => '#',
            BurnState::NotOnFire => self.material.glyph(),
        }
    }
}

impl Default for WildfireCell {
    fn default() -> Self {
        Self::new(Material::Grass)
    }
}
