//! Wind direction and neighbour-driven spread.
//!
//! Grid orientation: `x` grows eastward, `y` grows southward, so row 0 is
//! the northern edge. Directions follow the meteorological convention and
//! name where the wind blows *from*.

use crate::core_types::Vec2;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_1_SQRT_2;
use std::fmt;
use std::str::FromStr;

/// Moore neighbourhood offsets `(dx, dy)`, row by row from the north-west.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Spread chance per burning neighbour when there is no wind.
pub const CALM_SPREAD_PER_NEIGHBOR: f32 = 1.0 / 16.0;

/// Floor of the wind-weighted contribution for a fully upwind neighbour.
const CROSSWIND_FLOOR: f32 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindDirection {
    #[default]
    Calm,
    North,
    South,
    West,
    East,
    SouthWest,
    SouthEast,
    NorthWest,
    NorthEast,
}

impl WindDirection {
    pub const ALL: [Self; 9] = [
        Self::Calm,
        Self::South,
        Self::North,
        Self::West,
        Self::East,
        Self::SouthWest,
        Self::SouthEast,
        Self::NorthWest,
        Self::NorthEast,
    ];

    /// Direction by position in [`WindDirection::ALL`], wrapping.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Unit vector the wind blows towards; zero when calm.
    #[must_use]
    pub fn downwind(self) -> Vec2 {
        let d = FRAC_1_SQRT_2;
        match self {
            Self::Calm => Vec2::zeros(),
            Self::North => Vec2::new(0.0, 1.0),
            Self::South => Vec2::new(0.0, -1.0),
            Self::West => Vec2::new(1.0, 0.0),
            Self::East => Vec2::new(-1.0, 0.0),
            Self::NorthEast => Vec2::new(-d, d),
            Self::NorthWest => Vec2::new(d, d),
            Self::SouthEast => Vec2::new(-d, -d),
            Self::SouthWest => Vec2::new(d, -d),
        }
    }

    /// Neighbour offsets that can pass fire to a cell under this wind.
    ///
    /// Cardinal winds admit the upwind row and both crosswind cells;
    /// diagonal winds admit only the three upwind cells.
    #[must_use]
    pub fn upwind_offsets(self) -> &'static [(i32, i32)] {
        match self {
            Self::Calm => &NEIGHBOR_OFFSETS,
            Self::North => &[(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0)],
            Self::South => &[(-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)],
            Self::East => &[(0, -1), (1, -1), (1, 0), (0, 1), (1, 1)],
            Self::West => &[(-1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)],
            Self::NorthEast => &[(0, -1), (1, -1), (1, 0)],
            Self::NorthWest => &[(-1, -1), (0, -1), (-1, 0)],
            Self::SouthEast => &[(1, 0), (0, 1), (1, 1)],
            Self::SouthWest => &[(-1, 0), (-1, 1), (0, 1)],
        }
    }

    /// Chance that fire from the neighbour at `offset` reaches the cell.
    ///
    /// `(0.1 + 0.9 * max(0, dot(normalize(-offset), downwind))) / 8`, or a
    /// flat 1/16 when calm.
    #[must_use]
    pub fn neighbor_weight(self, offset: (i32, i32)) -> f32 {
        if self == Self::Calm {
            return CALM_SPREAD_PER_NEIGHBOR;
        }
        let towards_cell = -Vec2::new(offset.0 as f32, offset.1 as f32).normalize();
        let alignment = towards_cell.dot(&self.downwind()).max(0.0);
        (CROSSWIND_FLOOR + (1.0 - CROSSWIND_FLOOR) * alignment) / 8.0
    }

    /// Short compass label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::North => "N",
            Self::South => "S",
            Self::West => "W",
            Self::East => "E",
            Self::SouthWest => "SW",
            Self::SouthEast => "SE",
            Self::NorthWest => "NW",
            Self::NorthEast => "NE",
        }
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WindDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownName {
                kind: "wind direction",
                name: s.to_string(),
            })
    }
}
