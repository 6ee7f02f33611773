//! 2D terrain lattice for the automaton, row-major (`y * width + x`).

use super::cell::{BurnState, Material, TreeStage, WildfireCell};
use super::wind::NEIGHBOR_OFFSETS;
use crate::core_types::noise::{NoiseGenerator, NoiseOctave};
use crate::error::{ConfigError, SimResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Burning flags of the eight neighbours of `(x, y)`, in
/// [`NEIGHBOR_OFFSETS`] order. Off-grid neighbours never burn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
    pub x: u32,
    pub y: u32,
    pub burning: [bool; 8],
}

impl Neighborhood {
    #[must_use]
    pub fn any_burning(&self) -> bool {
        self.burning.iter().any(|&b| b)
    }

    /// Offsets of the burning neighbours.
    pub fn burning_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .zip(self.burning)
            .filter_map(|(&o, burning)| burning.then_some(o))
    }
}

/// Population of each burn state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub not_on_fire: usize,
    pub on_fire: usize,
    pub destroyed: usize,
}

/// Height-map driven terrain generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    pub seed: u64,
    /// Fractal layers for the height map, in cell units.
    pub octaves: Vec<NoiseOctave>,
    /// Heights below this become water.
    pub water_level: f32,
    /// Heights above this become bedrock.
    pub rock_level: f32,
    /// Share of the remaining land planted with mature trees.
    pub tree_fraction: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: vec![
                NoiseOctave::new(0.03, 0.5),
                NoiseOctave::new(0.07, 0.25),
                NoiseOctave::new(0.15, 0.125),
            ],
            water_level: -0.3,
            rock_level: 0.4,
            tree_fraction: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WildfireGrid {
    width: u32,
    height: u32,
    pub(crate) cells: Vec<WildfireCell>,
}

impl WildfireGrid {
    /// Grid with every cell set to `fill`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDimensions`] if either extent is zero.
    pub fn new(width: u32, height: u32, fill: WildfireCell) -> SimResult<Self> {
        check_extent(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDimensions`] for a zero extent and
    /// [`ConfigError::GridMismatch`] if `cells` has the wrong length.
    pub fn from_cells(width: u32, height: u32, cells: Vec<WildfireCell>) -> SimResult<Self> {
        check_extent(width, height)?;
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(ConfigError::GridMismatch {
                expected: format!("{expected} cells ({width}x{height})"),
                actual: format!("{} cells", cells.len()),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Flat terrain with a random grass/mature-tree mix.
    ///
    /// # Errors
    ///
    /// Same as [`WildfireGrid::new`], plus [`ConfigError::OutOfRange`] for a
    /// `tree_fraction` outside `[0, 1]`.
    pub fn random_vegetation(
        width: u32,
        height: u32,
        tree_fraction: f32,
        seed: u64,
    ) -> SimResult<Self> {
        Self::generate(
            width,
            height,
            &TerrainConfig {
                seed,
                octaves: Vec::new(),
                water_level: f32::NEG_INFINITY,
                rock_level: f32::INFINITY,
                tree_fraction,
            },
        )
    }

    /// Terrain from a noise height map.
    ///
    /// # Errors
    ///
    /// Same as [`WildfireGrid::random_vegetation`].
    pub fn generate(width: u32, height: u32, terrain: &TerrainConfig) -> SimResult<Self> {
        check_extent(width, height)?;
        crate::error::ensure_range("terrain.tree_fraction", terrain.tree_fraction, 0.0, 1.0)?;

        let heights = NoiseGenerator::new(terrain.seed).field(width, height, &terrain.octaves);
        let mut rng = StdRng::seed_from_u64(terrain.seed);
        let cells = heights
            .into_iter()
            .map(|h| {
                let material = if h < terrain.water_level {
                    Material::Water
                } else if h > terrain.rock_level {
                    Material::Bedrock
                } else if rng.random::<f32>() < terrain.tree_fraction {
                    Material::Tree(TreeStage::Mature)
                } else {
                    Material::Grass
                };
                WildfireCell::new(material).with_height(h)
            })
            .collect();

        Self::from_cells(width, height, cells)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn cells(&self) -> &[WildfireCell] {
        &self.cells
    }

    #[inline]
    #[must_use]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&WildfireCell> {
        if x < self.width && y < self.height {
            self.cells.get(self.index(x, y))
        } else {
            None
        }
    }

    /// Overwrite a cell. Returns `false` outside the grid.
    pub fn set(&mut self, x: u32, y: u32, cell: WildfireCell) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let i = self.index(x, y);
        self.cells[i] = cell;
        true
    }

    /// Force a cell alight regardless of material. Returns `false` outside
    /// the grid.
    pub fn ignite(&mut self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let i = self.index(x, y);
        self.cells[i].state = BurnState::OnFire;
        true
    }

    fn state_at(&self, x: i64, y: i64) -> Option<BurnState> {
        self.contains(x, y)
            .then(|| self.cells[self.index(x as u32, y as u32)].state)
    }

    /// Burning flags around `(x, y)` in the current snapshot.
    #[must_use]
    pub fn neighborhood(&self, x: u32, y: u32) -> Neighborhood {
        let mut burning = [false; 8];
        for (flag, (dx, dy)) in burning.iter_mut().zip(NEIGHBOR_OFFSETS) {
            *flag = self.state_at(i64::from(x) + i64::from(dx), i64::from(y) + i64::from(dy))
                == Some(BurnState::OnFire);
        }
        Neighborhood { x, y, burning }
    }

    #[must_use]
    pub fn count_by_state(&self, state: BurnState) -> usize {
        self.cells.iter().filter(|c| c.state == state).count()
    }

    #[must_use]
    pub fn state_counts(&self) -> StateCounts {
        self.cells
            .iter()
            .fold(StateCounts::default(), |mut counts, cell| {
                match cell.state {
                    BurnState::NotOnFire => counts.not_on_fire += 1,
                    BurnState::OnFire => counts.on_fire += 1,
                    BurnState::Destroyed => counts.destroyed += 1,
                }
                counts
            })
    }

    /// Cells in `state` within the `(2r + 1)²` square around `(x, y)`,
    /// clipped to the grid, the centre included.
    #[must_use]
    pub fn neighbors_with_state(
        &self,
        x: u32,
        y: u32,
        state: BurnState,
        radius: u32,
    ) -> Vec<(u32, u32)> {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = x.saturating_add(radius).min(self.width - 1);
        let y1 = y.saturating_add(radius).min(self.height - 1);
        (y0..=y1)
            .flat_map(|ny| (x0..=x1).map(move |nx| (nx, ny)))
            .filter(|&(nx, ny)| self.cells[self.index(nx, ny)].state == state)
            .collect()
    }

    /// One line per row using [`WildfireCell::glyph`].
    #[must_use]
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for row in self.cells.chunks(self.width as usize) {
            out.extend(row.iter().map(WildfireCell::glyph));
            out.push('\n');
        }
        out
    }
}

fn check_extent(width: u32, height: u32) -> SimResult<()> {
    if width == 0 || height == 0 {
        return Err(ConfigError::InvalidDimensions {
            x: width,
            y: height,
            z: 1,
        });
    }
    Ok(())
}
