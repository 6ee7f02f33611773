//! Fluid solver parameters.
//!
//! Defaults describe a small campfire: a 4% radius emitter near the floor
//! of a 128³ box, mild smoke from extinguishing flame, weak noisy wind.

use crate::core_types::Vec3;
use crate::error::{ensure_finite, ensure_range, ConfigError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scalar advection scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvectionScheme {
    /// Single back-trace and trilinear sample.
    #[default]
    SemiLagrangian,
    /// Back and Forth Error Compensation and Correction.
    Bfecc,
    /// MacCormack predictor/corrector with a min/max limiter.
    MacCormack,
}

impl AdvectionScheme {
    pub const ALL: [Self; 3] = [Self::SemiLagrangian, Self::Bfecc, Self::MacCormack];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SemiLagrangian => "semi-lagrangian",
            Self::Bfecc => "bfecc",
            Self::MacCormack => "maccormack",
        }
    }
}

impl fmt::Display for AdvectionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AdvectionScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownName {
                kind: "advection scheme",
                name: s.to_string(),
            })
    }
}

/// Gaussian heat and fuel source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    /// Centre in normalized `[0, 1]³` grid coordinates.
    pub position: Vec3,
    /// Radius in normalized units.
    pub radius: f32,
    /// Reaction injected per unit time at the centre.
    pub reaction_amount: f32,
    /// Temperature injected per unit time at the centre.
    pub temperature_amount: f32,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.5, 0.1, 0.5),
            radius: 0.04,
            reaction_amount: 1.0,
            temperature_amount: 10.0,
        }
    }
}

/// Noise-driven ambient wind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindNoise {
    /// Lattice-to-noise scale.
    pub frequency: f32,
    /// Magnitude added to velocity each step.
    pub speed: f32,
    /// Permutation seed.
    pub seed: u64,
}

impl Default for WindNoise {
    fn default() -> Self {
        Self {
            frequency: 0.1,
            speed: 0.2,
            seed: 0,
        }
    }
}

/// Local velocity impulse, e.g. driven by user input.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindGust {
    /// Centre in lattice units.
    pub position: Vec3,
    /// Gaussian radius in cells.
    pub radius: f32,
    /// Velocity added per unit time at the centre.
    pub strength: Vec3,
}

/// Every tunable of [`crate::fluid::FluidSolver`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluidConfig {
    pub velocity_dissipation: f32,
    pub density_dissipation: f32,
    pub temperature_dissipation: f32,
    /// Subtracted after dissipation, floored at zero.
    pub temperature_decay: f32,
    pub reaction_dissipation: f32,
    /// Subtracted after dissipation, floored at zero.
    pub reaction_decay: f32,

    pub density_scheme: AdvectionScheme,
    pub reaction_scheme: AdvectionScheme,

    /// Smoke produced per unit of dying reaction.
    pub density_amount: f32,
    /// Reaction level below which flame turns into smoke.
    pub extinguishment: f32,

    pub buoyancy: f32,
    /// Downward pull per unit density.
    pub weight: f32,
    pub ambient_temperature: f32,
    /// Direction buoyancy pushes hot gas.
    pub up: Vec3,

    pub vorticity_strength: f32,

    pub jacobi_iterations: u32,
    /// Start each pressure solve from the previous step's pressure.
    pub warm_start_pressure: bool,

    pub emitter: Option<Emitter>,
    pub wind: Option<WindNoise>,
    pub gust: Option<WindGust>,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            velocity_dissipation: 0.995,
            density_dissipation: 0.999,
            temperature_dissipation: 0.995,
            temperature_decay: 0.0,
            reaction_dissipation: 1.0,
            reaction_decay: 0.001,
            density_scheme: AdvectionScheme::SemiLagrangian,
            reaction_scheme: AdvectionScheme::SemiLagrangian,
            density_amount: 1.0,
            extinguishment: 0.01,
            buoyancy: 1.0,
            weight: 0.0125,
            ambient_temperature: 0.0,
            up: Vec3::y(),
            vorticity_strength: 1.0,
            jacobi_iterations: 10,
            warm_start_pressure: true,
            emitter: Some(Emitter::default()),
            wind: Some(WindNoise::default()),
            gust: None,
        }
    }
}

impl FluidConfig {
    /// Buoyancy-only setup: no emitter, wind, gust or confinement.
    #[must_use]
    pub fn quiescent() -> Self {
        Self {
            emitter: None,
            wind: None,
            gust: None,
            vorticity_strength: 0.0,
            ..Self::default()
        }
    }

    /// Copy with `up` scaled to unit length. Call after [`FluidConfig::validate`].
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            up: self.up.normalize(),
            ..self
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroIterations`] for a zero-sweep pressure solve,
    /// [`ConfigError::NonFiniteParameter`] for NaN/inf values, and
    /// [`ConfigError::OutOfRange`] for dissipations outside `(0, 1]`,
    /// negative decays, radii too small to square, or a degenerate `up`.
    pub fn validate(&self) -> SimResult<()> {
        if self.jacobi_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }

        for (name, value) in [
            ("velocity_dissipation", self.velocity_dissipation),
            ("density_dissipation", self.density_dissipation),
            ("temperature_dissipation", self.temperature_dissipation),
            ("reaction_dissipation", self.reaction_dissipation),
        ] {
            ensure_range(name, value, f32::MIN_POSITIVE, 1.0)?;
        }

        ensure_range("temperature_decay", self.temperature_decay, 0.0, f32::MAX)?;
        ensure_range("reaction_decay", self.reaction_decay, 0.0, f32::MAX)?;
        ensure_range("extinguishment", self.extinguishment, 0.0, 1.0)?;

        for (name, value) in [
            ("density_amount", self.density_amount),
            ("buoyancy", self.buoyancy),
            ("weight", self.weight),
            ("ambient_temperature", self.ambient_temperature),
            ("vorticity_strength", self.vorticity_strength),
        ] {
            ensure_finite(name, value)?;
        }

        ensure_vec("up", self.up)?;
        let up_squared = self.up.norm_squared();
        if !up_squared.is_normal() {
            return Err(ConfigError::OutOfRange {
                name: "up",
                value: up_squared.sqrt(),
                min: f32::MIN_POSITIVE,
                max: f32::MAX,
            });
        }

        if let Some(emitter) = &self.emitter {
            ensure_vec("emitter.position", emitter.position)?;
            ensure_radius("emitter.radius", emitter.radius)?;
            ensure_finite("emitter.reaction_amount", emitter.reaction_amount)?;
            ensure_finite("emitter.temperature_amount", emitter.temperature_amount)?;
        }

        if let Some(wind) = &self.wind {
            ensure_finite("wind.frequency", wind.frequency)?;
            ensure_finite("wind.speed", wind.speed)?;
        }

        if let Some(gust) = &self.gust {
            ensure_vec("gust.position", gust.position)?;
            ensure_vec("gust.strength", gust.strength)?;
            ensure_radius("gust.radius", gust.radius)?;
        }

        Ok(())
    }
}

/// Falloffs divide by `r²`, which must stay a normal float.
fn ensure_radius(name: &'static str, radius: f32) -> SimResult<()> {
    ensure_range(name, radius, f32::MIN_POSITIVE, f32::MAX)?;
    if (radius * radius).is_normal() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value: radius,
            min: f32::MIN_POSITIVE.sqrt(),
            max: f32::MAX.sqrt(),
        })
    }
}

fn ensure_vec(name: &'static str, v: Vec3) -> SimResult<()> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteParameter { name })
    }
}
