//! Configuration errors shared by both engines.
//!
//! Every constructor validates eagerly and a rejected `step` leaves its grid
//! untouched, so callers only ever see these at the API boundary.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type SimResult<T> = Result<T, ConfigError>;

/// Rejected configuration or per-step input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A grid extent was zero.
    #[error("invalid grid dimensions {x}x{y}x{z}: every extent must be at least 1")]
    InvalidDimensions { x: u32, y: u32, z: u32 },

    /// The pressure relaxation was asked to run zero sweeps.
    #[error("pressure solve needs at least one Jacobi iteration")]
    ZeroIterations,

    /// A parameter was NaN or infinite.
    #[error("parameter `{name}` must be finite")]
    NonFiniteParameter { name: &'static str },

    /// A parameter was finite but outside its accepted range.
    #[error("parameter `{name}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// Two grids (or a grid and a config) disagree on extent.
    #[error("grid extent mismatch: expected {expected}, got {actual}")]
    GridMismatch { expected: String, actual: String },

    /// A named option (wind direction, preset, ...) was not recognised.
    #[error("unknown {kind} `{name}`")]
    UnknownName { kind: &'static str, name: String },
}

/// Reject NaN/inf values.
pub(crate) fn ensure_finite(name: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteParameter { name })
    }
}

/// Reject non-finite values and values outside `[min, max]`.
pub(crate) fn ensure_range(name: &'static str, value: f32, min: f32, max: f32) -> SimResult<()> {
    ensure_finite(name, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}
