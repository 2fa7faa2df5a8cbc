//! Error types for the simulator's outer surfaces.
//!
//! The integrator itself is infallible; these cover parameter checks offered
//! to callers and config persistence.

use std::path::PathBuf;

use thiserror::Error;

/// A device parameter set outside the physically sensible domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// Thresholds must satisfy v_on < 0 < v_off
    #[error("thresholds must satisfy v_on < 0 < v_off (got v_on={v_on}, v_off={v_off})")]
    Thresholds { v_on: f64, v_off: f64 },

    /// Drift coefficients must satisfy k_on < 0 < k_off
    #[error("drift coefficients must satisfy k_on < 0 < k_off (got k_on={k_on}, k_off={k_off})")]
    DriftSigns { k_on: f64, k_off: f64 },

    /// Resistances must satisfy 0 < r_on < r_off
    #[error("resistances must satisfy 0 < r_on < r_off (got r_on={r_on}, r_off={r_off})")]
    Resistances { r_on: f64, r_off: f64 },

    #[error("initial state {0} is outside [0, 1]")]
    InitialState(f64),

    #[error("compliance current must be positive (got {0})")]
    Compliance(f64),
}

/// Errors from saving or loading a config document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
