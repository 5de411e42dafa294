//! Errors for display calibration and MTF → blur-σ conversion.
//!
//! Every variant is fatal for stimulus rendering: a table built from
//! meaningless physical inputs must never reach the blur step.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

/// Result alias for calibration and σ-table operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    // ---- Physical parameters ----
    /// Pixel pitch must be finite and > 0 (mm).
    NonPositivePixelSize { value: f64 },

    /// Spatial frequency must be finite and > 0 (line pairs / mm).
    NonPositiveFrequency { value: f64 },

    /// Panel description cannot yield a pixel pitch.
    InvalidPanel { reason: &'static str },

    // ---- Levels ----
    /// MTF percentage outside (0, 100] or non-finite where a level is required.
    InvalidLevel { value: f64 },

    /// No levels were supplied.
    EmptyLevels,

    // ---- Conversion ----
    /// MTF percentage that has no finite σ (≤ 0 or NaN).
    InvalidMtf { value: f64 },

    /// σ must be finite and ≥ 0.
    InvalidSigma { value: f64 },
}

impl std::error::Error for CalibrationError {}

impl std::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationError::NonPositivePixelSize { value } => {
                write!(f, "Pixel size must be finite and > 0 mm; got: {value}")
            }
            CalibrationError::NonPositiveFrequency { value } => {
                write!(f, "Spatial frequency must be finite and > 0 lp/mm; got: {value}")
            }
            CalibrationError::InvalidPanel { reason } => write!(f, "Invalid panel description: {reason}"),
            CalibrationError::InvalidLevel { value } => {
                write!(f, "MTF level must be finite and in (0, 100]; got: {value}")
            }
            CalibrationError::EmptyLevels => write!(f, "At least one MTF level is required"),
            CalibrationError::InvalidMtf { value } => {
                write!(f, "MTF percentage must be finite and > 0; got: {value}")
            }
            CalibrationError::InvalidSigma { value } => {
                write!(f, "Blur sigma must be finite and >= 0; got: {value}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<CalibrationError> for PyErr {
    fn from(err: CalibrationError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
