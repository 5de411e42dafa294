//! Errors for the ADO engine (configuration checks, trial input validation,
//! and numerical guards on the posterior).
//!
//! This module defines the engine error type, [`ADOError`], and a coarse
//! classification, [`ErrorKind`], that mirrors how a host experiment reacts to
//! a failure: a configuration error halts the session, every other kind only
//! means the current trial could not be used adaptively.
//!
//! ## Conventions
//! - Axis names in payloads are `"threshold"`, `"slope"`, or `"design"`.
//! - Every variant is raised synchronously at the point of detection; the
//!   engine never retries internally.
//! - Under the `python-bindings` feature, errors convert to `ValueError`.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::ado::response::Response;

/// Result alias for engine operations that may produce [`ADOError`].
pub type ADOResult<T> = Result<T, ADOError>;

/// Coarse classification of [`ADOError`] variants.
///
/// - `Configuration`: invalid ranges, resolutions, priors or criteria. Fatal
///   to engine construction.
/// - `InvalidDesign`: a design outside the configured design-space bounds.
/// - `InvalidResponse`: a response that is not one of the two categories.
/// - `PosteriorCollapse`: the unnormalized posterior lost all of its mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InvalidDesign,
    InvalidResponse,
    PosteriorCollapse,
}

/// Unified error type for the ADO engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ADOError {
    // ---- Configuration ----
    /// A range bound is NaN/±inf.
    NonFiniteBound { axis: &'static str, value: f64 },

    /// A range is empty or inverted (`lower >= upper`).
    InvalidRange { axis: &'static str, lower: f64, upper: f64 },

    /// A grid axis was configured with zero points.
    InvalidResolution { axis: &'static str, points: usize },

    /// Design-space step must be finite and > 0.
    InvalidStep { step: f64 },

    /// The step yields more candidate designs than [`MAX_DESIGNS`].
    ///
    /// [`MAX_DESIGNS`]: crate::ado::validation::MAX_DESIGNS
    TooManyDesigns { step: f64, count: f64, max: usize },

    /// An explicit design list had no values.
    EmptyDesignSpace,

    /// `|designs| · |thresholds| · |slopes|` exceeds [`MAX_TABLE_CELLS`].
    ///
    /// [`MAX_TABLE_CELLS`]: crate::ado::validation::MAX_TABLE_CELLS
    TableTooLarge { designs: usize, grid_cells: usize, max: usize },

    /// A value is outside what the chosen model or axis admits.
    InvalidAxisValue { axis: &'static str, value: f64, reason: &'static str },

    /// Seed design must lie inside the design space.
    InvalidSeed { seed: f64, lower: f64, upper: f64 },

    /// Model parameters (guess/lapse rates) are out of range.
    InvalidModelParam { name: &'static str, value: f64, reason: &'static str },

    /// Prior could not be built or normalized.
    InvalidPrior { reason: String },

    /// Custom prior does not match the grid shape.
    PriorShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    /// Credible mass must lie strictly between 0 and 1.
    InvalidCredibleMass { value: f64 },

    /// Convergence criterion must be finite and > 0.
    InvalidCriterion { name: &'static str, value: f64 },

    // ---- Trial input ----
    /// Design value lies outside the configured design space.
    InvalidDesign { design: f64, lower: f64, upper: f64 },

    /// Response label/value is not one of the recognized categories.
    InvalidResponse { value: String },

    // ---- Numerical ----
    /// Posterior mass underflowed to zero (or became non-finite) after an update.
    PosteriorCollapse { design: f64, response: Response },
}

impl ADOError {
    /// Map this error onto the engine's error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ADOError::InvalidDesign { .. } => ErrorKind::InvalidDesign,
            ADOError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            ADOError::PosteriorCollapse { .. } => ErrorKind::PosteriorCollapse,
            _ => ErrorKind::Configuration,
        }
    }

    /// `true` when the session cannot continue at all.
    ///
    /// Non-fatal errors mean the host may skip the trial or fall back to a
    /// non-adaptive design strategy.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

impl std::error::Error for ADOError {}

impl std::fmt::Display for ADOError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            ADOError::NonFiniteBound { axis, value } => {
                write!(f, "Bound of the {axis} range must be finite; got: {value}")
            }
            ADOError::InvalidRange { axis, lower, upper } => {
                write!(f, "The {axis} range is empty or inverted: lower ({lower}) >= upper ({upper})")
            }
            ADOError::InvalidResolution { axis, points } => {
                write!(f, "The {axis} axis needs at least one grid point; got: {points}")
            }
            ADOError::InvalidStep { step } => {
                write!(f, "Design-space step must be finite and > 0; got: {step}")
            }
            ADOError::TooManyDesigns { step, count, max } => {
                write!(f, "Design-space step {step} yields {count} designs; at most {max} allowed")
            }
            ADOError::EmptyDesignSpace => write!(f, "Design space needs at least one value"),
            ADOError::TableTooLarge { designs, grid_cells, max } => write!(
                f,
                "Likelihood table of {designs} designs x {grid_cells} grid cells exceeds {max} cells"
            ),
            ADOError::InvalidAxisValue { axis, value, reason } => {
                write!(f, "Invalid {axis} value {value}: {reason}")
            }
            ADOError::InvalidSeed { seed, lower, upper } => {
                write!(f, "Seed design {seed} is outside the design space [{lower}, {upper}]")
            }
            ADOError::InvalidModelParam { name, value, reason } => {
                write!(f, "Invalid psychometric model parameter {name} = {value}: {reason}")
            }
            ADOError::InvalidPrior { reason } => {
                write!(f, "Invalid prior: {reason}")
            }
            ADOError::PriorShapeMismatch { expected, found } => {
                write!(f, "Custom prior shape mismatch: expected {expected:?}, found {found:?}")
            }
            ADOError::InvalidCredibleMass { value } => {
                write!(f, "Credible mass must lie in (0, 1); got: {value}")
            }
            ADOError::InvalidCriterion { name, value } => {
                write!(f, "Convergence criterion {name} must be finite and > 0; got: {value}")
            }
            // ---- Trial input ----
            ADOError::InvalidDesign { design, lower, upper } => {
                write!(f, "Design {design} is outside the design space [{lower}, {upper}]")
            }
            ADOError::InvalidResponse { value } => {
                write!(f, "Unrecognized response '{value}'; expected clear or not_clear")
            }
            // ---- Numerical ----
            ADOError::PosteriorCollapse { design, response } => {
                write!(
                    f,
                    "Posterior collapsed to zero mass after observing {response} at design {design}"
                )
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<ADOError> for PyErr {
    fn from(err: ADOError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
