//! Errors for post-hoc analysis of a trial history.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::{ado::errors::ADOError, optimization::errors::OptError};

/// Result alias for the analysis module.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    // ---- Input ----
    /// Too few trials for the requested analysis.
    InsufficientData { found: usize, required: usize },

    /// The psychometric model or the recorded designs are invalid for it.
    InvalidModel(ADOError),

    // ---- Fitting ----
    /// The optimizer failed.
    Optimization(OptError),

    /// Observed information has no positive eigenvalue; standard errors are
    /// undefined.
    DegenerateInformation,
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::InvalidModel(e) => Some(e),
            AnalysisError::Optimization(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::InsufficientData { found, required } => {
                write!(f, "Analysis needs at least {required} trials; found {found}")
            }
            AnalysisError::InvalidModel(e) => write!(f, "Invalid model for analysis: {e}"),
            AnalysisError::Optimization(e) => write!(f, "Psychometric fit failed: {e}"),
            AnalysisError::DegenerateInformation => {
                write!(f, "Observed information is degenerate; standard errors are undefined")
            }
        }
    }
}

impl From<OptError> for AnalysisError {
    fn from(err: OptError) -> Self {
        AnalysisError::Optimization(err)
    }
}

impl From<ADOError> for AnalysisError {
    fn from(err: ADOError) -> Self {
        AnalysisError::InvalidModel(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<AnalysisError> for PyErr {
    fn from(err: AnalysisError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
