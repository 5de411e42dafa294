//! Error surface for the likelihood optimizer.
//!
//! Purpose
//! -------
//! Collect every failure the L-BFGS layer can produce (bad configuration,
//! non-finite objective or derivatives, malformed solver output, and errors
//! raised inside argmin) into one enum, [`OptError`], with the alias
//! [`OptResult`].
//!
//! Conventions
//! -----------
//! - Likelihood implementations report their own domain violations through
//!   the `Likelihood` section (`ThetaLengthMismatch`, `InvalidThetaInput`,
//!   `EmptyData`, `InvalidObservation`).
//! - Errors that cross the argmin boundary are boxed as `argmin::core::Error`
//!   and recovered by `From<argmin::core::Error>`, which first looks for an
//!   `OptError` inside the box and only then for an `ArgminError`.
use argmin::core::{ArgminError, Error};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

/// Result alias used by every fallible optimizer routine.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// The likelihood has no analytic gradient; finite differences take over.
    GradientNotImplemented,

    GradientDimMismatch { expected: usize, found: usize },

    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- Options ----
    InvalidTolGrad { tol: f64, reason: &'static str },

    InvalidTolCost { tol: f64, reason: &'static str },

    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// Every stopping rule was left unset.
    NoTolerancesProvided,

    InvalidLineSearch { name: String, reason: &'static str },

    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Likelihood ----
    NonFiniteCost { value: f64 },

    ThetaLengthMismatch { expected: usize, found: usize },

    InvalidThetaInput { index: usize, value: f64 },

    /// The likelihood was handed no observations.
    EmptyData,

    /// An observation lies outside the likelihood's domain.
    InvalidObservation { index: usize, value: f64, reason: &'static str },

    // ---- Outcome ----
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    MissingThetaHat,

    // ---- Argmin ----
    InvalidParameter { text: String },
    NotImplemented { text: String },
    NotInitialized { text: String },
    ConditionViolated { text: String },
    PotentialBug { text: String },
    BackendError { text: String },

    // ---- Finite differences ----
    HessianDimMismatch { expected: usize, found: (usize, usize) },

    InvalidHessian { row: usize, col: usize, value: f64 },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => write!(f, "Analytic gradient not implemented"),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }
            // ---- Options ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one of tol_grad, tol_cost or max_iter must be set")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            // ---- Likelihood ----
            OptError::NonFiniteCost { value } => write!(f, "Non-finite log-likelihood: {value}"),
            OptError::ThetaLengthMismatch { expected, found } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid parameter at index {index}: {value}, must be finite")
            }
            OptError::EmptyData => write!(f, "Log-likelihood requires at least one observation"),
            OptError::InvalidObservation { index, value, reason } => {
                write!(f, "Invalid observation at index {index}: {value}: {reason}")
            }
            // ---- Outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimate at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => write!(f, "Solver finished without a best parameter"),
            // ---- Argmin ----
            OptError::InvalidParameter { text } => write!(f, "Invalid parameter: {text}"),
            OptError::NotImplemented { text } => write!(f, "Not implemented: {text}"),
            OptError::NotInitialized { text } => write!(f, "Not initialized: {text}"),
            OptError::ConditionViolated { text } => write!(f, "Condition violated: {text}"),
            OptError::PotentialBug { text } => write!(f, "Potential bug: {text}"),
            OptError::BackendError { text } => write!(f, "Backend error: {text}"),
            // ---- Finite differences ----
            OptError::HessianDimMismatch { expected, found } => write!(
                f,
                "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
            ),
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian entry at ({row}, {col}): {value}, must be finite")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(other) => other,
        };
        match err.downcast::<ArgminError>() {
            Ok(ArgminError::InvalidParameter { text }) => OptError::InvalidParameter { text },
            Ok(ArgminError::NotImplemented { text }) => OptError::NotImplemented { text },
            Ok(ArgminError::NotInitialized { text }) => OptError::NotInitialized { text },
            Ok(ArgminError::ConditionViolated { text }) => OptError::ConditionViolated { text },
            Ok(ArgminError::PotentialBug { text }) => OptError::PotentialBug { text },
            Ok(other) => OptError::BackendError { text: other.to_string() },
            Err(other) => OptError::BackendError { text: other.to_string() },
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // An OptError boxed into argmin's error type comes back unchanged.
    fn boxed_opt_error_round_trips_through_argmin() {
        let boxed: Error = OptError::NonFiniteCost { value: f64::INFINITY }.into();
        assert_eq!(OptError::from(boxed), OptError::NonFiniteCost { value: f64::INFINITY });
    }

    #[test]
    fn argmin_errors_map_to_named_variants() {
        let boxed: Error = ArgminError::ConditionViolated { text: "wolfe".to_string() }.into();
        assert_eq!(OptError::from(boxed), OptError::ConditionViolated { text: "wolfe".to_string() });

        let boxed: Error = ArgminError::CheckpointNotFound { text: "ckpt".to_string() }.into();
        assert!(matches!(OptError::from(boxed), OptError::BackendError { .. }));
    }
}
