//! analysis — post-hoc analysis of a completed session.
//!
//! Purpose
//! -------
//! Complement the engine's grid posterior with grid-free summaries of the
//! recorded trials: the empirical response proportion at each presented
//! design, and a maximum-likelihood psychometric fit with standard errors.
//!
//! Key behaviors
//! -------------
//! - [`summarize_by_design`] groups a [`TrialHistory`](crate::ado::TrialHistory)
//!   by design value.
//! - [`fit_psychometric`] maximizes the Bernoulli log-likelihood with the
//!   `optimization` stack and reports `(threshold, slope)` with delta-method
//!   standard errors.
//! - [`standard_errors`] turns an observed information matrix into SEs via an
//!   eigen-truncated pseudo-inverse.
//!
//! Invariants & assumptions
//! ------------------------
//! - Nothing here mutates an engine or a history.
//! - Failures are [`AnalysisError`] values; missing standard errors are not
//!   failures.
//!
//! Testing notes
//! -------------
//! - Recovery of known observer parameters is tested with seeded
//!   `SimulatedObserver`s, both here and in the integration tests.

pub mod errors;
pub mod fit;
pub mod information;
pub mod summary;

pub use self::errors::{AnalysisError, AnalysisResult};
pub use self::fit::{fit_psychometric, FitResult, PsychometricLikelihood, MIN_FIT_TRIALS};
pub use self::information::standard_errors;
pub use self::summary::{summarize_by_design, DesignSummary};

pub mod prelude {
    pub use super::{
        AnalysisError, AnalysisResult, DesignSummary, FitResult, fit_psychometric,
        summarize_by_design,
    };
}
