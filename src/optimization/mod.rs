//! optimization — likelihood maximization and its error surface.
//!
//! Purpose
//! -------
//! Offline fitting of a psychometric function to a finished session needs a
//! general maximum-likelihood routine. This module provides it
//! ([`loglik_optimizer`]) together with the single error type every
//! optimizer path reports ([`errors::OptError`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimization happens in an unconstrained θ space; models map positive
//!   parameters through logarithms before handing them over.
//! - Invalid configurations and numerical failures are `OptError` values,
//!   never panics.
//!
//! Downstream usage
//! ----------------
//! - `analysis::fit` implements `LogLikelihood` for trial histories and calls
//!   `maximize`, then `finite_diff::compute_hessian` for standard errors.

pub mod errors;
pub mod loglik_optimizer;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
}
