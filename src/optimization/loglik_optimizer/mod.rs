//! loglik_optimizer — argmin-backed maximum likelihood.
//!
//! Purpose
//! -------
//! Maximize a log-likelihood ℓ(θ) with L-BFGS. Models implement
//! [`LogLikelihood`] and call [`maximize`]; everything argmin-specific stays
//! inside this module.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns ℓ into the cost c(θ) = −ℓ(θ) and
//!   supplies a finite-difference gradient when no analytic one exists.
//! - [`solver`] builds L-BFGS with a More–Thuente or Hager–Zhang line search,
//!   runs it, and normalizes the final state into an [`OptimOutcome`].
//! - [`finite_diff::compute_hessian`] provides validated, symmetric numerical
//!   Hessians for standard errors after a fit.
//!
//! Conventions
//! -----------
//! - User-facing values ([`OptimOutcome::value`], [`LogLikelihood::grad`])
//!   are on the log-likelihood scale; the sign flip lives in the adapter.
//! - θ is unconstrained; constrained model parameters are mapped in and out
//!   by the model.
//! - Failures are [`OptError`](crate::optimization::errors::OptError)
//!   values; nothing here panics on bad input.

pub mod adapter;
pub mod finite_diff;
pub mod solver;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::solver::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, FnEvalMap, Grad, Hessian, Theta, DEFAULT_LBFGS_MEM};

pub mod prelude {
    pub use super::solver::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
