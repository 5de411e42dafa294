//! Contracts and configuration for likelihood maximization.
//!
//! - [`LogLikelihood`]: what a model supplies (ℓ(θ), a domain check, and
//!   optionally ∇ℓ(θ)).
//! - [`Tolerances`] / [`MLEOptions`]: validated stopping rules and solver
//!   choice.
//! - [`OptimOutcome`]: the normalized result of one run, reported on the
//!   log-likelihood scale.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// A log-likelihood ℓ(θ) over some data payload.
///
/// Implementations return recoverable [`OptError`]s for parameters or data
/// outside the model's domain; they never panic on bad input. The optimizer
/// maximizes ℓ, so signs are never flipped on this side of the trait.
pub trait LogLikelihood {
    type Data: 'static;

    /// ℓ(θ) for `data`.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;

    /// Reject a starting point or data set the model cannot evaluate.
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    /// ∇ℓ(θ). The default signals that finite differences should be used.
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search paired with L-BFGS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    /// Case-insensitive; underscores and hyphens are ignored, so
    /// `"more_thuente"` and `"MoreThuente"` are equivalent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String =
            s.chars().filter(|c| *c != '_' && *c != '-').collect::<String>().to_lowercase();
        match key.as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Stopping rules. At least one must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Stop when ‖∇c‖ falls below this value.
    pub tol_grad: Option<f64>,
    /// Stop when successive costs differ by less than this value.
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Validated constructor.
    ///
    /// Errors
    /// ------
    /// - `OptError::NoTolerancesProvided` when every field is `None`.
    /// - `OptError::InvalidTolGrad` / `OptError::InvalidTolCost` for
    ///   non-finite or non-positive tolerances.
    /// - `OptError::InvalidMaxIter` for `Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Tolerances { tol_grad, tol_cost, max_iter })
    }
}

impl Default for Tolerances {
    /// `tol_grad = 1e-6`, no cost rule, 300 iterations.
    fn default() -> Self {
        Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) }
    }
}

/// Solver configuration for [`maximize`](super::maximize).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    /// L-BFGS history length; `None` means
    /// [`DEFAULT_LBFGS_MEM`](super::types::DEFAULT_LBFGS_MEM).
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// Errors with `OptError::InvalidLBFGSMem` for `Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(MLEOptions { tols, line_searcher, lbfgs_mem })
    }
}

/// Result of one maximization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    /// Best parameter found, in the optimizer's unconstrained space.
    pub theta_hat: Theta,
    /// ℓ(θ̂), not the internal cost.
    pub value: f64,
    /// `true` once argmin reports any termination reason.
    pub converged: bool,
    /// Human-readable termination reason.
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    /// ‖∇c(θ̂)‖ when the solver kept a gradient.
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Normalize argmin's final state.
    ///
    /// `value` must already be on the log-likelihood scale.
    ///
    /// Errors
    /// ------
    /// - `OptError::MissingThetaHat` / `OptError::InvalidThetaHat` for an
    ///   absent or non-finite best parameter.
    /// - `OptError::NonFiniteCost` for a non-finite `value`.
    pub fn new(
        theta_hat: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => (true, format!("{reason:?}")),
        };
        Ok(OptimOutcome {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::TerminationReason;
    use ndarray::array;

    #[test]
    fn line_searcher_parses_loosely() {
        assert_eq!("MoreThuente".parse::<LineSearcher>().unwrap(), LineSearcher::MoreThuente);
        assert_eq!("hager_zhang".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
        assert!(matches!(
            "bisection".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    fn tolerances_and_options_validate() {
        assert!(matches!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided)));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        let tols = Tolerances::new(Some(1e-8), None, Some(50)).unwrap();
        assert!(matches!(
            MLEOptions::new(tols, LineSearcher::HagerZhang, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));

        let defaults = MLEOptions::default();
        assert_eq!(defaults.tols.max_iter, Some(300));
        assert_eq!(defaults.line_searcher, LineSearcher::MoreThuente);
    }

    #[test]
    // Purpose
    // -------
    // Any termination reason counts as converged; the gradient norm is the
    // Euclidean norm of the final gradient.
    fn outcome_normalizes_termination_and_gradient() {
        let out = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            -3.5,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            12,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .unwrap();
        assert!(out.converged);
        assert_eq!(out.iterations, 12);
        assert_eq!(out.grad_norm, Some(5.0));

        let pending = OptimOutcome::new(
            Some(array![0.0]),
            0.0,
            TerminationStatus::NotTerminated,
            0,
            FnEvalMap::new(),
            None,
        )
        .unwrap();
        assert!(!pending.converged);
        assert!(pending.grad_norm.is_none());

        assert!(OptimOutcome::new(
            Some(array![0.0]),
            f64::NAN,
            TerminationStatus::NotTerminated,
            0,
            FnEvalMap::new(),
            None
        )
        .is_err());
    }
}
