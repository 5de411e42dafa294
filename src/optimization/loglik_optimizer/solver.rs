//! L-BFGS construction and execution.
//!
//! [`maximize`] is the public entry point: it checks the starting point,
//! builds an L-BFGS solver with the requested line search, runs it through
//! argmin's `Executor`, and normalizes the final state into an
//! [`OptimOutcome`]. Progress is reported through `tracing` at `debug!`.
use argmin::{
    core::{CostFunction, Executor, Gradient, IterState, Solver, State},
    solver::quasinewton::LBFGS,
};
use argmin_math::ArgminL2Norm;
use tracing::debug;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        adapter::ArgMinAdapter,
        traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome},
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// Maximize `f` over θ starting from `theta0`.
///
/// Parameters
/// ----------
/// - `f`: the log-likelihood.
/// - `theta0`: starting point in the unconstrained parameter space.
/// - `data`: payload passed to every evaluation of `f`.
/// - `opts`: stopping rules, line search and L-BFGS memory.
///
/// Returns
/// -------
/// [`OptimOutcome`] with θ̂ and ℓ(θ̂).
///
/// Errors
/// ------
/// - Whatever [`LogLikelihood::check`] reports for `theta0`.
/// - Solver configuration errors (invalid tolerances for argmin).
/// - Errors raised while evaluating ℓ or ∇ℓ inside the solver, recovered
///   into their original [`OptError`](crate::optimization::errors::OptError)
///   variant where possible.
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_lbfgs_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_lbfgs_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

pub fn build_lbfgs_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    apply_tolerances(LBFGS::new(MoreThuenteLS::new(), mem), opts)
}

pub fn build_lbfgs_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    apply_tolerances(LBFGS::new(HagerZhangLS::new(), mem), opts)
}

/// Copy the gradient and cost tolerances onto an L-BFGS solver; the
/// iteration cap is applied on the executor instead.
pub fn apply_tolerances<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    if tracing::enabled!(tracing::Level::DEBUG) {
        let ll0 = -problem.cost(&theta0)?;
        let grad_norm0 = problem.gradient(&theta0).ok().map(|g| g.l2_norm());
        debug!(ll0, ?grad_norm0, dim = theta0.len(), "starting L-BFGS");
    }

    let max_iter = opts.tols.max_iter;
    let result = Executor::new(problem, solver)
        .configure(|state| {
            let state = state.param(theta0);
            match max_iter {
                Some(n) => state.max_iters(n as u64),
                None => state,
            }
        })
        .run()?;

    let mut state = result.state().clone();
    let iterations = state.get_iter();
    let fn_evals = state.get_func_counts().clone();
    let termination = state.get_termination_status().clone();
    let grad = state.take_gradient();
    let outcome = OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        termination,
        iterations,
        fn_evals,
        grad,
    )?;
    debug!(
        ll = outcome.value,
        iterations = outcome.iterations,
        status = %outcome.status,
        "L-BFGS finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        loglik_optimizer::traits::Tolerances,
    };
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // ℓ(θ) = −Σ wᵢ(θᵢ − mᵢ)², data = (m, w).
    struct WeightedQuadratic;

    impl LogLikelihood for WeightedQuadratic {
        type Data = (Theta, Theta);

        fn value(&self, theta: &Theta, (m, w): &(Theta, Theta)) -> OptResult<f64> {
            let d = theta - m;
            Ok(-(&d * &d * w).sum())
        }

        fn check(&self, theta: &Theta, (m, _): &(Theta, Theta)) -> OptResult<()> {
            if theta.len() != m.len() {
                return Err(OptError::ThetaLengthMismatch { expected: m.len(), found: theta.len() });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, (m, w): &(Theta, Theta)) -> OptResult<Grad> {
            Ok(-2.0 * w * &(theta - m))
        }
    }

    #[test]
    fn builders_accept_valid_options() {
        let tols = Tolerances::new(Some(1e-6), Some(1e-10), Some(50)).unwrap();
        for mem in [None, Some(3)] {
            let opts = MLEOptions::new(tols, LineSearcher::HagerZhang, mem).unwrap();
            assert!(build_lbfgs_hager_zhang(&opts).is_ok());
            assert!(build_lbfgs_more_thuente(&opts).is_ok());
        }
        let only_iters = Tolerances::new(None, None, Some(10)).unwrap();
        let opts = MLEOptions::new(only_iters, LineSearcher::MoreThuente, None).unwrap();
        assert!(apply_tolerances(LBFGS::new(MoreThuenteLS::new(), 5), &opts).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Both line searches find the maximizer of a separable quadratic and
    // report ℓ on the likelihood scale.
    fn maximize_recovers_quadratic_optimum() {
        let data = (array![3.0, -1.0], array![1.0, 4.0]);
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            let opts = MLEOptions::new(Tolerances::default(), ls, None).unwrap();
            let out = maximize(&WeightedQuadratic, array![0.0, 0.0], &data, &opts).unwrap();
            assert!(out.converged, "{ls:?}: {}", out.status);
            assert_abs_diff_eq!(out.theta_hat[0], 3.0, epsilon = 1e-4);
            assert_abs_diff_eq!(out.theta_hat[1], -1.0, epsilon = 1e-4);
            assert!(out.value <= 0.0 && out.value > -1e-6);
        }
    }

    #[test]
    fn maximize_rejects_bad_start_before_running() {
        let data = (array![0.0, 0.0], array![1.0, 1.0]);
        let err = maximize(&WeightedQuadratic, array![0.0], &data, &MLEOptions::default())
            .unwrap_err();
        assert!(matches!(err, OptError::ThetaLengthMismatch { expected: 2, found: 1 }));
    }
}
