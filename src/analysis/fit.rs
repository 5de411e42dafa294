//! analysis::fit — maximum-likelihood psychometric fit of a finished session.
//!
//! Purpose
//! -------
//! Provide a point estimate of `(threshold, slope)` that does not depend on
//! the grid or the prior, for reporting next to the Bayesian posterior
//! summary and for re-analysing persisted sessions.
//!
//! Key behaviors
//! -------------
//! - [`PsychometricLikelihood`] implements [`LogLikelihood`] over
//!   `(design, clear)` observations. It reports the **average** Bernoulli
//!   log-likelihood so optimizer tolerances do not scale with session length.
//! - Parameters are optimized unconstrained:
//!   - logistic: θ = (α, ln β), with an analytic gradient;
//!   - Weibull: θ = (ln α, ln β), with finite-difference gradients.
//! - [`fit_psychometric`] runs L-BFGS, then builds the observed information
//!   `J = −n · H(θ̂)` from a finite-difference Hessian of the average score and
//!   maps its standard errors back with the delta method.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least [`MIN_FIT_TRIALS`] observations are required.
//! - Weibull fits need strictly positive designs.
//! - Perfectly separable data has no finite maximizer. The optimizer then
//!   stops at its iteration cap or gradient tolerance with a large slope, and
//!   the standard errors are usually reported as `None`.
//!
//! Conventions
//! -----------
//! - Log-probabilities use `ln σ(z) = −softplus(−z)` for the logistic model,
//!   which is finite for every finite `z`.
//! - `FitResult` values are on the natural `(α, β)` scale; the raw optimizer
//!   outcome (unconstrained θ̂) is kept in `FitResult::outcome`.
use finitediff::FiniteDiff;
use ndarray::{array, Array1};
use tracing::{info, warn};

use crate::{
    ado::{history::TrialHistory, psychometric::PsychometricModel},
    analysis::{
        errors::{AnalysisError, AnalysisResult},
        information::standard_errors,
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            finite_diff::compute_hessian, maximize, Grad, Hessian, LogLikelihood, MLEOptions,
            OptimOutcome, Theta,
        },
    },
};

/// Fewest trials accepted by [`fit_psychometric`].
pub const MIN_FIT_TRIALS: usize = 2;

/// `(design, clear)` pairs in trial order.
pub type Observations = Vec<(f64, bool)>;

/// Bernoulli log-likelihood of a psychometric model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsychometricLikelihood {
    model: PsychometricModel,
}

impl PsychometricLikelihood {
    pub fn new(model: PsychometricModel) -> Self {
        PsychometricLikelihood { model }
    }

    pub fn model(&self) -> PsychometricModel {
        self.model
    }

    /// Map unconstrained θ to `(threshold, slope)`.
    pub fn to_natural(&self, theta: &Theta) -> (f64, f64) {
        match self.model {
            PsychometricModel::Logistic => (theta[0], theta[1].exp()),
            PsychometricModel::Weibull { .. } => (theta[0].exp(), theta[1].exp()),
        }
    }

    /// Map `(threshold, slope)` to unconstrained θ.
    pub fn to_unconstrained(&self, threshold: f64, slope: f64) -> Theta {
        match self.model {
            PsychometricModel::Logistic => array![threshold, slope.ln()],
            PsychometricModel::Weibull { .. } => array![threshold.ln(), slope.ln()],
        }
    }

    /// Starting point: threshold at the mean design; slope from the spread
    /// of the designs (logistic) or a moderate Weibull shape.
    pub fn initial_guess(&self, data: &Observations) -> Theta {
        let n = data.len().max(1) as f64;
        let mean = data.iter().map(|(d, _)| d).sum::<f64>() / n;
        let spread = (data.iter().map(|(d, _)| (d - mean).powi(2)).sum::<f64>() / n).sqrt();
        let slope = match self.model {
            PsychometricModel::Logistic if spread > 0.0 => 1.0 / spread,
            PsychometricModel::Logistic => 1.0,
            PsychometricModel::Weibull { .. } => 2.0,
        };
        self.to_unconstrained(mean, slope)
    }

    fn log_prob(&self, design: f64, clear: bool, threshold: f64, slope: f64) -> f64 {
        match self.model {
            PsychometricModel::Logistic => {
                let z = slope * (design - threshold);
                if clear { -softplus(-z) } else { -softplus(z) }
            }
            PsychometricModel::Weibull { .. } => {
                let (p_clear, p_not) = self.model.p_pair(design, threshold, slope);
                let p = if clear { p_clear } else { p_not };
                p.max(f64::MIN_POSITIVE).ln()
            }
        }
    }

    fn check_theta(theta: &Theta) -> OptResult<()> {
        if theta.len() != 2 {
            return Err(OptError::ThetaLengthMismatch { expected: 2, found: theta.len() });
        }
        match theta.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(OptError::InvalidThetaInput { index, value: theta[index] }),
            None => Ok(()),
        }
    }

    /// Gradient of the average log-likelihood; analytic when available,
    /// central differences otherwise. Failures show up as NaN entries, which
    /// the Hessian validation then rejects.
    fn score(&self, theta: &Theta, data: &Observations) -> Grad {
        match self.grad(theta, data) {
            Ok(g) => g,
            Err(OptError::GradientNotImplemented) => {
                theta.central_diff(&|t: &Theta| self.value(t, data).unwrap_or(f64::NAN))
            }
            Err(_) => Array1::from_elem(theta.len(), f64::NAN),
        }
    }

    /// Observed information `J = −n · H(θ)` of the total log-likelihood.
    pub fn observed_information(&self, theta: &Theta, data: &Observations) -> OptResult<Hessian> {
        let hess = compute_hessian(&|t: &Theta| self.score(t, data), theta)?;
        Ok(hess * -(data.len() as f64))
    }
}

impl LogLikelihood for PsychometricLikelihood {
    type Data = Observations;

    fn value(&self, theta: &Theta, data: &Observations) -> OptResult<f64> {
        Self::check_theta(theta)?;
        if data.is_empty() {
            return Err(OptError::EmptyData);
        }
        let (threshold, slope) = self.to_natural(theta);
        let total: f64 = data.iter().map(|&(d, y)| self.log_prob(d, y, threshold, slope)).sum();
        Ok(total / data.len() as f64)
    }

    fn check(&self, theta: &Theta, data: &Observations) -> OptResult<()> {
        Self::check_theta(theta)?;
        if data.is_empty() {
            return Err(OptError::EmptyData);
        }
        let positive = matches!(self.model, PsychometricModel::Weibull { .. });
        for (index, &(design, _)) in data.iter().enumerate() {
            if !design.is_finite() {
                return Err(OptError::InvalidObservation {
                    index,
                    value: design,
                    reason: "design must be finite",
                });
            }
            if positive && design <= 0.0 {
                return Err(OptError::InvalidObservation {
                    index,
                    value: design,
                    reason: "the Weibull model requires positive designs",
                });
            }
        }
        Ok(())
    }

    /// Logistic only: with `z = β (d − α)`,
    /// `∂ℓ/∂α = −β (y − σ(z))` and `∂ℓ/∂ln β = z (y − σ(z))`.
    fn grad(&self, theta: &Theta, data: &Observations) -> OptResult<Grad> {
        if !matches!(self.model, PsychometricModel::Logistic) {
            return Err(OptError::GradientNotImplemented);
        }
        Self::check_theta(theta)?;
        if data.is_empty() {
            return Err(OptError::EmptyData);
        }
        let (threshold, slope) = self.to_natural(theta);
        let mut g = Array1::<f64>::zeros(2);
        for &(design, clear) in data {
            let z = slope * (design - threshold);
            let y = if clear { 1.0 } else { 0.0 };
            let residual = y - self.model.p_clear(design, threshold, slope);
            g[0] -= slope * residual;
            g[1] += z * residual;
        }
        Ok(g / data.len() as f64)
    }
}

/// Numerically stable `ln(1 + e^x)`.
fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

/// Maximum-likelihood psychometric fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub model: PsychometricModel,
    pub threshold: f64,
    pub slope: f64,
    /// `None` when the observed information is degenerate.
    pub threshold_se: Option<f64>,
    pub slope_se: Option<f64>,
    /// Total (not average) log-likelihood at the estimate.
    pub log_likelihood: f64,
    pub n_trials: usize,
    /// Raw optimizer result on the unconstrained scale.
    pub outcome: OptimOutcome,
}

impl FitResult {
    /// Design at which the fitted curve reaches `performance`.
    pub fn design_at(&self, performance: f64) -> Option<f64> {
        self.model.design_at(performance, self.threshold, self.slope)
    }
}

/// Fit `model` to every trial in `history` by maximum likelihood.
///
/// Parameters
/// ----------
/// - `history`: completed trials; at least [`MIN_FIT_TRIALS`].
/// - `model`: response model; Weibull rates are validated.
/// - `opts`: optimizer settings; `MLEOptions::default()` suits sessions of
///   any length because the objective is averaged per trial.
///
/// Errors
/// ------
/// - `AnalysisError::InsufficientData` for fewer than two trials.
/// - `AnalysisError::InvalidModel` for invalid Weibull rates.
/// - `AnalysisError::Optimization` for designs outside the model's domain or
///   any optimizer failure.
///
/// Notes
/// -----
/// Standard-error failures do not fail the fit: they are logged at `warn!`
/// and reported as `None`.
pub fn fit_psychometric(
    history: &TrialHistory, model: PsychometricModel, opts: &MLEOptions,
) -> AnalysisResult<FitResult> {
    model.validate()?;
    if history.len() < MIN_FIT_TRIALS {
        return Err(AnalysisError::InsufficientData {
            found: history.len(),
            required: MIN_FIT_TRIALS,
        });
    }
    let data: Observations = history.iter().map(|r| (r.design, r.response.is_clear())).collect();
    let likelihood = PsychometricLikelihood::new(model);
    let theta0 = likelihood.initial_guess(&data);

    let outcome = maximize(&likelihood, theta0, &data, opts)?;
    let (threshold, slope) = likelihood.to_natural(&outcome.theta_hat);

    let se = likelihood
        .observed_information(&outcome.theta_hat, &data)
        .map_err(AnalysisError::from)
        .and_then(|j| standard_errors(&j));
    let (threshold_se, slope_se) = match se {
        Ok(se) => {
            let threshold_se = match model {
                PsychometricModel::Logistic => se[0],
                PsychometricModel::Weibull { .. } => threshold * se[0],
            };
            (Some(threshold_se), Some(slope * se[1]))
        }
        Err(e) => {
            warn!(error = %e, "standard errors unavailable for psychometric fit");
            (None, None)
        }
    };

    let n_trials = data.len();
    let log_likelihood = outcome.value * n_trials as f64;
    info!(
        model = model.name(),
        n_trials,
        threshold,
        slope,
        log_likelihood,
        converged = outcome.converged,
        "psychometric fit complete"
    );
    Ok(FitResult {
        model,
        threshold,
        slope,
        threshold_se,
        slope_se,
        log_likelihood,
        n_trials,
        outcome,
    })
}
