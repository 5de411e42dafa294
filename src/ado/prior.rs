//! ado::prior — prior distributions over the parameter grid.
//!
//! Purpose
//! -------
//! Turn a prior specification into a normalized weight array on a
//! [`ParameterGrid`]. The engine evaluates the prior once at construction and
//! keeps the result both as the initial posterior and as the fallback used by
//! [`CollapsePolicy::ResetToPrior`](crate::ado::config::CollapsePolicy).
//!
//! Key behaviors
//! -------------
//! - [`Prior::Uniform`]: equal mass on every cell.
//! - [`Prior::Parametric`]: independent Normal(α) × Gamma(β; shape, rate)
//!   densities evaluated at the grid points. Log-densities are shifted by their
//!   maximum before exponentiation, so a narrow prior on a wide grid does not
//!   underflow to an all-zero array.
//! - [`Prior::Custom`]: caller-provided weights with the grid's shape.
//!
//! Invariants & assumptions
//! ------------------------
//! - The returned array has the grid's shape, finite non-negative entries,
//!   and sums to 1.
//! - Densities are evaluated at points, not integrated over cells; the grid is
//!   the discretization.
use ndarray::Array2;
use statrs::distribution::{Continuous, Gamma, Normal};

use crate::ado::{
    errors::{ADOError, ADOResult},
    grid::ParameterGrid,
};

/// Prior specification.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Prior {
    #[default]
    Uniform,
    Parametric { threshold_mean: f64, threshold_sd: f64, slope_shape: f64, slope_rate: f64 },
    Custom { weights: Array2<f64> },
}

impl Prior {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Prior::Uniform => "uniform",
            Prior::Parametric { .. } => "parametric",
            Prior::Custom { .. } => "custom",
        }
    }

    /// Evaluate and normalize the prior on `grid`.
    ///
    /// Errors
    /// ------
    /// - `ADOError::InvalidPrior` if a parametric density cannot be built
    ///   (non-positive sd/shape/rate, non-finite mean) or if the weights contain
    ///   negative/non-finite entries or have zero total mass.
    /// - `ADOError::PriorShapeMismatch` if custom weights do not match the grid.
    pub fn weights(&self, grid: &ParameterGrid) -> ADOResult<Array2<f64>> {
        let shape = grid.shape();
        let raw = match self {
            Prior::Uniform => Array2::from_elem(shape, 1.0),
            Prior::Parametric { threshold_mean, threshold_sd, slope_shape, slope_rate } => {
                let normal = Normal::new(*threshold_mean, *threshold_sd)
                    .map_err(|e| ADOError::InvalidPrior { reason: format!("threshold: {e}") })?;
                let gamma = Gamma::new(*slope_shape, *slope_rate)
                    .map_err(|e| ADOError::InvalidPrior { reason: format!("slope: {e}") })?;

                let log_t = grid.thresholds().mapv(|t| normal.ln_pdf(t));
                let log_s = grid.slopes().mapv(|s| gamma.ln_pdf(s));
                let log_joint =
                    Array2::from_shape_fn(shape, |(i, j)| log_t[i] + log_s[j]);
                let max = log_joint.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if !max.is_finite() {
                    return Err(ADOError::InvalidPrior {
                        reason: "parametric density has no finite mass on the grid".to_string(),
                    });
                }
                log_joint.mapv(|l| (l - max).exp())
            }
            Prior::Custom { weights } => {
                if weights.dim() != shape {
                    return Err(ADOError::PriorShapeMismatch {
                        expected: shape,
                        found: weights.dim(),
                    });
                }
                weights.clone()
            }
        };
        normalize(raw)
    }
}

fn normalize(mut weights: Array2<f64>) -> ADOResult<Array2<f64>> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ADOError::InvalidPrior {
            reason: "weights must be finite and non-negative".to_string(),
        });
    }
    let total = weights.sum();
    if !(total > 0.0) || !total.is_finite() {
        return Err(ADOError::InvalidPrior { reason: format!("total mass must be positive; got {total}") });
    }
    weights /= total;
    Ok(weights)
}
