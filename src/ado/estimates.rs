//! ado::estimates — point and interval summaries of the posterior marginals.
//!
//! Purpose
//! -------
//! Reduce the 2-D posterior to what a host records after each trial: the
//! posterior mean and standard deviation of threshold and slope, and an
//! equal-tailed credible interval on each.
//!
//! Key behaviors
//! -------------
//! - Marginals are obtained by summing the other axis out of the posterior.
//! - Means and SDs are probability-weighted moments over the axis values.
//! - Credible bounds are grid quantiles: the first axis value whose
//!   cumulative mass reaches the tail probability. They are therefore always
//!   grid points and `lower <= upper`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The input marginal sums to 1 (it comes from a normalized posterior).
//! - Quantile comparisons allow [`QUANTILE_TOL`] so that a cumulative sum that
//!   lands a rounding error short of the target still selects that point.
//! - Computing estimates never mutates engine state; repeated calls return
//!   identical values.
use ndarray::Array1;

use crate::ado::{errors::ADOResult, grid::ParameterGrid, posterior::Posterior, validation::validate_credible_mass};

/// Default credible mass (2.5 % / 97.5 % tails).
pub const DEFAULT_CREDIBLE_MASS: f64 = 0.95;

/// Slack applied when comparing cumulative mass against a quantile level.
pub const QUANTILE_TOL: f64 = 1e-12;

/// Equal-tailed credible interval on one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CredibleInterval {
    pub lower: f64,
    pub upper: f64,
    pub mass: f64,
}

/// Moments and credible interval of one marginal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarginalSummary {
    pub mean: f64,
    pub sd: f64,
    pub credible_interval: CredibleInterval,
}

impl MarginalSummary {
    /// Summarize a discrete distribution `probs` over ascending `values`.
    pub fn from_marginal(values: &Array1<f64>, probs: &Array1<f64>, mass: f64) -> Self {
        let mean = values.dot(probs);
        let var = values
            .iter()
            .zip(probs.iter())
            .map(|(&x, &p)| p * (x - mean) * (x - mean))
            .sum::<f64>();
        let tail = 0.5 * (1.0 - mass);
        MarginalSummary {
            mean,
            sd: var.max(0.0).sqrt(),
            credible_interval: CredibleInterval {
                lower: grid_quantile(values, probs, tail),
                upper: grid_quantile(values, probs, 1.0 - tail),
                mass,
            },
        }
    }
}

/// Smallest value whose cumulative probability reaches `level`.
///
/// Falls back to the last value when rounding keeps the cumulative sum below
/// `level` all the way through.
pub fn grid_quantile(values: &Array1<f64>, probs: &Array1<f64>, level: f64) -> f64 {
    let mut cdf = 0.0;
    for (&x, &p) in values.iter().zip(probs.iter()) {
        cdf += p;
        if cdf >= level - QUANTILE_TOL {
            return x;
        }
    }
    values[values.len() - 1]
}

/// Posterior summaries for threshold and slope.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterEstimates {
    pub threshold: MarginalSummary,
    pub slope: MarginalSummary,
}

impl ParameterEstimates {
    /// Summarize `posterior` on `grid` with the given credible mass.
    ///
    /// # Errors
    /// [`ADOError::InvalidCredibleMass`](crate::ado::errors::ADOError) when
    /// `mass` is not in (0, 1).
    pub fn from_posterior(posterior: &Posterior, grid: &ParameterGrid, mass: f64) -> ADOResult<Self> {
        validate_credible_mass(mass)?;
        Ok(Self::summarize(posterior, grid, mass))
    }

    /// Same as [`from_posterior`](Self::from_posterior) for a mass that was
    /// already validated.
    pub(crate) fn summarize(posterior: &Posterior, grid: &ParameterGrid, mass: f64) -> Self {
        ParameterEstimates {
            threshold: MarginalSummary::from_marginal(
                grid.thresholds(),
                &posterior.threshold_marginal(),
                mass,
            ),
            slope: MarginalSummary::from_marginal(grid.slopes(), &posterior.slope_marginal(), mass),
        }
    }

    pub fn threshold_mean(&self) -> f64 {
        self.threshold.mean
    }

    pub fn threshold_sd(&self) -> f64 {
        self.threshold.sd
    }

    pub fn slope_mean(&self) -> f64 {
        self.slope.mean
    }

    pub fn slope_sd(&self) -> f64 {
        self.slope.sd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Moments of a symmetric three-point distribution.
    fn moments_of_three_point_distribution() {
        let values = array![10.0, 20.0, 30.0];
        let probs = array![0.25, 0.5, 0.25];
        let s = MarginalSummary::from_marginal(&values, &probs, 0.95);
        assert_relative_eq!(s.mean, 20.0, epsilon = 1e-12);
        assert_relative_eq!(s.sd, 50.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(s.credible_interval.lower, 10.0);
        assert_eq!(s.credible_interval.upper, 30.0);
    }

    #[test]
    // Purpose
    // -------
    // Quantiles select the first grid point whose CDF reaches the level,
    // including when the CDF lands exactly on it.
    fn grid_quantile_uses_first_point_reaching_level() {
        let values = array![1.0, 2.0, 3.0, 4.0];
        let probs = array![0.1, 0.2, 0.3, 0.4];
        assert_eq!(grid_quantile(&values, &probs, 0.025), 1.0);
        assert_eq!(grid_quantile(&values, &probs, 0.3), 2.0);
        assert_eq!(grid_quantile(&values, &probs, 0.31), 3.0);
        assert_eq!(grid_quantile(&values, &probs, 1.0), 4.0);
    }

    #[test]
    fn point_mass_has_zero_sd_and_degenerate_interval() {
        let values = array![1.0, 2.0, 3.0];
        let probs = array![0.0, 1.0, 0.0];
        let s = MarginalSummary::from_marginal(&values, &probs, 0.9);
        assert_eq!(s.sd, 0.0);
        assert_eq!(s.credible_interval.lower, 2.0);
        assert_eq!(s.credible_interval.upper, 2.0);
        assert_eq!(s.credible_interval.mass, 0.9);
    }
}
