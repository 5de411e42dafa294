//! ado::posterior — the grid posterior and its Bayes update.
//!
//! The posterior is a normalized `[threshold, slope]` weight array owned by the
//! engine. It is only replaced through [`Posterior::apply_likelihood`] (or a
//! reset to the prior), and only readable from outside through views and
//! derived summaries.
use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};

use crate::ado::information::shannon_entropy;

#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    weights: Array2<f64>,
}

impl Posterior {
    /// Start from already-normalized prior weights.
    pub(crate) fn from_prior(prior: &Array2<f64>) -> Self {
        Posterior { weights: prior.clone() }
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Total mass (1 up to rounding).
    pub fn mass(&self) -> f64 {
        self.weights.sum()
    }

    /// Shannon entropy in nats.
    pub fn entropy(&self) -> f64 {
        shannon_entropy(self.weights.view())
    }

    /// Marginal over thresholds (slopes summed out).
    pub fn threshold_marginal(&self) -> Array1<f64> {
        self.weights.sum_axis(Axis(1))
    }

    /// Marginal over slopes (thresholds summed out).
    pub fn slope_marginal(&self) -> Array1<f64> {
        self.weights.sum_axis(Axis(0))
    }

    /// Multiply by `likelihood` elementwise and renormalize.
    ///
    /// Returns the evidence (the unnormalized mass) on success. Returns `None`
    /// and leaves the weights untouched when that mass is zero or non-finite;
    /// the caller decides how to recover.
    pub(crate) fn apply_likelihood(&mut self, likelihood: ArrayView2<'_, f64>) -> Option<f64> {
        let mut next = Array2::zeros(self.weights.raw_dim());
        Zip::from(&mut next).and(&self.weights).and(likelihood).for_each(|n, &w, &l| *n = w * l);
        let evidence = next.sum();
        if !(evidence > 0.0 && evidence.is_finite()) {
            return None;
        }
        next /= evidence;
        self.weights = next;
        Some(evidence)
    }

    pub(crate) fn reset(&mut self, prior: &Array2<f64>) {
        self.weights.assign(prior);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn update_renormalizes_and_reports_evidence() {
        let mut post = Posterior::from_prior(&Array2::from_elem((2, 2), 0.25));
        let lik = array![[0.9, 0.9], [0.1, 0.1]];
        let evidence = post.apply_likelihood(lik.view()).unwrap();

        assert_relative_eq!(evidence, 0.5, epsilon = 1e-15);
        assert_relative_eq!(post.mass(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(post.threshold_marginal()[0], 0.9, epsilon = 1e-12);
        assert_relative_eq!(post.slope_marginal()[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A likelihood that is zero wherever the posterior has mass must not
    // produce NaNs; the update is refused and the weights are unchanged.
    fn zero_evidence_leaves_weights_untouched() {
        let prior = array![[1.0, 0.0], [0.0, 0.0]];
        let mut post = Posterior::from_prior(&prior);
        let lik = array![[0.0, 1.0], [1.0, 1.0]];
        assert!(post.apply_likelihood(lik.view()).is_none());
        assert_eq!(post.weights(), prior.view());

        post.reset(&Array2::from_elem((2, 2), 0.25));
        assert_relative_eq!(post.entropy(), (4.0_f64).ln(), epsilon = 1e-12);
    }
}
