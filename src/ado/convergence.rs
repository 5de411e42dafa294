//! ado::convergence — optional early-stopping predicate.
//!
//! Whether a session stops early is the host's policy; the engine only answers
//! the question. A host that always runs a fixed number of trials simply never
//! calls [`ConvergenceCriteria::is_met`].
use crate::ado::{
    errors::{ADOError, ADOResult},
    estimates::ParameterEstimates,
    validation::validate_criterion,
};

/// Minimum trial count plus SD ceilings on both marginals.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceCriteria {
    pub min_trials: usize,
    pub threshold_sd: f64,
    pub slope_sd: f64,
}

impl ConvergenceCriteria {
    /// Validated constructor.
    ///
    /// # Errors
    /// [`ADOError::InvalidCriterion`] when either SD ceiling is non-finite or
    /// not positive. `min_trials = 0` is allowed (no minimum).
    pub fn new(min_trials: usize, threshold_sd: f64, slope_sd: f64) -> ADOResult<Self> {
        validate_criterion("threshold_sd", threshold_sd)?;
        validate_criterion("slope_sd", slope_sd)?;
        Ok(ConvergenceCriteria { min_trials, threshold_sd, slope_sd })
    }

    /// `true` iff `trials >= min_trials` and both SDs are within their ceilings.
    pub fn is_met(&self, trials: usize, estimates: &ParameterEstimates) -> bool {
        trials >= self.min_trials
            && estimates.threshold_sd() <= self.threshold_sd
            && estimates.slope_sd() <= self.slope_sd
    }

    pub(crate) fn check(&self) -> ADOResult<()> {
        validate_criterion("threshold_sd", self.threshold_sd)?;
        validate_criterion("slope_sd", self.slope_sd)
    }
}

impl Default for ConvergenceCriteria {
    /// 15 trials, threshold SD ≤ 5, slope SD ≤ 0.3.
    fn default() -> Self {
        ConvergenceCriteria { min_trials: 15, threshold_sd: 5.0, slope_sd: 0.3 }
    }
}

impl TryFrom<(usize, f64, f64)> for ConvergenceCriteria {
    type Error = ADOError;

    fn try_from((min_trials, threshold_sd, slope_sd): (usize, f64, f64)) -> ADOResult<Self> {
        ConvergenceCriteria::new(min_trials, threshold_sd, slope_sd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ado::estimates::{CredibleInterval, MarginalSummary};

    fn estimates(threshold_sd: f64, slope_sd: f64) -> ParameterEstimates {
        let ci = CredibleInterval { lower: 0.0, upper: 1.0, mass: 0.95 };
        ParameterEstimates {
            threshold: MarginalSummary { mean: 60.0, sd: threshold_sd, credible_interval: ci },
            slope: MarginalSummary { mean: 1.0, sd: slope_sd, credible_interval: ci },
        }
    }

    #[test]
    // Purpose
    // -------
    // Every condition must hold; SD ceilings are inclusive.
    fn all_conditions_are_required() {
        let c = ConvergenceCriteria::new(15, 5.0, 1.0).unwrap();
        assert!(!c.is_met(10, &estimates(0.1, 0.1)));
        assert!(c.is_met(15, &estimates(5.0, 1.0)));
        assert!(!c.is_met(20, &estimates(5.1, 0.1)));
        assert!(!c.is_met(20, &estimates(0.1, 1.1)));
    }

    #[test]
    fn invalid_ceilings_are_rejected() {
        assert!(matches!(
            ConvergenceCriteria::new(15, 0.0, 1.0),
            Err(ADOError::InvalidCriterion { name: "threshold_sd", .. })
        ));
        assert!(ConvergenceCriteria::try_from((15, 5.0, f64::NAN)).is_err());
        assert_eq!(ConvergenceCriteria::default(), ConvergenceCriteria::new(15, 5.0, 0.3).unwrap());
    }
}
