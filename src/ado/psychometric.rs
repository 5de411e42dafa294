//! ado::psychometric — closed-form psychometric functions.
//!
//! Purpose
//! -------
//! Define the response model `P(clear | d, α, β)` used both by the grid
//! posterior (likelihood of an observed response) and by the design search
//! (predicted response probabilities for a candidate design).
//!
//! Key behaviors
//! -------------
//! - [`PsychometricModel::Logistic`]: `1 / (1 + exp(−β (d − α)))`.
//! - [`PsychometricModel::Weibull`]: `γ + (1 − γ − λ)(1 − exp(−(d/α)^β))`
//!   with guess rate γ and lapse rate λ fixed when the engine is built.
//! - [`PsychometricModel::p_pair`] returns `(P(clear), P(not clear))` with
//!   each member evaluated directly, so neither tail is produced by a
//!   `1 − p` subtraction that would round tiny probabilities to zero early.
//! - [`PsychometricModel::design_at`] inverts the model at a target
//!   performance level.
//!
//! Invariants & assumptions
//! ------------------------
//! - Slopes are strictly positive, so every model is non-decreasing in `d`.
//! - The Weibull form requires `d > 0` and `α > 0`; grids and design spaces
//!   are validated against [`PsychometricModel::validate_axis`] at engine
//!   construction so these never fail at trial time.
//! - The logistic probabilities are exactly 0 or 1 only when `exp` overflows
//!   (|β (d − α)| beyond ≈ 745).
//!
//! Conventions
//! -----------
//! - α is the threshold (the 0.5 crossing for the logistic model), β the slope.
//! - All functions are pure; the model is `Copy` and stored by value.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the 0.5 crossing, monotonicity, Weibull asymptotes,
//!   tail behavior of `p_pair`, and `design_at` round trips.
use crate::ado::errors::{ADOError, ADOResult};

/// Response model mapping a design and `(threshold, slope)` to `P(clear)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "family", rename_all = "snake_case"))]
pub enum PsychometricModel {
    /// Two-parameter logistic centered on the threshold.
    Logistic,
    /// Weibull with fixed guess and lapse rates.
    Weibull { guess_rate: f64, lapse_rate: f64 },
}

impl Default for PsychometricModel {
    fn default() -> Self {
        PsychometricModel::Logistic
    }
}

impl PsychometricModel {
    /// Short name used in logs and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            PsychometricModel::Logistic => "logistic",
            PsychometricModel::Weibull { .. } => "weibull",
        }
    }

    /// Validate model parameters.
    ///
    /// # Errors
    /// [`ADOError::InvalidModelParam`] when a Weibull rate is non-finite,
    /// outside `[0, 1)`, or when `guess_rate + lapse_rate >= 1`.
    pub fn validate(&self) -> ADOResult<()> {
        if let PsychometricModel::Weibull { guess_rate, lapse_rate } = *self {
            for (name, value) in [("guess_rate", guess_rate), ("lapse_rate", lapse_rate)] {
                if !value.is_finite() || !(0.0..1.0).contains(&value) {
                    return Err(ADOError::InvalidModelParam {
                        name,
                        value,
                        reason: "must lie in [0, 1)",
                    });
                }
            }
            if guess_rate + lapse_rate >= 1.0 {
                return Err(ADOError::InvalidModelParam {
                    name: "lapse_rate",
                    value: lapse_rate,
                    reason: "guess_rate + lapse_rate must be < 1",
                });
            }
        }
        Ok(())
    }

    /// Check that the lower bound of an axis (or of the design space) is
    /// admissible for this model.
    ///
    /// The Weibull form takes `(d/α)^β` and therefore needs strictly positive
    /// designs and thresholds. The logistic form accepts any finite value.
    pub fn validate_axis(&self, axis: &'static str, lower: f64) -> ADOResult<()> {
        match self {
            PsychometricModel::Weibull { .. } if lower <= 0.0 => Err(ADOError::InvalidAxisValue {
                axis,
                value: lower,
                reason: "the Weibull model requires strictly positive values",
            }),
            _ => Ok(()),
        }
    }

    /// Probability of a "clear" response.
    #[inline]
    pub fn p_clear(&self, design: f64, threshold: f64, slope: f64) -> f64 {
        self.p_pair(design, threshold, slope).0
    }

    /// `(P(clear), P(not clear))` for one design and grid cell.
    ///
    /// Notes
    /// -----
    /// - Logistic: with `z = β (d − α)`, returns `(1/(1+e^−z), 1/(1+e^z))`.
    /// - Weibull: with `e = exp(−(d/α)^β)` and `s = 1 − γ − λ`, returns
    ///   `(γ + s (1 − e), s e + λ)`.
    #[inline]
    pub fn p_pair(&self, design: f64, threshold: f64, slope: f64) -> (f64, f64) {
        match *self {
            PsychometricModel::Logistic => {
                let z = slope * (design - threshold);
                (1.0 / (1.0 + (-z).exp()), 1.0 / (1.0 + z.exp()))
            }
            PsychometricModel::Weibull { guess_rate, lapse_rate } => {
                let span = 1.0 - guess_rate - lapse_rate;
                let survival = (-(design / threshold).powf(slope)).exp();
                (guess_rate + span * (1.0 - survival), span * survival + lapse_rate)
            }
        }
    }

    /// Design at which the model reaches `performance`.
    ///
    /// Returns `None` when `performance` is outside the open range the model
    /// can produce (`(0, 1)` for the logistic, `(γ, 1 − λ)` for the Weibull).
    pub fn design_at(&self, performance: f64, threshold: f64, slope: f64) -> Option<f64> {
        if !performance.is_finite() || slope <= 0.0 {
            return None;
        }
        match *self {
            PsychometricModel::Logistic => {
                if performance <= 0.0 || performance >= 1.0 {
                    return None;
                }
                Some(threshold + (performance / (1.0 - performance)).ln() / slope)
            }
            PsychometricModel::Weibull { guess_rate, lapse_rate } => {
                let span = 1.0 - guess_rate - lapse_rate;
                let scaled = (performance - guess_rate) / span;
                if scaled <= 0.0 || scaled >= 1.0 {
                    return None;
                }
                Some(threshold * (-(1.0 - scaled).ln()).powf(1.0 / slope))
            }
        }
    }
}

impl std::fmt::Display for PsychometricModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PsychometricModel::Logistic => f.write_str("logistic"),
            PsychometricModel::Weibull { guess_rate, lapse_rate } => {
                write!(f, "weibull(guess_rate={guess_rate}, lapse_rate={lapse_rate})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The logistic 0.5 crossing at the threshold and monotonicity in design.
    // - Weibull asymptotes (guess rate at d → 0, 1 − lapse at d → ∞).
    // - Tail behavior of `p_pair` (no premature rounding of the small tail).
    // - `design_at` inversion and its out-of-range `None` cases.
    // - Parameter validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The logistic threshold is the 50 % point and the curve increases in d.
    fn logistic_crosses_half_at_threshold_and_increases() {
        let m = PsychometricModel::Logistic;
        assert_relative_eq!(m.p_clear(60.0, 60.0, 1.0), 0.5, epsilon = 1e-15);

        let mut prev = 0.0;
        for d in 10..=99 {
            let p = m.p_clear(d as f64, 60.0, 0.3);
            assert!(p >= prev, "not monotone at d = {d}");
            prev = p;
        }
    }

    #[test]
    // Purpose
    // -------
    // The pair must sum to one wherever both members are representable, and
    // the small tail must keep its magnitude instead of collapsing to 0.
    fn p_pair_keeps_small_tail_representable() {
        let m = PsychometricModel::Logistic;
        let (clear, not_clear) = m.p_pair(99.0, 10.0, 0.5);
        assert_relative_eq!(clear + not_clear, 1.0, epsilon = 1e-12);
        assert!(not_clear > 0.0 && not_clear < 1e-15, "tail was {not_clear}");

        // Only exp overflow produces an exact zero.
        let (_, zero) = m.p_pair(99.0, 10.0, 10.0);
        assert_eq!(zero, 0.0);
    }

    #[test]
    fn weibull_spans_guess_rate_to_one_minus_lapse() {
        let m = PsychometricModel::Weibull { guess_rate: 0.5, lapse_rate: 0.02 };
        let low = m.p_clear(1e-6, 50.0, 3.0);
        let high = m.p_clear(1e6, 50.0, 3.0);
        assert_relative_eq!(low, 0.5, epsilon = 1e-9);
        assert_relative_eq!(high, 0.98, epsilon = 1e-9);

        let (c, n) = m.p_pair(40.0, 50.0, 3.0);
        assert_relative_eq!(c + n, 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // `design_at` inverts `p_clear` inside the model range and returns None
    // at or beyond its asymptotes.
    fn design_at_inverts_the_model() {
        let logistic = PsychometricModel::Logistic;
        let d75 = logistic.design_at(0.75, 60.0, 0.4).unwrap();
        assert_relative_eq!(logistic.p_clear(d75, 60.0, 0.4), 0.75, epsilon = 1e-12);
        assert_relative_eq!(logistic.design_at(0.5, 60.0, 0.4).unwrap(), 60.0, epsilon = 1e-12);
        assert!(logistic.design_at(1.0, 60.0, 0.4).is_none());

        let weibull = PsychometricModel::Weibull { guess_rate: 0.5, lapse_rate: 0.01 };
        let d84 = weibull.design_at(0.84, 40.0, 2.0).unwrap();
        assert_relative_eq!(weibull.p_clear(d84, 40.0, 2.0), 0.84, epsilon = 1e-12);
        assert!(weibull.design_at(0.4, 40.0, 2.0).is_none());
        assert!(weibull.design_at(0.995, 40.0, 2.0).is_none());
    }

    #[test]
    fn validation_rejects_bad_weibull_rates_and_non_positive_axes() {
        assert!(PsychometricModel::Logistic.validate().is_ok());
        assert!(PsychometricModel::Weibull { guess_rate: 0.5, lapse_rate: 0.02 }.validate().is_ok());
        assert!(matches!(
            PsychometricModel::Weibull { guess_rate: 1.2, lapse_rate: 0.0 }.validate(),
            Err(ADOError::InvalidModelParam { name: "guess_rate", .. })
        ));
        assert!(matches!(
            PsychometricModel::Weibull { guess_rate: 0.6, lapse_rate: 0.5 }.validate(),
            Err(ADOError::InvalidModelParam { name: "lapse_rate", .. })
        ));

        let weibull = PsychometricModel::Weibull { guess_rate: 0.0, lapse_rate: 0.0 };
        assert!(weibull.validate_axis("threshold", 0.0).is_err());
        assert!(weibull.validate_axis("threshold", 0.5).is_ok());
        assert!(PsychometricModel::Logistic.validate_axis("design", -5.0).is_ok());
    }
}
