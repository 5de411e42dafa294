//! ado::grid — the (threshold, slope) parameter grid.
//!
//! Purpose
//! -------
//! Hold the two immutable parameter axes over which the posterior is
//! discretized. Every posterior, prior, and likelihood array in the engine is
//! indexed as `[threshold_index, slope_index]` against one [`ParameterGrid`].
//!
//! Key behaviors
//! -------------
//! - [`AxisConfig`] describes one axis as `points` evenly spaced values on
//!   `[lower, upper]` (both ends included; a single point sits at `lower`).
//! - [`ParameterGrid::new`] validates both axes, including the model-specific
//!   lower-bound rules, and materializes them with `Array1::linspace`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Axes are strictly increasing, finite, and never mutated after
//!   construction.
//! - Slopes are strictly positive under every model; thresholds must also be
//!   positive for the Weibull model.
//!
//! Conventions
//! -----------
//! - Axis 0 is threshold (α), axis 1 is slope (β).
//!
//! Testing notes
//! -------------
//! - Unit tests check endpoints, shapes, and rejection of invalid axes.
use ndarray::Array1;

use crate::ado::{
    errors::{ADOError, ADOResult},
    psychometric::PsychometricModel,
    validation::{validate_points, validate_range},
};

/// Range and resolution of one parameter axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisConfig {
    pub lower: f64,
    pub upper: f64,
    pub points: usize,
}

impl AxisConfig {
    /// Validated constructor (finite, `lower < upper`, `points > 0`).
    ///
    /// Model-specific constraints (positive slopes, positive Weibull
    /// thresholds) are checked later by [`ParameterGrid::new`].
    pub fn new(lower: f64, upper: f64, points: usize) -> ADOResult<Self> {
        let cfg = AxisConfig { lower, upper, points };
        cfg.validate("axis")?;
        Ok(cfg)
    }

    fn validate(&self, axis: &'static str) -> ADOResult<()> {
        validate_range(axis, self.lower, self.upper)?;
        validate_points(axis, self.points)
    }

    fn materialize(&self) -> Array1<f64> {
        if self.points == 1 {
            Array1::from_elem(1, self.lower)
        } else {
            Array1::linspace(self.lower, self.upper, self.points)
        }
    }
}

/// Cartesian product of the threshold and slope axes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    thresholds: Array1<f64>,
    slopes: Array1<f64>,
}

impl ParameterGrid {
    /// Build and validate the grid for `model`.
    ///
    /// Parameters
    /// ----------
    /// - `threshold`: `&AxisConfig`
    ///   Range and resolution of α.
    /// - `slope`: `&AxisConfig`
    ///   Range and resolution of β. `lower` must be > 0.
    /// - `model`: `&PsychometricModel`
    ///   Used to apply model-specific bounds (Weibull needs α > 0).
    ///
    /// Errors
    /// ------
    /// - `ADOError::NonFiniteBound` / `InvalidRange` / `InvalidResolution`
    ///   for malformed axes.
    /// - `ADOError::InvalidAxisValue` for a non-positive slope lower bound, or a
    ///   non-positive threshold lower bound under the Weibull model.
    pub fn new(
        threshold: &AxisConfig, slope: &AxisConfig, model: &PsychometricModel,
    ) -> ADOResult<Self> {
        threshold.validate("threshold")?;
        slope.validate("slope")?;
        if slope.lower <= 0.0 {
            return Err(ADOError::InvalidAxisValue {
                axis: "slope",
                value: slope.lower,
                reason: "slopes must be strictly positive",
            });
        }
        model.validate_axis("threshold", threshold.lower)?;

        Ok(ParameterGrid { thresholds: threshold.materialize(), slopes: slope.materialize() })
    }

    pub fn thresholds(&self) -> &Array1<f64> {
        &self.thresholds
    }

    pub fn slopes(&self) -> &Array1<f64> {
        &self.slopes
    }

    /// `(n_thresholds, n_slopes)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.thresholds.len(), self.slopes.len())
    }

    /// Total number of grid cells.
    pub fn size(&self) -> usize {
        self.thresholds.len() * self.slopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_include_both_endpoints() {
        let grid = ParameterGrid::new(
            &AxisConfig::new(10.0, 99.0, 41).unwrap(),
            &AxisConfig::new(0.1, 3.0, 30).unwrap(),
            &PsychometricModel::Logistic,
        )
        .unwrap();
        assert_eq!(grid.shape(), (41, 30));
        assert_eq!(grid.size(), 41 * 30);
        assert_eq!(grid.thresholds()[0], 10.0);
        assert!((grid.thresholds()[40] - 99.0).abs() < 1e-12);
        assert!((grid.slopes()[29] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_point_axis_sits_at_lower_bound() {
        let grid = ParameterGrid::new(
            &AxisConfig::new(10.0, 99.0, 5).unwrap(),
            &AxisConfig::new(1.0, 2.0, 1).unwrap(),
            &PsychometricModel::Logistic,
        )
        .unwrap();
        assert_eq!(grid.slopes().to_vec(), vec![1.0]);
    }

    #[test]
    // Purpose
    // -------
    // Model-independent and model-specific axis checks both fire.
    fn invalid_axes_are_rejected() {
        let good = AxisConfig { lower: 10.0, upper: 99.0, points: 10 };
        let zero_points = AxisConfig { lower: 0.1, upper: 3.0, points: 0 };
        let zero_slope = AxisConfig { lower: 0.0, upper: 3.0, points: 10 };
        let neg_threshold = AxisConfig { lower: -5.0, upper: 99.0, points: 10 };
        let slope = AxisConfig { lower: 0.1, upper: 3.0, points: 10 };

        assert!(matches!(
            ParameterGrid::new(&good, &zero_points, &PsychometricModel::Logistic),
            Err(ADOError::InvalidResolution { axis: "slope", .. })
        ));
        assert!(matches!(
            ParameterGrid::new(&good, &zero_slope, &PsychometricModel::Logistic),
            Err(ADOError::InvalidAxisValue { axis: "slope", .. })
        ));
        assert!(ParameterGrid::new(&neg_threshold, &slope, &PsychometricModel::Logistic).is_ok());
        assert!(matches!(
            ParameterGrid::new(
                &neg_threshold,
                &slope,
                &PsychometricModel::Weibull { guess_rate: 0.0, lapse_rate: 0.0 }
            ),
            Err(ADOError::InvalidAxisValue { axis: "threshold", .. })
        ));
        assert!(AxisConfig::new(5.0, 1.0, 3).is_err());
    }
}
