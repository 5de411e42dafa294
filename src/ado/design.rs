//! ado::design — the admissible stimulus intensities.
//!
//! Purpose
//! -------
//! Materialize the ordered candidate designs the engine may present, either
//! from `[lower, upper]` bounds and a fixed step ([`DesignConfig`]) or from an
//! explicit list of values.
//!
//! Invariants & assumptions
//! ------------------------
//! - Values are finite, strictly increasing, and non-empty.
//! - Stepped spaces are generated as `lower + k · step` (never by repeated
//!   addition) so the k-th value carries no accumulated rounding error, and the
//!   last value never exceeds `upper` by more than the design tolerance.
//! - The space is immutable once built.
use ndarray::Array1;

use crate::ado::{
    errors::{ADOError, ADOResult},
    validation::{design_count, validate_design, validate_range, DESIGN_TOL},
};

/// Bounds and step of a stepped design space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DesignConfig {
    pub lower: f64,
    pub upper: f64,
    pub step: f64,
}

impl DesignConfig {
    /// Validated constructor.
    ///
    /// # Errors
    /// Non-finite or inverted bounds, a non-positive step, or a step so small
    /// that the space would exceed [`MAX_DESIGNS`](crate::ado::validation::MAX_DESIGNS).
    pub fn new(lower: f64, upper: f64, step: f64) -> ADOResult<Self> {
        let cfg = DesignConfig { lower, upper, step };
        cfg.validate()?;
        Ok(cfg)
    }

    pub(crate) fn validate(&self) -> ADOResult<()> {
        self.count().map(|_| ())
    }

    /// Number of designs the config materializes.
    pub fn count(&self) -> ADOResult<usize> {
        validate_range("design", self.lower, self.upper)?;
        design_count(self.lower, self.upper, self.step)
    }
}

impl Default for DesignConfig {
    /// Integer MTF percentages 10..=99.
    fn default() -> Self {
        DesignConfig { lower: 10.0, upper: 99.0, step: 1.0 }
    }
}

/// Ordered, immutable set of candidate designs.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignSpace {
    values: Array1<f64>,
}

impl DesignSpace {
    /// Build `lower, lower + step, …` up to and including `upper`.
    ///
    /// # Errors
    /// Propagates [`DesignConfig`] validation failures.
    pub fn from_config(cfg: &DesignConfig) -> ADOResult<Self> {
        let count = cfg.count()?;
        let values = Array1::from_iter((0..count).map(|k| cfg.lower + k as f64 * cfg.step));
        Ok(DesignSpace { values })
    }

    /// Build from explicit values. Input is sorted and duplicates removed.
    ///
    /// # Errors
    /// - [`ADOError::EmptyDesignSpace`] when the list is empty.
    /// - [`ADOError::NonFiniteBound`] when any value is NaN/±inf.
    pub fn from_values(values: &[f64]) -> ADOResult<Self> {
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ADOError::NonFiniteBound { axis: "design", value: bad });
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();
        if sorted.is_empty() {
            return Err(ADOError::EmptyDesignSpace);
        }
        Ok(DesignSpace { values: Array1::from_vec(sorted) })
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn lower(&self) -> f64 {
        self.values[0]
    }

    pub fn upper(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// `true` when `design` lies within the bounds of the space.
    ///
    /// Membership is about the bounds, not the lattice: replayed designs that
    /// fall between two candidates are still admissible observations.
    pub fn contains(&self, design: f64) -> bool {
        self.check(design).is_ok()
    }

    /// Same as [`contains`](Self::contains) but returns the error to raise.
    pub fn check(&self, design: f64) -> ADOResult<()> {
        validate_design(design, self.lower(), self.upper())
    }

    /// Candidate nearest to the midpoint of the bounds (ties → smaller value).
    pub fn midpoint(&self) -> f64 {
        let mid = 0.5 * (self.lower() + self.upper());
        let mut best = self.values[0];
        for &v in self.values.iter().skip(1) {
            if (v - mid).abs() < (best - mid).abs() - DESIGN_TOL {
                best = v;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Construction from a stepped config and from explicit values, bound
    // membership, and the midpoint seed rule.
    // -------------------------------------------------------------------------

    #[test]
    fn default_config_yields_integer_designs_10_to_99() {
        let space = DesignSpace::from_config(&DesignConfig::default()).unwrap();
        assert_eq!(space.len(), 90);
        assert_eq!(space.lower(), 10.0);
        assert_eq!(space.upper(), 99.0);
    }

    #[test]
    // Purpose
    // -------
    // A fractional step that does not divide the range stops at the last value
    // not exceeding `upper`, and a step that does divide it includes `upper`.
    fn stepped_space_respects_upper_bound() {
        let space = DesignSpace::from_config(&DesignConfig::new(10.0, 20.0, 3.0).unwrap()).unwrap();
        assert_eq!(space.values().to_vec(), vec![10.0, 13.0, 16.0, 19.0]);

        let space = DesignSpace::from_config(&DesignConfig::new(0.1, 0.7, 0.1).unwrap()).unwrap();
        assert_eq!(space.len(), 7);
        assert!((space.upper() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(matches!(DesignConfig::new(99.0, 10.0, 1.0), Err(ADOError::InvalidRange { .. })));
        assert!(matches!(DesignConfig::new(10.0, 99.0, 0.0), Err(ADOError::InvalidStep { .. })));
        assert!(matches!(DesignSpace::from_values(&[]), Err(ADOError::EmptyDesignSpace)));
        assert!(DesignSpace::from_values(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    // Purpose
    // -------
    // A vanishing step is rejected with a configuration error, both by the
    // validated constructor and for a config assembled field by field.
    fn vanishing_step_is_a_configuration_error() {
        assert!(matches!(
            DesignConfig::new(10.0, 99.0, 1e-300),
            Err(ADOError::TooManyDesigns { .. })
        ));

        let raw = DesignConfig { lower: 10.0, upper: 99.0, step: 1e-300 };
        let err = DesignSpace::from_config(&raw).unwrap_err();
        assert!(matches!(err, ADOError::TooManyDesigns { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn explicit_values_are_sorted_and_deduplicated() {
        let space = DesignSpace::from_values(&[30.0, 10.0, 20.0, 10.0]).unwrap();
        assert_eq!(space.values().to_vec(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    // Purpose
    // -------
    // Membership is checked against the bounds; the midpoint seed picks the
    // smaller of two equidistant candidates.
    fn membership_and_midpoint_seed() {
        let space = DesignSpace::from_config(&DesignConfig::default()).unwrap();
        assert!(space.contains(50.5));
        assert!(!space.contains(9.0));
        assert!(!space.contains(100.0));
        assert_eq!(space.midpoint(), 54.0);

        let odd = DesignSpace::from_values(&[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(odd.midpoint(), 20.0);
    }
}
