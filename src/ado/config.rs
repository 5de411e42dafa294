//! ado::config — construction-time configuration for the ADO engine.
//!
//! Purpose
//! -------
//! Collect everything an [`ADOEngine`](crate::ado::engine::ADOEngine) needs
//! at construction in one plain data carrier: the design space, both grid
//! axes, the prior, the response model, the bootstrap design, the collapse
//! recovery policy, and the credible mass used by `estimates()`.
//!
//! Key behaviors
//! -------------
//! - [`ADOConfig`] has public fields and a [`Default`] that reproduces the
//!   standard MTF session: designs 10..=99 in steps of 1, threshold 10–99 on 41
//!   points, slope 0.1–3.0 on 30 points, uniform prior, logistic model.
//! - [`CollapsePolicy`] selects how a zero-mass update is recovered from.
//! - Builder-style `with_*` methods return a modified copy for concise setup.
//!
//! Invariants & assumptions
//! ------------------------
//! - This type performs no validation itself; [`ADOConfig::validate`] (called
//!   by the engine constructor) checks every field and cross-field rule, so an
//!   invalid configuration never yields an engine.
//!
//! Conventions
//! -----------
//! - `seed_design = None` means "nearest candidate to the midpoint of the
//!   design space, ties to the smaller value".
//!
//! Downstream usage
//! ----------------
//! - Host config loaders populate an `ADOConfig` (directly or via the `serde`
//!   feature) and hand it to `ADOEngine::new`.
//!
//! Testing notes
//! -------------
//! - Unit tests check defaults and each validation failure path; engine-level
//!   behavior driven by these fields is tested in `engine`.
use crate::ado::{
    design::DesignConfig,
    errors::{ADOError, ADOResult},
    estimates::DEFAULT_CREDIBLE_MASS,
    grid::AxisConfig,
    prior::Prior,
    psychometric::PsychometricModel,
    validation::{validate_credible_mass, validate_design, validate_table_size},
};

/// Recovery applied when an update leaves the posterior with zero mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CollapsePolicy {
    /// Keep the previous posterior, drop the trial, return
    /// `ADOError::PosteriorCollapse`.
    #[default]
    RetainPrevious,
    /// Reset the posterior to the prior, record the trial, return `Ok`.
    ResetToPrior,
}

impl CollapsePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            CollapsePolicy::RetainPrevious => "retain_previous",
            CollapsePolicy::ResetToPrior => "reset_to_prior",
        }
    }
}

/// ADOConfig — engine configuration.
///
/// Fields
/// ------
/// - `design`: [`DesignConfig`]
///   Bounds and step of the candidate designs (MTF %).
/// - `threshold`, `slope`: [`AxisConfig`]
///   Range and resolution of the α and β grid axes.
/// - `prior`: [`Prior`]
///   Initial distribution over the grid.
/// - `model`: [`PsychometricModel`]
///   Response model; chosen once for the session.
/// - `seed_design`: `Option<f64>`
///   Design returned before any trial has been recorded. Must lie inside the
///   design space when given.
/// - `collapse_policy`: [`CollapsePolicy`]
/// - `credible_mass`: `f64`
///   Mass of the equal-tailed intervals reported by `estimates()`; in (0, 1).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ADOConfig {
    pub design: DesignConfig,
    pub threshold: AxisConfig,
    pub slope: AxisConfig,
    pub prior: Prior,
    pub model: PsychometricModel,
    pub seed_design: Option<f64>,
    pub collapse_policy: CollapsePolicy,
    pub credible_mass: f64,
}

impl Default for ADOConfig {
    fn default() -> Self {
        ADOConfig {
            design: DesignConfig::default(),
            threshold: AxisConfig { lower: 10.0, upper: 99.0, points: 41 },
            slope: AxisConfig { lower: 0.1, upper: 3.0, points: 30 },
            prior: Prior::Uniform,
            model: PsychometricModel::Logistic,
            seed_design: None,
            collapse_policy: CollapsePolicy::RetainPrevious,
            credible_mass: DEFAULT_CREDIBLE_MASS,
        }
    }
}

impl ADOConfig {
    pub fn with_design(mut self, design: DesignConfig) -> Self {
        self.design = design;
        self
    }

    pub fn with_threshold(mut self, threshold: AxisConfig) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_slope(mut self, slope: AxisConfig) -> Self {
        self.slope = slope;
        self
    }

    pub fn with_prior(mut self, prior: Prior) -> Self {
        self.prior = prior;
        self
    }

    pub fn with_model(mut self, model: PsychometricModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_seed_design(mut self, seed: f64) -> Self {
        self.seed_design = Some(seed);
        self
    }

    pub fn with_collapse_policy(mut self, policy: CollapsePolicy) -> Self {
        self.collapse_policy = policy;
        self
    }

    pub fn with_credible_mass(mut self, mass: f64) -> Self {
        self.credible_mass = mass;
        self
    }

    /// Check the scalar fields that are not covered by grid/design/prior
    /// construction.
    ///
    /// Errors
    /// ------
    /// - Design config, model parameter, or Weibull design bound violations.
    /// - `ADOError::TableTooLarge` when designs × grid exceeds
    ///   [`MAX_TABLE_CELLS`](crate::ado::validation::MAX_TABLE_CELLS).
    /// - `ADOError::InvalidSeed` for a seed outside the design bounds.
    /// - `ADOError::InvalidCredibleMass` for a mass outside (0, 1).
    pub fn validate(&self) -> ADOResult<()> {
        let designs = self.design.count()?;
        validate_table_size(designs, self.threshold.points, self.slope.points)?;
        self.model.validate()?;
        self.model.validate_axis("design", self.design.lower)?;
        if let Some(seed) = self.seed_design {
            validate_design(seed, self.design.lower, self.design.upper).map_err(|_| {
                ADOError::InvalidSeed { seed, lower: self.design.lower, upper: self.design.upper }
            })?;
        }
        validate_credible_mass(self.credible_mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_standard_session() {
        let cfg = ADOConfig::default();
        assert_eq!(cfg.design, DesignConfig { lower: 10.0, upper: 99.0, step: 1.0 });
        assert_eq!((cfg.threshold.points, cfg.slope.points), (41, 30));
        assert_eq!(cfg.prior, Prior::Uniform);
        assert_eq!(cfg.model, PsychometricModel::Logistic);
        assert_eq!(cfg.collapse_policy, CollapsePolicy::RetainPrevious);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Each scalar rule has its own error.
    fn validate_reports_the_offending_field() {
        let dense =
            ADOConfig::default().with_design(DesignConfig { lower: 10.0, upper: 99.0, step: 0.001 });
        assert!(matches!(dense.validate(), Err(ADOError::TableTooLarge { designs: 89_001, .. })));

        let fine_axis = AxisConfig { lower: 10.0, upper: 99.0, points: 1_000_000 };
        let fine_grid = ADOConfig::default().with_threshold(fine_axis);
        assert!(matches!(fine_grid.validate(), Err(ADOError::TableTooLarge { .. })));

        let seed_out = ADOConfig::default().with_seed_design(150.0);
        assert!(matches!(seed_out.validate(), Err(ADOError::InvalidSeed { seed, .. }) if seed == 150.0));

        let mass = ADOConfig::default().with_credible_mass(1.5);
        assert!(matches!(mass.validate(), Err(ADOError::InvalidCredibleMass { .. })));

        let weibull_zero_design = ADOConfig::default()
            .with_design(DesignConfig { lower: 0.0, upper: 99.0, step: 1.0 })
            .with_model(PsychometricModel::Weibull { guess_rate: 0.5, lapse_rate: 0.0 });
        assert!(matches!(
            weibull_zero_design.validate(),
            Err(ADOError::InvalidAxisValue { axis: "design", .. })
        ));
    }
}
