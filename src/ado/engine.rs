//! ado::engine — the adaptive design optimization engine.
//!
//! Purpose
//! -------
//! Own one subject's session state (parameter grid, prior, posterior, design
//! candidates, trial history) and expose the trial loop operations:
//! choose the next design, absorb a response, report estimates, and answer
//! the convergence question.
//!
//! Key behaviors
//! -------------
//! - [`ADOEngine::new`] validates the whole [`ADOConfig`], builds the grid and
//!   design space, evaluates the prior, and precomputes the
//!   [`LikelihoodTable`] once.
//! - [`ADOEngine::select_next_design`] returns the seed design while the
//!   history is empty ([`EngineState::Bootstrap`]), and otherwise the
//!   candidate with maximal mutual information (ties → smallest design).
//! - [`ADOEngine::update`] checks the design against the space bounds,
//!   multiplies the posterior by the response likelihood, renormalizes, and
//!   appends a [`TrialRecord`](crate::ado::history::TrialRecord). A zero-mass
//!   result is handled by the configured [`CollapsePolicy`].
//! - Read operations (`estimates`, `entropy`, `design_utilities`, `predict`,
//!   `summary`, ...) never mutate state.
//!
//! Invariants & assumptions
//! ------------------------
//! - The posterior always sums to 1 and contains no NaN: an update either
//!   produces a normalized array or is not applied.
//! - History grows by exactly one record per accepted update and is never
//!   edited.
//! - Design selection has no hidden randomness; identical update sequences
//!   on identically configured engines give identical posteriors and designs.
//! - One engine serves one sequential session; `update` takes `&mut self`, so
//!   concurrent mutation is ruled out by the borrow checker. The only
//!   parallelism is inside [`design_utilities`](crate::ado::information::design_utilities).
//!
//! Conventions
//! -----------
//! - Designs are MTF percentages; responses are [`Response`] values.
//! - Entropies are in nats.
//!
//! Downstream usage
//! ----------------
//! - A host controller creates one engine per session, then loops
//!   `select_next_design` → present stimulus → `update`, reading
//!   `estimates()`/`history()` after each trial for persistence and deciding
//!   termination via `check_convergence` and/or a fixed trial cap.
//!
//! Testing notes
//! -------------
//! - Unit tests here cover bootstrap, direction of the first adaptive probe,
//!   normalization, rejection of invalid input without side effects, both
//!   collapse policies, determinism, and the read-only operations.
//! - Session-level behavior (recovery of a simulated observer's parameters,
//!   Monte-Carlo SD shrinkage) lives in `tests/integration_ado_session.rs`.
use chrono::Utc;
use ndarray::{Array1, Array2, ArrayView2};
use tracing::{debug, info, warn};

use crate::ado::{
    config::{ADOConfig, CollapsePolicy},
    convergence::ConvergenceCriteria,
    design::DesignSpace,
    errors::{ADOError, ADOResult},
    estimates::ParameterEstimates,
    grid::ParameterGrid,
    history::TrialHistory,
    information::{best_design_index, design_utilities, likelihood_grid, predictive_clear, LikelihoodTable},
    posterior::Posterior,
    psychometric::PsychometricModel,
    response::Response,
};

/// Number of ranked candidates reported in debug logs.
const LOGGED_CANDIDATES: usize = 5;

/// Logical state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EngineState {
    /// No trial recorded yet; the seed design is returned.
    Bootstrap,
    /// At least one trial recorded; designs come from the information search.
    Adapting,
}

/// Snapshot of a session for logging or export.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialSummary {
    pub trial_count: usize,
    pub state: EngineState,
    pub converged: bool,
    pub estimates: ParameterEstimates,
    pub entropy: f64,
    pub clear_rate: Option<f64>,
    pub tested_range: Option<(f64, f64)>,
}

/// Grid-based Bayesian adaptive design engine for one session.
#[derive(Debug, Clone)]
pub struct ADOEngine {
    config: ADOConfig,
    design_space: DesignSpace,
    grid: ParameterGrid,
    prior: Array2<f64>,
    posterior: Posterior,
    table: LikelihoodTable,
    history: TrialHistory,
    seed_design: f64,
}

impl ADOEngine {
    /// Build an engine from `config`.
    ///
    /// Parameters
    /// ----------
    /// - `config`: `ADOConfig`
    ///   Complete session configuration; see [`ADOConfig`] for defaults.
    ///
    /// Returns
    /// -------
    /// ADOResult<ADOEngine>
    ///   An engine in the bootstrap state with the posterior equal to the
    ///   normalized prior.
    ///
    /// Errors
    /// ------
    /// - Any configuration error (`ErrorKind::Configuration`): invalid ranges,
    ///   resolutions, step, model parameters, prior, seed, or credible mass,
    ///   plus `TooManyDesigns`/`TableTooLarge` when the likelihood table would
    ///   exceed its size cap.
    ///
    /// Notes
    /// -----
    /// - Cost is O(|designs| · |grid|) for the likelihood table, paid once.
    pub fn new(config: ADOConfig) -> ADOResult<Self> {
        config.validate()?;
        let design_space = DesignSpace::from_config(&config.design)?;
        let grid = ParameterGrid::new(&config.threshold, &config.slope, &config.model)?;
        let prior = config.prior.weights(&grid)?;
        let table = LikelihoodTable::build(&config.model, &design_space, &grid);
        let seed_design = config.seed_design.unwrap_or_else(|| design_space.midpoint());

        info!(
            designs = design_space.len(),
            design_lower = design_space.lower(),
            design_upper = design_space.upper(),
            thresholds = grid.shape().0,
            slopes = grid.shape().1,
            model = %config.model,
            prior = config.prior.name(),
            collapse_policy = config.collapse_policy.name(),
            seed_design,
            "ADO engine initialized"
        );

        Ok(ADOEngine {
            posterior: Posterior::from_prior(&prior),
            config,
            design_space,
            grid,
            prior,
            table,
            history: TrialHistory::new(),
            seed_design,
        })
    }

    /// Engine with [`ADOConfig::default`].
    pub fn with_defaults() -> ADOResult<Self> {
        Self::new(ADOConfig::default())
    }

    pub fn state(&self) -> EngineState {
        if self.history.is_empty() { EngineState::Bootstrap } else { EngineState::Adapting }
    }

    /// Next design to present.
    ///
    /// Returns the seed design in the bootstrap state, otherwise the candidate
    /// maximizing the mutual information between the response and the
    /// parameters. Pure: nothing is recorded until [`update`](Self::update).
    pub fn select_next_design(&self) -> f64 {
        if self.state() == EngineState::Bootstrap {
            debug!(design = self.seed_design, "bootstrap: returning seed design");
            return self.seed_design;
        }

        let utilities = design_utilities(self.posterior.weights(), &self.table);
        let design = best_design_index(&utilities)
            .map(|k| self.design_space.values()[k])
            .unwrap_or(self.seed_design);

        if tracing::enabled!(tracing::Level::DEBUG) {
            let top = self.ranked_candidates(&utilities, LOGGED_CANDIDATES);
            debug!(trial = self.history.len() + 1, design, ?top, "selected next design");
        }
        design
    }

    /// Mutual information (nats) of every candidate, in design order.
    pub fn design_utilities(&self) -> Array1<f64> {
        design_utilities(self.posterior.weights(), &self.table)
    }

    fn ranked_candidates(&self, utilities: &Array1<f64>, n: usize) -> Vec<(f64, f64)> {
        let mut ranked: Vec<(f64, f64)> = self
            .design_space
            .values()
            .iter()
            .copied()
            .zip(utilities.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Absorb one observed response.
    ///
    /// Parameters
    /// ----------
    /// - `design`: `f64`
    ///   The presented design. Must lie within the design-space bounds; it
    ///   need not be one of the candidates (replayed sessions may use others).
    /// - `response`: `Response`
    ///
    /// Errors
    /// ------
    /// - `ADOError::InvalidDesign` when `design` is outside the bounds or not
    ///   finite. Nothing is changed.
    /// - `ADOError::PosteriorCollapse` under [`CollapsePolicy::RetainPrevious`]
    ///   when the update would leave no mass; posterior and history are
    ///   unchanged.
    ///
    /// Notes
    /// -----
    /// - Under [`CollapsePolicy::ResetToPrior`] a collapse resets the posterior
    ///   to the prior, records the trial, and returns `Ok(())`.
    pub fn update(&mut self, design: f64, response: Response) -> ADOResult<()> {
        self.design_space.check(design)?;
        let likelihood = likelihood_grid(&self.config.model, &self.grid, design, response.is_clear());

        match self.posterior.apply_likelihood(likelihood.view()) {
            Some(evidence) => {
                self.history.push(design, response, Utc::now());
                debug!(
                    trial = self.history.len(),
                    design,
                    %response,
                    evidence,
                    entropy = self.posterior.entropy(),
                    "posterior updated"
                );
                Ok(())
            }
            None => match self.config.collapse_policy {
                CollapsePolicy::RetainPrevious => {
                    warn!(
                        design,
                        %response,
                        policy = CollapsePolicy::RetainPrevious.name(),
                        "posterior collapsed; keeping previous posterior and discarding the trial"
                    );
                    Err(ADOError::PosteriorCollapse { design, response })
                }
                CollapsePolicy::ResetToPrior => {
                    warn!(
                        design,
                        %response,
                        policy = CollapsePolicy::ResetToPrior.name(),
                        "posterior collapsed; resetting to the prior"
                    );
                    self.posterior.reset(&self.prior);
                    self.history.push(design, response, Utc::now());
                    Ok(())
                }
            },
        }
    }

    /// Parse `label` as a [`Response`] and [`update`](Self::update).
    ///
    /// # Errors
    /// `ADOError::InvalidResponse` for an unrecognized label (nothing changes),
    /// plus every error of `update`.
    pub fn update_from_label(&mut self, design: f64, label: &str) -> ADOResult<()> {
        let response: Response = label.parse()?;
        self.update(design, response)
    }

    /// Posterior estimates with the configured credible mass.
    pub fn estimates(&self) -> ParameterEstimates {
        ParameterEstimates::summarize(&self.posterior, &self.grid, self.config.credible_mass)
    }

    /// Posterior estimates with a caller-chosen credible mass.
    pub fn estimates_with_mass(&self, mass: f64) -> ADOResult<ParameterEstimates> {
        ParameterEstimates::from_posterior(&self.posterior, &self.grid, mass)
    }

    /// `true` iff at least `min_trials` trials are recorded and both marginal
    /// SDs are at or below their criteria.
    pub fn check_convergence(&self, min_trials: usize, threshold_sd: f64, slope_sd: f64) -> bool {
        ConvergenceCriteria { min_trials, threshold_sd, slope_sd }
            .is_met(self.history.len(), &self.estimates())
    }

    /// [`check_convergence`](Self::check_convergence) with validated criteria.
    pub fn is_converged(&self, criteria: &ConvergenceCriteria) -> bool {
        criteria.is_met(self.history.len(), &self.estimates())
    }

    /// Shannon entropy (nats) of the posterior.
    pub fn entropy(&self) -> f64 {
        self.posterior.entropy()
    }

    /// Posterior-predictive `P(clear | d)` for each design in `designs`.
    pub fn predict(&self, designs: &[f64]) -> Array1<f64> {
        designs
            .iter()
            .map(|&d| predictive_clear(self.posterior.weights(), &self.config.model, &self.grid, d))
            .collect()
    }

    /// Session snapshot; convergence is evaluated against `criteria`.
    pub fn summary(&self, criteria: &ConvergenceCriteria) -> TrialSummary {
        let estimates = self.estimates();
        TrialSummary {
            trial_count: self.history.len(),
            state: self.state(),
            converged: criteria.is_met(self.history.len(), &estimates),
            estimates,
            entropy: self.entropy(),
            clear_rate: self.history.clear_rate(),
            tested_range: self.history.design_range(),
        }
    }

    pub fn history(&self) -> &TrialHistory {
        &self.history
    }

    pub fn trial_count(&self) -> usize {
        self.history.len()
    }

    pub fn posterior(&self) -> ArrayView2<'_, f64> {
        self.posterior.weights()
    }

    pub fn prior(&self) -> ArrayView2<'_, f64> {
        self.prior.view()
    }

    pub fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    pub fn design_space(&self) -> &DesignSpace {
        &self.design_space
    }

    pub fn model(&self) -> &PsychometricModel {
        &self.config.model
    }

    pub fn seed_design(&self) -> f64 {
        self.seed_design
    }

    pub fn config(&self) -> &ADOConfig {
        &self.config
    }
}
