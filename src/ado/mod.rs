//! ado — grid-based Bayesian adaptive design optimization.
//!
//! Purpose
//! -------
//! Choose, trial by trial, the stimulus intensity (MTF %) that is expected to
//! be most informative about a subject's psychometric function, and update a
//! posterior over its (threshold, slope) parameters after each response.
//!
//! Key behaviors
//! -------------
//! - [`ADOEngine`] owns a session: grid, prior, posterior, design space, and
//!   trial history. Its loop is `select_next_design` → `update` →
//!   `estimates` / `check_convergence`.
//! - Design selection maximizes the mutual information between the next
//!   response and the parameters over a precomputed [`LikelihoodTable`],
//!   scoring candidates in parallel and breaking ties toward the smallest
//!   design.
//! - Response models ([`PsychometricModel`]), priors ([`Prior`]), and collapse
//!   recovery ([`CollapsePolicy`]) are strategies fixed at construction.
//! - [`SimulatedObserver`] and [`simulate_session`] provide synthetic subjects
//!   for dry runs and tests.
//!
//! Invariants & assumptions
//! ------------------------
//! - Grid axes and the design space are immutable after construction.
//! - The posterior always sums to 1 (within floating-point tolerance) and is
//!   mutated only through `ADOEngine::update`.
//! - The trial history is append-only: one record per accepted update.
//! - Given identical configuration and observations, behavior is
//!   deterministic.
//!
//! Conventions
//! -----------
//! - Arrays over the grid are indexed `[threshold_index, slope_index]`.
//! - Designs and thresholds are MTF percentages; entropies are in nats.
//! - Errors are reported as [`ADOError`]; [`ErrorKind`] classifies them into
//!   configuration, invalid-design, invalid-response, and collapse failures.
//!
//! Downstream usage
//! ----------------
//! - Hosts typically `use mtf_ado::ado::prelude::*;`, build an [`ADOConfig`],
//!   and drive one [`ADOEngine`] per session.
//! - Post-hoc fits of a finished session live in `crate::analysis`.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own invariants.
//! - Full-session properties are covered in `tests/integration_ado_session.rs`.

pub mod config;
pub mod convergence;
pub mod design;
pub mod engine;
pub mod errors;
pub mod estimates;
pub mod grid;
pub mod history;
pub mod information;
pub mod posterior;
pub mod prior;
pub mod psychometric;
pub mod response;
pub mod simulation;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::config::{ADOConfig, CollapsePolicy};
pub use self::convergence::ConvergenceCriteria;
pub use self::design::{DesignConfig, DesignSpace};
pub use self::engine::{ADOEngine, EngineState, TrialSummary};
pub use self::errors::{ADOError, ADOResult, ErrorKind};
pub use self::estimates::{CredibleInterval, MarginalSummary, ParameterEstimates};
pub use self::grid::{AxisConfig, ParameterGrid};
pub use self::history::{TrialHistory, TrialRecord};
pub use self::information::LikelihoodTable;
pub use self::posterior::Posterior;
pub use self::prior::Prior;
pub use self::psychometric::PsychometricModel;
pub use self::response::Response;
pub use self::simulation::{simulate_session, SimulatedObserver};

// ---- Optional convenience prelude for downstream crates -------------------
//
//     use mtf_ado::ado::prelude::*;

pub mod prelude {
    pub use super::{
        ADOConfig, ADOEngine, ADOError, ADOResult, AxisConfig, CollapsePolicy,
        ConvergenceCriteria, DesignConfig, EngineState, ErrorKind, ParameterEstimates, Prior,
        PsychometricModel, Response, SimulatedObserver, TrialHistory, TrialRecord,
        simulate_session,
    };
}
