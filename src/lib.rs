//! mtf_ado — Bayesian adaptive design for MTF clarity thresholds.
//!
//! Purpose
//! -------
//! Provide the numerical core of an MTF-clarity psychophysics experiment: a
//! grid-based Bayesian Adaptive Design Optimization engine that picks the
//! most informative stimulus level for every trial, the MTF → Gaussian-σ
//! conversion used to render those levels, and post-hoc analysis of a
//! completed session. With the `python-bindings` feature this module is also
//! the PyO3 bridge exposing the engine to a Python experiment host through the
//! `_mtf_ado` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`ado`, `stimulus`, `analysis`,
//!   `optimization`) as the public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_mtf_ado` Python extension.
//! - Create and register the Python submodules (`ado`, `stimulus`,
//!   `analysis`) under `mtf_ado` so dotted imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work happens in the inner modules; this file only does
//!   FFI glue, argument conversion and error mapping.
//! - One engine instance serves one session on one thread; the host drives
//!   the select → present → respond → update loop.
//!
//! Conventions
//! -----------
//! - Python classes live under `_mtf_ado.<submodule>` and are re-exported by
//!   the pure-Python `mtf_ado` package.
//! - Rust errors are converted to `ValueError` at the boundary.
//! - The library never installs a `tracing` subscriber; hosts decide where
//!   logs go.
//!
//! Downstream usage
//! ----------------
//! - Rust callers use `ado::ADOEngine`, `stimulus::SigmaTable` and
//!   `analysis::fit_psychometric` directly and ignore the PyO3 items.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   session-level integration tests under `tests/`.

pub mod ado;
pub mod analysis;
pub mod optimization;
pub mod stimulus;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    ado::{
        convergence::ConvergenceCriteria, engine::ADOEngine, estimates::ParameterEstimates,
    },
    analysis::{fit::FitResult, fit_psychometric, summarize_by_design},
    stimulus::SigmaTable,
    utils::{build_ado_config, build_mle_options, extract_f64_array, extract_response, parse_model},
};

/// Python handle on an [`ADOEngine`].
#[cfg(feature = "python-bindings")]
#[pyclass(name = "ADOEngine", module = "mtf_ado.ado", unsendable)]
pub struct PyADOEngine {
    pub inner: ADOEngine,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyADOEngine {
    #[new]
    #[pyo3(
        signature = (
            design_range = None,
            design_step = None,
            threshold_range = None,
            threshold_points = None,
            slope_range = None,
            slope_points = None,
            model = None,
            guess_rate = None,
            lapse_rate = None,
            seed_design = None,
            collapse_policy = None,
            credible_mass = None,
        ),
        text_signature = "(design_range=None, design_step=None, threshold_range=None, \
                          threshold_points=None, slope_range=None, slope_points=None, \
                          model=None, guess_rate=None, lapse_rate=None, seed_design=None, \
                          collapse_policy=None, credible_mass=None)"
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        design_range: Option<(f64, f64)>, design_step: Option<f64>,
        threshold_range: Option<(f64, f64)>, threshold_points: Option<usize>,
        slope_range: Option<(f64, f64)>, slope_points: Option<usize>, model: Option<&str>,
        guess_rate: Option<f64>, lapse_rate: Option<f64>, seed_design: Option<f64>,
        collapse_policy: Option<&str>, credible_mass: Option<f64>,
    ) -> PyResult<Self> {
        let config = build_ado_config(
            design_range,
            design_step,
            threshold_range,
            threshold_points,
            slope_range,
            slope_points,
            model,
            guess_rate,
            lapse_rate,
            seed_design,
            collapse_policy,
            credible_mass,
        )?;
        Ok(PyADOEngine { inner: ADOEngine::new(config)? })
    }

    pub fn select_next_design(&self) -> f64 {
        self.inner.select_next_design()
    }

    /// `response` may be a bool, 0/1, or a label such as `"clear"`.
    pub fn update(&mut self, design: f64, response: &Bound<'_, PyAny>) -> PyResult<()> {
        let response = extract_response(response)?;
        Ok(self.inner.update(design, response)?)
    }

    #[pyo3(signature = (credible_mass = None))]
    pub fn estimates(&self, credible_mass: Option<f64>) -> PyResult<PyParameterEstimates> {
        let inner = match credible_mass {
            Some(mass) => self.inner.estimates_with_mass(mass)?,
            None => self.inner.estimates(),
        };
        Ok(PyParameterEstimates { inner })
    }

    #[pyo3(signature = (min_trials = 15, threshold_sd = 5.0, slope_sd = 0.3))]
    pub fn check_convergence(&self, min_trials: usize, threshold_sd: f64, slope_sd: f64) -> bool {
        self.inner.check_convergence(min_trials, threshold_sd, slope_sd)
    }

    #[getter]
    pub fn entropy(&self) -> f64 {
        self.inner.entropy()
    }

    #[getter]
    pub fn trial_count(&self) -> usize {
        self.inner.trial_count()
    }

    #[getter]
    pub fn state(&self) -> &'static str {
        match self.inner.state() {
            ado::engine::EngineState::Bootstrap => "bootstrap",
            ado::engine::EngineState::Adapting => "adapting",
        }
    }

    /// `(trial, design, clear, timestamp_rfc3339)` per recorded trial.
    pub fn history(&self) -> Vec<(usize, f64, bool, String)> {
        self.inner
            .history()
            .iter()
            .map(|r| (r.trial, r.design, r.response.is_clear(), r.timestamp.to_rfc3339()))
            .collect()
    }

    /// `(design, n_trials, n_clear, proportion_clear)` per presented design.
    pub fn design_summary(&self) -> Vec<(f64, usize, usize, f64)> {
        summarize_by_design(self.inner.history())
            .into_iter()
            .map(|s| (s.design, s.n_trials, s.n_clear, s.proportion_clear))
            .collect()
    }

    pub fn posterior<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.posterior().to_owned().into_pyarray(py)
    }

    pub fn design_utilities<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.design_utilities().into_pyarray(py)
    }

    pub fn predict<'py>(
        &self, py: Python<'py>, designs: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let arr: PyReadonlyArray1<f64> = extract_f64_array(py, designs)?;
        let designs = arr
            .as_slice()
            .map_err(|_| PyValueError::new_err("designs must be a contiguous 1-D array"))?;
        Ok(self.inner.predict(designs).into_pyarray(py))
    }

    #[pyo3(signature = (min_trials = 15, threshold_sd = 5.0, slope_sd = 0.3))]
    pub fn converged(&self, min_trials: usize, threshold_sd: f64, slope_sd: f64) -> PyResult<bool> {
        let criteria = ConvergenceCriteria::new(min_trials, threshold_sd, slope_sd)?;
        Ok(self.inner.is_converged(&criteria))
    }

    /// Maximum-likelihood fit of the recorded trials.
    #[pyo3(signature = (
        model = None, guess_rate = None, lapse_rate = None, tol_grad = None, tol_cost = None,
        max_iter = None, line_searcher = None, lbfgs_mem = None,
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn fit(
        &self, model: Option<&str>, guess_rate: Option<f64>, lapse_rate: Option<f64>,
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
        line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
    ) -> PyResult<PsychometricFit> {
        let model = match model {
            Some(name) => parse_model(name, guess_rate, lapse_rate)?,
            None => *self.inner.model(),
        };
        let opts = build_mle_options(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem)?;
        let inner = fit_psychometric(self.inner.history(), model, &opts)?;
        Ok(PsychometricFit { inner })
    }
}

/// Posterior means, SDs and credible intervals.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "ParameterEstimates", module = "mtf_ado.ado")]
pub struct PyParameterEstimates {
    pub inner: ParameterEstimates,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyParameterEstimates {
    #[getter]
    pub fn threshold_mean(&self) -> f64 {
        self.inner.threshold_mean()
    }

    #[getter]
    pub fn threshold_sd(&self) -> f64 {
        self.inner.threshold_sd()
    }

    #[getter]
    pub fn slope_mean(&self) -> f64 {
        self.inner.slope_mean()
    }

    #[getter]
    pub fn slope_sd(&self) -> f64 {
        self.inner.slope_sd()
    }

    #[getter]
    pub fn threshold_ci(&self) -> (f64, f64) {
        let ci = self.inner.threshold.credible_interval;
        (ci.lower, ci.upper)
    }

    #[getter]
    pub fn slope_ci(&self) -> (f64, f64) {
        let ci = self.inner.slope.credible_interval;
        (ci.lower, ci.upper)
    }

    #[getter]
    pub fn credible_mass(&self) -> f64 {
        self.inner.threshold.credible_interval.mass
    }
}

/// Result of `ADOEngine.fit`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "mtf_ado.analysis")]
pub struct PsychometricFit {
    pub inner: FitResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PsychometricFit {
    #[getter]
    pub fn threshold(&self) -> f64 {
        self.inner.threshold
    }

    #[getter]
    pub fn slope(&self) -> f64 {
        self.inner.slope
    }

    #[getter]
    pub fn threshold_se(&self) -> Option<f64> {
        self.inner.threshold_se
    }

    #[getter]
    pub fn slope_se(&self) -> Option<f64> {
        self.inner.slope_se
    }

    #[getter]
    pub fn log_likelihood(&self) -> f64 {
        self.inner.log_likelihood
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.outcome.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.outcome.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.outcome.iterations
    }

    pub fn design_at(&self, performance: f64) -> Option<f64> {
        self.inner.design_at(performance)
    }
}

/// MTF → σ lookup table for one display calibration.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "SigmaTable", module = "mtf_ado.stimulus")]
pub struct PySigmaTable {
    pub inner: SigmaTable,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PySigmaTable {
    #[new]
    #[pyo3(
        signature = (pixel_size_mm, frequency_lpmm, levels = None),
        text_signature = "(pixel_size_mm, frequency_lpmm, /, levels=None)"
    )]
    pub fn new(pixel_size_mm: f64, frequency_lpmm: f64, levels: Option<Vec<f64>>) -> PyResult<Self> {
        let levels = levels.unwrap_or_else(SigmaTable::default_levels);
        Ok(PySigmaTable { inner: SigmaTable::build(pixel_size_mm, frequency_lpmm, &levels)? })
    }

    pub fn lookup(&self, mtf_percent: f64) -> f64 {
        self.inner.lookup(mtf_percent)
    }

    /// `(mtf_percent, sigma_pixels)` in ascending MTF order.
    #[getter]
    pub fn entries(&self) -> Vec<(f64, f64)> {
        self.inner.entries().iter().map(|e| (e.mtf_percent, e.sigma_pixels)).collect()
    }

    #[getter]
    pub fn pixel_size_mm(&self) -> f64 {
        self.inner.calibration().pixel_size_mm()
    }

    #[getter]
    pub fn frequency_lpmm(&self) -> f64 {
        self.inner.calibration().frequency_lpmm()
    }

    pub fn __len__(&self) -> usize {
        self.inner.len()
    }
}

/// _mtf_ado — PyO3 module initializer.
///
/// Creates the `ado`, `stimulus` and `analysis` submodules, attaches them to
/// `_mtf_ado`, and registers them in `sys.modules` under `mtf_ado.*` so they
/// are importable with dotted paths.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _mtf_ado<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let ado_mod = PyModule::new(py, "ado")?;
    let stimulus_mod = PyModule::new(py, "stimulus")?;
    let analysis_mod = PyModule::new(py, "analysis")?;
    ado_module(m, &ado_mod)?;
    stimulus_module(m, &stimulus_mod)?;
    analysis_module(m, &analysis_mod)?;

    let modules = py.import("sys")?.getattr("modules")?;
    modules.set_item("mtf_ado.ado", ado_mod)?;
    modules.set_item("mtf_ado.stimulus", stimulus_mod)?;
    modules.set_item("mtf_ado.analysis", analysis_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn ado_module<'py>(parent: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PyADOEngine>()?;
    m.add_class::<PyParameterEstimates>()?;
    parent.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn stimulus_module<'py>(parent: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PySigmaTable>()?;
    parent.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn analysis_module<'py>(parent: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PsychometricFit>()?;
    parent.add_submodule(m)?;
    Ok(())
}
