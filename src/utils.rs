//! PyO3 conversion helpers shared by the Python classes in the crate root.
//!
//! Everything here is compiled only with the `python-bindings` feature and
//! turns loosely typed Python inputs into validated Rust values, raising
//! `TypeError` for the wrong shape of input and `ValueError` for the wrong
//! contents.
#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyBool},
};

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1};

#[cfg(feature = "python-bindings")]
use crate::{
    ado::{
        config::{ADOConfig, CollapsePolicy},
        design::DesignConfig,
        grid::AxisConfig,
        psychometric::PsychometricModel,
        response::Response,
    },
    optimization::loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
};

/// Read a 1-D float64 array from a numpy array, a pandas Series, or any
/// sequence of floats.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<f64>>() {
        if arr.as_slice().is_ok() {
            return Ok(arr);
        }
    }
    if let Ok(obj) = raw.call_method("to_numpy", (false,), None) {
        if let Ok(series) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series.as_slice().is_ok() {
                return Ok(series);
            }
        }
    }
    let values: Vec<f64> = raw.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(values.into_pyarray(py).readonly())
}

/// Convert a host response (bool, 0/1 integer, or label string) to
/// [`Response`].
///
/// `bool` is checked before `int` because Python booleans are integers.
#[cfg(feature = "python-bindings")]
pub fn extract_response(raw: &Bound<'_, PyAny>) -> PyResult<Response> {
    if raw.is_instance_of::<PyBool>() {
        return Ok(Response::from(raw.extract::<bool>()?));
    }
    if let Ok(code) = raw.extract::<i64>() {
        return Ok(Response::try_from(code)?);
    }
    if let Ok(label) = raw.extract::<String>() {
        return Ok(label.parse::<Response>()?);
    }
    Err(PyTypeError::new_err("response must be a bool, 0/1, or a response label string"))
}

/// Psychometric model from its Python name.
#[cfg(feature = "python-bindings")]
pub fn parse_model(
    name: &str, guess_rate: Option<f64>, lapse_rate: Option<f64>,
) -> PyResult<PsychometricModel> {
    match name.trim().to_lowercase().as_str() {
        "logistic" => Ok(PsychometricModel::Logistic),
        "weibull" => Ok(PsychometricModel::Weibull {
            guess_rate: guess_rate.unwrap_or(0.0),
            lapse_rate: lapse_rate.unwrap_or(0.0),
        }),
        other => Err(PyValueError::new_err(format!(
            "unknown model '{other}'; expected 'logistic' or 'weibull'"
        ))),
    }
}

#[cfg(feature = "python-bindings")]
pub fn parse_collapse_policy(name: &str) -> PyResult<CollapsePolicy> {
    match name.trim().to_lowercase().as_str() {
        "retain_previous" => Ok(CollapsePolicy::RetainPrevious),
        "reset_to_prior" => Ok(CollapsePolicy::ResetToPrior),
        other => Err(PyValueError::new_err(format!(
            "unknown collapse policy '{other}'; expected 'retain_previous' or 'reset_to_prior'"
        ))),
    }
}

/// Assemble an [`ADOConfig`] from the keyword arguments of the Python
/// `ADOEngine` constructor. Unset arguments keep their defaults; final
/// validation happens in `ADOEngine::new`.
#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn build_ado_config(
    design_range: Option<(f64, f64)>, design_step: Option<f64>,
    threshold_range: Option<(f64, f64)>, threshold_points: Option<usize>,
    slope_range: Option<(f64, f64)>, slope_points: Option<usize>, model: Option<&str>,
    guess_rate: Option<f64>, lapse_rate: Option<f64>, seed_design: Option<f64>,
    collapse_policy: Option<&str>, credible_mass: Option<f64>,
) -> PyResult<ADOConfig> {
    let mut config = ADOConfig::default();
    if design_range.is_some() || design_step.is_some() {
        let (lower, upper) = design_range.unwrap_or((config.design.lower, config.design.upper));
        config.design = DesignConfig::new(lower, upper, design_step.unwrap_or(config.design.step))?;
    }
    if threshold_range.is_some() || threshold_points.is_some() {
        let (lower, upper) =
            threshold_range.unwrap_or((config.threshold.lower, config.threshold.upper));
        let points = threshold_points.unwrap_or(config.threshold.points);
        config.threshold = AxisConfig::new(lower, upper, points)?;
    }
    if slope_range.is_some() || slope_points.is_some() {
        let (lower, upper) = slope_range.unwrap_or((config.slope.lower, config.slope.upper));
        let points = slope_points.unwrap_or(config.slope.points);
        config.slope = AxisConfig::new(lower, upper, points)?;
    }
    if let Some(name) = model {
        config.model = parse_model(name, guess_rate, lapse_rate)?;
    }
    config.seed_design = seed_design;
    if let Some(policy) = collapse_policy {
        config.collapse_policy = parse_collapse_policy(policy)?;
    }
    if let Some(mass) = credible_mass {
        config.credible_mass = mass;
    }
    Ok(config)
}

/// Optimizer options for `fit_psychometric`; unset arguments keep the
/// `MLEOptions` defaults.
#[cfg(feature = "python-bindings")]
pub fn build_mle_options(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<MLEOptions> {
    let defaults = MLEOptions::default();
    let tols = if tol_grad.is_some() || tol_cost.is_some() || max_iter.is_some() {
        Tolerances::new(tol_grad, tol_cost, max_iter)?
    } else {
        defaults.tols
    };
    let line_searcher = match line_searcher {
        Some(name) => name.parse::<LineSearcher>()?,
        None => defaults.line_searcher,
    };
    Ok(MLEOptions::new(tols, line_searcher, lbfgs_mem)?)
}
