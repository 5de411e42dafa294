//! Numeric aliases shared by the optimizer.
//!
//! Parameters, gradients and Hessians live in `ndarray` containers so that
//! argmin-math's ndarray backend can operate on them directly.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Unconstrained parameter vector.
pub type Theta = Array1<f64>;

/// Gradient of the log-likelihood with respect to [`Theta`].
pub type Grad = Array1<f64>;

/// Square matrix of second derivatives.
pub type Hessian = Array2<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Function-evaluation counters reported by argmin (`"cost_count"`, ...).
pub type FnEvalMap = HashMap<String, u64>;

/// History length used when [`MLEOptions::lbfgs_mem`](super::MLEOptions) is unset.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
