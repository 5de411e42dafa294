//! Bridge from [`LogLikelihood`] to argmin's minimization traits.
//!
//! argmin minimizes, so the adapter exposes the cost c(θ) = −ℓ(θ) and its
//! gradient −∇ℓ(θ). When the likelihood has no analytic gradient, the cost is
//! differentiated numerically: central differences first, forward
//! differences if the central pass hits an error or a non-finite entry.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        ArgMinAdapter { f, data }
    }

    fn numerical_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let probe = CostProbe::new(self);
        let central = theta.central_diff(&|t: &Theta| probe.eval(t));
        if probe.take_error().is_none() && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }
        let forward = theta.forward_diff(&|t: &Theta| probe.eval(t));
        if let Some(err) = probe.take_error() {
            return Err(err);
        }
        validate_grad(&forward, theta.len())?;
        Ok(forward)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let ll = self.f.value(theta, self.data)?;
        if !ll.is_finite() {
            return Err(OptError::NonFiniteCost { value: ll }.into());
        }
        Ok(-ll)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.numerical_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}

/// Cost evaluator for finite differences. `finitediff` wants a plain
/// `Fn(&Theta) -> f64`, so failures become NaN and the first error is kept
/// for the caller to inspect.
struct CostProbe<'p, 'a, F: LogLikelihood> {
    adapter: &'p ArgMinAdapter<'a, F>,
    first_error: RefCell<Option<Error>>,
}

impl<'p, 'a, F: LogLikelihood> CostProbe<'p, 'a, F> {
    fn new(adapter: &'p ArgMinAdapter<'a, F>) -> Self {
        CostProbe { adapter, first_error: RefCell::new(None) }
    }

    fn eval(&self, theta: &Theta) -> f64 {
        match self.adapter.cost(theta) {
            Ok(c) => c,
            Err(e) => {
                let mut slot = self.first_error.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    }

    fn take_error(&self) -> Option<Error> {
        self.first_error.borrow_mut().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // ℓ(θ) = −½‖θ − m‖², maximized at m.
    struct Quadratic {
        analytic: bool,
    }

    impl LogLikelihood for Quadratic {
        type Data = Theta;

        fn value(&self, theta: &Theta, m: &Theta) -> OptResult<f64> {
            let d = theta - m;
            Ok(-0.5 * d.dot(&d))
        }

        fn check(&self, _: &Theta, _: &Theta) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, m: &Theta) -> OptResult<Grad> {
            if self.analytic { Ok(m - theta) } else { Err(OptError::GradientNotImplemented) }
        }
    }

    // Undefined for θ₀ ≤ 0.
    struct LogBarrier;

    impl LogLikelihood for LogBarrier {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            if theta[0] <= 0.0 {
                return Err(OptError::InvalidThetaInput { index: 0, value: theta[0] });
            }
            Ok(theta[0].ln())
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Cost and gradient carry the minimization sign, with or without an
    // analytic gradient.
    fn adapter_flips_signs_for_minimization() {
        let m = array![1.0, -2.0];
        let theta = array![0.0, 0.0];
        for analytic in [true, false] {
            let f = Quadratic { analytic };
            let adapter = ArgMinAdapter::new(&f, &m);
            assert_abs_diff_eq!(adapter.cost(&theta).unwrap(), 2.5, epsilon = 1e-12);
            let g = adapter.gradient(&theta).unwrap();
            assert_abs_diff_eq!(g[0], -1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(g[1], 2.0, epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Next to a domain boundary the central stencil fails and the forward
    // stencil takes over; inside the boundary the error itself surfaces.
    fn numerical_gradient_falls_back_then_reports_errors() {
        let adapter = ArgMinAdapter::new(&LogBarrier, &());

        let near_edge = array![1e-9];
        let g = adapter.gradient(&near_edge).unwrap();
        assert!(g[0].is_finite() && g[0] < 0.0);

        let outside = array![-1.0];
        let err: OptError = adapter.gradient(&outside).unwrap_err().into();
        assert!(matches!(err, OptError::InvalidThetaInput { index: 0, .. }));
    }
}
