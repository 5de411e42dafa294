//! Numerical Hessians for post-fit uncertainty.
//!
//! The Hessian is obtained by differentiating a gradient map. A central
//! stencil is tried first; if it produces a non-finite entry (typically a
//! step crossing a domain edge) a forward stencil is used instead. The result
//! is validated and symmetrized before it is returned.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        types::{Grad, Hessian, Theta},
        validation::validate_hessian,
    },
};
use finitediff::FiniteDiff;

/// Finite-difference Hessian of the function whose gradient is `grad`.
///
/// Errors
/// ------
/// - `OptError::InvalidHessian` when both stencils leave a non-finite entry.
/// - `OptError::HessianDimMismatch` when `grad` returns the wrong length.
pub fn compute_hessian<G: Fn(&Theta) -> Grad>(grad: &G, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(grad);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(grad);
        validate_hessian(&hess, dim)?;
    }
    symmetrize(&mut hess);
    Ok(hess)
}

fn symmetrize(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
