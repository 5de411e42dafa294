//! analysis::information — standard errors from observed information.
//!
//! Purpose
//! -------
//! Turn an observed information matrix `J(θ̂)` (the negative Hessian of the
//! total log-likelihood at the estimate) into per-parameter standard errors
//! on the unconstrained scale.
//!
//! Key behaviors
//! -------------
//! - `J` is decomposed with `nalgebra`'s symmetric eigensolver,
//!   `J = Q Λ Qᵀ`, and `Var(θ̂_i) = Σ_k Q[i,k]² / λ_k` is summed over the
//!   eigenvalues that are clearly positive.
//! - Eigenvalues at or below `EIGEN_EPS · λ_max` are dropped (a
//!   pseudo-inverse), so nearly flat directions do not produce infinite or
//!   negative variances.
//!
//! Invariants & assumptions
//! ------------------------
//! - The input is square, finite and symmetric; [`compute_hessian`] output
//!   satisfies all three.
//! - If no eigenvalue is positive the information carries no curvature and
//!   [`AnalysisError::DegenerateInformation`] is returned.
//!
//! [`compute_hessian`]: crate::optimization::loglik_optimizer::finite_diff::compute_hessian
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use crate::analysis::errors::{AnalysisError, AnalysisResult};

/// Relative cut-off for eigenvalues kept in the pseudo-inverse.
pub const EIGEN_EPS: f64 = 1e-10;

/// Standard errors `sqrt(diag(J⁺))` of an observed information matrix.
///
/// Errors
/// ------
/// - `AnalysisError::DegenerateInformation` when `J` is empty, not square,
///   non-finite, or has no positive eigenvalue.
pub fn standard_errors(observed_info: &Array2<f64>) -> AnalysisResult<Array1<f64>> {
    let n = observed_info.nrows();
    if n == 0 || observed_info.ncols() != n || observed_info.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::DegenerateInformation);
    }
    let j = DMatrix::from_fn(n, n, |r, c| observed_info[[r, c]]);
    let eigen = j.symmetric_eigen();
    let lambda_max = eigen.eigenvalues.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lambda_max <= 0.0 {
        return Err(AnalysisError::DegenerateInformation);
    }
    let cutoff = EIGEN_EPS * lambda_max;
    let q = &eigen.eigenvectors;

    let se = Array1::from_shape_fn(n, |i| {
        eigen
            .eigenvalues
            .iter()
            .enumerate()
            .filter(|(_, lambda)| **lambda > cutoff)
            .map(|(k, &lambda)| q[(i, k)] * q[(i, k)] / lambda)
            .sum::<f64>()
            .sqrt()
    });
    Ok(se)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // For a diagonal information matrix the SEs are 1/sqrt(diag).
    fn diagonal_information_gives_reciprocal_root() {
        let se = standard_errors(&array![[4.0, 0.0], [0.0, 0.25]]).unwrap();
        assert_relative_eq!(se[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(se[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A correlated 2×2 information matrix matches its explicit inverse.
    fn correlated_information_matches_inverse() {
        let j = array![[2.0, 1.0], [1.0, 2.0]];
        // J⁻¹ = [[2, −1], [−1, 2]] / 3
        let se = standard_errors(&j).unwrap();
        assert_relative_eq!(se[0], (2.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(se[1], (2.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn flat_or_malformed_information_is_degenerate() {
        assert_eq!(
            standard_errors(&Array2::zeros((2, 2))),
            Err(AnalysisError::DegenerateInformation)
        );
        assert_eq!(
            standard_errors(&array![[-1.0, 0.0], [0.0, -3.0]]),
            Err(AnalysisError::DegenerateInformation)
        );
        assert_eq!(
            standard_errors(&array![[f64::NAN]]),
            Err(AnalysisError::DegenerateInformation)
        );
    }
}
