//! ado::information — entropy and expected information gain on the grid.
//!
//! Purpose
//! -------
//! Score every candidate design by the mutual information between the
//! next response and the parameter posterior, and pick the most informative
//! one. This is the per-trial cost driver of the engine.
//!
//! Key behaviors
//! -------------
//! - [`LikelihoodTable`] precomputes, once per engine, `P(clear)` and the
//!   negative conditional response entropy `q ln q + (1 − q) ln(1 − q)` for
//!   every (design, threshold, slope) triple. Neither depends on the
//!   posterior, so a trial only pays for weighted sums.
//! - [`mutual_information`] evaluates, for one design `d` with marginal
//!   `m = Σ p · q`,
//!   `MI(d) = H_b(m) + Σ p · [q ln q + (1 − q) ln(1 − q)]`,
//!   i.e. the marginal response entropy minus the expected conditional
//!   response entropy. This equals the expected reduction in posterior
//!   entropy and avoids forming the two hypothetical posteriors.
//! - [`design_utilities`] scores all candidates with rayon; results are
//!   collected in design order so the selection in [`best_design_index`] is
//!   identical to a serial run.
//!
//! Invariants & assumptions
//! ------------------------
//! - `0 · ln 0` is defined as 0 ([`xlogx`]), so cells with `q ∈ {0, 1}`
//!   contribute no entropy instead of producing NaN.
//! - Mutual information is mathematically ≥ 0; tiny negative values from
//!   cancellation are clamped to 0.
//! - Ties (within [`TIE_TOL`]) resolve to the smallest design.
//!
//! Conventions
//! -----------
//! - All entropies are in nats.
//! - Table axes are `[design, threshold, slope]`.
//!
//! Performance
//! -----------
//! - Table build: O(|D| · |grid|) model evaluations, once.
//! - Scoring: O(|D| · |grid|) multiply-adds per trial, parallel over designs.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the `xlogx` edge case, the entropy of known
//!   distributions, MI against a brute-force posterior-entropy computation,
//!   MI vanishing for an uninformative design, and the tie-break rule.
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, Zip};
use rayon::prelude::*;

use crate::ado::{design::DesignSpace, grid::ParameterGrid, psychometric::PsychometricModel};

/// Absolute tolerance under which two utilities count as tied.
pub const TIE_TOL: f64 = 1e-12;

/// `x ln x` with the continuous extension `0 ln 0 = 0`.
#[inline]
pub fn xlogx(x: f64) -> f64 {
    if x > 0.0 { x * x.ln() } else { 0.0 }
}

/// Entropy (nats) of a Bernoulli(p) variable given both probabilities.
#[inline]
pub fn binary_entropy(p: f64, q: f64) -> f64 {
    -(xlogx(p) + xlogx(q))
}

/// Shannon entropy (nats) of a normalized weight array.
pub fn shannon_entropy(weights: ArrayView2<'_, f64>) -> f64 {
    -weights.iter().map(|&w| xlogx(w)).sum::<f64>()
}

/// Per-design likelihoods and conditional entropies over the grid.
#[derive(Debug, Clone)]
pub struct LikelihoodTable {
    p_clear: Array3<f64>,
    p_not_clear: Array3<f64>,
    neg_entropy: Array3<f64>,
}

impl LikelihoodTable {
    /// Evaluate `model` at every design and grid cell.
    pub fn build(model: &PsychometricModel, designs: &DesignSpace, grid: &ParameterGrid) -> Self {
        let (nt, ns) = grid.shape();
        let shape = (designs.len(), nt, ns);
        let thresholds = grid.thresholds();
        let slopes = grid.slopes();
        let d = designs.values();

        let mut p_clear = Array3::zeros(shape);
        let mut p_not_clear = Array3::zeros(shape);
        let mut neg_entropy = Array3::zeros(shape);
        Zip::indexed(&mut p_clear).and(&mut p_not_clear).and(&mut neg_entropy).for_each(
            |(k, i, j), pc, pn, ne| {
                let (clear, not_clear) = model.p_pair(d[k], thresholds[i], slopes[j]);
                *pc = clear;
                *pn = not_clear;
                *ne = xlogx(clear) + xlogx(not_clear);
            },
        );
        LikelihoodTable { p_clear, p_not_clear, neg_entropy }
    }

    pub fn n_designs(&self) -> usize {
        self.p_clear.len_of(Axis(0))
    }

    /// `P(clear | d_k, ·, ·)` over the grid.
    pub fn p_clear(&self, k: usize) -> ArrayView2<'_, f64> {
        self.p_clear.index_axis(Axis(0), k)
    }

    /// `P(not clear | d_k, ·, ·)` over the grid.
    pub fn p_not_clear(&self, k: usize) -> ArrayView2<'_, f64> {
        self.p_not_clear.index_axis(Axis(0), k)
    }
}

/// Mutual information between the response at design `k` and the parameters.
pub fn mutual_information(posterior: ArrayView2<'_, f64>, table: &LikelihoodTable, k: usize) -> f64 {
    let mut marginal_clear = 0.0;
    let mut marginal_not = 0.0;
    let mut expected_neg_entropy = 0.0;
    Zip::from(posterior)
        .and(table.p_clear(k))
        .and(table.p_not_clear(k))
        .and(table.neg_entropy.index_axis(Axis(0), k))
        .for_each(|&p, &qc, &qn, &ne| {
            marginal_clear += p * qc;
            marginal_not += p * qn;
            expected_neg_entropy += p * ne;
        });
    (binary_entropy(marginal_clear, marginal_not) + expected_neg_entropy).max(0.0)
}

/// Mutual information for every candidate design, in design order.
pub fn design_utilities(posterior: ArrayView2<'_, f64>, table: &LikelihoodTable) -> Array1<f64> {
    let scores: Vec<f64> = (0..table.n_designs())
        .into_par_iter()
        .map(|k| mutual_information(posterior, table, k))
        .collect();
    Array1::from_vec(scores)
}

/// Index of the largest utility; ties within [`TIE_TOL`] go to the lowest index.
///
/// Returns `None` for an empty slice.
pub fn best_design_index(utilities: &Array1<f64>) -> Option<usize> {
    let mut iter = utilities.iter().enumerate();
    let (mut best_k, mut best_u) = iter.next().map(|(k, &u)| (k, u))?;
    for (k, &u) in iter {
        if u > best_u + TIE_TOL {
            best_k = k;
            best_u = u;
        }
    }
    Some(best_k)
}

/// Posterior-predictive `Σ p · q` for one design evaluated directly by the model.
pub fn predictive_clear(
    posterior: ArrayView2<'_, f64>, model: &PsychometricModel, grid: &ParameterGrid, design: f64,
) -> f64 {
    let slopes = grid.slopes();
    grid.thresholds()
        .iter()
        .zip(posterior.axis_iter(Axis(0)))
        .map(|(&t, row)| {
            row.iter().zip(slopes.iter()).map(|(&p, &s)| p * model.p_clear(design, t, s)).sum::<f64>()
        })
        .sum()
}

/// Likelihood of `clear`/`not clear` at `design` for every grid cell.
pub(crate) fn likelihood_grid(
    model: &PsychometricModel, grid: &ParameterGrid, design: f64, clear: bool,
) -> Array2<f64> {
    let thresholds = grid.thresholds();
    let slopes = grid.slopes();
    Array2::from_shape_fn(grid.shape(), |(i, j)| {
        let (c, n) = model.p_pair(design, thresholds[i], slopes[j]);
        if clear { c } else { n }
    })
}
