//! ado::validation — shared input guards for engine configuration and trials.
//!
//! Purpose
//! -------
//! Centralize the scalar checks used while building an engine (range bounds,
//! grid resolution, design step, credible mass, convergence criteria) and
//! while accepting a trial (design bounds). Keeping them here gives every
//! constructor the same error semantics.
//!
//! Key behaviors
//! -------------
//! - Reject non-finite bounds before any ordering comparison is made, so a
//!   NaN never slips through a `lower < upper` test.
//! - Map each violated condition onto a specific [`ADOError`] variant that
//!   names the axis and the offending value.
//!
//! Invariants & assumptions
//! ------------------------
//! - Ranges are closed intervals `[lower, upper]` with `lower < upper`.
//! - Design membership is checked against the bounds with a small absolute
//!   tolerance ([`DESIGN_TOL`]) so that values produced by stepping
//!   `lower + k · step` are never rejected because of rounding.
//!
//! Testing notes
//! -------------
//! - Unit tests cover every error branch and the tolerance at the bounds.
use crate::ado::errors::{ADOError, ADOResult};

/// Absolute tolerance used when comparing designs against bounds.
pub const DESIGN_TOL: f64 = 1e-9;

/// Largest number of candidate designs a stepped design space may hold.
pub const MAX_DESIGNS: usize = 100_000;

/// Largest `|designs| · |grid|` product accepted for the likelihood table.
///
/// The table stores three `f64` per cell, so this caps it at about 240 MB.
pub const MAX_TABLE_CELLS: usize = 10_000_000;

/// Validate a closed range `[lower, upper]` for the named axis.
///
/// # Errors
/// - [`ADOError::NonFiniteBound`] if either bound is NaN/±inf.
/// - [`ADOError::InvalidRange`] if `lower >= upper`.
pub fn validate_range(axis: &'static str, lower: f64, upper: f64) -> ADOResult<()> {
    for value in [lower, upper] {
        if !value.is_finite() {
            return Err(ADOError::NonFiniteBound { axis, value });
        }
    }
    if lower >= upper {
        return Err(ADOError::InvalidRange { axis, lower, upper });
    }
    Ok(())
}

/// Validate the number of grid points on an axis (must be > 0).
pub fn validate_points(axis: &'static str, points: usize) -> ADOResult<()> {
    if points == 0 {
        return Err(ADOError::InvalidResolution { axis, points });
    }
    Ok(())
}

/// Validate a design-space step (finite and > 0).
pub fn validate_step(step: f64) -> ADOResult<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(ADOError::InvalidStep { step });
    }
    Ok(())
}

/// Number of designs `lower, lower + step, …` not exceeding `upper`.
///
/// The count is formed in `f64` and checked before it becomes a `usize`.
///
/// # Errors
/// - [`ADOError::InvalidStep`] for a non-finite or non-positive step.
/// - [`ADOError::TooManyDesigns`] when the count is non-finite or above
///   [`MAX_DESIGNS`].
pub fn design_count(lower: f64, upper: f64, step: f64) -> ADOResult<usize> {
    validate_step(step)?;
    let count = ((upper - lower) / step + DESIGN_TOL).floor() + 1.0;
    if !count.is_finite() || count > MAX_DESIGNS as f64 {
        return Err(ADOError::TooManyDesigns { step, count, max: MAX_DESIGNS });
    }
    Ok(count as usize)
}

/// Validate the likelihood-table size `designs · thresholds · slopes`.
///
/// # Errors
/// [`ADOError::TableTooLarge`] when the product exceeds [`MAX_TABLE_CELLS`].
pub fn validate_table_size(designs: usize, thresholds: usize, slopes: usize) -> ADOResult<()> {
    let grid_cells = thresholds.saturating_mul(slopes);
    if designs.saturating_mul(grid_cells) > MAX_TABLE_CELLS {
        return Err(ADOError::TableTooLarge { designs, grid_cells, max: MAX_TABLE_CELLS });
    }
    Ok(())
}

/// Validate a credible mass in the open interval (0, 1).
pub fn validate_credible_mass(mass: f64) -> ADOResult<()> {
    if !mass.is_finite() || mass <= 0.0 || mass >= 1.0 {
        return Err(ADOError::InvalidCredibleMass { value: mass });
    }
    Ok(())
}

/// Validate a convergence criterion (finite and > 0).
pub fn validate_criterion(name: &'static str, value: f64) -> ADOResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ADOError::InvalidCriterion { name, value });
    }
    Ok(())
}

/// Validate that `design` lies inside `[lower, upper]` (with [`DESIGN_TOL`]).
///
/// # Errors
/// [`ADOError::InvalidDesign`] for non-finite designs or designs outside the
/// bounds.
pub fn validate_design(design: f64, lower: f64, upper: f64) -> ADOResult<()> {
    if !design.is_finite() || design < lower - DESIGN_TOL || design > upper + DESIGN_TOL {
        return Err(ADOError::InvalidDesign { design, lower, upper });
    }
    Ok(())
}
