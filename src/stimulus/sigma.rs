//! stimulus::sigma — MTF percentage → Gaussian blur σ.
//!
//! Purpose
//! -------
//! Convert a claimed stimulus clarity (MTF %) at the calibration frequency
//! into the standard deviation of the Gaussian kernel that produces it on the
//! calibrated display, and memoize that conversion in a [`SigmaTable`].
//!
//! Key behaviors
//! -------------
//! - A Gaussian blur of σ (mm) has MTF `exp(−2 π² σ² f²)` at frequency `f`,
//!   so [`mtf_to_sigma_pixels`] evaluates
//!   `σ_mm = sqrt(−ln(m / 100) / (2 (π f)²))` and divides by the pixel pitch.
//!   [`sigma_pixels_to_mtf`] is its inverse.
//! - [`SigmaTable`] stores `(mtf_percent, sigma_pixels)` sorted by MTF and
//!   answers [`SigmaTable::lookup`] by exact match, linear interpolation
//!   between the bracketing entries, or clamping to the nearest boundary
//!   entry outside the table. It never extrapolates.
//!
//! Invariants & assumptions
//! ------------------------
//! - σ is finite and ≥ 0 for every accepted input; `mtf ≥ 100` maps to 0,
//!   which downstream blur treats as a no-op.
//! - Table entries are strictly increasing in MTF and strictly decreasing in
//!   σ (the formula is strictly decreasing on (0, 100]).
//! - A table is immutable; a new calibration means a new table.
//!
//! Conventions
//! -----------
//! - MTF values are percentages in (0, 100]; σ is reported in pixels.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the closed form at known points, the inverse, level
//!   validation, and every lookup branch (exact, interpolated, clamped, NaN).
use std::f64::consts::PI;

use tracing::debug;

use crate::stimulus::{
    calibration::DisplayCalibration,
    errors::{CalibrationError, CalibrationResult},
};

/// σ in pixels for `mtf_percent` on `calibration`.
///
/// Errors
/// ------
/// - `CalibrationError::InvalidMtf` when `mtf_percent` is NaN or ≤ 0 (the log
///   is undefined). Values ≥ 100 (including +∞) map to σ = 0.
pub fn mtf_to_sigma_pixels(mtf_percent: f64, calibration: &DisplayCalibration) -> CalibrationResult<f64> {
    if mtf_percent.is_nan() || mtf_percent <= 0.0 {
        return Err(CalibrationError::InvalidMtf { value: mtf_percent });
    }
    if mtf_percent >= 100.0 {
        return Ok(0.0);
    }
    let f = calibration.frequency_lpmm();
    let sigma_mm = (-(mtf_percent / 100.0).ln() / (2.0 * (PI * f).powi(2))).sqrt();
    Ok(sigma_mm / calibration.pixel_size_mm())
}

/// MTF percentage produced by a blur of `sigma_pixels` on `calibration`.
///
/// Errors
/// ------
/// - `CalibrationError::InvalidSigma` for a negative or non-finite σ.
pub fn sigma_pixels_to_mtf(sigma_pixels: f64, calibration: &DisplayCalibration) -> CalibrationResult<f64> {
    if !sigma_pixels.is_finite() || sigma_pixels < 0.0 {
        return Err(CalibrationError::InvalidSigma { value: sigma_pixels });
    }
    let sigma_mm = sigma_pixels * calibration.pixel_size_mm();
    let f = calibration.frequency_lpmm();
    Ok(100.0 * (-2.0 * PI * PI * sigma_mm * sigma_mm * f * f).exp())
}

/// One precomputed conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SigmaEntry {
    pub mtf_percent: f64,
    pub sigma_pixels: f64,
}

/// Sorted MTF → σ table for one calibration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SigmaTable {
    calibration: DisplayCalibration,
    entries: Vec<SigmaEntry>,
}

impl SigmaTable {
    /// Levels 100, 95, …, 5.
    pub fn default_levels() -> Vec<f64> {
        (1..=20).rev().map(|k| 5.0 * k as f64).collect()
    }

    /// Build from raw calibration scalars.
    ///
    /// Parameters
    /// ----------
    /// - `pixel_size_mm`: `f64`
    ///   Pixel pitch; must be finite and > 0.
    /// - `frequency_lpmm`: `f64`
    ///   Frequency at which MTF is specified; must be finite and > 0.
    /// - `levels`: `&[f64]`
    ///   MTF percentages to precompute, each finite and in (0, 100]. Order
    ///   does not matter; duplicates are collapsed.
    ///
    /// Errors
    /// ------
    /// - `CalibrationError::NonPositivePixelSize` / `NonPositiveFrequency`.
    /// - `CalibrationError::EmptyLevels` / `InvalidLevel`.
    pub fn build(pixel_size_mm: f64, frequency_lpmm: f64, levels: &[f64]) -> CalibrationResult<Self> {
        let calibration = DisplayCalibration::new(pixel_size_mm, frequency_lpmm)?;
        Self::from_calibration(&calibration, levels)
    }

    /// Build for an already-validated calibration.
    pub fn from_calibration(calibration: &DisplayCalibration, levels: &[f64]) -> CalibrationResult<Self> {
        if levels.is_empty() {
            return Err(CalibrationError::EmptyLevels);
        }
        if let Some(&bad) = levels.iter().find(|&&m| !m.is_finite() || m <= 0.0 || m > 100.0) {
            return Err(CalibrationError::InvalidLevel { value: bad });
        }
        let mut sorted = levels.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();

        let entries = sorted
            .into_iter()
            .map(|mtf_percent| {
                mtf_to_sigma_pixels(mtf_percent, calibration)
                    .map(|sigma_pixels| SigmaEntry { mtf_percent, sigma_pixels })
            })
            .collect::<CalibrationResult<Vec<_>>>()?;
        Ok(SigmaTable { calibration: *calibration, entries })
    }

    /// Entries sorted by increasing MTF.
    pub fn entries(&self) -> &[SigmaEntry] {
        &self.entries
    }

    pub fn calibration(&self) -> &DisplayCalibration {
        &self.calibration
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(lowest, highest)` MTF level in the table.
    pub fn mtf_range(&self) -> (f64, f64) {
        (self.first().mtf_percent, self.last().mtf_percent)
    }

    fn first(&self) -> &SigmaEntry {
        &self.entries[0]
    }

    fn last(&self) -> &SigmaEntry {
        &self.entries[self.entries.len() - 1]
    }

    /// σ (pixels) for `mtf_percent`.
    ///
    /// Notes
    /// -----
    /// - Exact level → stored σ.
    /// - Between two levels → linear interpolation in MTF.
    /// - Below the lowest / above the highest level → that boundary entry's σ.
    ///   Clamping keeps kernels within the range the table was built for.
    /// - NaN → the lowest-MTF entry (the most blurred stimulus in the table).
    pub fn lookup(&self, mtf_percent: f64) -> f64 {
        let (lo, hi) = (self.first(), self.last());
        if mtf_percent.is_nan() {
            debug!(mtf_percent, clamped_to = lo.mtf_percent, "NaN MTF; using lowest table entry");
            return lo.sigma_pixels;
        }
        if mtf_percent <= lo.mtf_percent {
            if mtf_percent < lo.mtf_percent {
                debug!(mtf_percent, clamped_to = lo.mtf_percent, "MTF below table range; clamping");
            }
            return lo.sigma_pixels;
        }
        if mtf_percent >= hi.mtf_percent {
            if mtf_percent > hi.mtf_percent {
                debug!(mtf_percent, clamped_to = hi.mtf_percent, "MTF above table range; clamping");
            }
            return hi.sigma_pixels;
        }

        let idx = self.entries.partition_point(|e| e.mtf_percent < mtf_percent);
        let upper = &self.entries[idx];
        if upper.mtf_percent == mtf_percent {
            return upper.sigma_pixels;
        }
        let lower = &self.entries[idx - 1];
        let w = (mtf_percent - lower.mtf_percent) / (upper.mtf_percent - lower.mtf_percent);
        lower.sigma_pixels + w * (upper.sigma_pixels - lower.sigma_pixels)
    }
}
