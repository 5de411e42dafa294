//! stimulus::calibration — physical display parameters.
//!
//! Purpose
//! -------
//! Carry the two scalars the MTF → σ formula needs: the pixel pitch of the
//! panel (mm) and the spatial frequency at which MTF is specified (lp/mm).
//!
//! Key behaviors
//! -------------
//! - [`DisplayCalibration::new`] takes both scalars directly.
//! - [`DisplayCalibration::from_panel`] derives the pixel pitch from the panel
//!   diagonal and native resolution:
//!   `pixel_size_mm = diagonal_in · 25.4 / hypot(h_px, v_px)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Both fields are finite and > 0 for every constructed value; there is no
//!   way to build an invalid calibration.
//! - Pixels are assumed square.
use crate::stimulus::errors::{CalibrationError, CalibrationResult};

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Validated display calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayCalibration {
    pixel_size_mm: f64,
    frequency_lpmm: f64,
}

impl DisplayCalibration {
    /// Validated constructor.
    ///
    /// Errors
    /// ------
    /// - `CalibrationError::NonPositivePixelSize` if `pixel_size_mm` is not
    ///   finite or ≤ 0.
    /// - `CalibrationError::NonPositiveFrequency` if `frequency_lpmm` is not
    ///   finite or ≤ 0.
    pub fn new(pixel_size_mm: f64, frequency_lpmm: f64) -> CalibrationResult<Self> {
        if !pixel_size_mm.is_finite() || pixel_size_mm <= 0.0 {
            return Err(CalibrationError::NonPositivePixelSize { value: pixel_size_mm });
        }
        if !frequency_lpmm.is_finite() || frequency_lpmm <= 0.0 {
            return Err(CalibrationError::NonPositiveFrequency { value: frequency_lpmm });
        }
        Ok(DisplayCalibration { pixel_size_mm, frequency_lpmm })
    }

    /// Calibration from the panel diagonal (inches) and native resolution.
    ///
    /// Errors
    /// ------
    /// - `CalibrationError::InvalidPanel` for a non-positive diagonal or a
    ///   zero resolution.
    /// - Errors of [`DisplayCalibration::new`] for the derived values.
    pub fn from_panel(
        diagonal_inches: f64, horizontal_px: u32, vertical_px: u32, frequency_lpmm: f64,
    ) -> CalibrationResult<Self> {
        if !diagonal_inches.is_finite() || diagonal_inches <= 0.0 {
            return Err(CalibrationError::InvalidPanel { reason: "diagonal must be finite and > 0" });
        }
        if horizontal_px == 0 || vertical_px == 0 {
            return Err(CalibrationError::InvalidPanel { reason: "resolution must be non-zero" });
        }
        let diagonal_px = f64::from(horizontal_px).hypot(f64::from(vertical_px));
        Self::new(diagonal_inches * MM_PER_INCH / diagonal_px, frequency_lpmm)
    }

    pub fn pixel_size_mm(&self) -> f64 {
        self.pixel_size_mm
    }

    pub fn frequency_lpmm(&self) -> f64 {
        self.frequency_lpmm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_non_positive_or_non_finite_inputs() {
        assert!(matches!(
            DisplayCalibration::new(0.0, 22.0),
            Err(CalibrationError::NonPositivePixelSize { .. })
        ));
        assert!(matches!(
            DisplayCalibration::new(0.1556, -1.0),
            Err(CalibrationError::NonPositiveFrequency { .. })
        ));
        assert!(DisplayCalibration::new(f64::NAN, 22.0).is_err());
        assert!(DisplayCalibration::new(0.1556, f64::INFINITY).is_err());
    }

    #[test]
    // Purpose
    // -------
    // A 27" 2560×1440 panel has a ≈ 0.2331 mm pixel pitch.
    fn from_panel_derives_pixel_pitch() {
        let cal = DisplayCalibration::from_panel(27.0, 2560, 1440, 22.0).unwrap();
        let expected = 27.0 * 25.4 / (2560.0_f64.powi(2) + 1440.0_f64.powi(2)).sqrt();
        assert_relative_eq!(cal.pixel_size_mm(), expected, epsilon = 1e-15);
        assert!((cal.pixel_size_mm() - 0.2331).abs() < 1e-3);
        assert_eq!(cal.frequency_lpmm(), 22.0);

        assert!(matches!(
            DisplayCalibration::from_panel(27.0, 0, 1440, 22.0),
            Err(CalibrationError::InvalidPanel { .. })
        ));
    }
}
