//! stimulus — display calibration and MTF → blur-σ mapping.
//!
//! Purpose
//! -------
//! Provide the numerically precise piece upstream of stimulus rendering: the
//! Gaussian σ (in pixels) that realizes a given MTF percentage on a
//! calibrated display. Rendering itself is a host concern.
//!
//! Key behaviors
//! -------------
//! - [`DisplayCalibration`] validates pixel pitch and spatial frequency, or
//!   derives the pitch from panel size and resolution.
//! - [`mtf_to_sigma_pixels`] / [`sigma_pixels_to_mtf`] implement the closed
//!   form and its inverse.
//! - [`SigmaTable`] memoizes the closed form on a set of levels, with
//!   interpolating, clamping lookup.
//! - [`SigmaMapper`] fixes one of these paths per session and logs it.
//!
//! Invariants & assumptions
//! ------------------------
//! - No σ handed to a renderer is negative or non-finite.
//! - Invalid physical inputs fail with [`CalibrationError`] at construction.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each submodule; the σ-monotonicity and
//!   calibration-failure scenarios are repeated in the integration tests.

pub mod calibration;
pub mod errors;
pub mod mapper;
pub mod sigma;

pub use self::calibration::DisplayCalibration;
pub use self::errors::{CalibrationError, CalibrationResult};
pub use self::mapper::{SigmaMapper, SigmaStrategy};
pub use self::sigma::{mtf_to_sigma_pixels, sigma_pixels_to_mtf, SigmaEntry, SigmaTable};

pub mod prelude {
    pub use super::{
        CalibrationError, CalibrationResult, DisplayCalibration, SigmaEntry, SigmaMapper,
        SigmaStrategy, SigmaTable, mtf_to_sigma_pixels, sigma_pixels_to_mtf,
    };
}
