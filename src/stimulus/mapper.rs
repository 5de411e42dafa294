//! stimulus::mapper — one σ computation path per session.
//!
//! The renderer asks a [`SigmaMapper`] for σ at each trial. Which path answers
//! (precomputed table or closed form) is decided once, when the mapper is
//! built, and logged at `info!`; there is no per-call fallback between paths.
use tracing::info;

use crate::stimulus::{
    calibration::DisplayCalibration,
    errors::CalibrationResult,
    sigma::{mtf_to_sigma_pixels, SigmaTable},
};

/// How σ is obtained for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SigmaStrategy {
    /// Precomputed levels; interpolated between, clamped outside.
    #[default]
    LookupTable,
    /// Closed form at every call.
    ClosedForm,
}

impl SigmaStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            SigmaStrategy::LookupTable => "lookup_table",
            SigmaStrategy::ClosedForm => "closed_form",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Backend {
    Table(SigmaTable),
    Formula(DisplayCalibration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SigmaMapper {
    backend: Backend,
}

impl SigmaMapper {
    /// Build a mapper for `calibration` with the chosen `strategy`.
    ///
    /// `levels` is used by [`SigmaStrategy::LookupTable`] only; `None` means
    /// [`SigmaTable::default_levels`].
    ///
    /// # Errors
    /// Table construction errors (`EmptyLevels`, `InvalidLevel`).
    pub fn new(
        calibration: DisplayCalibration, strategy: SigmaStrategy, levels: Option<&[f64]>,
    ) -> CalibrationResult<Self> {
        let backend = match strategy {
            SigmaStrategy::LookupTable => {
                let table = match levels {
                    Some(levels) => SigmaTable::from_calibration(&calibration, levels)?,
                    None => SigmaTable::from_calibration(&calibration, &SigmaTable::default_levels())?,
                };
                Backend::Table(table)
            }
            SigmaStrategy::ClosedForm => Backend::Formula(calibration),
        };
        let mapper = SigmaMapper { backend };
        mapper.log_selection();
        Ok(mapper)
    }

    /// Mapper answering from an existing table.
    pub fn from_table(table: SigmaTable) -> Self {
        let mapper = SigmaMapper { backend: Backend::Table(table) };
        mapper.log_selection();
        mapper
    }

    fn log_selection(&self) {
        let cal = self.calibration();
        let levels = match &self.backend {
            Backend::Table(t) => t.len(),
            Backend::Formula(_) => 0,
        };
        info!(
            strategy = self.strategy().name(),
            pixel_size_mm = cal.pixel_size_mm(),
            frequency_lpmm = cal.frequency_lpmm(),
            levels,
            "sigma strategy selected"
        );
    }

    pub fn strategy(&self) -> SigmaStrategy {
        match self.backend {
            Backend::Table(_) => SigmaStrategy::LookupTable,
            Backend::Formula(_) => SigmaStrategy::ClosedForm,
        }
    }

    pub fn calibration(&self) -> &DisplayCalibration {
        match &self.backend {
            Backend::Table(t) => t.calibration(),
            Backend::Formula(c) => c,
        }
    }

    /// The table behind a [`SigmaStrategy::LookupTable`] mapper.
    pub fn table(&self) -> Option<&SigmaTable> {
        match &self.backend {
            Backend::Table(t) => Some(t),
            Backend::Formula(_) => None,
        }
    }

    /// σ (pixels) for `mtf_percent`.
    ///
    /// # Errors
    /// Only the closed-form path can fail (`InvalidMtf` for NaN or ≤ 0); the
    /// table path clamps instead.
    pub fn sigma_for(&self, mtf_percent: f64) -> CalibrationResult<f64> {
        match &self.backend {
            Backend::Table(t) => Ok(t.lookup(mtf_percent)),
            Backend::Formula(c) => mtf_to_sigma_pixels(mtf_percent, c),
        }
    }
}
