use serde::{Deserialize, Serialize};

use crate::consts::{PSNR_PEAK_SQUARED, PSNR_PEAK_SQUARED_8BIT};
use crate::error::{EdgeBenchError, Result};
use crate::frame::GreyImage;

/// Denominator used to turn the interior squared-error sum into an MSE.
///
/// Only interior pixels contribute to the sum. `FullFrame` still divides
/// by side^2, which is how the existing golden-data PSNR figures were
/// produced; `Interior` divides by the number of summed pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MseDivisor {
    #[default]
    FullFrame,
    Interior,
}

impl MseDivisor {
    pub fn pixel_count(&self, side: usize) -> f64 {
        match self {
            Self::FullFrame => (side as f64).powi(2),
            Self::Interior => (side.saturating_sub(2) as f64).powi(2),
        }
    }
}

impl std::fmt::Display for MseDivisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullFrame => write!(f, "Full frame (N^2)"),
            Self::Interior => write!(f, "Interior ((N-2)^2)"),
        }
    }
}

/// Constants of the PSNR computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PsnrConfig {
    /// Squared peak signal value in the numerator. Must be at least 255^2,
    /// the largest possible MSE, so scores are never negative.
    pub peak_squared: f64,
    pub divisor: MseDivisor,
}

impl Default for PsnrConfig {
    fn default() -> Self {
        Self {
            peak_squared: PSNR_PEAK_SQUARED,
            divisor: MseDivisor::FullFrame,
        }
    }
}

impl PsnrConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.peak_squared.is_finite() && self.peak_squared >= PSNR_PEAK_SQUARED_8BIT) {
            return Err(EdgeBenchError::Config(format!(
                "psnr.peak_squared must be a finite value of at least {PSNR_PEAK_SQUARED_8BIT}, got {}",
                self.peak_squared
            )));
        }
        Ok(())
    }
}

/// PSNR of a computed image against a golden image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum QualityScore {
    /// Finite PSNR in decibels.
    Decibels(f64),
    /// The interiors are bit-identical (MSE = 0), PSNR is unbounded.
    Identical,
}

impl QualityScore {
    /// Decibel value, `None` for identical images.
    pub fn decibels(&self) -> Option<f64> {
        match self {
            Self::Decibels(db) => Some(*db),
            Self::Identical => None,
        }
    }

    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical)
    }

    /// True when the score reaches `threshold_db` (identical always passes).
    pub fn meets(&self, threshold_db: f64) -> bool {
        match self {
            Self::Decibels(db) => *db >= threshold_db,
            Self::Identical => true,
        }
    }
}

impl std::fmt::Display for QualityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decibels(db) => write!(f, "{db:.4} dB"),
            Self::Identical => write!(f, "identical (infinite)"),
        }
    }
}

fn ensure_same_side(a: &GreyImage, b: &GreyImage) -> Result<usize> {
    if a.side() != b.side() {
        return Err(EdgeBenchError::DimensionMismatch {
            left: a.side(),
            right: b.side(),
        });
    }
    Ok(a.side())
}

/// Sum of squared sample differences over the interior region.
///
/// Border pixels are skipped; the Sobel filter never writes them.
pub fn interior_squared_error(test: &GreyImage, golden: &GreyImage) -> Result<u64> {
    let side = ensure_same_side(test, golden)?;
    let test = test.as_bytes();
    let golden = golden.as_bytes();

    let mut sum = 0u64;
    for row in 1..side - 1 {
        let start = row * side + 1;
        let end = row * side + side - 1;
        for (&t, &g) in test[start..end].iter().zip(&golden[start..end]) {
            let diff = t as i64 - g as i64;
            sum += (diff * diff) as u64;
        }
    }
    Ok(sum)
}

/// Mean squared error with the configured divisor.
pub fn mean_squared_error(test: &GreyImage, golden: &GreyImage, divisor: MseDivisor) -> Result<f64> {
    let sum = interior_squared_error(test, golden)?;
    Ok(sum as f64 / divisor.pixel_count(test.side()))
}

/// Peak signal-to-noise ratio of `test` against `golden`.
///
/// `PSNR = 10 * log10(peak_squared / MSE)`. Returns
/// [`QualityScore::Identical`] when the interiors match exactly instead of
/// dividing by zero. The result is symmetric in its two arguments.
pub fn psnr(test: &GreyImage, golden: &GreyImage, config: &PsnrConfig) -> Result<QualityScore> {
    config.validate()?;
    let mse = mean_squared_error(test, golden, config.divisor)?;
    if mse == 0.0 {
        return Ok(QualityScore::Identical);
    }
    Ok(QualityScore::Decibels(10.0 * (config.peak_squared / mse).log10()))
}
