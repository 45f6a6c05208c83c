use ndarray::Axis;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::consts::{HORIZONTAL_OPERATOR, MAX_SAMPLE, PARALLEL_PIXEL_THRESHOLD, VERTICAL_OPERATOR};
use crate::frame::GreyImage;

use super::convolution::convolve3x3;

/// How the software reference path is executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoftwareMode {
    /// Single thread, the configuration the reference timings were taken with.
    #[default]
    Sequential,
    /// Rows split across the Rayon pool for large images.
    Parallel,
}

impl std::fmt::Display for SoftwareMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "Sequential"),
            Self::Parallel => write!(f, "Parallel"),
        }
    }
}

/// Combine the two gradient responses into an output sample.
///
/// The magnitude is computed in `f64`, truncated toward zero and clipped
/// to 255. Truncation (not rounding) is what the golden data was produced
/// with.
pub fn gradient_magnitude(gx: i32, gy: i32) -> u8 {
    let gx = gx as f64;
    let gy = gy as f64;
    let magnitude = (gx * gx + gy * gy).sqrt() as u32;
    magnitude.min(MAX_SAMPLE as u32) as u8
}

/// Sobel output sample for one interior pixel.
pub fn sobel_pixel(input: &GreyImage, row: usize, col: usize) -> u8 {
    let gx = convolve3x3(input, row, col, &HORIZONTAL_OPERATOR);
    let gy = convolve3x3(input, row, col, &VERTICAL_OPERATOR);
    gradient_magnitude(gx, gy)
}

/// Sobel edge magnitude image.
///
/// Returns an image of the same side as `input`. The 1-pixel border is
/// left at zero.
pub fn sobel(input: &GreyImage) -> GreyImage {
    let mut output = input.blank_like();

    for row in input.interior() {
        for col in input.interior() {
            output.set(row, col, sobel_pixel(input, row, col));
        }
    }

    output
}

/// Row-parallel variant of [`sobel`] with bit-identical output.
///
/// Falls back to the sequential filter below [`PARALLEL_PIXEL_THRESHOLD`].
pub fn sobel_parallel(input: &GreyImage) -> GreyImage {
    if input.len() < PARALLEL_PIXEL_THRESHOLD {
        return sobel(input);
    }

    let side = input.side();
    let mut output = input.blank_like();

    output
        .view_mut()
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .filter(|(row, _)| *row >= 1 && *row < side - 1)
        .for_each(|(row, mut out_row)| {
            for col in 1..side - 1 {
                out_row[col] = sobel_pixel(input, row, col);
            }
        });

    output
}

/// Run the software path in the requested mode.
pub fn sobel_with_mode(input: &GreyImage, mode: SoftwareMode) -> GreyImage {
    match mode {
        SoftwareMode::Sequential => sobel(input),
        SoftwareMode::Parallel => sobel_parallel(input),
    }
}
