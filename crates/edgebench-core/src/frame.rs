use std::ops::Range;

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use crate::consts::MIN_IMAGE_SIDE;
use crate::error::{EdgeBenchError, Result};

/// A square single-channel 8-bit image.
///
/// Pixel data is row-major with shape `(side, side)`; `(row, col)` maps to
/// the flat offset `row * side + col`. The side is validated at
/// construction so every instance has at least one interior pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GreyImage {
    data: Array2<u8>,
}

impl GreyImage {
    /// All-zero image of the given side.
    pub fn zeros(side: usize) -> Result<Self> {
        validate_side(side)?;
        Ok(Self {
            data: Array2::zeros((side, side)),
        })
    }

    /// Image with every sample set to `value`.
    pub fn filled(side: usize, value: u8) -> Result<Self> {
        validate_side(side)?;
        Ok(Self {
            data: Array2::from_elem((side, side), value),
        })
    }

    /// Wrap a row-major byte buffer of exactly `side * side` samples.
    pub fn from_raw(side: usize, bytes: Vec<u8>) -> Result<Self> {
        validate_side(side)?;
        let data = Array2::from_shape_vec((side, side), bytes).map_err(|_| {
            EdgeBenchError::InvalidDimensions { side }
        })?;
        Ok(Self { data })
    }

    /// Build an image from a per-pixel function of `(row, col)`.
    pub fn from_fn(side: usize, f: impl FnMut((usize, usize)) -> u8) -> Result<Self> {
        validate_side(side)?;
        Ok(Self {
            data: Array2::from_shape_fn((side, side), f),
        })
    }

    /// All-zero image with the same side as `self`.
    pub fn blank_like(&self) -> Self {
        Self {
            data: Array2::zeros(self.data.dim()),
        }
    }

    pub fn side(&self) -> usize {
        self.data.nrows()
    }

    /// Total number of samples (side^2).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[[row, col]]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[[row, col]] = value;
    }

    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }

    pub(crate) fn view_mut(&mut self) -> ArrayViewMut2<'_, u8> {
        self.data.view_mut()
    }

    /// Row-major sample bytes, the on-disk and on-device layout.
    pub fn as_bytes(&self) -> &[u8] {
        self.data
            .as_slice()
            .expect("GreyImage is always in standard layout")
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let (bytes, _offset) = self.data.into_raw_vec_and_offset();
        bytes
    }

    /// Row (and column) indices whose 3x3 neighbourhood is fully in bounds.
    pub fn interior(&self) -> Range<usize> {
        1..self.side() - 1
    }

    /// 3x3 neighbourhood centred on an interior pixel, widened to `i32`.
    pub fn neighborhood(&self, row: usize, col: usize) -> [[i32; 3]; 3] {
        let mut patch = [[0i32; 3]; 3];
        for (i, patch_row) in patch.iter_mut().enumerate() {
            for (j, value) in patch_row.iter_mut().enumerate() {
                *value = self.data[[row + i - 1, col + j - 1]] as i32;
            }
        }
        patch
    }
}

/// Check that a side length can hold a 3x3 neighbourhood and that
/// `side * side` is representable.
pub fn validate_side(side: usize) -> Result<()> {
    frame_len(side).map(|_| ())
}

/// Number of samples in a frame of the given side.
pub fn frame_len(side: usize) -> Result<usize> {
    if side < MIN_IMAGE_SIDE {
        return Err(EdgeBenchError::InvalidDimensions { side });
    }
    side.checked_mul(side)
        .ok_or(EdgeBenchError::InvalidDimensions { side })
}
