use std::path::Path;

use image::{GrayImage, ImageFormat};

use crate::error::{EdgeBenchError, Result};
use crate::frame::GreyImage;

/// Save a frame as 8-bit grayscale PNG for visual inspection.
pub fn save_png(frame: &GreyImage, path: &Path) -> Result<()> {
    let side = frame.side() as u32;
    let img = GrayImage::from_raw(side, side, frame.as_bytes().to_vec()).ok_or(
        EdgeBenchError::InvalidDimensions {
            side: frame.side(),
        },
    )?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Load an 8-bit grayscale image file (PNG, TIFF, ...) as a square frame.
pub fn load_image(path: &Path) -> Result<GreyImage> {
    let img = image::open(path)?.into_luma8();
    let (w, h) = img.dimensions();
    if w != h {
        return Err(EdgeBenchError::DimensionMismatch {
            left: w as usize,
            right: h as usize,
        });
    }
    GreyImage::from_raw(w as usize, img.into_raw())
}
