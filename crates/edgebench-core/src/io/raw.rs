use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EdgeBenchError, Result};
use crate::frame::{frame_len, GreyImage};

/// Load a headerless `.grey` file: `side * side` row-major 8-bit samples.
///
/// A missing or unreadable file is reported as
/// [`EdgeBenchError::MissingInput`]; a file of the wrong length as
/// [`EdgeBenchError::SizeMismatch`].
pub fn load_raw(path: &Path, side: usize) -> Result<GreyImage> {
    let expected = frame_len(side)?;
    let bytes = fs::read(path).map_err(|source| EdgeBenchError::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.len() != expected {
        return Err(EdgeBenchError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            actual: bytes.len(),
        });
    }

    debug!(path = %path.display(), side, "Loaded raw frame");
    GreyImage::from_raw(side, bytes)
}

/// Write an image as headerless row-major bytes.
pub fn save_raw(image: &GreyImage, path: &Path) -> Result<()> {
    fs::write(path, image.as_bytes())?;
    debug!(path = %path.display(), side = image.side(), "Saved raw frame");
    Ok(())
}
