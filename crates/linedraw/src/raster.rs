//! Image decoding, fitting and grayscale conversion.
//!
//! Produces the [`PixelGrid`] the pipeline consumes: any image the `image`
//! crate can decode (PNG, JPEG, BMP, WebP) is shrunk so both sides fit
//! inside `max_size`, never enlarged, and converted to 8-bit luminance.

use image::DynamicImage;
use image::imageops::FilterType;
use linedraw_pipeline::{PipelineError, PixelGrid};

/// Resampling filter used when shrinking.
const FILTER: FilterType = FilterType::Triangle;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("image data is empty")]
    EmptyInput,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Grid(#[from] PipelineError),
}

/// Decode `bytes` and build a grayscale grid fitting `max_size`.
///
/// # Errors
///
/// Returns [`RasterError::EmptyInput`] for empty input,
/// [`RasterError::Decode`] if the format is unrecognized or the data is
/// corrupt, and [`RasterError::Grid`] if the decoded image has a zero
/// dimension.
pub fn load_grid(bytes: &[u8], max_size: u32) -> Result<PixelGrid, RasterError> {
    if bytes.is_empty() {
        return Err(RasterError::EmptyInput);
    }
    let image = image::load_from_memory(bytes)?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        max_size,
        "decoded image"
    );
    to_grid(&fit(image, max_size))
}

/// Shrink `image` so its longest side is at most `max_size`, keeping the
/// aspect ratio. Smaller images are returned unchanged.
#[must_use]
pub fn fit(image: DynamicImage, max_size: u32) -> DynamicImage {
    if image.width().max(image.height()) <= max_size {
        return image;
    }
    image.resize(max_size, max_size, FILTER)
}

/// Luminance conversion into a row-major grid.
///
/// # Errors
///
/// Returns [`RasterError::Grid`] if the image has a zero dimension.
pub fn to_grid(image: &DynamicImage) -> Result<PixelGrid, RasterError> {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    Ok(PixelGrid::new(width, height, gray.into_raw())?)
}
