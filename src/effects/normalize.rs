use image::imageops::FilterType;

use crate::foundation::core::Image;
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Resampling filter shared by every resize in the compositor.
pub(crate) const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Resize `image` to exactly `width`x`height`, ignoring aspect ratio.
///
/// When the image already has the target size the result is an independent copy of its
/// pixels, never the same buffer.
pub fn normalize(image: &Image, width: u32, height: u32) -> FlipbookResult<Image> {
    if width == 0 || height == 0 {
        return Err(FlipbookError::invalid_parameter(format!(
            "normalize target must be non-zero (got {width}x{height})"
        )));
    }
    if image.width() == width && image.height() == height {
        return Ok(image.deep_copy());
    }
    let resized = image
        .as_dynamic()
        .resize_exact(width, height, RESAMPLE_FILTER);
    Ok(Image::from_dynamic_unchecked(resized))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/normalize.rs"]
mod tests;
