use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Image;
use crate::foundation::error::FlipbookResult;

/// Decode an encoded raster (PNG, JPEG, GIF, BMP, ...) into an [`Image`].
///
/// Alpha-carrying layouts become `Rgba8`, everything else `Rgb8`. Animated inputs contribute
/// their first frame only.
pub fn decode_image(bytes: &[u8]) -> FlipbookResult<Image> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Image::new(dyn_img)
}

/// Read and decode the image at `path`; the format is guessed from the content.
#[tracing::instrument]
pub fn load_image(path: &Path) -> FlipbookResult<Image> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let dyn_img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    let img = Image::new(dyn_img)?;
    tracing::debug!(canvas = %img.canvas(), "loaded image");
    Ok(img)
}
