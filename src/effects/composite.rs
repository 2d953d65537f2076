use image::{Rgb, RgbImage, RgbaImage, imageops};

use crate::effects::normalize::RESAMPLE_FILTER;
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::foundation::math::lerp_u8;

/// Fill color of every slide/grow/shrink canvas before anything is pasted.
pub const BACKGROUND_RGB: [u8; 3] = [255, 255, 255];

/// New opaque canvas filled with [`BACKGROUND_RGB`].
pub(crate) fn blank_canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(BACKGROUND_RGB))
}

/// Background canvas with `base` pasted at the origin.
pub(crate) fn canvas_with(base: &RgbImage) -> RgbImage {
    let mut canvas = blank_canvas(base.width(), base.height());
    paste(&mut canvas, base, 0, 0);
    canvas
}

/// Copy `src` into `canvas` at `(x, y)`; pixels are replaced, not blended.
///
/// Parts of `src` falling outside the canvas are clipped.
pub(crate) fn paste(canvas: &mut RgbImage, src: &RgbImage, x: u32, y: u32) {
    if src.width() == 0 || src.height() == 0 {
        return;
    }
    imageops::replace(canvas, src, i64::from(x), i64::from(y));
}

/// Paste `src` so that its center lines up with the canvas center (floor division).
pub(crate) fn paste_centered(canvas: &mut RgbImage, src: &RgbImage) {
    let left = canvas.width().saturating_sub(src.width()) / 2;
    let top = canvas.height().saturating_sub(src.height()) / 2;
    paste(canvas, src, left, top);
}

/// Copy out the `width`x`height` region starting at `(x, y)`.
pub(crate) fn crop(src: &RgbImage, x: u32, y: u32, width: u32, height: u32) -> RgbImage {
    imageops::crop_imm(src, x, y, width, height).to_image()
}

/// Stretch `src` to `width`x`height` with the shared resampling filter.
pub(crate) fn resize(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    if src.width() == width && src.height() == height {
        return src.clone();
    }
    imageops::resize(src, width, height, RESAMPLE_FILTER)
}

/// Per-channel cross-dissolve `a*(1-t) + b*t` over straight RGBA, alpha included.
pub fn crossfade_rgba(a: &RgbaImage, b: &RgbaImage, t: f64) -> FlipbookResult<RgbaImage> {
    if a.dimensions() != b.dimensions() {
        return Err(FlipbookError::validation(format!(
            "crossfade expects equal-size buffers (got {:?} and {:?})",
            a.dimensions(),
            b.dimensions()
        )));
    }
    let t = t.clamp(0.0, 1.0);
    let mut out = RgbaImage::new(a.width(), a.height());
    for ((d, a), b) in out
        .iter_mut()
        .zip(a.as_raw().iter())
        .zip(b.as_raw().iter())
    {
        *d = lerp_u8(*a, *b, t);
    }
    Ok(out)
}

/// Flatten RGBA to opaque RGB by discarding the alpha channel.
pub fn flatten_to_rgb(src: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(src.width(), src.height());
    for (d, s) in out.chunks_exact_mut(3).zip(src.as_raw().chunks_exact(4)) {
        d.copy_from_slice(&s[..3]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
