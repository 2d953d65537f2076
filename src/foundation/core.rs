use std::sync::Arc;

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Pixel dimensions of an image or of the output canvas.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> FlipbookResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlipbookError::invalid_parameter(format!(
                "canvas dimensions must be non-zero (got {width}x{height})"
            )));
        }
        Ok(Self { width, height })
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Color layout of an [`Image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Opaque 8-bit RGB.
    Rgb8,
    /// 8-bit RGB with straight (non-premultiplied) alpha.
    Rgba8,
}

/// Decoded, immutable raster image.
///
/// Pixels live behind an [`Arc`], so cloning an `Image` shares the buffer instead of copying
/// it. Nothing hands out mutable access to the pixels; every derived image (resized, blended,
/// cropped) is a new buffer.
#[derive(Clone, Debug)]
pub struct Image {
    pixels: Arc<DynamicImage>,
}

impl Image {
    /// Wrap a decoded image, converting it to [`ColorMode::Rgb8`] or [`ColorMode::Rgba8`].
    ///
    /// Gray, 16-bit and float layouts are converted; layouts with an alpha channel become
    /// `Rgba8`, everything else `Rgb8`. Zero-sized images are rejected.
    pub fn new(img: DynamicImage) -> FlipbookResult<Self> {
        if img.width() == 0 || img.height() == 0 {
            return Err(FlipbookError::invalid_parameter(format!(
                "image dimensions must be non-zero (got {}x{})",
                img.width(),
                img.height()
            )));
        }
        let img = match img {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img,
            other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
        Ok(Self::from_dynamic_unchecked(img))
    }

    /// Wrap an opaque RGB buffer.
    pub fn from_rgb8(img: RgbImage) -> FlipbookResult<Self> {
        Self::new(DynamicImage::ImageRgb8(img))
    }

    /// Wrap an RGBA buffer.
    pub fn from_rgba8(img: RgbaImage) -> FlipbookResult<Self> {
        Self::new(DynamicImage::ImageRgba8(img))
    }

    /// Callers guarantee non-zero dimensions and an `Rgb8`/`Rgba8` layout.
    pub(crate) fn from_dynamic_unchecked(img: DynamicImage) -> Self {
        debug_assert!(img.width() > 0 && img.height() > 0);
        debug_assert!(matches!(
            img,
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_)
        ));
        Self {
            pixels: Arc::new(img),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Pixel dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Color layout of the pixel buffer.
    pub fn color_mode(&self) -> ColorMode {
        match self.pixels.as_ref() {
            DynamicImage::ImageRgba8(_) => ColorMode::Rgba8,
            _ => ColorMode::Rgb8,
        }
    }

    /// Borrow the underlying `image` buffer.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Copy the pixels out as opaque RGB (alpha is dropped, not composited).
    pub fn to_rgb8(&self) -> RgbImage {
        self.pixels.to_rgb8()
    }

    /// Copy the pixels out as RGBA (opaque images get alpha 255).
    pub fn to_rgba8(&self) -> RgbaImage {
        self.pixels.to_rgba8()
    }

    /// Return an `Image` backed by a fresh copy of the pixel buffer.
    pub fn deep_copy(&self) -> Self {
        Self::from_dynamic_unchecked(self.pixels.as_ref().clone())
    }

    /// Return `true` when both values point at the same pixel buffer.
    pub fn shares_buffer(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
