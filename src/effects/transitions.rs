use std::str::FromStr;

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::effects::composite::{
    canvas_with, crop, crossfade_rgba, flatten_to_rgb, paste, paste_centered, resize,
};
use crate::effects::normalize::normalize;
use crate::foundation::core::Image;
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::foundation::math::{progress, scale_len};

/// Transition applied when moving away from one image toward the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Hard cut, no synthesized frames.
    #[default]
    None,
    /// Hard cut, no synthesized frames (same output as `None`).
    Instant,
    /// Linear cross-dissolve.
    FadeIn,
    /// Next image rises from the bottom edge.
    SlideUp,
    /// Next image enters along the top edge.
    SlideDown,
    /// Next image enters from the left edge.
    SlideRight,
    /// Next image enters along the left edge from the right.
    SlideLeft,
    /// Next image grows from the center.
    Grow,
    /// Previous image shrinks into the center.
    Shrink,
}

impl TransitionKind {
    /// Every kind, in menu order.
    pub const ALL: [TransitionKind; 9] = [
        TransitionKind::None,
        TransitionKind::Instant,
        TransitionKind::FadeIn,
        TransitionKind::SlideUp,
        TransitionKind::SlideDown,
        TransitionKind::SlideRight,
        TransitionKind::SlideLeft,
        TransitionKind::Grow,
        TransitionKind::Shrink,
    ];

    /// Canonical snake_case name, as used in project files.
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionKind::None => "none",
            TransitionKind::Instant => "instant",
            TransitionKind::FadeIn => "fade_in",
            TransitionKind::SlideUp => "slide_up",
            TransitionKind::SlideDown => "slide_down",
            TransitionKind::SlideRight => "slide_right",
            TransitionKind::SlideLeft => "slide_left",
            TransitionKind::Grow => "grow",
            TransitionKind::Shrink => "shrink",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            TransitionKind::None => "None",
            TransitionKind::Instant => "Instant",
            TransitionKind::FadeIn => "Fade in",
            TransitionKind::SlideUp => "Slide up",
            TransitionKind::SlideDown => "Slide down",
            TransitionKind::SlideRight => "Slide right",
            TransitionKind::SlideLeft => "Slide left",
            TransitionKind::Grow => "Grow",
            TransitionKind::Shrink => "Shrink",
        }
    }

    /// `false` for the hard cuts (`None`, `Instant`), which never produce frames.
    pub fn synthesizes_frames(self) -> bool {
        !matches!(self, TransitionKind::None | TransitionKind::Instant)
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a transition name.
///
/// Accepts the snake_case names, the human labels (`"Fade in"`), hyphenated and unseparated
/// spellings, case-insensitively.
pub fn parse_transition_kind(name: &str) -> FlipbookResult<TransitionKind> {
    let key: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect();
    if key.is_empty() {
        return Err(FlipbookError::validation("transition kind must be non-empty"));
    }

    match key.as_str() {
        "none" => Ok(TransitionKind::None),
        "instant" => Ok(TransitionKind::Instant),
        "fadein" | "fade" => Ok(TransitionKind::FadeIn),
        "slideup" => Ok(TransitionKind::SlideUp),
        "slidedown" => Ok(TransitionKind::SlideDown),
        "slideright" => Ok(TransitionKind::SlideRight),
        "slideleft" => Ok(TransitionKind::SlideLeft),
        "grow" => Ok(TransitionKind::Grow),
        "shrink" => Ok(TransitionKind::Shrink),
        _ => Err(FlipbookError::validation(format!(
            "unknown transition kind '{}'",
            name.trim()
        ))),
    }
}

impl FromStr for TransitionKind {
    type Err = FlipbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_transition_kind(s)
    }
}

impl serde::Serialize for TransitionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for TransitionKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_transition_kind(&s).map_err(serde::de::Error::custom)
    }
}

/// Geometric transitions drawn on an opaque canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Motion {
    SlideUp,
    SlideDown,
    SlideRight,
    SlideLeft,
    Grow,
    Shrink,
}

/// How a kind produces its frames.
enum Synthesis {
    Cut,
    Fade,
    Motion(Motion),
}

impl TransitionKind {
    fn synthesis(self) -> Synthesis {
        match self {
            TransitionKind::None | TransitionKind::Instant => Synthesis::Cut,
            TransitionKind::FadeIn => Synthesis::Fade,
            TransitionKind::SlideUp => Synthesis::Motion(Motion::SlideUp),
            TransitionKind::SlideDown => Synthesis::Motion(Motion::SlideDown),
            TransitionKind::SlideRight => Synthesis::Motion(Motion::SlideRight),
            TransitionKind::SlideLeft => Synthesis::Motion(Motion::SlideLeft),
            TransitionKind::Grow => Synthesis::Motion(Motion::Grow),
            TransitionKind::Shrink => Synthesis::Motion(Motion::Shrink),
        }
    }
}

/// Pixel inputs for one `prev -> next` transition, prepared once and reused for every frame.
///
/// `next` has already been stretched to `prev`'s size.
pub(crate) struct TransitionInputs {
    pixels: PairPixels,
}

enum PairPixels {
    Cut,
    Fade {
        prev: RgbaImage,
        next: RgbaImage,
    },
    Motion {
        motion: Motion,
        prev: RgbImage,
        next: RgbImage,
    },
}

impl TransitionInputs {
    pub(crate) fn new(prev: &Image, next: &Image, kind: TransitionKind) -> FlipbookResult<Self> {
        let pixels = match kind.synthesis() {
            Synthesis::Cut => PairPixels::Cut,
            Synthesis::Fade => PairPixels::Fade {
                prev: prev.to_rgba8(),
                next: fit_to(prev, next)?.to_rgba8(),
            },
            Synthesis::Motion(motion) => PairPixels::Motion {
                motion,
                prev: prev.to_rgb8(),
                next: fit_to(prev, next)?.to_rgb8(),
            },
        };
        Ok(Self { pixels })
    }

    /// Frame `index` of a run of `frame_count` frames; `None` when nothing is synthesized.
    pub(crate) fn frame(&self, index: u32, frame_count: u32) -> FlipbookResult<Option<Image>> {
        if frame_count == 0 || index >= frame_count {
            return Ok(None);
        }
        let p = progress(index, frame_count);
        let rgb = match &self.pixels {
            PairPixels::Cut => return Ok(None),
            PairPixels::Fade { prev, next } => flatten_to_rgb(&crossfade_rgba(prev, next, p)?),
            PairPixels::Motion { motion, prev, next } => motion_frame(*motion, prev, next, p),
        };
        Ok(Some(Image::from_dynamic_unchecked(DynamicImage::ImageRgb8(
            rgb,
        ))))
    }
}

/// `next` stretched to `prev`'s size when they differ.
fn fit_to(prev: &Image, next: &Image) -> FlipbookResult<Image> {
    if next.canvas() == prev.canvas() {
        Ok(next.clone())
    } else {
        normalize(next, prev.width(), prev.height())
    }
}

fn motion_frame(motion: Motion, prev: &RgbImage, next: &RgbImage, p: f64) -> RgbImage {
    let (w, h) = prev.dimensions();
    match motion {
        Motion::SlideUp => {
            let mut canvas = canvas_with(prev);
            let offset = scale_len(h, 1.0 - p);
            let visible = h - offset;
            if visible > 0 {
                paste(&mut canvas, &crop(next, 0, 0, w, visible), 0, offset);
            }
            canvas
        }
        Motion::SlideDown => {
            let mut canvas = canvas_with(prev);
            let offset = scale_len(h, p);
            if offset < h {
                paste(&mut canvas, &crop(next, 0, offset, w, h - offset), 0, 0);
            }
            canvas
        }
        Motion::SlideRight => {
            let mut canvas = canvas_with(prev);
            let offset = scale_len(w, 1.0 - p);
            let visible = w - offset;
            if visible > 0 {
                paste(&mut canvas, &crop(next, 0, 0, visible, h), offset, 0);
            }
            canvas
        }
        Motion::SlideLeft => {
            let mut canvas = canvas_with(prev);
            let offset = scale_len(w, p);
            if offset < w {
                paste(&mut canvas, &crop(next, offset, 0, w - offset, h), 0, 0);
            }
            canvas
        }
        Motion::Grow => {
            let mut canvas = canvas_with(prev);
            let (gw, gh) = (scale_len(w, p), scale_len(h, p));
            if gw > 0 && gh > 0 {
                paste_centered(&mut canvas, &resize(next, gw, gh));
            }
            canvas
        }
        Motion::Shrink => {
            let mut canvas = canvas_with(next);
            let sw = scale_len(w, 1.0 - p).max(1);
            let sh = scale_len(h, 1.0 - p).max(1);
            paste_centered(&mut canvas, &resize(prev, sw, sh));
            canvas
        }
    }
}

/// Synthesize the frames shown between `prev` and `next`.
///
/// Returns `frame_count` frames for the compositing kinds and nothing for the hard cuts or
/// when `frame_count` is zero. Frame `i` is drawn at progress `i / frame_count`, so the last
/// frame stops short of a full `next`. A `next` of a different size is stretched to `prev`'s
/// size first. All returned frames are opaque RGB with `prev`'s dimensions.
pub fn generate(
    prev: &Image,
    next: &Image,
    kind: TransitionKind,
    frame_count: u32,
) -> FlipbookResult<Vec<Image>> {
    if !kind.synthesizes_frames() || frame_count == 0 {
        return Ok(Vec::new());
    }
    let inputs = TransitionInputs::new(prev, next, kind)?;
    let mut frames = Vec::with_capacity(frame_count as usize);
    for i in 0..frame_count {
        if let Some(frame) = inputs.frame(i, frame_count)? {
            frames.push(frame);
        }
    }
    Ok(frames)
}

/// Synthesize only frame `index` of a `frame_count`-frame run.
///
/// Returns `Ok(None)` for hard cuts; `IndexOutOfRange` when `index >= frame_count`.
pub fn transition_frame(
    prev: &Image,
    next: &Image,
    kind: TransitionKind,
    index: u32,
    frame_count: u32,
) -> FlipbookResult<Option<Image>> {
    if index >= frame_count {
        return Err(FlipbookError::index_out_of_range(
            index as usize,
            frame_count as usize,
        ));
    }
    if !kind.synthesizes_frames() {
        return Ok(None);
    }
    TransitionInputs::new(prev, next, kind)?.frame(index, frame_count)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
