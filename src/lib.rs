//! Flipbook assembles an ordered list of still images into a looping animated GIF.
//!
//! Images live in a caller-owned [`Workspace`], each tagged with the [`TransitionKind`] used when
//! moving on to the next image. The public API is pipeline-oriented:
//!
//! - Build a [`Workspace`] by hand or load a [`Project`] manifest
//! - Lay out the output with [`plan_sequence`], or render it with [`build`] / [`render_frame`]
//! - Stream the frames into a [`FrameSink`] such as [`GifSink`] via [`export`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod compile;
pub(crate) mod composition;
pub(crate) mod effects;
pub(crate) mod encode;
pub(crate) mod project;
pub(crate) mod render;

pub use crate::foundation::core::{Canvas, ColorMode, Image};
pub use crate::foundation::error::{FlipbookError, FlipbookResult};

pub use crate::assets::decode::{decode_image, load_image};
pub use crate::compile::plan::{FrameSlot, SequencePlan, plan_sequence};
pub use crate::composition::workspace::{Workspace, WorkspaceEntry};
pub use crate::effects::composite::{BACKGROUND_RGB, crossfade_rgba, flatten_to_rgb};
pub use crate::effects::normalize::normalize;
pub use crate::effects::transitions::{
    TransitionKind, generate, parse_transition_kind, transition_frame,
};
pub use crate::encode::gif::{DEFAULT_GIF_SPEED, GifSink, GifSinkOpts};
pub use crate::encode::settings::{
    DEFAULT_FRAME_DURATION_MS, DEFAULT_LOOP_COUNT, DEFAULT_TRANSITION_FRAMES, ExportSettings,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::project::manifest::{
    ExportDef, ImageEntryDef, Project, ProjectDef, normalize_rel_path,
};
pub use crate::render::pipeline::{
    BuildOpts, ExportStats, FrameSequence, build, build_with_opts, export, export_sequence,
    render_frame,
};
