use rayon::prelude::*;

use crate::{
    compile::plan::{FrameSlot, SequencePlan, plan_sequence},
    composition::workspace::Workspace,
    effects::{
        normalize::normalize,
        transitions::{TransitionInputs, TransitionKind},
    },
    encode::{
        settings::ExportSettings,
        sink::{FrameSink, SinkConfig},
    },
    foundation::{
        core::{Canvas, Image},
        error::{FlipbookError, FlipbookResult},
    },
};

/// Non-empty ordered frames sharing one canvas size.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    canvas: Canvas,
    frames: Vec<Image>,
    base_frames: usize,
}

impl FrameSequence {
    /// Wrap `frames`, checking that there is at least one and that every frame has the
    /// first frame's size. All frames count as base frames.
    pub fn new(frames: Vec<Image>) -> FlipbookResult<Self> {
        let base_frames = frames.len();
        Self::with_base_frames(frames, base_frames)
    }

    pub(crate) fn with_base_frames(frames: Vec<Image>, base_frames: usize) -> FlipbookResult<Self> {
        let canvas = frames.first().ok_or(FlipbookError::EmptyInput)?.canvas();
        if let Some((i, bad)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.canvas() != canvas)
        {
            return Err(FlipbookError::validation(format!(
                "frame {i} is {}, expected {canvas}",
                bad.canvas()
            )));
        }
        let base_frames = base_frames.min(frames.len());
        Ok(Self {
            canvas,
            frames,
            base_frames,
        })
    }

    /// Shared frame size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Number of frames (at least one).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Sequences always hold at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of normalized source frames.
    pub fn base_frames(&self) -> usize {
        self.base_frames
    }

    /// Number of synthesized transition frames.
    pub fn transition_frames(&self) -> usize {
        self.frames.len() - self.base_frames
    }

    /// Borrow the frames in output order.
    pub fn frames(&self) -> &[Image] {
        &self.frames
    }

    /// Iterate frames in output order.
    pub fn iter(&self) -> std::slice::Iter<'_, Image> {
        self.frames.iter()
    }

    /// Take ownership of the frames.
    pub fn into_frames(self) -> Vec<Image> {
        self.frames
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Image;
    type IntoIter = std::slice::Iter<'a, Image>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Parallelism knobs for [`build_with_opts`] and [`export`].
#[derive(Clone, Debug, Default)]
pub struct BuildOpts {
    /// Normalize images and synthesize frames on a rayon pool.
    pub parallel: bool,
    /// Pool size; `None` lets rayon decide. `Some(0)` is rejected.
    pub threads: Option<usize>,
}

impl BuildOpts {
    /// Check options before any pixel work.
    pub fn validate(&self) -> FlipbookResult<()> {
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(FlipbookError::invalid_parameter(
                "build threads must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

/// Summary of one export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames written to the sink.
    pub frames: usize,
    /// Of which base frames.
    pub base_frames: usize,
    /// Of which synthesized transition frames.
    pub transition_frames: usize,
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
}

/// Build the full frame sequence of `workspace` sequentially.
///
/// The first entry's size is the canonical size; every entry is resized to it and each
/// adjacent pair `(i, i + 1)` is joined by `transition_frames` frames of entry `i`'s kind.
pub fn build(workspace: &Workspace, transition_frames: u32) -> FlipbookResult<FrameSequence> {
    build_with_opts(workspace, transition_frames, &BuildOpts::default())
}

/// [`build`] with optional parallelism. Output is identical to the sequential path.
#[tracing::instrument(skip(workspace), fields(entries = workspace.len()))]
pub fn build_with_opts(
    workspace: &Workspace,
    transition_frames: u32,
    opts: &BuildOpts,
) -> FlipbookResult<FrameSequence> {
    opts.validate()?;
    let plan = plan_sequence(workspace, transition_frames)?;
    tracing::debug!(
        canvas = %plan.canvas(),
        frames = plan.len(),
        transition_frames = plan.transition_frames(),
        "planned sequence"
    );

    let frames = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| render_plan_parallel(workspace, &plan))?
    } else {
        render_plan_sequential(workspace, &plan)?
    };
    FrameSequence::with_base_frames(frames, plan.entry_count())
}

fn render_plan_sequential(workspace: &Workspace, plan: &SequencePlan) -> FlipbookResult<Vec<Image>> {
    let canvas = plan.canvas();
    let bases = workspace
        .iter()
        .map(|e| normalize(e.image(), canvas.width, canvas.height))
        .collect::<FlipbookResult<Vec<_>>>()?;
    let pairs = plan
        .outgoing_kinds()
        .into_iter()
        .enumerate()
        .map(|(i, kind)| pair_inputs(kind, &bases, i))
        .collect::<FlipbookResult<Vec<_>>>()?;
    plan.slots()
        .iter()
        .map(|slot| render_slot(*slot, &bases, &pairs))
        .collect()
}

fn render_plan_parallel(workspace: &Workspace, plan: &SequencePlan) -> FlipbookResult<Vec<Image>> {
    let canvas = plan.canvas();
    let bases = workspace
        .entries()
        .par_iter()
        .map(|e| normalize(e.image(), canvas.width, canvas.height))
        .collect::<FlipbookResult<Vec<_>>>()?;
    let pairs = plan
        .outgoing_kinds()
        .into_par_iter()
        .enumerate()
        .map(|(i, kind)| pair_inputs(kind, &bases, i))
        .collect::<FlipbookResult<Vec<_>>>()?;
    plan.slots()
        .par_iter()
        .map(|slot| render_slot(*slot, &bases, &pairs))
        .collect()
}

/// Prepared inputs for the run leaving entry `i`, when the plan has one.
fn pair_inputs(
    kind: Option<TransitionKind>,
    bases: &[Image],
    i: usize,
) -> FlipbookResult<Option<TransitionInputs>> {
    match (kind, bases.get(i + 1)) {
        (Some(kind), Some(next)) => Ok(Some(TransitionInputs::new(&bases[i], next, kind)?)),
        _ => Ok(None),
    }
}

fn render_slot(
    slot: FrameSlot,
    bases: &[Image],
    pairs: &[Option<TransitionInputs>],
) -> FlipbookResult<Image> {
    match slot {
        FrameSlot::Base { entry } => bases
            .get(entry)
            .cloned()
            .ok_or_else(|| FlipbookError::index_out_of_range(entry, bases.len())),
        FrameSlot::Transition {
            from, step, steps, ..
        } => {
            let inputs = pairs
                .get(from)
                .and_then(Option::as_ref)
                .ok_or_else(|| FlipbookError::index_out_of_range(from, pairs.len()))?;
            inputs.frame(step, steps)?.ok_or_else(|| {
                FlipbookError::validation(format!(
                    "transition from entry {from} produced no frame {step}"
                ))
            })
        }
    }
}

/// Produce only the frame at output position `index`.
///
/// Pixel-identical to `build(workspace, transition_frames)?.frames()[index]` but only
/// normalizes the one or two entries the slot needs.
#[tracing::instrument(skip(workspace))]
pub fn render_frame(
    workspace: &Workspace,
    transition_frames: u32,
    index: usize,
) -> FlipbookResult<Image> {
    let plan = plan_sequence(workspace, transition_frames)?;
    let canvas = plan.canvas();
    match plan.slot(index)? {
        FrameSlot::Base { entry } => {
            normalize(workspace.image_at(entry)?, canvas.width, canvas.height)
        }
        FrameSlot::Transition {
            from,
            kind,
            step,
            steps,
        } => {
            let prev = normalize(workspace.image_at(from)?, canvas.width, canvas.height)?;
            let next = normalize(workspace.image_at(from + 1)?, canvas.width, canvas.height)?;
            TransitionInputs::new(&prev, &next, kind)?
                .frame(step, steps)?
                .ok_or_else(|| {
                    FlipbookError::validation(format!(
                        "transition from entry {from} produced no frame {step}"
                    ))
                })
        }
    }
}

/// Validate `settings`, build the sequence and stream it into `sink`.
///
/// Settings are checked before any compositing work, so a bad frame duration never
/// reaches the sink.
#[tracing::instrument(skip(workspace, sink), fields(entries = workspace.len()))]
pub fn export(
    workspace: &Workspace,
    settings: &ExportSettings,
    opts: &BuildOpts,
    sink: &mut dyn FrameSink,
) -> FlipbookResult<ExportStats> {
    settings.validate()?;
    let sequence = build_with_opts(workspace, settings.transition_frames, opts)?;
    export_sequence(&sequence, settings, sink)
}

/// Stream an already built sequence into `sink`.
pub fn export_sequence(
    sequence: &FrameSequence,
    settings: &ExportSettings,
    sink: &mut dyn FrameSink,
) -> FlipbookResult<ExportStats> {
    settings.validate()?;
    let canvas = sequence.canvas();
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        frame_duration_ms: settings.frame_duration_ms,
        loop_count: settings.loop_count,
        frame_count: sequence.len(),
    })?;
    for (idx, frame) in sequence.iter().enumerate() {
        sink.push_frame(idx, frame)?;
    }
    sink.end()?;
    tracing::debug!(frames = sequence.len(), "export finished");

    Ok(ExportStats {
        frames: sequence.len(),
        base_frames: sequence.base_frames(),
        transition_frames: sequence.transition_frames(),
        width: canvas.width,
        height: canvas.height,
    })
}

fn build_thread_pool(threads: Option<usize>) -> FlipbookResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FlipbookError::invalid_parameter(
            "build threads must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FlipbookError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
