use crate::composition::workspace::Workspace;
use crate::effects::transitions::TransitionKind;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// One position of the output sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameSlot {
    /// Normalized copy of workspace entry `entry`.
    Base {
        /// Workspace index.
        entry: usize,
    },
    /// Frame `step` of the `steps`-frame transition from entry `from` to `from + 1`.
    Transition {
        /// Workspace index of the outgoing entry; its transition kind drives the run.
        from: usize,
        /// Transition kind stored on `from`.
        kind: TransitionKind,
        /// 0-based frame index within the run.
        step: u32,
        /// Run length.
        steps: u32,
    },
}

/// Frame layout of a workspace, computed without touching pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencePlan {
    canvas: Canvas,
    entries: usize,
    slots: Vec<FrameSlot>,
}

impl SequencePlan {
    /// Canonical output size (the first entry's size).
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Number of workspace entries the plan was built from.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Ordered output slots.
    pub fn slots(&self) -> &[FrameSlot] {
        &self.slots
    }

    /// Total number of output frames (always at least one).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Plans always hold at least one base frame.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of synthesized transition frames.
    pub fn transition_frames(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, FrameSlot::Transition { .. }))
            .count()
    }

    /// Kind of the run leaving each entry, indexed by entry; `None` where no frames follow it.
    pub fn outgoing_kinds(&self) -> Vec<Option<TransitionKind>> {
        let mut kinds = vec![None; self.entries];
        for slot in &self.slots {
            if let FrameSlot::Transition { from, kind, .. } = *slot
                && let Some(k) = kinds.get_mut(from)
            {
                *k = Some(kind);
            }
        }
        kinds
    }

    /// Slot at output position `index`.
    pub fn slot(&self, index: usize) -> FlipbookResult<FrameSlot> {
        self.slots
            .get(index)
            .copied()
            .ok_or_else(|| FlipbookError::index_out_of_range(index, self.slots.len()))
    }
}

/// Lay out the output frames for `workspace`.
///
/// Each entry contributes its base frame; every entry except the last is followed by
/// `transition_frames` frames of its own transition kind toward the next entry (none for hard
/// cuts). The sequence does not wrap from the last entry back to the first.
pub fn plan_sequence(workspace: &Workspace, transition_frames: u32) -> FlipbookResult<SequencePlan> {
    let first = workspace.get(0).ok_or(FlipbookError::EmptyInput)?;
    let canvas = first.image().canvas();

    let last = workspace.len() - 1;
    let mut slots = Vec::with_capacity(workspace.len());
    for (i, entry) in workspace.iter().enumerate() {
        slots.push(FrameSlot::Base { entry: i });
        if i == last {
            break;
        }
        let kind = entry.transition();
        if kind.synthesizes_frames() {
            slots.extend((0..transition_frames).map(|step| FrameSlot::Transition {
                from: i,
                kind,
                step,
                steps: transition_frames,
            }));
        }
    }

    Ok(SequencePlan {
        canvas,
        entries: workspace.len(),
        slots,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
