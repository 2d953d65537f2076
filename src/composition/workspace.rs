use crate::effects::transitions::TransitionKind;
use crate::foundation::core::Image;
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// One image plus the transition used when leaving it for the next entry.
#[derive(Clone, Debug)]
pub struct WorkspaceEntry {
    image: Image,
    transition: TransitionKind,
}

impl WorkspaceEntry {
    /// Source image.
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Transition toward the following entry.
    pub fn transition(&self) -> TransitionKind {
        self.transition
    }
}

/// Ordered, caller-owned collection of images and their outgoing transitions.
///
/// Every entry carries both its image and its transition, so the two lists can never drift
/// apart. Positions are dense: removing an entry shifts every later entry down by one, and
/// indices must not be cached across a removal.
///
/// Cloning is cheap (image buffers are shared) and gives an independent snapshot to build from.
#[derive(Clone, Debug, Default)]
pub struct Workspace {
    entries: Vec<WorkspaceEntry>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `image` with [`TransitionKind::None`] and return its index.
    pub fn add_image(&mut self, image: Image) -> usize {
        self.entries.push(WorkspaceEntry {
            image,
            transition: TransitionKind::None,
        });
        tracing::debug!(len = self.entries.len(), "workspace: image added");
        self.entries.len() - 1
    }

    /// Remove and return the entry at `index`; later entries move down by one.
    pub fn remove_at(&mut self, index: usize) -> FlipbookResult<WorkspaceEntry> {
        self.check_index(index)?;
        let entry = self.entries.remove(index);
        tracing::debug!(index, len = self.entries.len(), "workspace: entry removed");
        Ok(entry)
    }

    /// Overwrite the transition stored at `index`.
    pub fn set_transition(&mut self, index: usize, kind: TransitionKind) -> FlipbookResult<()> {
        self.check_index(index)?;
        self.entries[index].transition = kind;
        Ok(())
    }

    /// Overwrite every entry's transition; a no-op on an empty workspace.
    pub fn set_all_transitions(&mut self, kind: TransitionKind) {
        for entry in &mut self.entries {
            entry.transition = kind;
        }
    }

    /// Entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&WorkspaceEntry> {
        self.entries.get(index)
    }

    /// Image at `index`.
    pub fn image_at(&self, index: usize) -> FlipbookResult<&Image> {
        self.check_index(index)?;
        Ok(&self.entries[index].image)
    }

    /// Transition at `index`.
    pub fn transition_at(&self, index: usize) -> FlipbookResult<TransitionKind> {
        self.check_index(index)?;
        Ok(self.entries[index].transition)
    }

    /// All entries in order.
    pub fn entries(&self) -> &[WorkspaceEntry] {
        &self.entries
    }

    /// Iterate entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, WorkspaceEntry> {
        self.entries.iter()
    }

    fn check_index(&self, index: usize) -> FlipbookResult<()> {
        if index >= self.entries.len() {
            return Err(FlipbookError::index_out_of_range(index, self.entries.len()));
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Workspace {
    type Item = &'a WorkspaceEntry;
    type IntoIter = std::slice::Iter<'a, WorkspaceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/workspace.rs"]
mod tests;
