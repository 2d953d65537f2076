use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::decode::load_image;
use crate::composition::workspace::Workspace;
use crate::effects::transitions::TransitionKind;
use crate::encode::settings::{
    DEFAULT_FRAME_DURATION_MS, DEFAULT_LOOP_COUNT, DEFAULT_TRANSITION_FRAMES, ExportSettings,
};
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Serialized project file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDef {
    /// Images in display order.
    pub images: Vec<ImageEntryDef>,
    /// Export parameters.
    #[serde(default)]
    pub export: ExportDef,
}

/// One image of a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageEntryDef {
    /// Path relative to the project file's directory.
    pub path: String,
    /// Transition toward the next image.
    #[serde(default)]
    pub transition: TransitionKind,
}

/// Raw export parameters; signed so negative inputs are reported instead of failing to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportDef {
    /// Per-frame display time in milliseconds.
    #[serde(default = "default_frame_duration_ms")]
    pub frame_duration_ms: i64,
    /// `0` loops forever.
    #[serde(default = "default_loop_count")]
    pub loop_count: i64,
    /// Synthesized frames per transition.
    #[serde(default = "default_transition_frames")]
    pub transition_frames: i64,
}

fn default_frame_duration_ms() -> i64 {
    i64::from(DEFAULT_FRAME_DURATION_MS)
}

fn default_loop_count() -> i64 {
    i64::from(DEFAULT_LOOP_COUNT)
}

fn default_transition_frames() -> i64 {
    i64::from(DEFAULT_TRANSITION_FRAMES)
}

impl Default for ExportDef {
    fn default() -> Self {
        Self {
            frame_duration_ms: default_frame_duration_ms(),
            loop_count: default_loop_count(),
            transition_frames: default_transition_frames(),
        }
    }
}

/// A parsed project plus the directory its image paths are resolved against.
#[derive(Clone, Debug)]
pub struct Project {
    def: ProjectDef,
    root: PathBuf,
}

impl Project {
    /// Parse a project from JSON; image paths resolve against `root`.
    pub fn from_reader(reader: impl Read, root: impl Into<PathBuf>) -> FlipbookResult<Self> {
        let def: ProjectDef = serde_json::from_reader(reader)
            .map_err(|e| FlipbookError::validation(format!("parse project JSON: {e}")))?;
        let project = Self {
            def,
            root: root.into(),
        };
        project.validate()?;
        Ok(project)
    }

    /// Open and parse the project file at `path`; image paths resolve against its directory.
    pub fn from_path(path: &Path) -> FlipbookResult<Self> {
        let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_reader(BufReader::new(f), root)
    }

    /// Wrap an already constructed definition.
    pub fn from_def(def: ProjectDef, root: impl Into<PathBuf>) -> FlipbookResult<Self> {
        let project = Self {
            def,
            root: root.into(),
        };
        project.validate()?;
        Ok(project)
    }

    /// Check image paths and export parameters.
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.def.images.is_empty() {
            return Err(FlipbookError::validation(
                "project must list at least one image",
            ));
        }
        for (i, entry) in self.def.images.iter().enumerate() {
            normalize_rel_path(&entry.path)
                .map_err(|e| FlipbookError::validation(format!("images[{i}].path: {e}")))?;
        }
        self.export_settings()?;
        Ok(())
    }

    /// Parsed definition.
    pub fn def(&self) -> &ProjectDef {
        &self.def
    }

    /// Directory image paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Typed export settings built from the raw values.
    pub fn export_settings(&self) -> FlipbookResult<ExportSettings> {
        let e = &self.def.export;
        ExportSettings::from_raw(e.frame_duration_ms, e.loop_count, e.transition_frames)
    }

    /// Resolved path of every image, in order.
    pub fn image_paths(&self) -> FlipbookResult<Vec<PathBuf>> {
        self.def
            .images
            .iter()
            .map(|entry| Ok(self.root.join(normalize_rel_path(&entry.path)?)))
            .collect()
    }

    /// Decode every image and assemble the workspace with its transitions.
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load_workspace(&self) -> FlipbookResult<Workspace> {
        let mut ws = Workspace::new();
        for (entry, path) in self.def.images.iter().zip(self.image_paths()?) {
            let idx = ws.add_image(load_image(&path)?);
            ws.set_transition(idx, entry.transition)?;
        }
        tracing::debug!(entries = ws.len(), "loaded project workspace");
        Ok(ws)
    }
}

/// Normalize and validate a project-relative image path.
///
/// The result uses `/` separators and drops `.` segments. Absolute paths, empty paths and
/// parent traversals (`..`) are rejected.
pub fn normalize_rel_path(source: &str) -> FlipbookResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || has_drive_prefix(&s) {
        return Err(FlipbookError::validation("image paths must be relative"));
    }
    if s.trim().is_empty() {
        return Err(FlipbookError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(FlipbookError::validation(
                "image paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(FlipbookError::validation(
            "image path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

fn has_drive_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

#[cfg(test)]
#[path = "../../tests/unit/project/manifest.rs"]
mod tests;
