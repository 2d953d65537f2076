use crate::foundation::core::Image;
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Configuration provided to a [`FrameSink`] before any frame is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Width shared by every frame.
    pub width: u32,
    /// Height shared by every frame.
    pub height: u32,
    /// Display time of every frame in milliseconds (positive).
    pub frame_duration_ms: u32,
    /// Number of loops; `0` means loop forever.
    pub loop_count: u32,
    /// Number of frames that will be pushed.
    pub frame_count: usize,
}

/// Animation encoder contract.
///
/// Ordering contract: `begin` once, then `push_frame` with strictly increasing indices starting
/// at zero and frames of the configured size, then `end` once.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> FlipbookResult<()>;
    /// Push one frame in output order.
    fn push_frame(&mut self, idx: usize, frame: &Image) -> FlipbookResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> FlipbookResult<()>;
}

/// Checks shared by every sink on `begin`.
pub(crate) fn validate_sink_config(cfg: &SinkConfig) -> FlipbookResult<()> {
    if cfg.width == 0 || cfg.height == 0 {
        return Err(FlipbookError::invalid_parameter(
            "sink width/height must be non-zero",
        ));
    }
    if cfg.frame_duration_ms == 0 {
        return Err(FlipbookError::invalid_parameter(
            "frame duration must be greater than 0 ms",
        ));
    }
    if cfg.frame_count == 0 {
        return Err(FlipbookError::validation(
            "an animation needs at least one frame",
        ));
    }
    Ok(())
}

/// Checks shared by every sink on `push_frame`.
pub(crate) fn validate_pushed_frame(
    cfg: &SinkConfig,
    next_idx: usize,
    idx: usize,
    frame: &Image,
) -> FlipbookResult<()> {
    if idx != next_idx {
        return Err(FlipbookError::validation(format!(
            "sink received frame {idx}, expected frame {next_idx}"
        )));
    }
    if frame.width() != cfg.width || frame.height() != cfg.height {
        return Err(FlipbookError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width(),
            frame.height(),
            cfg.width,
            cfg.height
        )));
    }
    Ok(())
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<Image>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[Image] {
        &self.frames
    }

    /// `true` once `end` has succeeded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FlipbookResult<()> {
        validate_sink_config(&cfg)?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &Image) -> FlipbookResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FlipbookError::validation("in-memory sink not started"))?;
        validate_pushed_frame(cfg, self.frames.len(), idx, frame)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> FlipbookResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FlipbookError::validation("in-memory sink not started"))?;
        if self.frames.len() != cfg.frame_count {
            return Err(FlipbookError::validation(format!(
                "sink expected {} frames, received {}",
                cfg.frame_count,
                self.frames.len()
            )));
        }
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
