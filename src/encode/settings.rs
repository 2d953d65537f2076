use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Front-end default per-frame display time.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 200;
/// Front-end default loop count (`0` loops forever).
pub const DEFAULT_LOOP_COUNT: u32 = 0;
/// Front-end default number of synthesized frames per transition.
pub const DEFAULT_TRANSITION_FRAMES: u32 = 10;

/// Timing and looping parameters of one export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExportSettings {
    /// Display time of every frame in milliseconds; must be positive.
    pub frame_duration_ms: u32,
    /// Number of loops; `0` means loop forever. GIF limits this to `u16::MAX`.
    pub loop_count: u32,
    /// Synthesized frames per transition.
    pub transition_frames: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            frame_duration_ms: DEFAULT_FRAME_DURATION_MS,
            loop_count: DEFAULT_LOOP_COUNT,
            transition_frames: DEFAULT_TRANSITION_FRAMES,
        }
    }
}

impl ExportSettings {
    /// Build settings from raw signed inputs (form fields, JSON numbers), rejecting negatives.
    pub fn from_raw(
        frame_duration_ms: i64,
        loop_count: i64,
        transition_frames: i64,
    ) -> FlipbookResult<Self> {
        if frame_duration_ms <= 0 {
            return Err(FlipbookError::invalid_parameter(format!(
                "frame duration must be greater than 0 ms (got {frame_duration_ms})"
            )));
        }
        if loop_count < 0 {
            return Err(FlipbookError::invalid_parameter(format!(
                "loop count must be 0 or greater (got {loop_count})"
            )));
        }
        if transition_frames < 0 {
            return Err(FlipbookError::invalid_parameter(format!(
                "transition frames must be 0 or greater (got {transition_frames})"
            )));
        }
        let settings = Self {
            frame_duration_ms: to_u32(frame_duration_ms, "frame duration")?,
            loop_count: to_u32(loop_count, "loop count")?,
            transition_frames: to_u32(transition_frames, "transition frames")?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings before any compositing work is started.
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.frame_duration_ms == 0 {
            return Err(FlipbookError::invalid_parameter(
                "frame duration must be greater than 0 ms",
            ));
        }
        if self.loop_count > u32::from(u16::MAX) {
            return Err(FlipbookError::invalid_parameter(format!(
                "loop count must be at most {} (got {})",
                u16::MAX,
                self.loop_count
            )));
        }
        Ok(())
    }
}

fn to_u32(v: i64, what: &str) -> FlipbookResult<u32> {
    u32::try_from(v)
        .map_err(|_| FlipbookError::invalid_parameter(format!("{what} is too large (got {v})")))
}
