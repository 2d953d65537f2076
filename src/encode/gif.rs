use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use gif::{Encoder, Repeat};

use crate::encode::sink::{FrameSink, SinkConfig, validate_pushed_frame, validate_sink_config};
use crate::foundation::core::Image;
use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Quantizer speed used when none is configured (1 = best quality, 30 = fastest).
pub const DEFAULT_GIF_SPEED: i32 = 10;

/// Output options of a [`GifSink`].
#[derive(Clone, Debug)]
pub struct GifSinkOpts {
    /// Destination file; parent directories are created on `begin`.
    pub out_path: PathBuf,
    /// Replace an existing file instead of failing.
    pub overwrite: bool,
    /// NeuQuant speed in `1..=30`.
    pub speed: i32,
}

impl GifSinkOpts {
    /// Overwriting options with the default quantizer speed.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            speed: DEFAULT_GIF_SPEED,
        }
    }

    /// Check options before any file is touched.
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.out_path.as_os_str().is_empty() {
            return Err(FlipbookError::validation("gif output path must be non-empty"));
        }
        if !(1..=30).contains(&self.speed) {
            return Err(FlipbookError::invalid_parameter(format!(
                "gif speed must be in 1..=30 (got {})",
                self.speed
            )));
        }
        Ok(())
    }
}

/// Create the parent directory of `path` when it has one.
pub fn ensure_parent_dir(path: &Path) -> FlipbookResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

struct GifState {
    cfg: SinkConfig,
    /// Per-frame delay in GIF centiseconds.
    delay_cs: u16,
    encoder: Encoder<BufWriter<File>>,
    pushed: usize,
}

/// Animated GIF writer.
///
/// Every frame is shown for `frame_duration_ms`; `loop_count == 0` repeats forever. Write
/// failures surface as [`FlipbookError::Encode`] and remove the partly written file.
pub struct GifSink {
    opts: GifSinkOpts,
    state: Option<GifState>,
}

impl GifSink {
    /// Validate `opts` and create an idle sink. No file is created until `begin`.
    pub fn new(opts: GifSinkOpts) -> FlipbookResult<Self> {
        opts.validate()?;
        Ok(Self { opts, state: None })
    }

    /// Destination path.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    /// Drop the encoder and remove the incomplete output, then hand back `err`.
    fn abort(&mut self, err: FlipbookError) -> FlipbookError {
        self.state = None;
        remove_partial_output(&self.opts.out_path);
        err
    }
}

/// Only regular files are removed; device sinks such as `/dev/null` stay untouched.
fn remove_partial_output(path: &Path) {
    let is_file = std::fs::symlink_metadata(path).is_ok_and(|m| m.is_file());
    if is_file && let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove partial gif");
    }
}

fn repeat_for(loop_count: u32) -> FlipbookResult<Repeat> {
    if loop_count == 0 {
        return Ok(Repeat::Infinite);
    }
    let n = u16::try_from(loop_count).map_err(|_| {
        FlipbookError::invalid_parameter(format!(
            "loop count must be at most {} (got {loop_count})",
            u16::MAX
        ))
    })?;
    Ok(Repeat::Finite(n))
}

/// GIF delays are stored in hundredths of a second; round to nearest, at least one.
fn delay_centis(frame_duration_ms: u32) -> u16 {
    let cs = (u64::from(frame_duration_ms) + 5) / 10;
    u16::try_from(cs.max(1)).unwrap_or(u16::MAX)
}

fn gif_dim(v: u32, what: &str) -> FlipbookResult<u16> {
    u16::try_from(v).map_err(|_| {
        FlipbookError::invalid_parameter(format!(
            "gif {what} must be at most {} (got {v})",
            u16::MAX
        ))
    })
}

impl FrameSink for GifSink {
    #[tracing::instrument(skip(self), fields(out = %self.opts.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> FlipbookResult<()> {
        if self.state.is_some() {
            return Err(FlipbookError::validation("gif sink already started"));
        }
        validate_sink_config(&cfg)?;
        let repeat = repeat_for(cfg.loop_count)?;
        let width = gif_dim(cfg.width, "width")?;
        let height = gif_dim(cfg.height, "height")?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(FlipbookError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let file = File::create(&self.opts.out_path).map_err(|e| {
            FlipbookError::encode(format!(
                "failed to create '{}': {e}",
                self.opts.out_path.display()
            ))
        })?;
        let encoder = Encoder::new(BufWriter::new(file), width, height, &[])
            .and_then(|mut enc| {
                enc.set_repeat(repeat)?;
                Ok(enc)
            })
            .map_err(|e| FlipbookError::encode(format!("failed to start gif stream: {e}")));
        let encoder = match encoder {
            Ok(enc) => enc,
            Err(err) => return Err(self.abort(err)),
        };

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            frames = cfg.frame_count,
            "gif sink started"
        );
        self.state = Some(GifState {
            delay_cs: delay_centis(cfg.frame_duration_ms),
            cfg,
            encoder,
            pushed: 0,
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &Image) -> FlipbookResult<()> {
        let speed = self.opts.speed;
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| FlipbookError::validation("gif sink not started"))?;
        validate_pushed_frame(&state.cfg, state.pushed, idx, frame)?;

        // Sizes were checked against the u16-bounded config above.
        let (w, h) = (state.cfg.width as u16, state.cfg.height as u16);
        let mut rgba = frame.to_rgba8().into_raw();
        let mut gif_frame = gif::Frame::from_rgba_speed(w, h, &mut rgba, speed);
        gif_frame.delay = state.delay_cs;

        if let Err(e) = state.encoder.write_frame(&gif_frame) {
            let err = FlipbookError::encode(format!("failed to encode gif frame {idx}: {e}"));
            return Err(self.abort(err));
        }
        state.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> FlipbookResult<()> {
        let state = self
            .state
            .take()
            .ok_or_else(|| FlipbookError::validation("gif sink not started"))?;
        if state.pushed == 0 {
            return Err(self.abort(FlipbookError::validation(
                "gif sink needs at least one frame before end",
            )));
        }
        if state.pushed != state.cfg.frame_count {
            return Err(self.abort(FlipbookError::validation(format!(
                "gif sink expected {} frames, received {}",
                state.cfg.frame_count, state.pushed
            ))));
        }

        let pushed = state.pushed;
        let finished = state
            .encoder
            .into_inner()
            .and_then(|mut writer| {
                writer.flush()?;
                writer.into_inner().map_err(|e| e.into_error())
            });
        if let Err(e) = finished {
            let err = FlipbookError::encode(format!(
                "failed to finish '{}': {e}",
                self.opts.out_path.display()
            ));
            return Err(self.abort(err));
        }
        tracing::debug!(frames = pushed, "gif sink finished");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
