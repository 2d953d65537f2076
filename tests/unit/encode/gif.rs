use super::*;
use image::{Rgb, RgbImage};

fn out_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("flipbook_unit_gif_{}", std::process::id()))
        .join(name)
}

fn solid(w: u32, h: u32, v: u8) -> Image {
    Image::from_rgb8(RgbImage::from_pixel(w, h, Rgb([v, v, v]))).unwrap()
}

fn cfg(frame_count: usize, loop_count: u32) -> SinkConfig {
    SinkConfig {
        width: 8,
        height: 6,
        frame_duration_ms: 120,
        loop_count,
        frame_count,
    }
}

#[test]
fn opts_validation_rejects_bad_speed_and_empty_path() {
    assert!(GifSinkOpts::new("a.gif").validate().is_ok());
    assert!(GifSinkOpts::new("").validate().is_err());
    let mut opts = GifSinkOpts::new("a.gif");
    opts.speed = 0;
    assert!(GifSink::new(opts).is_err());
}

#[test]
fn repeat_maps_zero_to_infinite() {
    assert!(matches!(repeat_for(0).unwrap(), Repeat::Infinite));
    assert!(matches!(repeat_for(3).unwrap(), Repeat::Finite(3)));
    assert!(repeat_for(70_000).is_err());
}

#[test]
fn writes_a_decodable_gif() {
    let path = out_path("two_frames.gif");
    let mut sink = GifSink::new(GifSinkOpts::new(&path)).unwrap();
    sink.begin(cfg(2, 0)).unwrap();
    sink.push_frame(0, &solid(8, 6, 0)).unwrap();
    sink.push_frame(1, &solid(8, 6, 255)).unwrap();
    sink.end().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"GIF89a"));
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (8, 6));
}

#[test]
fn contract_violations_are_rejected() {
    let path = out_path("violations.gif");
    let mut sink = GifSink::new(GifSinkOpts::new(&path)).unwrap();
    assert!(sink.push_frame(0, &solid(8, 6, 0)).is_err());
    assert!(sink.end().is_err());

    sink.begin(cfg(2, 1)).unwrap();
    assert!(sink.begin(cfg(2, 1)).is_err());
    assert!(sink.push_frame(1, &solid(8, 6, 0)).is_err());
    assert!(sink.push_frame(0, &solid(4, 6, 0)).is_err());
    sink.push_frame(0, &solid(8, 6, 0)).unwrap();
    assert!(sink.end().is_err());
}

#[test]
fn refuses_to_overwrite_when_disabled() {
    let path = out_path("existing.gif");
    ensure_parent_dir(&path).unwrap();
    std::fs::write(&path, b"not a gif").unwrap();

    let mut opts = GifSinkOpts::new(&path);
    opts.overwrite = false;
    let mut sink = GifSink::new(opts).unwrap();
    assert!(matches!(
        sink.begin(cfg(1, 0)),
        Err(FlipbookError::Validation(_))
    ));
    assert_eq!(std::fs::read(&path).unwrap(), b"not a gif");
}

fn write_all_frames(sink: &mut GifSink, frames: usize) -> FlipbookResult<()> {
    sink.begin(cfg(frames, 0))?;
    for i in 0..frames {
        sink.push_frame(i, &solid(8, 6, (i * 40) as u8))?;
    }
    sink.end()
}

#[cfg(target_os = "linux")]
#[test]
fn write_failures_are_reported() {
    let mut sink = GifSink::new(GifSinkOpts::new("/dev/full")).unwrap();
    let err = write_all_frames(&mut sink, 2).unwrap_err();
    assert!(matches!(err, FlipbookError::Encode(_)), "{err}");
    assert!(Path::new("/dev/full").exists());
}

#[test]
fn incomplete_output_is_removed() {
    let path = out_path("incomplete.gif");
    let mut sink = GifSink::new(GifSinkOpts::new(&path)).unwrap();
    sink.begin(cfg(3, 0)).unwrap();
    sink.push_frame(0, &solid(8, 6, 0)).unwrap();
    assert!(path.exists());
    assert!(sink.end().is_err());
    assert!(!path.exists());
}

#[test]
fn delay_rounds_to_centiseconds() {
    assert_eq!(delay_centis(120), 12);
    assert_eq!(delay_centis(125), 13);
    assert_eq!(delay_centis(1), 1);
    assert_eq!(delay_centis(u32::MAX), u16::MAX);
}

#[test]
fn oversized_canvas_is_rejected_before_creating_a_file() {
    let path = out_path("huge.gif");
    let _ = std::fs::remove_file(&path);
    let mut sink = GifSink::new(GifSinkOpts::new(&path)).unwrap();
    let huge = SinkConfig {
        width: 70_000,
        ..cfg(1, 0)
    };
    assert!(matches!(
        sink.begin(huge),
        Err(FlipbookError::InvalidParameter(_))
    ));
    assert!(!path.exists());
}
