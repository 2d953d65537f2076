use super::*;
use crate::foundation::core::{Canvas, ColorMode};
use image::Rgb;

const RED: [u8; 3] = [255, 0, 0];
const BLUE: [u8; 3] = [0, 0, 255];

fn solid(w: u32, h: u32, px: [u8; 3]) -> Image {
    Image::from_rgb8(RgbImage::from_pixel(w, h, Rgb(px))).unwrap()
}

/// 4x4 image whose row `y` is `[y*10, 100, 200]` (or column `x` when `by_col`).
fn banded(by_col: bool) -> Image {
    let img = RgbImage::from_fn(4, 4, |x, y| {
        let band = if by_col { x } else { y };
        Rgb([band as u8 * 10, 100, 200])
    });
    Image::from_rgb8(img).unwrap()
}

fn px(img: &Image, x: u32, y: u32) -> [u8; 3] {
    img.to_rgb8().get_pixel(x, y).0
}

#[test]
fn parses_names_labels_and_aliases() {
    assert_eq!(parse_transition_kind("fade_in").unwrap(), TransitionKind::FadeIn);
    assert_eq!(parse_transition_kind("Fade in").unwrap(), TransitionKind::FadeIn);
    assert_eq!(parse_transition_kind("  SLIDE-UP ").unwrap(), TransitionKind::SlideUp);
    assert_eq!(parse_transition_kind("slideleft").unwrap(), TransitionKind::SlideLeft);
    assert_eq!("Shrink".parse::<TransitionKind>().unwrap(), TransitionKind::Shrink);
    for kind in TransitionKind::ALL {
        assert_eq!(parse_transition_kind(kind.as_str()).unwrap(), kind);
        assert_eq!(parse_transition_kind(kind.label()).unwrap(), kind);
    }
}

#[test]
fn rejects_unknown_and_empty_names() {
    assert!(matches!(
        parse_transition_kind("wipe"),
        Err(FlipbookError::Validation(_))
    ));
    assert!(parse_transition_kind("   ").is_err());
}

#[test]
fn serde_uses_snake_case_names() {
    let s = serde_json::to_string(&TransitionKind::SlideRight).unwrap();
    assert_eq!(s, "\"slide_right\"");
    let k: TransitionKind = serde_json::from_str("\"Slide right\"").unwrap();
    assert_eq!(k, TransitionKind::SlideRight);
    assert!(serde_json::from_str::<TransitionKind>("\"zoom\"").is_err());
}

#[test]
fn hard_cuts_never_synthesize_frames() {
    let a = solid(4, 4, RED);
    let b = solid(4, 4, BLUE);
    for n in 0..6 {
        assert!(generate(&a, &b, TransitionKind::None, n).unwrap().is_empty());
        assert!(generate(&a, &b, TransitionKind::Instant, n).unwrap().is_empty());
    }
}

#[test]
fn zero_frame_count_is_empty_for_every_kind() {
    let a = solid(4, 4, RED);
    let b = solid(4, 4, BLUE);
    for kind in TransitionKind::ALL {
        assert!(generate(&a, &b, kind, 0).unwrap().is_empty());
    }
}

#[test]
fn compositing_kinds_emit_exactly_n_opaque_frames_of_prev_size() {
    let a = solid(6, 4, RED);
    let b = solid(6, 4, BLUE);
    for kind in TransitionKind::ALL.into_iter().filter(|k| k.synthesizes_frames()) {
        let frames = generate(&a, &b, kind, 5).unwrap();
        assert_eq!(frames.len(), 5, "{kind}");
        for f in &frames {
            assert_eq!(f.canvas(), a.canvas(), "{kind}");
            assert_eq!(f.color_mode(), ColorMode::Rgb8, "{kind}");
        }
    }
}

#[test]
fn next_of_other_size_is_stretched_to_prev() {
    let a = solid(10, 10, RED);
    let b = solid(30, 7, BLUE);
    let frames = generate(&a, &b, TransitionKind::SlideLeft, 3).unwrap();
    assert_eq!(frames.len(), 3);
    for f in &frames {
        assert_eq!(
            f.canvas(),
            Canvas {
                width: 10,
                height: 10
            }
        );
    }
    // offset = round(10 * 2/3) = 7: columns 0..3 come from the stretched next image.
    assert_eq!(px(&frames[2], 0, 5), BLUE);
    assert_eq!(px(&frames[2], 3, 5), RED);
}

#[test]
fn fade_starts_at_prev_and_stops_short_of_next() {
    let a = solid(3, 3, [0, 0, 0]);
    let b = solid(3, 3, [255, 255, 255]);
    let frames = generate(&a, &b, TransitionKind::FadeIn, 4).unwrap();
    assert_eq!(frames.len(), 4);

    assert_eq!(frames[0].to_rgb8(), a.to_rgb8());
    assert_eq!(px(&frames[1], 1, 1), [64, 64, 64]);
    assert_eq!(px(&frames[2], 1, 1), [128, 128, 128]);

    let last = px(&frames[3], 1, 1);
    assert_eq!(last, [191, 191, 191]);
    assert_ne!(frames[3].to_rgb8(), b.to_rgb8());
}

#[test]
fn fade_flattens_alpha_inputs_to_rgb() {
    let a = Image::from_rgba8(RgbaImage::from_pixel(2, 2, image::Rgba([100, 0, 0, 0]))).unwrap();
    let b = solid(2, 2, [0, 0, 200]);
    let frames = generate(&a, &b, TransitionKind::FadeIn, 2).unwrap();
    assert_eq!(frames[1].color_mode(), ColorMode::Rgb8);
    assert_eq!(px(&frames[1], 0, 0), [50, 0, 100]);
}

#[test]
fn slide_up_reveals_top_rows_of_next_from_the_bottom() {
    let a = solid(4, 4, RED);
    let b = banded(false);
    let frames = generate(&a, &b, TransitionKind::SlideUp, 4).unwrap();

    // i = 0: offset = 4, nothing of next visible.
    assert_eq!(frames[0].to_rgb8(), a.to_rgb8());
    // i = 1: offset = 3, next row 0 lands on row 3.
    assert_eq!(px(&frames[1], 0, 2), RED);
    assert_eq!(px(&frames[1], 0, 3), [0, 100, 200]);
    // i = 3: offset = 1, next rows 0..3 land on rows 1..4.
    assert_eq!(px(&frames[3], 0, 0), RED);
    assert_eq!(px(&frames[3], 2, 1), [0, 100, 200]);
    assert_eq!(px(&frames[3], 2, 3), [20, 100, 200]);
}

#[test]
fn slide_down_pastes_lower_rows_of_next_at_the_top() {
    let a = solid(4, 4, RED);
    let b = banded(false);
    let frames = generate(&a, &b, TransitionKind::SlideDown, 4).unwrap();

    // i = 0: offset = 0, all of next is pasted.
    assert_eq!(frames[0].to_rgb8(), b.to_rgb8());
    // i = 1: offset = 1, rows 1..4 of next fill rows 0..3.
    assert_eq!(px(&frames[1], 0, 0), [10, 100, 200]);
    assert_eq!(px(&frames[1], 0, 2), [30, 100, 200]);
    assert_eq!(px(&frames[1], 0, 3), RED);
}

#[test]
fn slide_right_reveals_left_columns_of_next() {
    let a = solid(4, 4, RED);
    let b = banded(true);
    let frames = generate(&a, &b, TransitionKind::SlideRight, 4).unwrap();

    assert_eq!(frames[0].to_rgb8(), a.to_rgb8());
    // i = 1: offset = 3, next column 0 lands on column 3.
    assert_eq!(px(&frames[1], 2, 0), RED);
    assert_eq!(px(&frames[1], 3, 0), [0, 100, 200]);
}

#[test]
fn slide_left_pastes_right_columns_of_next_at_the_left() {
    let a = solid(4, 4, RED);
    let b = banded(true);
    let frames = generate(&a, &b, TransitionKind::SlideLeft, 4).unwrap();

    assert_eq!(frames[0].to_rgb8(), b.to_rgb8());
    // i = 1: offset = 1, columns 1..4 of next fill columns 0..3.
    assert_eq!(px(&frames[1], 0, 0), [10, 100, 200]);
    assert_eq!(px(&frames[1], 2, 3), [30, 100, 200]);
    assert_eq!(px(&frames[1], 3, 0), RED);
}

#[test]
fn grow_skips_empty_scale_and_centers_next() {
    let a = solid(10, 10, RED);
    let b = solid(10, 10, BLUE);
    let frames = generate(&a, &b, TransitionKind::Grow, 2).unwrap();

    assert_eq!(frames[0].to_rgb8(), a.to_rgb8());
    // i = 1: 5x5 next pasted at (2, 2).
    assert_eq!(px(&frames[1], 1, 1), RED);
    assert_eq!(px(&frames[1], 2, 2), BLUE);
    assert_eq!(px(&frames[1], 6, 6), BLUE);
    assert_eq!(px(&frames[1], 7, 7), RED);
}

#[test]
fn shrink_paints_next_and_centers_shrinking_prev() {
    let a = solid(10, 10, RED);
    let b = solid(10, 10, BLUE);
    let frames = generate(&a, &b, TransitionKind::Shrink, 2).unwrap();

    assert_eq!(frames[0].to_rgb8(), a.to_rgb8());
    assert_eq!(px(&frames[1], 0, 0), BLUE);
    assert_eq!(px(&frames[1], 2, 2), RED);
    assert_eq!(px(&frames[1], 6, 6), RED);
    assert_eq!(px(&frames[1], 7, 7), BLUE);
}

#[test]
fn shrink_never_collapses_below_one_pixel() {
    let a = solid(2, 2, RED);
    let b = solid(2, 2, BLUE);
    // i = 9 of 10: round(2 * 0.1) = 0, clamped to 1.
    let frames = generate(&a, &b, TransitionKind::Shrink, 10).unwrap();
    let last = frames[9].to_rgb8();
    let red = last.pixels().filter(|p| p.0 == RED).count();
    assert_eq!(red, 1);
}

#[test]
fn single_frame_matches_full_run() {
    let a = solid(8, 8, RED);
    let b = banded(false);
    for kind in [TransitionKind::FadeIn, TransitionKind::SlideUp, TransitionKind::Grow] {
        let all = generate(&a, &b, kind, 5).unwrap();
        for (i, expected) in all.iter().enumerate() {
            let one = transition_frame(&a, &b, kind, i as u32, 5).unwrap().unwrap();
            assert_eq!(one.to_rgb8(), expected.to_rgb8(), "{kind} frame {i}");
        }
    }
}

#[test]
fn single_frame_bounds_and_hard_cuts() {
    let a = solid(2, 2, RED);
    let b = solid(2, 2, BLUE);
    assert!(matches!(
        transition_frame(&a, &b, TransitionKind::FadeIn, 3, 3),
        Err(FlipbookError::IndexOutOfRange { index: 3, len: 3 })
    ));
    assert!(
        transition_frame(&a, &b, TransitionKind::Instant, 0, 3)
            .unwrap()
            .is_none()
    );
}

#[test]
fn every_kind_routes_to_its_own_synthesis() {
    for kind in TransitionKind::ALL {
        let routed = match kind.synthesis() {
            Synthesis::Cut => None,
            Synthesis::Fade => Some(TransitionKind::FadeIn),
            Synthesis::Motion(Motion::SlideUp) => Some(TransitionKind::SlideUp),
            Synthesis::Motion(Motion::SlideDown) => Some(TransitionKind::SlideDown),
            Synthesis::Motion(Motion::SlideRight) => Some(TransitionKind::SlideRight),
            Synthesis::Motion(Motion::SlideLeft) => Some(TransitionKind::SlideLeft),
            Synthesis::Motion(Motion::Grow) => Some(TransitionKind::Grow),
            Synthesis::Motion(Motion::Shrink) => Some(TransitionKind::Shrink),
        };
        match routed {
            Some(k) => assert_eq!(k, kind),
            None => assert!(!kind.synthesizes_frames(), "{kind}"),
        }
    }
}

#[test]
fn motion_frames_never_fall_back_to_a_blank_canvas() {
    // Black prev and next: a frame of pure background white would mean a dropped kind.
    let a = solid(6, 6, [0, 0, 0]);
    let b = solid(6, 6, [0, 0, 0]);
    for kind in TransitionKind::ALL.into_iter().filter(|k| k.synthesizes_frames()) {
        for f in generate(&a, &b, kind, 4).unwrap() {
            assert!(f.to_rgb8().pixels().all(|p| p.0 == [0, 0, 0]), "{kind}");
        }
    }
}
