use image::{Rgba, RgbaImage};

use super::*;

const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn no_fringe(threshold: u32) -> BackgroundOpts {
    BackgroundOpts {
        threshold,
        fringe: Vec::new(),
        ..BackgroundOpts::default()
    }
}

#[test]
fn classify_alpha_bands() {
    // t = 10: background up to 30, ramp up to 60.
    assert_eq!(classify_alpha(0, 10, 255), 0);
    assert_eq!(classify_alpha(30, 10, 255), 0);
    assert_eq!(classify_alpha(45, 10, 255), 128);
    assert_eq!(classify_alpha(60, 10, 255), 255);
    assert_eq!(classify_alpha(61, 10, 200), 200);
    assert_eq!(classify_alpha(500, 10, 255), 255);
}

#[test]
fn classify_alpha_zero_threshold_only_clears_exact_matches() {
    assert_eq!(classify_alpha(0, 0, 255), 0);
    assert_eq!(classify_alpha(1, 0, 255), 255);
}

#[test]
fn ramp_is_monotonic() {
    let t = 30;
    let mut prev = 0u8;
    for diff in 0..=(6 * t) {
        let a = classify_alpha(diff, t, 255);
        assert!(a >= prev, "diff {diff}");
        prev = a;
    }
    assert_eq!(prev, 255);
}

#[test]
fn background_cleared_foreground_kept() {
    let mut img = RgbaImage::from_pixel(16, 16, BLUE);
    for y in 4..12 {
        for x in 4..12 {
            img.put_pixel(x, y, RED);
        }
    }
    // Close enough to blue to count as background at t = 10.
    img.put_pixel(1, 1, Rgba([5, 5, 250, 255]));

    let mut seq = FrameSequence::from_frames(vec![Frame::new(img.clone())]).unwrap();
    let (bg, stats) = remove_background(&mut seq, &no_fringe(10)).unwrap();
    assert_eq!(bg, Rgb::new(0, 0, 255));

    let out = seq.get(0).unwrap().image();
    for (x, y, px) in out.enumerate_pixels() {
        let src = img.get_pixel(x, y);
        assert_eq!(&px.0[..3], &src.0[..3], "rgb must never change");
        let inside = (4..12).contains(&x) && (4..12).contains(&y);
        assert_eq!(px[3], if inside { 255 } else { 0 }, "({x},{y})");
    }
    assert_eq!(stats.cleared, 16 * 16 - 64);
    assert_eq!(stats.softened, 0);
}

#[test]
fn soft_edge_gets_partial_alpha() {
    let mut img = RgbaImage::from_pixel(4, 1, BLUE);
    // diff = 45 against blue at t = 10.
    img.put_pixel(2, 0, Rgba([45, 0, 255, 255]));
    let mut frame = Frame::new(img);
    let stats = remove_background_frame(&mut frame, Rgb::new(0, 0, 255), &no_fringe(10));
    assert_eq!(frame.image().get_pixel(2, 0)[3], 128);
    assert_eq!(stats.softened, 1);
}

#[test]
fn mask_region_cleared_independently_of_color() {
    // Corner differs from the red body, so only the mask can clear red pixels.
    let mut img = RgbaImage::from_pixel(32, 32, RED);
    img.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
    let frames = vec![Frame::new(img.clone()), Frame::new(img)];
    let mut seq = FrameSequence::from_frames(frames).unwrap();

    let opts = BackgroundOpts {
        threshold: 5,
        mask: Some(MaskRegion::new(10, 10, 20, 20)),
        fringe: Vec::new(),
        parallel: false,
    };
    remove_background(&mut seq, &opts).unwrap();

    for frame in &seq {
        for (x, y, px) in frame.image().enumerate_pixels() {
            let masked = (10..=20).contains(&x) && (10..=20).contains(&y);
            let corner = (x, y) == (0, 0);
            let expected = if masked || corner { 0 } else { 255 };
            assert_eq!(px[3], expected, "({x},{y})");
        }
    }
}

#[test]
fn mask_outside_frame_is_ignored() {
    let mut frame = Frame::new(RgbaImage::from_pixel(8, 8, RED));
    let opts = BackgroundOpts {
        threshold: 5,
        mask: Some(MaskRegion::new(100, 100, 200, 200)),
        fringe: Vec::new(),
        parallel: false,
    };
    let stats = remove_background_frame(&mut frame, Rgb::new(0, 255, 0), &opts);
    assert_eq!(stats.cleared, 0);
    assert!(frame.image().pixels().all(|p| p[3] == 255));
}

#[test]
fn background_sampled_from_first_frame_only() {
    let first = RgbaImage::from_pixel(4, 4, BLUE);
    let second = RgbaImage::from_pixel(4, 4, RED);
    let mut seq =
        FrameSequence::from_frames(vec![Frame::new(first), Frame::new(second)]).unwrap();
    remove_background(&mut seq, &no_fringe(10)).unwrap();
    assert!(seq.get(0).unwrap().image().pixels().all(|p| p[3] == 0));
    assert!(seq.get(1).unwrap().image().pixels().all(|p| p[3] == 255));
}

#[test]
fn parallel_matches_sequential() {
    let mut img = RgbaImage::new(40, 30);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = Rgba([(x * 6) as u8, (y * 8) as u8, 255 - (x + y) as u8, 255]);
    }
    let mut a = Frame::new(img.clone());
    let mut b = Frame::new(img);
    let seq_opts = BackgroundOpts {
        threshold: 20,
        mask: Some(MaskRegion::new(3, 3, 9, 7)),
        ..BackgroundOpts::default()
    };
    let par_opts = BackgroundOpts {
        parallel: true,
        ..seq_opts.clone()
    };
    let bg = sample_background(&a).unwrap();
    let sa = remove_background_frame(&mut a, bg, &seq_opts);
    let sb = remove_background_frame(&mut b, bg, &par_opts);
    assert_eq!(a, b);
    assert_eq!(sa, sb);
}

#[test]
fn empty_sequence_is_rejected() {
    let mut seq = FrameSequence::new();
    let err = remove_background(&mut seq, &BackgroundOpts::default()).unwrap_err();
    assert!(matches!(err, SpriteError::NoFramesFound(_)));
}
