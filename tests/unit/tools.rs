use image::{Rgba, RgbaImage};

use super::*;
use crate::foundation::core::MaskRegion;

fn write_frames(dir: &Path, names: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    for (i, name) in names.iter().enumerate() {
        let img = RgbaImage::from_fn(3, 2, |x, _| Rgba([i as u8 * 10, x as u8, 0, 255]));
        img.save(dir.join(name)).unwrap();
    }
}

fn shade(path: &Path) -> u8 {
    image::open(path).unwrap().to_rgba8().get_pixel(0, 0)[0]
}

#[test]
fn pack_uses_sorted_file_names() {
    let tmp = tempfile::tempdir().unwrap();
    let frames = tmp.path().join("frames");
    write_frames(&frames, &["b.png", "a.png", "c.png"]);

    let (layout, out) =
        pack_frames_dir(&frames, &tmp.path().join("out"), "tree", PngCompression::Fast).unwrap();
    assert_eq!((layout.cols, layout.rows), (2, 2));
    assert!(out.png_path.ends_with("tree_atlas.png"));

    let atlas = image::open(&out.png_path).unwrap().to_rgba8();
    // "a.png" was written second, so it carries shade 10 and lands in cell 0.
    assert_eq!(atlas.get_pixel(0, 0)[0], 10);
    assert_eq!(atlas.get_pixel(3, 0)[0], 0);
    assert_eq!(atlas.get_pixel(0, 2)[0], 20);
}

#[test]
fn pack_of_an_empty_dir_reports_no_frames() {
    let tmp = tempfile::tempdir().unwrap();
    let err = pack_frames_dir(tmp.path(), tmp.path(), "none", PngCompression::Fast).unwrap_err();
    assert!(matches!(err, SpriteError::NoFramesFound(_)));
}

#[test]
fn mirror_in_place_only_adds_new_frames() {
    let tmp = tempfile::tempdir().unwrap();
    write_frames(tmp.path(), &["frame_0000.png", "frame_0001.png"]);

    let res = transform_frames_dir(tmp.path(), None, TransformMode::Mirror).unwrap();
    assert_eq!((res.original, res.total), (2, 4));
    assert_eq!(res.output_dir, tmp.path());

    let seq = FrameSequence::load_dir(tmp.path()).unwrap();
    assert_eq!(seq.len(), 4);
    assert_eq!(
        seq.get(3).unwrap(),
        &seq.get(1).unwrap().flipped_horizontal()
    );
}

#[test]
fn mirror_into_another_dir_renumbers_everything() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_frames(&src, &["walk_a.png", "walk_b.png", "walk_c.png"]);

    let res = transform_frames_dir(&src, Some(&dst), TransformMode::PingPong).unwrap();
    assert_eq!((res.original, res.total), (3, 4));
    assert_eq!(shade(&dst.join("frame_0000.png")), 0);
    assert_eq!(shade(&dst.join("frame_0003.png")), 10);
    assert_eq!(std::fs::read_dir(&src).unwrap().count(), 3);
}

#[test]
fn transform_without_a_mode_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    write_frames(tmp.path(), &["frame_0000.png"]);
    assert!(matches!(
        transform_frames_dir(tmp.path(), None, TransformMode::None),
        Err(SpriteError::InvalidArgument(_))
    ));
}

#[test]
fn matte_clears_mask_and_keeps_foreground() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.png");
    let output = tmp.path().join("nested/out.png");
    let mut img = RgbaImage::from_pixel(32, 32, Rgba([255, 0, 0, 255]));
    img.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
    img.save(&input).unwrap();

    let opts = BackgroundOpts {
        threshold: 5,
        mask: Some(MaskRegion::new(10, 10, 20, 20)),
        ..BackgroundOpts::default()
    };
    let (bg, stats) = matte_file(&input, &output, &opts).unwrap();
    assert_eq!(bg, Rgb::new(0, 255, 0));
    // 11x11 mask plus the sampled corner.
    assert_eq!(stats.cleared, 121 + 1);

    let out = image::open(&output).unwrap().to_rgba8();
    for (x, y, px) in out.enumerate_pixels() {
        let masked = (10..=20).contains(&x) && (10..=20).contains(&y);
        if masked || (x, y) == (0, 0) {
            assert_eq!(px[3], 0, "({x}, {y})");
        } else {
            assert_eq!(*px, Rgba([255, 0, 0, 255]), "({x}, {y})");
        }
    }
}

#[test]
fn mirror_in_place_renumbers_one_based_frames() {
    let tmp = tempfile::tempdir().unwrap();
    write_frames(
        tmp.path(),
        &["frame_0001.png", "frame_0002.png", "frame_0003.png"],
    );

    let res = transform_frames_dir(tmp.path(), None, TransformMode::Mirror).unwrap();
    assert_eq!((res.original, res.total), (3, 6));

    let mut names = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();
    let expected = (0..6).map(frame_file_name).collect::<Vec<_>>();
    assert_eq!(names, expected);

    // Old frame_0003 (shade 20) is now frame_0002; its mirror closes the sequence.
    assert_eq!(shade(&tmp.path().join("frame_0000.png")), 0);
    assert_eq!(shade(&tmp.path().join("frame_0002.png")), 20);
    let seq = FrameSequence::load_dir(tmp.path()).unwrap();
    assert_eq!(
        seq.get(5).unwrap(),
        &seq.get(2).unwrap().flipped_horizontal()
    );
}

#[test]
fn mirror_in_place_replaces_arbitrary_names() {
    let tmp = tempfile::tempdir().unwrap();
    write_frames(tmp.path(), &["walk_a.png", "walk_b.png"]);

    let res = transform_frames_dir(tmp.path(), None, TransformMode::Mirror).unwrap();
    assert_eq!(res.total, 4);
    assert!(!tmp.path().join("walk_a.png").exists());
    assert!(!tmp.path().join("walk_b.png").exists());
    assert_eq!(FrameSequence::load_dir(tmp.path()).unwrap().len(), 4);
    assert_eq!(shade(&tmp.path().join("frame_0001.png")), 10);
}
