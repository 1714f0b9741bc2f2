use super::*;
use crate::frames::frame::Frame;
use image::Rgba;

fn numbered_sequence(count: u8, w: u32, h: u32) -> FrameSequence {
    let frames = (0..count)
        .map(|i| {
            Frame::new(RgbaImage::from_fn(w, h, |x, y| {
                Rgba([i * 20, x as u8, y as u8, 200 + i])
            }))
        })
        .collect();
    FrameSequence::from_frames(frames).unwrap()
}

#[test]
fn every_frame_crops_back_out_unchanged() {
    let seq = numbered_sequence(5, 7, 4);
    let atlas = pack_atlas(&seq, "spark").unwrap();
    for (i, frame) in seq.iter().enumerate() {
        let cropped = atlas.crop(&frame_key("spark", i)).unwrap();
        assert_eq!(&cropped, frame.image(), "frame {i}");
    }
    assert!(atlas.crop("spark_5").is_none());
}

#[test]
fn eight_frames_leave_one_transparent_cell() {
    let seq = numbered_sequence(8, 6, 5);
    let atlas = pack_atlas(&seq, "orb").unwrap();
    assert_eq!((atlas.layout.cols, atlas.layout.rows), (3, 3));
    assert_eq!(atlas.image.dimensions(), (18, 15));

    for y in 10..15 {
        for x in 12..18 {
            assert_eq!(atlas.image.get_pixel(x, y)[3], 0, "({x}, {y})");
        }
    }
}

#[test]
fn manifest_lists_frames_in_order_with_meta() {
    let seq = numbered_sequence(8, 6, 5);
    let atlas = pack_atlas(&seq, "orb").unwrap();
    let keys = atlas.manifest.frames.keys().cloned().collect::<Vec<_>>();
    let expected = (0..8).map(|i| format!("orb_{i}")).collect::<Vec<_>>();
    assert_eq!(keys, expected);

    let last = atlas.manifest.frames["orb_7"];
    assert_eq!((last.frame.x, last.frame.y), (6, 10));
    assert_eq!(atlas.manifest.meta.image, "orb_atlas.png");
    assert_eq!(atlas.manifest.meta.size, AtlasSize { w: 18, h: 15 });
    assert_eq!(atlas.manifest.meta.scale, "1");
}

#[test]
fn write_places_both_files_and_no_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("objects");
    let seq = numbered_sequence(3, 4, 4);
    let atlas = pack_atlas(&seq, "coin").unwrap();

    let written = atlas.write(&out, PngCompression::Fast).unwrap();
    assert_eq!(written.png_path, out.join("coin_atlas.png"));
    assert_eq!(written.json_path, out.join("coin_atlas.json"));
    assert!(written.png_bytes > 0 && written.json_bytes > 0);

    let decoded = image::open(&written.png_path).unwrap().to_rgba8();
    assert_eq!(decoded, atlas.image);
    assert_eq!(AtlasManifest::from_path(&written.json_path).unwrap(), atlas.manifest);

    let mut names = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["coin_atlas.json", "coin_atlas.png"]);
}

#[test]
fn empty_sequence_cannot_be_packed() {
    assert!(matches!(
        pack_atlas(&FrameSequence::new(), "none"),
        Err(SpriteError::NoFramesFound(_))
    ));
}

#[test]
fn failed_manifest_write_removes_the_png() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("roll_atlas.json");
    std::fs::create_dir_all(&blocker).unwrap();
    std::fs::write(blocker.join("keep"), b"x").unwrap();

    let atlas = pack_atlas(&numbered_sequence(2, 4, 4), "roll").unwrap();
    assert!(atlas.write(dir.path(), PngCompression::Fast).is_err());

    assert!(!dir.path().join("roll_atlas.png").exists());
    let names = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["roll_atlas.json"]);
    assert!(blocker.join("keep").is_file());
}
