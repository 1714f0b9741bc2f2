use image::{Rgba, RgbaImage};

use super::*;
use crate::frames::frame::Frame;

/// Frame `tag` with a distinct left column so flips are observable.
fn tagged(tag: u8) -> Frame {
    let mut img = RgbaImage::from_pixel(3, 2, Rgba([tag, 0, 0, 255]));
    img.put_pixel(0, 0, Rgba([tag, 255, 0, 255]));
    Frame::new(img)
}

fn seq_of(n: u8) -> FrameSequence {
    FrameSequence::from_frames((0..n).map(tagged).collect()).unwrap()
}

fn tags(seq: &FrameSequence) -> Vec<u8> {
    seq.iter().map(|f| f.image().get_pixel(1, 1)[0]).collect()
}

#[test]
fn pingpong_appends_reversed_interior() {
    let mut seq = seq_of(5);
    let added = apply_transform(&mut seq, TransformMode::PingPong).unwrap();
    assert_eq!(added, 3);
    assert_eq!(tags(&seq), vec![0, 1, 2, 3, 4, 3, 2, 1]);
    assert_eq!(seq.get(5), seq.get(3));
}

#[test]
fn pingpong_length_matches_formula() {
    for n in 0..10u8 {
        let mut seq = seq_of(n);
        apply_transform(&mut seq, TransformMode::PingPong).unwrap();
        let n = n as usize;
        let expected = if n >= 2 { n + n.saturating_sub(2) } else { n };
        assert_eq!(seq.len(), expected, "n = {n}");
    }
}

#[test]
fn mirror_doubles_with_flipped_copies() {
    let mut seq = seq_of(4);
    let original = seq.clone();
    let added = apply_transform(&mut seq, TransformMode::Mirror).unwrap();
    assert_eq!(added, 4);
    assert_eq!(seq.len(), 8);
    for i in 0..4 {
        let src = original.get(i).unwrap().image();
        let flipped = seq.get(4 + i).unwrap().image();
        assert_eq!(flipped, &image::imageops::flip_horizontal(src));
        assert_eq!(flipped.get_pixel(2, 0), &Rgba([i as u8, 255, 0, 255]));
    }
}

#[test]
fn mirror_of_empty_sequence_fails() {
    let mut seq = FrameSequence::new();
    let err = apply_transform(&mut seq, TransformMode::Mirror).unwrap_err();
    assert!(matches!(err, SpriteError::NoFramesFound(_)));
}

#[test]
fn none_leaves_sequence_alone() {
    let mut seq = seq_of(3);
    assert_eq!(apply_transform(&mut seq, TransformMode::None).unwrap(), 0);
    assert_eq!(seq.len(), 3);
}
