//! One-shot operations on frame directories and single images, outside the video pipeline.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    atlas::{
        layout::GridLayout,
        pack::{AtlasOutput, PngCompression, pack_atlas},
    },
    foundation::core::{Rgb, TransformMode},
    foundation::error::{SpriteError, SpriteResult},
    frames::{
        frame::Frame,
        sequence::{FrameSequence, frame_file_name, list_png_files},
        transform::apply_transform,
    },
    matte::background::{BackgroundOpts, MatteStats, remove_background_frame, sample_background},
};

/// Default threshold of single-image background removal.
pub const MATTE_DEFAULT_THRESHOLD: u32 = 10;

/// Pack every PNG in `frames_dir` (natural file-name order) into `{name}_atlas.{png,json}`.
#[tracing::instrument]
pub fn pack_frames_dir(
    frames_dir: &Path,
    output_dir: &Path,
    name: &str,
    compression: PngCompression,
) -> SpriteResult<(GridLayout, AtlasOutput)> {
    let seq = FrameSequence::load_dir(frames_dir)?;
    let atlas = pack_atlas(&seq, name)?;
    let output = atlas.write(output_dir, compression)?;
    Ok((atlas.layout, output))
}

/// Result of [`transform_frames_dir`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirTransform {
    pub original: usize,
    pub total: usize,
    pub output_dir: PathBuf,
}

/// Append the `mode` tail to the frames in `frames_dir`.
///
/// With an `output_dir` the whole sequence is rewritten there as `frame_{i:04}.png`. Without
/// one the sequence stays in `frames_dir`: when the originals are already `frame_0000..` only
/// the appended frames are written, otherwise the whole sequence is renumbered from zero and
/// the old files are removed.
#[tracing::instrument]
pub fn transform_frames_dir(
    frames_dir: &Path,
    output_dir: Option<&Path>,
    mode: TransformMode,
) -> SpriteResult<DirTransform> {
    if mode == TransformMode::None {
        return Err(SpriteError::invalid_argument(
            "no transform selected (use mirror or ping-pong)",
        ));
    }

    let originals = list_png_files(frames_dir)?;
    let mut seq = FrameSequence::load_dir(frames_dir)?;
    let original = seq.len();
    apply_transform(&mut seq, mode)?;

    let target = output_dir.unwrap_or(frames_dir);
    if output_dir.is_some_and(|d| d != frames_dir) {
        seq.save_dir(target)?;
    } else {
        rewrite_in_place(&seq, frames_dir, &originals)?;
    }
    tracing::info!(
        dir = %target.display(),
        original,
        total = seq.len(),
        "wrote transformed frames"
    );

    Ok(DirTransform {
        original,
        total: seq.len(),
        output_dir: target.to_path_buf(),
    })
}

fn rewrite_in_place(seq: &FrameSequence, dir: &Path, originals: &[PathBuf]) -> SpriteResult<()> {
    let numbered = originals.iter().enumerate().all(|(i, path)| {
        path.file_name()
            .is_some_and(|name| name == frame_file_name(i).as_str())
    });
    if numbered {
        for (i, frame) in seq.frames().iter().enumerate().skip(originals.len()) {
            frame.save_png(&dir.join(frame_file_name(i)))?;
        }
        return Ok(());
    }

    let written = seq.save_dir(dir)?;
    for stale in originals.iter().filter(|p| !written.contains(*p)) {
        std::fs::remove_file(stale)
            .with_context(|| format!("remove renumbered frame '{}'", stale.display()))?;
    }
    tracing::debug!(dir = %dir.display(), frames = written.len(), "renumbered frames from zero");
    Ok(())
}

/// Background removal on one image, keyed on its top-left pixel. Writes a PNG to `output`.
#[tracing::instrument(skip(opts), fields(threshold = opts.threshold))]
pub fn matte_file(
    input: &Path,
    output: &Path,
    opts: &BackgroundOpts,
) -> SpriteResult<(Rgb, MatteStats)> {
    let mut frame = Frame::open(input)?;
    let bg = sample_background(&frame)?;
    tracing::info!(background = %bg, "sampled background color");
    let stats = remove_background_frame(&mut frame, bg, opts);

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.save_png(output)?;
    Ok((bg, stats))
}

#[cfg(test)]
#[path = "../tests/unit/tools.rs"]
mod tests;
