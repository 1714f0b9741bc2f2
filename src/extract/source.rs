use std::path::Path;

use crate::{
    foundation::error::{SpriteError, SpriteResult},
    frames::sequence::FrameSequence,
};

/// Where the pipeline's first stage gets its frames from.
pub trait FrameSource {
    /// Human-readable name of the input, for logs and reports.
    fn describe(&self) -> String;

    /// Checks that must pass before any working state is created.
    fn preflight(&self) -> SpriteResult<()>;

    /// Produce at most `max_frames` frames (`0` = no limit), using `work_dir` as scratch space.
    fn extract(&self, work_dir: &Path, max_frames: u32) -> SpriteResult<FrameSequence>;
}

/// Load what an extractor left in `work_dir`, then downsample to `max_frames` (`0` = no limit).
pub fn finish_extraction(work_dir: &Path, max_frames: u32) -> SpriteResult<FrameSequence> {
    let mut seq = match FrameSequence::load_dir(work_dir) {
        Ok(seq) => seq,
        Err(SpriteError::NoFramesFound(_)) => {
            return Err(SpriteError::no_frames(format!(
                "extraction produced no frames in '{}'",
                work_dir.display()
            )));
        }
        Err(e) => return Err(e),
    };
    tracing::info!(frames = seq.len(), "extracted frames");

    if max_frames > 0 {
        let dropped = seq.downsample(max_frames as usize);
        if dropped > 0 {
            tracing::info!(kept = seq.len(), dropped, "downsampled to frame budget");
        }
    }
    Ok(seq)
}

/// A pre-decoded sequence, staged through the work directory like a real extraction.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    frames: FrameSequence,
}

impl InMemorySource {
    pub fn new(frames: FrameSequence) -> Self {
        Self { frames }
    }
}

impl FrameSource for InMemorySource {
    fn describe(&self) -> String {
        format!("{} in-memory frames", self.frames.len())
    }

    fn preflight(&self) -> SpriteResult<()> {
        Ok(())
    }

    fn extract(&self, work_dir: &Path, max_frames: u32) -> SpriteResult<FrameSequence> {
        self.frames.save_dir(work_dir)?;
        finish_extraction(work_dir, max_frames)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/extract/source.rs"]
mod tests;
