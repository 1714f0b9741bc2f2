use crate::{
    foundation::core::TransformMode,
    foundation::error::{SpriteError, SpriteResult},
    frames::sequence::FrameSequence,
};

/// Append the tail selected by `mode` to `seq`. Returns the number of appended frames.
#[tracing::instrument(skip(seq), fields(frames = seq.len()))]
pub fn apply_transform(seq: &mut FrameSequence, mode: TransformMode) -> SpriteResult<usize> {
    match mode {
        TransformMode::None => Ok(0),
        TransformMode::PingPong => append_pingpong(seq),
        TransformMode::Mirror => append_mirror(seq),
    }
}

/// Append frames `N-2, N-3, ..., 1`, so playback runs forward then backward without doubling
/// the endpoints. Sequences shorter than two frames are left untouched.
pub fn append_pingpong(seq: &mut FrameSequence) -> SpriteResult<usize> {
    let n = seq.len();
    if n < 2 {
        tracing::warn!(frames = n, "ping-pong needs at least 2 frames; skipping");
        return Ok(0);
    }

    let tail = seq.frames()[1..n - 1]
        .iter()
        .rev()
        .cloned()
        .collect::<Vec<_>>();
    let added = tail.len();
    for frame in tail {
        seq.push(frame)?;
    }
    tracing::info!(original = n, added, total = seq.len(), "appended ping-pong tail");
    Ok(added)
}

/// Append a horizontally flipped copy of every frame, in original order.
pub fn append_mirror(seq: &mut FrameSequence) -> SpriteResult<usize> {
    let n = seq.len();
    if n == 0 {
        return Err(SpriteError::no_frames("mirror needs at least one frame"));
    }

    let mirrored = seq
        .iter()
        .map(|f| f.flipped_horizontal())
        .collect::<Vec<_>>();
    for frame in mirrored {
        seq.push(frame)?;
    }
    tracing::info!(original = n, added = n, total = seq.len(), "appended mirrored tail");
    Ok(n)
}

#[cfg(test)]
#[path = "../../tests/unit/frames/transform.rs"]
mod tests;
