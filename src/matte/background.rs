use crate::{
    foundation::core::{MaskRegion, Rgb},
    foundation::error::{SpriteError, SpriteResult},
    frames::{frame::Frame, sequence::FrameSequence},
    matte::{
        for_each_row,
        fringe::{DEFAULT_FRINGE_PASSES, FringePass, clean_fringe},
    },
};

/// Default color-distance threshold of the video pipeline.
pub const DEFAULT_THRESHOLD: u32 = 30;

/// Options for [`remove_background`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundOpts {
    /// Per-channel tolerance. Pixels within `3 * threshold` (summed over R, G, B) of the
    /// background color become transparent; up to `6 * threshold` they fade linearly.
    pub threshold: u32,
    /// Rectangle forced to alpha 0 in every frame.
    pub mask: Option<MaskRegion>,
    /// White-fringe cleanup passes, run in order after classification.
    pub fringe: Vec<FringePass>,
    /// Process rows on the current rayon pool.
    pub parallel: bool,
}

impl Default for BackgroundOpts {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            mask: None,
            fringe: DEFAULT_FRINGE_PASSES.to_vec(),
            parallel: false,
        }
    }
}

/// Per-frame counters reported by [`remove_background_frame`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatteStats {
    /// Pixels set fully transparent by the mask or the background match.
    pub cleared: usize,
    /// Pixels given a partial alpha on the soft edge.
    pub softened: usize,
    /// Pixels cleared by the fringe passes.
    pub defringed: usize,
}

impl std::ops::AddAssign for MatteStats {
    fn add_assign(&mut self, rhs: Self) {
        self.cleared += rhs.cleared;
        self.softened += rhs.softened;
        self.defringed += rhs.defringed;
    }
}

/// New alpha for a pixel at summed channel distance `diff` from the background.
///
/// `diff <= 3t` is background (0), `diff <= 6t` is a linear ramp from 0 to 255, anything
/// further keeps `alpha`.
pub fn classify_alpha(diff: u32, threshold: u32, alpha: u8) -> u8 {
    let near = threshold.saturating_mul(3);
    let far = threshold.saturating_mul(6);
    if diff <= near {
        0
    } else if diff <= far {
        // near > 0 here: diff > near >= 0 and diff <= far = 2 * near.
        let t = f64::from(diff - near) / f64::from(near) * 255.0;
        t.round().clamp(0.0, 255.0) as u8
    } else {
        alpha
    }
}

/// Color of pixel (0,0), the reference background for a whole sequence.
pub fn sample_background(frame: &Frame) -> SpriteResult<Rgb> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(SpriteError::validation(
            "cannot sample background color from an empty frame",
        ));
    }
    let px = frame.image().get_pixel(0, 0);
    Ok(Rgb::new(px[0], px[1], px[2]))
}

/// Rewrite the alpha channel of every frame in `seq`, using frame 0's corner as background.
///
/// Returns the sampled background color and the summed per-frame counters.
#[tracing::instrument(skip(seq, opts), fields(frames = seq.len(), threshold = opts.threshold))]
pub fn remove_background(
    seq: &mut FrameSequence,
    opts: &BackgroundOpts,
) -> SpriteResult<(Rgb, MatteStats)> {
    let first = seq
        .get(0)
        .ok_or_else(|| SpriteError::no_frames("background removal needs at least one frame"))?;
    let bg = sample_background(first)?;
    tracing::info!(background = %bg, threshold = opts.threshold, "removing background");

    let total = seq.len();
    let mut stats = MatteStats::default();
    for (i, frame) in seq.frames_mut().iter_mut().enumerate() {
        stats += remove_background_frame(frame, bg, opts);
        if (i + 1) % 5 == 0 || i + 1 == total {
            tracing::debug!(done = i + 1, total, "processed frames");
        }
    }
    Ok((bg, stats))
}

/// Classify every pixel of one frame against `bg`, then run the fringe passes.
pub fn remove_background_frame(frame: &mut Frame, bg: Rgb, opts: &BackgroundOpts) -> MatteStats {
    let (width, height) = frame.dimensions();
    let mask = opts.mask.and_then(|m| m.clamped(width, height));
    let threshold = opts.threshold;
    let (near, far) = (threshold.saturating_mul(3), threshold.saturating_mul(6));

    let softened = std::sync::atomic::AtomicUsize::new(0);
    let image = frame.image_mut();
    let cleared = for_each_row(image, width as usize * 4, opts.parallel, |y, row| {
        let y = y as u32;
        let mut cleared = 0usize;
        let mut soft = 0usize;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            if mask.is_some_and(|m| m.contains(x as u32, y)) {
                px[3] = 0;
                cleared += 1;
                continue;
            }
            let diff = bg.manhattan(px[0], px[1], px[2]);
            if diff <= near {
                cleared += 1;
            } else if diff <= far {
                soft += 1;
            }
            px[3] = classify_alpha(diff, threshold, px[3]);
        }
        softened.fetch_add(soft, std::sync::atomic::Ordering::Relaxed);
        cleared
    });

    let defringed = clean_fringe(frame.image_mut(), &opts.fringe, opts.parallel);
    MatteStats {
        cleared,
        softened: softened.into_inner(),
        defringed,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/matte/background.rs"]
mod tests;
