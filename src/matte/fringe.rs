use std::str::FromStr;

use image::RgbaImage;

use crate::{
    foundation::error::{SpriteError, SpriteResult},
    matte::for_each_row,
};

/// Pixels at or above this alpha are candidates for fringe removal.
const MIN_CANDIDATE_ALPHA: u8 = 10;
/// A neighbor below this alpha counts as "outside" the sprite.
const OUTSIDE_ALPHA: u8 = 128;

/// One white-fringe cleanup sub-pass.
///
/// A pixel whose R, G and B are all `>= min_white` is cleared when any pixel in the square of
/// side `2 * radius + 1` around it was mostly transparent before the pass started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FringePass {
    pub min_white: u8,
    pub radius: u32,
}

impl FringePass {
    pub const fn new(min_white: u8, radius: u32) -> Self {
        Self { min_white, radius }
    }
}

pub const DEFAULT_FRINGE_PASSES: [FringePass; 4] = [
    FringePass::new(200, 2),
    FringePass::new(180, 1),
    FringePass::new(160, 1),
    FringePass::new(140, 2),
];

impl FromStr for FringePass {
    type Err = SpriteError;

    /// Parses `white:radius`, e.g. `200:2`.
    fn from_str(s: &str) -> SpriteResult<Self> {
        let (white, radius) = s.split_once(':').ok_or_else(|| {
            SpriteError::invalid_argument(format!("fringe pass '{s}' must look like white:radius"))
        })?;
        let min_white = white
            .trim()
            .parse::<u8>()
            .map_err(|e| SpriteError::invalid_argument(format!("fringe white '{white}': {e}")))?;
        let radius = radius
            .trim()
            .parse::<u32>()
            .map_err(|e| SpriteError::invalid_argument(format!("fringe radius '{radius}': {e}")))?;
        Ok(Self::new(min_white, radius))
    }
}

/// Parse a comma separated pass list such as `200:2,180:1`.
pub fn parse_fringe_passes(s: &str) -> SpriteResult<Vec<FringePass>> {
    s.split(',')
        .filter(|p| !p.trim().is_empty())
        .map(FringePass::from_str)
        .collect()
}

/// Run `passes` in order over `image`. Returns the number of pixels cleared.
pub fn clean_fringe(image: &mut RgbaImage, passes: &[FringePass], parallel: bool) -> usize {
    passes
        .iter()
        .map(|pass| fringe_pass(image, *pass, parallel))
        .sum()
}

fn fringe_pass(image: &mut RgbaImage, pass: FringePass, parallel: bool) -> usize {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return 0;
    }

    // Neighbor reads must see the state before this pass, not rows already rewritten by it.
    let alpha = image.pixels().map(|p| p[3]).collect::<Vec<u8>>();
    let r = pass.radius as usize;
    let white = pass.min_white;

    for_each_row(image, w * 4, parallel, |y, row| {
        let mut cleared = 0usize;
        let (y0, y1) = (y.saturating_sub(r), (y + r).min(h - 1));
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            if alpha[y * w + x] < MIN_CANDIDATE_ALPHA
                || px[0] < white
                || px[1] < white
                || px[2] < white
            {
                continue;
            }
            let (x0, x1) = (x.saturating_sub(r), (x + r).min(w - 1));
            let touches_outside = (y0..=y1).any(|ny| {
                (x0..=x1).any(|nx| (nx, ny) != (x, y) && alpha[ny * w + nx] < OUTSIDE_ALPHA)
            });
            if touches_outside {
                px[3] = 0;
                cleared += 1;
            }
        }
        cleared
    })
}

#[cfg(test)]
#[path = "../../tests/unit/matte/fringe.rs"]
mod tests;
