use std::{fmt, str::FromStr};

use crate::foundation::error::{SpriteError, SpriteResult};

/// Straight (non-premultiplied) RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Summed absolute channel difference (`|dr| + |dg| + |db|`), in `0..=765`.
    pub fn manhattan(self, r: u8, g: u8, b: u8) -> u32 {
        u32::from(self.r.abs_diff(r)) + u32::from(self.g.abs_diff(g)) + u32::from(self.b.abs_diff(b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Axis-aligned rectangle forced to full transparency, with inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MaskRegion {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl MaskRegion {
    /// Build a region from two corners in any order.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Clamp the region to a `width`x`height` image. Returns `None` when nothing of the region
    /// lies inside the image.
    pub fn clamped(self, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || self.x1 >= width || self.y1 >= height {
            return None;
        }
        Some(Self {
            x1: self.x1,
            y1: self.y1,
            x2: self.x2.min(width - 1),
            y2: self.y2.min(height - 1),
        })
    }

    pub fn contains(self, x: u32, y: u32) -> bool {
        self.x1 <= x && x <= self.x2 && self.y1 <= y && y <= self.y2
    }
}

impl fmt::Display for MaskRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x1, self.y1, self.x2, self.y2)
    }
}

impl FromStr for MaskRegion {
    type Err = SpriteError;

    /// Parses `x1,y1,x2,y2`.
    fn from_str(s: &str) -> SpriteResult<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SpriteError::invalid_argument(format!("mask '{s}': {e}")))?;
        let [x1, y1, x2, y2] = parts[..] else {
            return Err(SpriteError::invalid_argument(format!(
                "mask '{s}' must have exactly four values x1,y1,x2,y2"
            )));
        };
        Ok(Self::new(x1, y1, x2, y2))
    }
}

/// Tail appended to a frame sequence before packing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransformMode {
    #[default]
    None,
    /// Forward then backward, without repeating the first and last frames.
    PingPong,
    /// Horizontally flipped copy of every frame, in original order.
    Mirror,
}

impl TransformMode {
    /// Collapse the two CLI flags into one mode. Ping-pong wins when both are set.
    pub fn from_flags(pingpong: bool, mirror: bool) -> Self {
        if pingpong {
            Self::PingPong
        } else if mirror {
            Self::Mirror
        } else {
            Self::None
        }
    }
}

/// Pipeline state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    Extracting,
    BackgroundRemoving,
    Transforming,
    Packing,
    Done,
    Aborted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Extracting => "extracting",
            Stage::BackgroundRemoving => "background removing",
            Stage::Transforming => "transforming",
            Stage::Packing => "packing",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
