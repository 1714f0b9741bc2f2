use std::path::Path;

use anyhow::Context as _;
use indexmap::IndexMap;

use crate::foundation::error::{SpriteError, SpriteResult};

/// Scale string written to every manifest.
pub const MANIFEST_SCALE: &str = "1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtlasSize {
    pub w: u32,
    pub h: u32,
}

/// Placement of one frame. Frames are never trimmed or rotated, so the sprite source rect is
/// always the full frame at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEntry {
    pub frame: AtlasRect,
    pub rotated: bool,
    pub trimmed: bool,
    pub sprite_source_size: AtlasRect,
    pub source_size: AtlasSize,
}

impl FrameEntry {
    pub fn untrimmed(frame: AtlasRect) -> Self {
        Self {
            frame,
            rotated: false,
            trimmed: false,
            sprite_source_size: AtlasRect {
                x: 0,
                y: 0,
                w: frame.w,
                h: frame.h,
            },
            source_size: AtlasSize {
                w: frame.w,
                h: frame.h,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtlasMeta {
    /// File name of the atlas image, relative to the manifest.
    pub image: String,
    pub size: AtlasSize,
    pub scale: String,
}

/// Sprite-sheet manifest in the common "JSON hash" layout: frame name to placement, plus meta.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtlasManifest {
    /// Entries in sequence order.
    pub frames: IndexMap<String, FrameEntry>,
    pub meta: AtlasMeta,
}

impl AtlasManifest {
    pub fn to_json_pretty(&self) -> SpriteResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SpriteError::serde(format!("serialize atlas manifest: {e}")))
    }

    pub fn from_json(json: &str) -> SpriteResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SpriteError::serde(format!("parse atlas manifest: {e}")))
    }

    pub fn from_path(path: &Path) -> SpriteResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read atlas manifest '{}'", path.display()))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/manifest.rs"]
mod tests;
