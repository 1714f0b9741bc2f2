use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use image::{ImageEncoder as _, RgbaImage};
use indexmap::IndexMap;

use crate::{
    atlas::{
        layout::GridLayout,
        manifest::{AtlasManifest, AtlasMeta, AtlasSize, FrameEntry, MANIFEST_SCALE},
    },
    foundation::error::{SpriteError, SpriteResult},
    frames::sequence::FrameSequence,
};

/// Manifest key of frame `index`.
pub fn frame_key(base_name: &str, index: usize) -> String {
    format!("{base_name}_{index}")
}

/// `(image, manifest)` file names written for `base_name`.
pub fn atlas_file_names(base_name: &str) -> (String, String) {
    (
        format!("{base_name}_atlas.png"),
        format!("{base_name}_atlas.json"),
    )
}

/// zlib effort for the atlas PNG.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PngCompression {
    Fast,
    Default,
    #[default]
    Best,
}

impl PngCompression {
    fn to_image(self) -> image::codecs::png::CompressionType {
        use image::codecs::png::CompressionType;
        match self {
            Self::Fast => CompressionType::Fast,
            Self::Default => CompressionType::Default,
            Self::Best => CompressionType::Best,
        }
    }
}

/// Composed atlas image plus its manifest, not yet written anywhere.
#[derive(Clone, Debug)]
pub struct PackedAtlas {
    pub base_name: String,
    pub image: RgbaImage,
    pub manifest: AtlasManifest,
    pub layout: GridLayout,
}

/// Paths and sizes of a written atlas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasOutput {
    pub png_path: PathBuf,
    pub json_path: PathBuf,
    pub png_bytes: u64,
    pub json_bytes: u64,
}

/// Paste every frame of `seq` into a transparent grid atlas and describe the placements.
#[tracing::instrument(skip(seq), fields(frames = seq.len()))]
pub fn pack_atlas(seq: &FrameSequence, base_name: &str) -> SpriteResult<PackedAtlas> {
    let (frame_w, frame_h) = seq
        .dimensions()
        .ok_or_else(|| SpriteError::no_frames("atlas packing needs at least one frame"))?;
    let layout = GridLayout::new(seq.len(), frame_w, frame_h)?;
    tracing::info!(
        cols = layout.cols,
        rows = layout.rows,
        width = layout.width(),
        height = layout.height(),
        "packing atlas"
    );

    let mut image = RgbaImage::new(layout.width(), layout.height());
    let mut frames = IndexMap::with_capacity(seq.len());
    for (i, frame) in seq.iter().enumerate() {
        let rect = layout.rect(i);
        // Straight copy: keeps the frame's alpha instead of blending over the background.
        image::imageops::replace(&mut image, frame.image(), i64::from(rect.x), i64::from(rect.y));
        frames.insert(frame_key(base_name, i), FrameEntry::untrimmed(rect));
    }

    let (png_name, _) = atlas_file_names(base_name);
    let manifest = AtlasManifest {
        frames,
        meta: AtlasMeta {
            image: png_name,
            size: AtlasSize {
                w: layout.width(),
                h: layout.height(),
            },
            scale: MANIFEST_SCALE.to_string(),
        },
    };

    Ok(PackedAtlas {
        base_name: base_name.to_string(),
        image,
        manifest,
        layout,
    })
}

impl PackedAtlas {
    /// Pixels of the manifest entry `key`, cut back out of the atlas.
    pub fn crop(&self, key: &str) -> Option<RgbaImage> {
        let rect = self.manifest.frames.get(key)?.frame;
        Some(image::imageops::crop_imm(&self.image, rect.x, rect.y, rect.w, rect.h).to_image())
    }

    /// Encode the atlas as PNG with the given compression effort.
    pub fn encode_png(&self, compression: PngCompression) -> SpriteResult<Vec<u8>> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new_with_quality(
            &mut buf,
            compression.to_image(),
            image::codecs::png::FilterType::Adaptive,
        );
        encoder
            .write_image(
                self.image.as_raw(),
                self.image.width(),
                self.image.height(),
                image::ExtendedColorType::Rgba8,
            )
            .context("encode atlas png")?;
        Ok(buf)
    }

    /// Write `{base_name}_atlas.png` and `{base_name}_atlas.json` into `out_dir`.
    ///
    /// Both files are staged as temporary siblings and only renamed into place once both
    /// encoded successfully; a failure leaves no partial atlas behind.
    pub fn write(&self, out_dir: &Path, compression: PngCompression) -> SpriteResult<AtlasOutput> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

        let png = self.encode_png(compression)?;
        let json = self.manifest.to_json_pretty()?;

        let (png_name, json_name) = atlas_file_names(&self.base_name);
        let png_path = out_dir.join(png_name);
        let json_path = out_dir.join(json_name);

        let png_tmp = stage_file(out_dir, png.as_slice())?;
        let json_tmp = stage_file(out_dir, json.as_bytes())?;

        png_tmp
            .persist(&png_path)
            .map_err(|e| anyhow::Error::new(e.error))
            .with_context(|| format!("write atlas png '{}'", png_path.display()))?;
        if let Err(e) = json_tmp.persist(&json_path) {
            let _ = std::fs::remove_file(&png_path);
            return Err(anyhow::Error::new(e.error)
                .context(format!("write atlas json '{}'", json_path.display()))
                .into());
        }

        tracing::info!(path = %png_path.display(), bytes = png.len(), "wrote atlas png");
        tracing::info!(path = %json_path.display(), bytes = json.len(), "wrote atlas json");
        Ok(AtlasOutput {
            png_path,
            json_path,
            png_bytes: png.len() as u64,
            json_bytes: json.len() as u64,
        })
    }
}

fn stage_file(dir: &Path, bytes: &[u8]) -> SpriteResult<tempfile::NamedTempFile> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".spritepipe-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("create temporary file in '{}'", dir.display()))?;
    let staged = tmp.path().to_path_buf();
    tmp.write_all(bytes)
        .with_context(|| format!("write temporary file '{}'", staged.display()))?;
    Ok(tmp)
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/pack.rs"]
mod tests;
