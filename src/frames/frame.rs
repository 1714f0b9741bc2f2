use std::path::Path;

use anyhow::Context as _;
use image::RgbaImage;

use crate::foundation::error::SpriteResult;

/// One straight-alpha RGBA8 raster in an animation sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decode any format supported by `image` and convert it to RGBA8.
    pub fn open(path: &Path) -> SpriteResult<Self> {
        let dyn_img =
            image::open(path).with_context(|| format!("decode frame '{}'", path.display()))?;
        Ok(Self::new(dyn_img.to_rgba8()))
    }

    /// Write the frame as PNG, regardless of the path's extension.
    pub fn save_png(&self, path: &Path) -> SpriteResult<()> {
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write frame '{}'", path.display()))?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Left-right mirror of this frame.
    pub fn flipped_horizontal(&self) -> Self {
        Self::new(image::imageops::flip_horizontal(&self.image))
    }
}

impl From<RgbaImage> for Frame {
    fn from(image: RgbaImage) -> Self {
        Self::new(image)
    }
}
