use crate::{
    atlas::manifest::AtlasRect,
    foundation::error::{SpriteError, SpriteResult},
};

/// Square-ish grid holding `count` equally sized cells in row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub count: usize,
    pub cols: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl GridLayout {
    /// `cols = ceil(sqrt(count))`, `rows = ceil(count / cols)`.
    pub fn new(count: usize, cell_width: u32, cell_height: u32) -> SpriteResult<Self> {
        if count == 0 {
            return Err(SpriteError::no_frames("cannot lay out an atlas with zero frames"));
        }
        let (cols, rows) = grid_dims(count);
        let layout = Self {
            count,
            cols,
            rows,
            cell_width,
            cell_height,
        };
        if cols.checked_mul(cell_width).is_none() || rows.checked_mul(cell_height).is_none() {
            return Err(SpriteError::validation(format!(
                "atlas of {cols}x{rows} cells of {cell_width}x{cell_height} overflows u32"
            )));
        }
        Ok(layout)
    }

    pub fn width(&self) -> u32 {
        self.cols * self.cell_width
    }

    pub fn height(&self) -> u32 {
        self.rows * self.cell_height
    }

    /// `(col, row)` of cell `index`.
    pub fn cell(&self, index: usize) -> (u32, u32) {
        let cols = self.cols as usize;
        ((index % cols) as u32, (index / cols) as u32)
    }

    /// Pixel rectangle of cell `index` inside the atlas.
    pub fn rect(&self, index: usize) -> AtlasRect {
        let (col, row) = self.cell(index);
        AtlasRect {
            x: col * self.cell_width,
            y: row * self.cell_height,
            w: self.cell_width,
            h: self.cell_height,
        }
    }
}

/// Minimal near-square grid for `count > 0` cells.
pub fn grid_dims(count: usize) -> (u32, u32) {
    let mut cols = (count as f64).sqrt().ceil() as usize;
    // Float sqrt can be off by one for large counts.
    while cols * cols < count {
        cols += 1;
    }
    while cols > 1 && (cols - 1) * (cols - 1) >= count {
        cols -= 1;
    }
    let cols = cols.max(1);
    let rows = count.div_ceil(cols);
    (cols as u32, rows as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/layout.rs"]
mod tests;
