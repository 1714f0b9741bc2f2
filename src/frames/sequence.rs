use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    foundation::error::{SpriteError, SpriteResult},
    frames::frame::Frame,
};

/// An ordered, gap-free sequence of equally sized frames.
///
/// Frame identity is the position in the sequence. Every mutating operation keeps indices
/// contiguous from zero, so a sequence can always be written back as `frame_0000.png`,
/// `frame_0001.png`, ... without holes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequence, rejecting frames whose size differs from frame 0.
    pub fn from_frames(frames: Vec<Frame>) -> SpriteResult<Self> {
        let mut seq = Self {
            frames: Vec::with_capacity(frames.len()),
        };
        for frame in frames {
            seq.push(frame)?;
        }
        Ok(seq)
    }

    /// Append a frame at index `len()`.
    pub fn push(&mut self, frame: Frame) -> SpriteResult<()> {
        if let Some((w, h)) = self.dimensions()
            && frame.dimensions() != (w, h)
        {
            return Err(SpriteError::validation(format!(
                "frame {} is {}x{}, expected {w}x{h} like frame 0",
                self.frames.len(),
                frame.width(),
                frame.height()
            )));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Shared `(width, height)` of every frame, `None` for an empty sequence.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(Frame::dimensions)
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut [Frame] {
        &mut self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Keep at most `max` evenly spaced frames (see [`even_sample_indices`]) and re-index the
    /// survivors from zero. Returns the number of dropped frames.
    pub fn downsample(&mut self, max: usize) -> usize {
        let before = self.frames.len();
        if before <= max {
            return 0;
        }
        let keep = even_sample_indices(before, max);
        let mut old = std::mem::take(&mut self.frames)
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>();
        self.frames = keep.into_iter().filter_map(|i| old[i].take()).collect();
        before - self.frames.len()
    }

    /// Load every `*.png` in `dir`, in natural file-name order.
    pub fn load_dir(dir: &Path) -> SpriteResult<Self> {
        let files = list_png_files(dir)?;
        if files.is_empty() {
            return Err(SpriteError::no_frames(format!(
                "no PNG frames in '{}'",
                dir.display()
            )));
        }
        let mut seq = Self {
            frames: Vec::with_capacity(files.len()),
        };
        for path in &files {
            seq.push(Frame::open(path)?)?;
        }
        tracing::debug!(dir = %dir.display(), frames = seq.len(), "loaded frame sequence");
        Ok(seq)
    }

    /// Write the sequence as `frame_{index:04}.png` files into `dir`, creating it if needed.
    pub fn save_dir(&self, dir: &Path) -> SpriteResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create frames dir '{}'", dir.display()))?;
        let mut out = Vec::with_capacity(self.frames.len());
        for (i, frame) in self.frames.iter().enumerate() {
            let path = dir.join(frame_file_name(i));
            frame.save_png(&path)?;
            out.push(path);
        }
        Ok(out)
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Canonical on-disk name of frame `index`.
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{index:04}.png")
}

/// Indices `floor(i * count / max)` for `i` in `0..max`: `max` evenly spaced picks out of
/// `count`. Returns `0..count` when `count <= max`.
pub fn even_sample_indices(count: usize, max: usize) -> Vec<usize> {
    if count <= max {
        return (0..count).collect();
    }
    (0..max)
        .map(|i| ((i as u128 * count as u128) / max as u128) as usize)
        .collect()
}

/// `*.png` files directly inside `dir`, in natural name order.
pub fn list_png_files(dir: &Path) -> SpriteResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read frames dir '{}'", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("read frames dir '{}'", dir.display()))?
            .path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| {
        let name = |p: &PathBuf| p.file_name().map(|n| n.to_string_lossy().into_owned());
        natural_cmp(&name(a).unwrap_or_default(), &name(b).unwrap_or_default())
    });
    Ok(files)
}

/// Compare names with digit runs ordered by value, so `frame_9999` sorts before `frame_10000`.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        let (Some(x), Some(y)) = (a.chars().next(), b.chars().next()) else {
            return a.len().cmp(&b.len());
        };
        if x.is_ascii_digit() && y.is_ascii_digit() {
            let (da, rest_a) = split_digits(a);
            let (db, rest_b) = split_digits(b);
            let (va, vb) = (da.trim_start_matches('0'), db.trim_start_matches('0'));
            let ord = va
                .len()
                .cmp(&vb.len())
                .then_with(|| va.cmp(vb))
                .then_with(|| da.len().cmp(&db.len()));
            if ord != Ordering::Equal {
                return ord;
            }
            (a, b) = (rest_a, rest_b);
        } else {
            if x != y {
                return x.cmp(&y);
            }
            (a, b) = (&a[x.len_utf8()..], &b[y.len_utf8()..]);
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
#[path = "../../tests/unit/frames/sequence.rs"]
mod tests;
