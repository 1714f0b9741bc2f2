use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    extract::{
        probe::{VideoProbe, probe_or_fallback},
        source::{FrameSource, finish_extraction},
    },
    foundation::error::{SpriteError, SpriteResult},
    frames::sequence::FrameSequence,
};

/// Output rate used when no frame budget is given.
pub const UNBOUNDED_FPS_FILTER: &str = "fps=10";

/// Assumed clip length, in seconds, behind the sampling-rate guess.
const ASSUMED_CLIP_SECS: f64 = 2.0;

/// Locations of the external decoder binaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FfmpegTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl FfmpegTools {
    /// Version probe of the `ffmpeg` binary.
    pub fn is_ffmpeg_available(&self) -> bool {
        Command::new(&self.ffmpeg)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Fail with [`SpriteError::ToolMissing`] unless `ffmpeg -version` succeeds.
    pub fn ensure_ffmpeg(&self) -> SpriteResult<()> {
        if self.is_ffmpeg_available() {
            Ok(())
        } else {
            Err(SpriteError::tool_missing(format!(
                "'{}' is required for frame extraction, but was not found or is not runnable \
                 (install ffmpeg: https://ffmpeg.org/download.html)",
                self.ffmpeg.display()
            )))
        }
    }
}

/// `fps=` filter sampling roughly `max_frames` frames, assuming a ~2 second clip.
///
/// The result is only a first guess: extraction may yield more frames than requested, which
/// are then downsampled exactly.
pub fn fps_filter(max_frames: u32, source_fps: f64) -> String {
    if max_frames == 0 || source_fps.is_nan() || source_fps <= 0.0 {
        return UNBOUNDED_FPS_FILTER.to_string();
    }
    let wanted = f64::from(max_frames) / ASSUMED_CLIP_SECS;
    format!("fps={}", wanted.min(source_fps))
}

/// Decode `video` into `out_dir` as `frame_%04d.png` through an `fps` filter.
#[tracing::instrument(skip(tools))]
pub fn extract_frames_to_dir(
    tools: &FfmpegTools,
    video: &Path,
    out_dir: &Path,
    filter: &str,
) -> SpriteResult<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create frames dir '{}'", out_dir.display()))?;

    let out = Command::new(&tools.ffmpeg)
        .args(["-v", "error", "-y", "-i"])
        .arg(video)
        .args(["-vf", filter, "-vsync", "vfr"])
        .arg(out_dir.join("frame_%04d.png"))
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(&tools.ffmpeg, e))?;

    if !out.status.success() {
        return Err(SpriteError::extraction_failed(format!(
            "ffmpeg exited with status {} for '{}': {}",
            out.status,
            video.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

/// Write the first frame of `video` to `out_png`, e.g. for picking a mask region.
pub fn extract_first_frame(tools: &FfmpegTools, video: &Path, out_png: &Path) -> SpriteResult<()> {
    if let Some(parent) = out_png.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let out = Command::new(&tools.ffmpeg)
        .args(["-v", "error", "-y", "-i"])
        .arg(video)
        .args(["-vframes", "1"])
        .arg(out_png)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(&tools.ffmpeg, e))?;

    if !out.status.success() || !out_png.is_file() {
        return Err(SpriteError::extraction_failed(format!(
            "could not extract first frame of '{}': {}",
            video.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

fn spawn_error(bin: &Path, e: std::io::Error) -> SpriteError {
    if e.kind() == ErrorKind::NotFound {
        SpriteError::tool_missing(format!("'{}' not found on PATH", bin.display()))
    } else {
        SpriteError::extraction_failed(format!("failed to spawn '{}': {e}", bin.display()))
    }
}

/// Frames sampled from a video file with the system `ffmpeg`.
#[derive(Clone, Debug)]
pub struct VideoSource {
    pub video: PathBuf,
    pub tools: FfmpegTools,
}

impl VideoSource {
    pub fn new(video: impl Into<PathBuf>) -> Self {
        Self {
            video: video.into(),
            tools: FfmpegTools::default(),
        }
    }

    pub fn with_tools(mut self, tools: FfmpegTools) -> Self {
        self.tools = tools;
        self
    }
}

impl FrameSource for VideoSource {
    fn describe(&self) -> String {
        self.video.display().to_string()
    }

    fn preflight(&self) -> SpriteResult<()> {
        self.tools.ensure_ffmpeg()
    }

    fn extract(&self, work_dir: &Path, max_frames: u32) -> SpriteResult<FrameSequence> {
        let probe = probe_or_fallback(&self.tools.ffprobe, &self.video);
        log_probe(&probe);

        let filter = fps_filter(max_frames, probe.fps);
        tracing::info!(filter = %filter, "extracting frames");
        extract_frames_to_dir(&self.tools, &self.video, work_dir, &filter)?;

        finish_extraction(work_dir, max_frames)
    }
}

fn log_probe(probe: &VideoProbe) {
    match (probe.width, probe.height) {
        (Some(w), Some(h)) => {
            tracing::info!(width = w, height = h, fps = probe.fps, "probed video")
        }
        _ => tracing::info!(fps = probe.fps, "video size unknown"),
    }
    if let Some(packets) = probe.packets {
        tracing::info!(packets, "estimated total frames");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/extract/ffmpeg.rs"]
mod tests;
