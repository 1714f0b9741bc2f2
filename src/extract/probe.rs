use std::path::Path;

use crate::foundation::error::{SpriteError, SpriteResult};

/// Frame rate assumed when the source cannot be probed.
pub const FALLBACK_FPS: f64 = 30.0;

/// What `ffprobe` reports about the first video stream.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoProbe {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: f64,
    /// Packet count of the stream (roughly its frame count), when ffprobe counted it.
    pub packets: Option<u64>,
}

impl VideoProbe {
    /// Assumptions used when probing fails: unknown size, 30 fps.
    pub fn fallback() -> Self {
        Self {
            width: None,
            height: None,
            fps: FALLBACK_FPS,
            packets: None,
        }
    }
}

/// Parse an ffmpeg frame rate, either rational (`30000/1001`) or decimal (`29.97`).
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    let s = s.trim();
    let fps = match s.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => s.parse::<f64>().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_read_packets: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// Parse `ffprobe -of json` output for the selected video stream.
pub fn parse_probe_json(bytes: &[u8]) -> SpriteResult<VideoProbe> {
    let parsed: ProbeOut = serde_json::from_slice(bytes)
        .map_err(|e| SpriteError::probe_failed(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| SpriteError::probe_failed("no video stream found"))?;

    let rate = stream.r_frame_rate.as_deref().unwrap_or("");
    let fps = parse_frame_rate(rate)
        .ok_or_else(|| SpriteError::probe_failed(format!("invalid r_frame_rate '{rate}'")))?;

    Ok(VideoProbe {
        width: stream.width,
        height: stream.height,
        fps,
        packets: stream
            .nb_read_packets
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok()),
    })
}

/// Run `ffprobe` on the first video stream of `source_path`.
pub fn probe_video(ffprobe: &Path, source_path: &Path) -> SpriteResult<VideoProbe> {
    let out = std::process::Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_packets",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_read_packets",
            "-of",
            "json",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| SpriteError::probe_failed(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SpriteError::probe_failed(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(&out.stdout)
}

/// [`probe_video`], falling back to [`VideoProbe::fallback`] with a warning on failure.
pub fn probe_or_fallback(ffprobe: &Path, source_path: &Path) -> VideoProbe {
    match probe_video(ffprobe, source_path) {
        Ok(probe) => probe,
        Err(err) => {
            tracing::warn!(error = %err, "could not probe video; assuming {FALLBACK_FPS} fps");
            VideoProbe::fallback()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/extract/probe.rs"]
mod tests;
