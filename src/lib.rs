//! spritepipe turns short videos and frame directories into sprite atlases for 2D games.
//!
//! The main entry point is the video pipeline:
//!
//! - Extract a bounded, evenly sampled [`FrameSequence`] from a [`FrameSource`]
//!   (usually a [`VideoSource`] backed by the system `ffmpeg`)
//! - Key out the background color sampled from frame 0 ([`remove_background`])
//! - Optionally append a ping-pong or mirrored tail ([`apply_transform`])
//! - Pack the frames on a square-ish grid with a JSON manifest ([`pack_atlas`])
//!
//! [`Pipeline`] runs these stages in order inside a temporary frames directory.
#![forbid(unsafe_code)]

mod args;
mod atlas;
mod extract;
mod foundation;
mod frames;
mod matte;
mod pipeline;
mod tools;

pub use crate::foundation::core::{MaskRegion, Rgb, Stage, TransformMode};
pub use crate::foundation::error::{SpriteError, SpriteResult};

pub use crate::args::{lenient_fringe, lenient_mask, lenient_number};
pub use crate::atlas::layout::{GridLayout, grid_dims};
pub use crate::atlas::manifest::{AtlasManifest, AtlasMeta, AtlasRect, AtlasSize, FrameEntry};
pub use crate::atlas::pack::{
    AtlasOutput, PackedAtlas, PngCompression, atlas_file_names, frame_key, pack_atlas,
};
pub use crate::extract::ffmpeg::{
    FfmpegTools, VideoSource, extract_first_frame, extract_frames_to_dir, fps_filter,
};
pub use crate::extract::probe::{
    FALLBACK_FPS, VideoProbe, parse_frame_rate, parse_probe_json, probe_or_fallback, probe_video,
};
pub use crate::extract::source::{FrameSource, InMemorySource, finish_extraction};
pub use crate::frames::frame::Frame;
pub use crate::frames::sequence::{FrameSequence, even_sample_indices, frame_file_name};
pub use crate::frames::transform::{append_mirror, append_pingpong, apply_transform};
pub use crate::matte::background::{
    BackgroundOpts, DEFAULT_THRESHOLD, MatteStats, classify_alpha, remove_background,
    remove_background_frame, sample_background,
};
pub use crate::matte::fringe::{
    DEFAULT_FRINGE_PASSES, FringePass, clean_fringe, parse_fringe_passes,
};
pub use crate::pipeline::{
    DEFAULT_MAX_FRAMES, DEFAULT_OUTPUT_DIR, ExtractOpts, Pipeline, PipelineOpts, PipelineReport,
    run_pipeline,
};
pub use crate::tools::{
    DirTransform, MATTE_DEFAULT_THRESHOLD, matte_file, pack_frames_dir, transform_frames_dir,
};
