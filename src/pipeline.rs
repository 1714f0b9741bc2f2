use std::path::PathBuf;

use anyhow::Context as _;

use crate::{
    atlas::pack::{AtlasOutput, PngCompression, pack_atlas},
    extract::source::FrameSource,
    foundation::core::{Rgb, Stage, TransformMode},
    foundation::error::{SpriteError, SpriteResult},
    frames::transform::apply_transform,
    matte::background::{BackgroundOpts, MatteStats, remove_background},
};

/// Frame budget of the video pipeline.
pub const DEFAULT_MAX_FRAMES: u32 = 20;

/// Where atlases land unless told otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "images/objects";

/// Options for the extraction stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractOpts {
    /// Upper bound on extracted frames. `0` disables the bound.
    pub max_frames: u32,
    /// Parent of the temporary frames directory. `None` uses the system temp dir.
    pub work_root: Option<PathBuf>,
}

impl Default for ExtractOpts {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
            work_root: None,
        }
    }
}

/// Options controlling one [`Pipeline`] run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOpts {
    /// Base name of the atlas files and of every manifest key.
    pub output_name: String,
    pub output_dir: PathBuf,
    pub extract: ExtractOpts,
    pub background: BackgroundOpts,
    pub mode: TransformMode,
    /// Override the number of rayon worker threads used when `background.parallel` is set.
    /// `None` uses rayon defaults.
    pub threads: Option<usize>,
    pub png_compression: PngCompression,
    /// Also write the processed frames here, as `frame_{i:04}.png`, before packing.
    pub keep_frames: Option<PathBuf>,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            output_name: "sprite".to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            extract: ExtractOpts::default(),
            background: BackgroundOpts::default(),
            mode: TransformMode::None,
            threads: None,
            png_compression: PngCompression::default(),
            keep_frames: None,
        }
    }
}

impl PipelineOpts {
    pub fn new(output_name: impl Into<String>) -> Self {
        Self {
            output_name: output_name.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> SpriteResult<()> {
        let name = self.output_name.as_str();
        if name.is_empty() {
            return Err(SpriteError::validation("output name must not be empty"));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(SpriteError::validation(format!(
                "output name '{name}' must be a plain file name"
            )));
        }
        Ok(())
    }
}

/// What a successful run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    /// Description of the frame source.
    pub source: String,
    /// Frames left after extraction and downsampling.
    pub extracted: usize,
    /// Frames appended by the transform stage.
    pub appended: usize,
    /// Frames packed into the atlas.
    pub frames: usize,
    pub background: Rgb,
    pub matte: MatteStats,
    pub cols: u32,
    pub rows: u32,
    pub width: u32,
    pub height: u32,
    pub output: AtlasOutput,
}

/// Video-to-atlas run: `Idle -> Extracting -> BackgroundRemoving -> (Transforming) -> Packing`,
/// ending in `Done` or `Aborted`.
///
/// The frames directory lives for the duration of [`Pipeline::run`] and is removed on both
/// outcomes.
pub struct Pipeline<'a> {
    source: &'a dyn FrameSource,
    opts: &'a PipelineOpts,
    stage: Stage,
    history: Vec<Stage>,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn FrameSource, opts: &'a PipelineOpts) -> Self {
        Self {
            source,
            opts,
            stage: Stage::Idle,
            history: vec![Stage::Idle],
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Every stage entered so far, starting with `Idle`.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Run every stage once. A pipeline cannot be re-run.
    #[tracing::instrument(skip(self), fields(name = %self.opts.output_name))]
    pub fn run(&mut self) -> SpriteResult<PipelineReport> {
        if self.stage != Stage::Idle {
            return Err(SpriteError::validation(format!(
                "pipeline already ran (stage: {})",
                self.stage
            )));
        }

        match self.run_stages() {
            Ok(report) => {
                self.enter(Stage::Done);
                Ok(report)
            }
            Err(e) => {
                self.enter(Stage::Aborted);
                tracing::warn!(error = %e, "pipeline aborted");
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!(from = %self.stage, to = %stage, "stage transition");
        self.stage = stage;
        self.history.push(stage);
    }

    fn run_stages(&mut self) -> SpriteResult<PipelineReport> {
        let opts = self.opts;
        opts.validate()?;
        self.source.preflight()?;
        let pool = if opts.background.parallel {
            Some(build_thread_pool(opts.threads)?)
        } else {
            None
        };

        let work = create_work_dir(opts)?;
        tracing::info!(
            source = %self.source.describe(),
            work_dir = %work.path().display(),
            "starting pipeline"
        );

        self.enter(Stage::Extracting);
        let mut seq = self
            .source
            .extract(work.path(), opts.extract.max_frames)
            .map_err(|e| e.in_stage(Stage::Extracting))?;
        let extracted = seq.len();

        self.enter(Stage::BackgroundRemoving);
        let (background, matte) = match &pool {
            Some(pool) => pool.install(|| remove_background(&mut seq, &opts.background)),
            None => remove_background(&mut seq, &opts.background),
        }
        .map_err(|e| e.in_stage(Stage::BackgroundRemoving))?;

        let mut appended = 0;
        if opts.mode != TransformMode::None {
            self.enter(Stage::Transforming);
            appended = apply_transform(&mut seq, opts.mode)
                .map_err(|e| e.in_stage(Stage::Transforming))?;
        }

        self.enter(Stage::Packing);
        if let Some(dir) = &opts.keep_frames {
            let written = seq.save_dir(dir).map_err(|e| e.in_stage(Stage::Packing))?;
            tracing::info!(dir = %dir.display(), frames = written.len(), "kept processed frames");
        }
        let atlas = pack_atlas(&seq, &opts.output_name).map_err(|e| e.in_stage(Stage::Packing))?;
        let output = atlas
            .write(&opts.output_dir, opts.png_compression)
            .map_err(|e| e.in_stage(Stage::Packing))?;

        let work_path = work.path().to_path_buf();
        if let Err(e) = work.close() {
            tracing::warn!(dir = %work_path.display(), error = %e, "failed to remove work dir");
        }

        Ok(PipelineReport {
            source: self.source.describe(),
            extracted,
            appended,
            frames: seq.len(),
            background,
            matte,
            cols: atlas.layout.cols,
            rows: atlas.layout.rows,
            width: atlas.layout.width(),
            height: atlas.layout.height(),
            output,
        })
    }
}

/// Run a fresh [`Pipeline`] over `source`.
pub fn run_pipeline(source: &dyn FrameSource, opts: &PipelineOpts) -> SpriteResult<PipelineReport> {
    Pipeline::new(source, opts).run()
}

/// Scratch directory `temp_frames_{name}_XXXXXX`, deleted when dropped.
fn create_work_dir(opts: &PipelineOpts) -> SpriteResult<tempfile::TempDir> {
    let prefix = format!("temp_frames_{}_", opts.output_name);
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix);
    let dir = match &opts.extract.work_root {
        Some(root) => {
            std::fs::create_dir_all(root)
                .with_context(|| format!("create work root '{}'", root.display()))?;
            builder
                .tempdir_in(root)
                .with_context(|| format!("create work dir in '{}'", root.display()))?
        }
        None => builder.tempdir().context("create work dir")?,
    };
    Ok(dir)
}

fn build_thread_pool(threads: Option<usize>) -> SpriteResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SpriteError::validation(
            "pipeline 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SpriteError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
