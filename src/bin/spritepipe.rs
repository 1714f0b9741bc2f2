use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "spritepipe",
    version,
    about = "Build sprite atlases from videos and frame directories"
)]
struct Cli {
    /// Log debug detail to stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Video to atlas: extract frames, key out the background, pack (requires `ffmpeg` on PATH).
    Video(VideoArgs),
    /// Pack a directory of PNG frames into an atlas.
    Pack(PackArgs),
    /// Append a mirrored (or ping-pong) tail to a directory of frames.
    Mirror(MirrorArgs),
    /// Key out the background of a single image.
    Matte(MatteArgs),
    /// Write the first frame of a video as PNG, e.g. to pick a mask region.
    FirstFrame(FirstFrameArgs),
}

#[derive(Args, Debug)]
struct MatteFlags {
    /// Rectangle x1,y1,x2,y2 (inclusive) cleared in every frame.
    #[arg(long)]
    mask: Option<String>,

    /// White-fringe cleanup passes as white:radius,... (default 200:2,180:1,160:1,140:2).
    #[arg(long, conflicts_with = "no_fringe")]
    fringe: Option<String>,

    /// Skip white-fringe cleanup.
    #[arg(long)]
    no_fringe: bool,

    /// Process pixel rows in parallel.
    #[arg(long)]
    parallel: bool,
}

impl MatteFlags {
    fn background_opts(&self, threshold: u32) -> spritepipe::BackgroundOpts {
        let fringe = if self.no_fringe {
            Vec::new()
        } else {
            spritepipe::lenient_fringe(self.fringe.as_deref())
        };
        spritepipe::BackgroundOpts {
            threshold,
            mask: spritepipe::lenient_mask(self.mask.as_deref()),
            fringe,
            parallel: self.parallel,
        }
    }
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Input video.
    video: PathBuf,

    /// Base name of the atlas files and frame keys.
    output_name: String,

    /// Color-distance threshold (default 30).
    #[arg(allow_hyphen_values = true)]
    threshold: Option<String>,

    /// Maximum number of frames, 0 for no limit (default 20).
    #[arg(allow_hyphen_values = true)]
    max_frames: Option<String>,

    #[command(flatten)]
    matte: MatteFlags,

    /// Append frames N-2..1 for forward-backward playback. Wins over --mirror.
    #[arg(long)]
    pingpong: bool,

    /// Append a horizontally flipped copy of every frame.
    #[arg(long)]
    mirror: bool,

    /// Directory receiving the atlas files.
    #[arg(long, default_value = spritepipe::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Parent of the temporary frames directory (default: system temp dir).
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Worker threads for --parallel.
    #[arg(long)]
    threads: Option<usize>,

    /// zlib effort for the atlas PNG.
    #[arg(long, value_enum, default_value_t = CompressionChoice::Best)]
    png_compression: CompressionChoice,

    /// Also save the processed frames into this directory.
    #[arg(long)]
    keep_frames: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PackArgs {
    /// Directory of PNG frames, packed in file-name order.
    frames_dir: PathBuf,

    /// Base name of the atlas files and frame keys.
    output_name: String,

    /// Directory receiving the atlas files.
    #[arg(long, default_value = spritepipe::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// zlib effort for the atlas PNG.
    #[arg(long, value_enum, default_value_t = CompressionChoice::Best)]
    png_compression: CompressionChoice,
}

#[derive(Parser, Debug)]
struct MirrorArgs {
    /// Directory of PNG frames.
    frames_dir: PathBuf,

    /// Where to write the full sequence. Without it, new frames are added next to the originals.
    output_dir: Option<PathBuf>,

    /// Append a ping-pong tail instead of mirrored frames.
    #[arg(long)]
    pingpong: bool,
}

#[derive(Parser, Debug)]
struct MatteArgs {
    /// Input image.
    input: PathBuf,

    /// Output PNG.
    output: PathBuf,

    /// Color-distance threshold (default 10).
    #[arg(allow_hyphen_values = true)]
    threshold: Option<String>,

    #[command(flatten)]
    matte: MatteFlags,
}

#[derive(Parser, Debug)]
struct FirstFrameArgs {
    /// Input video.
    video: PathBuf,

    /// Output PNG.
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompressionChoice {
    Fast,
    Default,
    Best,
}

impl From<CompressionChoice> for spritepipe::PngCompression {
    fn from(choice: CompressionChoice) -> Self {
        match choice {
            CompressionChoice::Fast => Self::Fast,
            CompressionChoice::Default => Self::Default,
            CompressionChoice::Best => Self::Best,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Video(args) => cmd_video(args),
        Command::Pack(args) => cmd_pack(args),
        Command::Mirror(args) => cmd_mirror(args),
        Command::Matte(args) => cmd_matte(args),
        Command::FirstFrame(args) => cmd_first_frame(args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let threshold = spritepipe::lenient_number(
        args.threshold.as_deref(),
        spritepipe::DEFAULT_THRESHOLD,
        "threshold",
    );
    let max_frames = spritepipe::lenient_number(
        args.max_frames.as_deref(),
        spritepipe::DEFAULT_MAX_FRAMES,
        "max frames",
    );

    let opts = spritepipe::PipelineOpts {
        output_name: args.output_name,
        output_dir: args.output_dir,
        extract: spritepipe::ExtractOpts {
            max_frames,
            work_root: args.work_dir,
        },
        background: args.matte.background_opts(threshold),
        mode: spritepipe::TransformMode::from_flags(args.pingpong, args.mirror),
        threads: args.threads,
        png_compression: args.png_compression.into(),
        keep_frames: args.keep_frames,
    };

    let source = spritepipe::VideoSource::new(args.video);
    let report = spritepipe::run_pipeline(&source, &opts)?;

    println!("frames: {}", report.frames);
    println!("grid: {}x{}", report.cols, report.rows);
    println!("atlas: {}x{}", report.width, report.height);
    println!("wrote {}", report.output.png_path.display());
    println!("wrote {}", report.output.json_path.display());
    Ok(())
}

fn cmd_pack(args: PackArgs) -> anyhow::Result<()> {
    let (layout, output) = spritepipe::pack_frames_dir(
        &args.frames_dir,
        &args.output_dir,
        &args.output_name,
        args.png_compression.into(),
    )?;

    println!("frames: {}", layout.count);
    println!("grid: {}x{}", layout.cols, layout.rows);
    println!("atlas: {}x{}", layout.width(), layout.height());
    println!("wrote {}", output.png_path.display());
    println!("wrote {}", output.json_path.display());
    Ok(())
}

fn cmd_mirror(args: MirrorArgs) -> anyhow::Result<()> {
    let mode = spritepipe::TransformMode::from_flags(args.pingpong, !args.pingpong);
    let res =
        spritepipe::transform_frames_dir(&args.frames_dir, args.output_dir.as_deref(), mode)?;

    println!("frames: {} -> {}", res.original, res.total);
    println!("wrote {}", res.output_dir.display());
    Ok(())
}

fn cmd_matte(args: MatteArgs) -> anyhow::Result<()> {
    let threshold = spritepipe::lenient_number(
        args.threshold.as_deref(),
        spritepipe::MATTE_DEFAULT_THRESHOLD,
        "threshold",
    );
    let opts = args.matte.background_opts(threshold);
    let (bg, stats) = spritepipe::matte_file(&args.input, &args.output, &opts)?;

    println!("background: {bg}");
    println!(
        "cleared: {}, softened: {}, defringed: {}",
        stats.cleared, stats.softened, stats.defringed
    );
    println!("wrote {}", args.output.display());
    Ok(())
}

fn cmd_first_frame(args: FirstFrameArgs) -> anyhow::Result<()> {
    let tools = spritepipe::FfmpegTools::default();
    tools.ensure_ffmpeg()?;
    spritepipe::extract_first_frame(&tools, &args.video, &args.out)?;

    println!("wrote {}", args.out.display());
    Ok(())
}
