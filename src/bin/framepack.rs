use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "framepack", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an animation into a pack (requires ImageMagick `magick` on PATH).
    Convert(ConvertArgs),
    /// Encode already reduced 1-bit raster files into a pack.
    Encode(EncodeArgs),
    /// Write only the descriptor for a given frame count.
    Meta(MetaArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input animation (GIF or anything the engine decodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output pack directory.
    #[arg(long)]
    out: PathBuf,

    /// Image engine executable.
    #[arg(long, default_value = "magick")]
    magick: PathBuf,

    /// Keep the intermediate raster files next to the pack.
    #[arg(long, default_value_t = false)]
    keep_rasters: bool,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    pack: PackArgs,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Directory holding `<prefix><i>.<ext>` raster files.
    #[arg(long)]
    frames: PathBuf,

    /// Raster file name prefix.
    #[arg(long, default_value = framepack::pipeline::magick::RASTER_PREFIX)]
    prefix: String,

    /// Raster file extension.
    #[arg(long, default_value = framepack::pipeline::magick::RASTER_EXT)]
    ext: String,

    /// Output pack directory.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    pack: PackArgs,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(Parser, Debug)]
struct MetaArgs {
    /// Passive frame count.
    #[arg(long)]
    frames: u64,

    /// Output descriptor path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    pack: PackArgs,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Contrast stretch in percent.
    #[arg(long)]
    contrast: Option<f32>,

    /// Sharpen sigma.
    #[arg(long)]
    sharpen: Option<f32>,

    /// Disable dithering.
    #[arg(long, default_value_t = false)]
    no_dither: bool,

    /// Skip grayscale conversion.
    #[arg(long, default_value_t = false)]
    no_grayscale: bool,

    /// Skip 1-bit reduction (input must already be two-color).
    #[arg(long, default_value_t = false)]
    no_monochrome: bool,

    /// Edge detection + normalize.
    #[arg(long, default_value_t = false)]
    edges: bool,

    /// Invert colors.
    #[arg(long, default_value_t = false)]
    invert: bool,
}

#[derive(Args, Debug)]
struct PackArgs {
    /// Pack configuration JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas width.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height.
    #[arg(long)]
    height: Option<u32>,

    /// Active frame count.
    #[arg(long)]
    active_frames: Option<u32>,

    /// Active cycle count.
    #[arg(long)]
    active_cycles: Option<u32>,

    /// Frames per second.
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Duration in seconds.
    #[arg(long)]
    duration: Option<u32>,

    /// Active cooldown in seconds.
    #[arg(long)]
    active_cooldown: Option<u32>,

    /// Bubble position (center, bottomcenter, topleft, ...).
    #[arg(long)]
    bubble_locale: Option<String>,

    /// Bubble text; use a literal `\n` for line breaks.
    #[arg(long)]
    bubble_text: Option<String>,

    /// First bubble frame.
    #[arg(long)]
    bubble_start: Option<u64>,

    /// Last bubble frame.
    #[arg(long)]
    bubble_end: Option<u64>,
}

#[derive(Args, Debug)]
struct ThreadingArgs {
    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Encode chunk size.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Encode(args) => cmd_encode(args),
        Command::Meta(args) => cmd_meta(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

impl PackArgs {
    fn resolve(&self) -> anyhow::Result<framepack::PackConfig> {
        let mut cfg = match self.config.as_deref() {
            Some(path) => framepack::PackConfig::from_path(path)
                .with_context(|| format!("load pack config '{}'", path.display()))?,
            None => framepack::PackConfig::default(),
        };

        if let Some(w) = self.width {
            cfg.canvas.width = w;
        }
        if let Some(h) = self.height {
            cfg.canvas.height = h;
        }
        if let Some(v) = self.active_frames {
            cfg.active_frames = v;
        }
        if let Some(v) = self.active_cycles {
            cfg.active_cycles = v;
        }
        if let Some(v) = self.frame_rate {
            cfg.frame_rate = v;
        }
        if let Some(v) = self.duration {
            cfg.duration = v;
        }
        if let Some(v) = self.active_cooldown {
            cfg.active_cooldown = v;
        }

        let touches_bubble = self.bubble_locale.is_some()
            || self.bubble_text.is_some()
            || self.bubble_start.is_some()
            || self.bubble_end.is_some();
        if touches_bubble {
            let bubble = cfg.bubble.get_or_insert_with(Default::default);
            if let Some(locale) = self.bubble_locale.as_deref() {
                bubble.locale = framepack::Locale::parse_lenient(locale);
            }
            if let Some(text) = self.bubble_text.as_ref() {
                bubble.text = text.clone();
            }
            if let Some(v) = self.bubble_start {
                bubble.start_frame = v;
            }
            if let Some(v) = self.bubble_end {
                bubble.end_frame = v;
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

impl ThreadingArgs {
    fn to_threading(&self) -> framepack::EncodeThreading {
        framepack::EncodeThreading {
            parallel: self.parallel,
            chunk_size: self.chunk_size,
            threads: self.threads,
        }
    }
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let config = args.pack.resolve()?;
    let options = framepack::FilterOptions {
        canvas: config.canvas,
        contrast_stretch: args.filters.contrast,
        sharpen: args.filters.sharpen,
        dither: !args.filters.no_dither,
        grayscale: !args.filters.no_grayscale,
        monochrome: !args.filters.no_monochrome,
        edge_detect: args.filters.edges,
        invert: args.filters.invert,
    };
    let pipeline = framepack::MagickPipeline {
        program: args.magick.clone(),
        options,
    };

    let raster_dir = args.out.join(".rasters");
    let rasters = pipeline.run(&args.in_path, &raster_dir)?;

    let result = write_pack(
        framepack::RasterFiles::new(rasters),
        &args.out,
        config,
        args.threading.to_threading(),
    );

    if !args.keep_rasters {
        std::fs::remove_dir_all(&raster_dir)
            .with_context(|| format!("remove raster dir '{}'", raster_dir.display()))?;
    }
    result
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let config = args.pack.resolve()?;
    let rasters = framepack::collect_indexed_frames(&args.frames, &args.prefix, &args.ext)?;
    anyhow::ensure!(
        !rasters.is_empty(),
        "no '{}<i>.{}' files found in '{}'",
        args.prefix,
        args.ext,
        args.frames.display()
    );

    write_pack(
        framepack::RasterFiles::new(rasters),
        &args.out,
        config,
        args.threading.to_threading(),
    )
}

fn cmd_meta(args: MetaArgs) -> anyhow::Result<()> {
    let config = args.pack.resolve()?;
    let descriptor = framepack::build(args.frames, &config)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    descriptor.write_to(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_pack(
    source: framepack::RasterFiles,
    out: &Path,
    config: framepack::PackConfig,
    threading: framepack::EncodeThreading,
) -> anyhow::Result<()> {
    let session = framepack::PackSession::new(framepack::PackSessionOpts {
        config,
        threading,
        cancel: None,
    })?;
    let (_descriptor, stats) = session
        .write_dir(&source, out)
        .with_context(|| format!("write pack '{}'", out.display()))?;

    eprintln!("wrote {} frames to {}", stats.frames_written, out.display());
    Ok(())
}
