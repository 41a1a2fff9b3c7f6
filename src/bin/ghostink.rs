use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ghostink", version)]
struct Cli {
    /// Log at debug level (`RUST_LOG` overrides).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the slideshow over an image directory.
    Run(RunArgs),
    /// Write `<stem>_black.png` / `<stem>_red.png` inspection layers for images.
    Split(SplitArgs),
    /// Generate transparent test images with 1-3 random black/red circles.
    Circles(CirclesArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TransportKind {
    /// Record calls and log them; nothing is drawn.
    Memory,
    /// Simulate the panel and write PNG snapshots.
    Preview,
}

#[derive(Parser, Debug)]
struct PanelArgs {
    /// Panel width in pixels (multiple of 8).
    #[arg(long)]
    width: Option<u32>,

    /// Panel height in pixels.
    #[arg(long)]
    height: Option<u32>,
}

impl PanelArgs {
    fn resolve(&self, base: ghostink::PanelSize) -> anyhow::Result<ghostink::PanelSize> {
        let size = ghostink::PanelSize::new(
            self.width.unwrap_or(base.width),
            self.height.unwrap_or(base.height),
        )?;
        Ok(size)
    }
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Slideshow configuration JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image directory.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Refresh strategy.
    #[arg(long)]
    strategy: Option<ghostink::Strategy>,

    /// Pause after each frame, in seconds.
    #[arg(long)]
    delay: Option<f64>,

    /// Canvas layer reset threshold.
    #[arg(long)]
    threshold: Option<u32>,

    #[command(flatten)]
    panel: PanelArgs,

    /// Process the directory once and exit.
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Display transport.
    #[arg(long, value_enum, default_value_t = TransportKind::Preview)]
    transport: TransportKind,

    /// Snapshot directory for the preview transport.
    #[arg(long, default_value = "preview")]
    preview_dir: PathBuf,

    /// Keep a numbered snapshot per refresh (preview transport only).
    #[arg(long, default_value_t = false)]
    keep_history: bool,
}

#[derive(Parser, Debug)]
struct SplitArgs {
    /// Image files or directories of images.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (defaults to each input's directory).
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    panel: PanelArgs,
}

#[derive(Parser, Debug)]
struct CirclesArgs {
    /// Output directory.
    #[arg(long, default_value = "pics")]
    out: PathBuf,

    /// Number of images to generate.
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// RNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    panel: PanelArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Split(args) => cmd_split(args),
        Command::Circles(args) => cmd_circles(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => ghostink::SlideshowConfig::from_path(path)?,
        None => ghostink::SlideshowConfig::default(),
    };
    if let Some(dir) = args.dir {
        cfg.image_dir = dir;
    }
    if let Some(strategy) = args.strategy {
        cfg.strategy = strategy;
    }
    if let Some(delay) = args.delay {
        cfg.delay_secs = delay;
    }
    if let Some(threshold) = args.threshold {
        cfg.layer_threshold = threshold;
    }
    cfg.panel = args.panel.resolve(cfg.panel)?;

    let opts = ghostink::SlideshowOpts {
        max_passes: args.once.then_some(1),
    };
    let show = ghostink::Slideshow::new(cfg, opts)?;

    let stop = show.stop_handle();
    ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))
        .context("install Ctrl-C handler")?;

    let mut transport: Box<dyn ghostink::DisplayTransport> = match args.transport {
        TransportKind::Memory => {
            Box::new(ghostink::InMemoryTransport::new().with_history_limit(64))
        }
        TransportKind::Preview => Box::new(ghostink::PreviewTransport::new(
            show.config().panel,
            ghostink::PreviewOpts {
                out_dir: args.preview_dir.clone(),
                keep_history: args.keep_history,
            },
        )),
    };

    let stats = show.run(&mut transport)?;
    eprintln!(
        "passes={} shown={} empty={} decode_errors={} transport_errors={} maintenance={}",
        stats.passes,
        stats.frames_shown,
        stats.frames_empty,
        stats.decode_errors,
        stats.transport_errors,
        stats.maintenance_runs
    );
    Ok(())
}

fn cmd_split(args: SplitArgs) -> anyhow::Result<()> {
    let panel = args.panel.resolve(ghostink::SlideshowConfig::default().panel)?;

    let mut files = Vec::new();
    for input in &args.inputs {
        if input.is_dir() {
            files.extend(ghostink::list_images(input)?);
        } else {
            files.push(input.clone());
        }
    }
    if files.is_empty() {
        anyhow::bail!("no images found");
    }

    for file in &files {
        let frame = ghostink::load_frame(file, panel)?;
        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("file name of '{}'", file.display()))?;
        let out_dir = match &args.out {
            Some(out) => out.as_path(),
            None => file.parent().unwrap_or_else(|| Path::new(".")),
        };
        let (black, red) = ghostink::write_layers(&frame, out_dir, stem)?;
        eprintln!("wrote {} and {}", black.display(), red.display());
    }
    Ok(())
}

fn cmd_circles(args: CirclesArgs) -> anyhow::Result<()> {
    let panel = args.panel.resolve(ghostink::SlideshowConfig::default().panel)?;
    let mut rng = match args.seed {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_entropy(),
    };

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .context("system clock before 1970")?
        .as_millis();

    for i in 0..args.count {
        let circles = ghostink::random_circles(&mut rng, panel);
        let img = ghostink::render_circles(&circles, panel);
        let path = args.out.join(format!("circles-{stamp}-{i:03}.png"));
        img.save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        for c in &circles {
            tracing::debug!(x = c.x, y = c.y, radius = c.radius, ink = ?c.ink, "circle");
        }
        eprintln!("wrote {} ({} circles)", path.display(), circles.len());
    }
    Ok(())
}
