use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mergif", version)]
struct Cli {
    /// Log progress at info level (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite GIFs into one animated GIF.
    Merge(MergeArgs),
    /// Write the first frame of a GIF as a PNG.
    Thumbnail(ThumbnailArgs),
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Project JSON listing the sources and their overrides.
    #[arg(long, conflicts_with = "inputs", required_unless_present = "inputs")]
    project: Option<PathBuf>,

    /// Source GIFs stacked with default placement; later inputs paint on top.
    #[arg(long = "in", value_name = "GIF")]
    inputs: Vec<PathBuf>,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Output tick in 10 ms units.
    #[arg(long, default_value_t = mergif::DEFAULT_TICK)]
    tick: u32,

    /// Play the output once instead of looping forever.
    #[arg(long)]
    once: bool,
}

#[derive(Parser, Debug)]
struct ThumbnailArgs {
    /// Source GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Shrink so the longer edge is at most this many pixels.
    #[arg(long)]
    max_edge: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Merge(args) => cmd_merge(args),
        Command::Thumbnail(args) => cmd_thumbnail(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_gif(path: &Path) -> anyhow::Result<mergif::ItemSource> {
    let bytes = std::fs::read(path).with_context(|| format!("read gif '{}'", path.display()))?;
    Ok(mergif::ItemSource::gif(bytes))
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let merger = match &args.project {
        Some(path) => mergif::Project::load(path)?.build()?,
        None => {
            let sources = args
                .inputs
                .iter()
                .map(|p| read_gif(p))
                .collect::<anyhow::Result<Vec<_>>>()?;
            mergif::GifMerger::with_sources(sources)?
        }
    };

    let opts = mergif::ExportOpts {
        tick: args.tick,
        repeat: if args.once {
            mergif::Repeat::Once
        } else {
            mergif::Repeat::Infinite
        },
        cancel: None,
    };
    let bytes = merger
        .generate_gif(opts)?
        .context("nothing to export: no sources were given")?;

    ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write gif '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_thumbnail(args: ThumbnailArgs) -> anyhow::Result<()> {
    let mut merger = mergif::GifMerger::new();
    let ids = merger.append([read_gif(&args.in_path)?])?;
    let id = ids.first().copied().context("no item was created")?;
    let frame = merger
        .thumbnail(id, args.max_edge)?
        .context("item disappeared before its thumbnail was taken")?;

    ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        frame.data(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
