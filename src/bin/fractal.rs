use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fractal_codec::{
    BlockGeometry, CompressedImage, DEFAULT_CONTRAST, DEFAULT_ITERATIONS, DecodeParams,
    EncodeParams, Threading,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "fractal", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress an image into a fractal archive.
    Compress(CompressArgs),
    /// Decode a fractal archive back into a PNG.
    Decompress(DecompressArgs),
}

#[derive(Parser, Debug)]
struct CompressArgs {
    /// Input image (PNG, JPEG or BMP).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output archive path.
    #[arg(long)]
    out: PathBuf,

    /// Domain block size in pixels.
    #[arg(short = 'd', long = "domain")]
    domain: usize,

    /// Range block size in pixels.
    #[arg(short = 'r', long = "range")]
    range: usize,

    /// Contrast scale applied to every block, in (0, 1].
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONTRAST)]
    contrast: f32,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct DecompressArgs {
    /// Input archive.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Domain block size; required when the archive has no params entry.
    #[arg(short = 'd', long = "domain", requires = "range")]
    domain: Option<usize>,

    /// Range block size; required when the archive has no params entry.
    #[arg(short = 'r', long = "range", requires = "domain")]
    range: Option<usize>,

    /// Number of decode iterations.
    #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Seed for the initial noise image (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Write every iterate into this directory as `iter_XXX.png`.
    #[arg(long)]
    dump_iterations: Option<PathBuf>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fractal_codec=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compress(args) => cmd_compress(args),
        Command::Decompress(args) => cmd_decompress(args),
    }
}

fn cmd_compress(args: CompressArgs) -> anyhow::Result<()> {
    let geometry = BlockGeometry::new(args.domain, args.range)?;
    let params = EncodeParams::new(geometry, args.contrast)?;
    let threading = Threading {
        threads: args.threads,
    };

    let image = fractal_codec::load_rgb(&args.in_path)?;
    let compressed = fractal_codec::compress_rgb(&image, &params, &threading)?;

    create_parent_dir(&args.out)?;
    fractal_codec::save(&args.out, &compressed)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_decompress(args: DecompressArgs) -> anyhow::Result<()> {
    let compressed = fractal_codec::load(&args.in_path)?;
    let geometry = decode_geometry(&args, &compressed)?;
    let params = DecodeParams::new(geometry, args.iterations)?;
    let threading = Threading {
        threads: args.threads,
    };

    create_parent_dir(&args.out)?;
    if let Some(dir) = &args.dump_iterations {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create iteration dir '{}'", dir.display()))?;
        let iterates =
            fractal_codec::decompress_rgb_iterates(&compressed, &params, args.seed, &threading)?;
        for (i, iterate) in iterates.iter().enumerate() {
            fractal_codec::save_rgb(&dir.join(format!("iter_{i:03}.png")), iterate)?;
        }
        let last = iterates
            .last()
            .context("decoder produced no iterates")?;
        fractal_codec::save_rgb(&args.out, last)?;
        eprintln!("wrote {} iterates to {}", iterates.len(), dir.display());
    } else {
        let image = fractal_codec::decompress_rgb(&compressed, &params, args.seed, &threading)?;
        fractal_codec::save_rgb(&args.out, &image)?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Block sizes from the flags, else from the archive's params entry.
fn decode_geometry(
    args: &DecompressArgs,
    compressed: &CompressedImage,
) -> anyhow::Result<BlockGeometry> {
    match (args.domain, args.range, compressed.geometry()) {
        (Some(d), Some(r), stored) => {
            let geometry = BlockGeometry::new(d, r)?;
            if let Some(stored) = stored
                && stored != geometry
            {
                tracing::warn!(
                    stored_domain = stored.domain_size(),
                    stored_range = stored.range_size(),
                    "block sizes from flags override the archive's params"
                );
            }
            Ok(geometry)
        }
        (_, _, Some(stored)) => Ok(stored),
        _ => anyhow::bail!(
            "archive '{}' has no params entry; pass -d and -r",
            args.in_path.display()
        ),
    }
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
