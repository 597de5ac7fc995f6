use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use prfbar_app::{App, bundle};
use prfbar_core::{ParamOverrides, Resolution};
use prfbar_render::RenderOpts;

#[derive(Parser, Debug)]
#[command(name = "prfbar", version, about = "Drifting checkerboard bar stimulus for pRF mapping")]
struct Cli {
    /// Log verbosity: -v info, -vv debug, -vvv trace.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the stimulus and write a bundle directory.
    Generate(GenerateArgs),
    /// Print the summary of an existing bundle.
    Inspect(InspectArgs),
    /// Write one library frame as a grayscale PNG.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Output bundle directory.
    #[arg(long)]
    out: PathBuf,

    /// Partial parameter record (JSON); unset fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen width in pixels (requires --height).
    #[arg(long)]
    width: Option<u32>,

    /// Screen height in pixels (requires --width).
    #[arg(long)]
    height: Option<u32>,

    /// Contrast in [0, 1], overrides the intensity range.
    #[arg(long)]
    contrast: Option<f64>,

    /// Scan duration in seconds.
    #[arg(long)]
    scan_duration: Option<f64>,

    /// Duration of one sweep in seconds.
    #[arg(long)]
    sweep_duration: Option<f64>,

    /// Sampling interval (TR) in seconds.
    #[arg(long = "tr")]
    sampling_interval: Option<f64>,

    /// Checker-motion phases per bar position.
    #[arg(long)]
    motion_steps: Option<u32>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

impl GenerateArgs {
    fn overrides(&self) -> anyhow::Result<ParamOverrides> {
        let resolution = match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Resolution { width, height }),
            (None, None) => None,
            _ => bail!("--width and --height must be given together"),
        };
        Ok(ParamOverrides {
            resolution,
            contrast: self.contrast,
            scan_duration: self.scan_duration,
            sweep_duration: self.sweep_duration,
            sampling_interval: self.sampling_interval,
            motion_steps: self.motion_steps,
            ..Default::default()
        })
    }
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Bundle directory.
    #[arg(long)]
    bundle: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Bundle directory.
    #[arg(long)]
    bundle: PathBuf,

    /// Frame library index (0-based).
    #[arg(long)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let opts = RenderOpts {
        threads: args.threads,
    };
    let app = App::from_config(args.config.as_deref(), args.overrides()?, opts)?;
    let stimulus = app.run()?;
    bundle::save_bundle(&args.out, &stimulus)
        .with_context(|| format!("write bundle '{}'", args.out.display()))?;

    println!("{}", stimulus.summary());
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let stimulus = bundle::load_bundle(&args.bundle)
        .with_context(|| format!("load bundle '{}'", args.bundle.display()))?;
    let stats = stimulus.timeline.stats();
    println!("{}", stimulus.summary());
    println!(
        "timing    {:.3} Hz, jitter {:.3e} s, interval [{:.6}, {:.6}] s",
        stats.frame_rate, stats.jitter, stats.min_interval, stats.max_interval
    );
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let frame = bundle::read_frame(&args.bundle, args.index)
        .with_context(|| format!("read frame {} from '{}'", args.index, args.bundle.display()))?;
    let (width, height) = frame.dimensions();
    let img = image::GrayImage::from_raw(width, height, frame.into_raw())
        .context("frame buffer does not match its dimensions")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
