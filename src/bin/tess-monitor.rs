use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tess_monitor::{
    Config, DEFAULT_DIR, DEFAULT_HEIGHT, DEFAULT_MARGIN, DEFAULT_WIDTH, TextOverlay, Trace,
};

const AFTER_HELP: &str = "\
Each trace file holds one or more runs (a polygon plus the monitor calls made while
tessellating it). Every run writes one PNG per observed state to <DIR>/<name>/, named
<name>-00000.png, <name>-00001.png, ... Existing frames of the same run are deleted first.

The frames can be assembled into a video with, for example:
    ffmpeg -r 5 -i /tmp/tessellation/polygon-1/polygon-1-%05d.png \\
        -c:v libx264 -vf fps=25 -pix_fmt yuv420p polygon-1.mp4";

#[derive(Parser, Debug)]
#[command(name = "tess-monitor", version, after_help = AFTER_HELP)]
struct Cli {
    /// Trace files (JSON) to render.
    #[arg(required = true)]
    traces: Vec<PathBuf>,

    /// Log every saved image.
    #[arg(short, long)]
    verbose: bool,

    /// Add vertex labels to images.
    #[arg(short, long)]
    labels: bool,

    /// Output directory for image files.
    #[arg(short = 'D', long, default_value = DEFAULT_DIR)]
    dir: PathBuf,

    /// Image width in pixels.
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Image height in pixels.
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Image margin in pixels.
    #[arg(short = 'M', long, default_value_t = DEFAULT_MARGIN)]
    margin: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::new(&cli.dir, cli.width, cli.height, cli.margin);
    if cli.verbose {
        config = config.make_verbose();
    }
    if cli.labels {
        config = config.with_labels();
    }
    config.validate().context("invalid image configuration")?;

    let text = TextOverlay::with_system_fonts();
    let mut failed = 0usize;
    for path in &cli.traces {
        let trace = match Trace::from_path(path) {
            Ok(trace) => trace,
            Err(err) => {
                tracing::error!(path = %path.display(), "failed to load trace: {err:#}");
                failed += 1;
                continue;
            }
        };
        for run in &trace.runs {
            match run.render(&config, text.clone()) {
                Ok(frames) => {
                    eprintln!(
                        "wrote {frames} frames to {}",
                        config.root().join(&run.name).display()
                    );
                }
                Err(err) => {
                    tracing::error!(run = %run.name, "failed triangulating: {err:#}");
                    failed += 1;
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} trace(s) or run(s) failed");
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
