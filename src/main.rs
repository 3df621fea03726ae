use anyhow::Result;
use clap::Parser;
use globaltemps::{pipeline, Config};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Render yearly surface temperature change maps and animate them"
)]
struct Args {
    /// YAML file overriding the built-in settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Per-country change table
    #[arg(long)]
    change_csv: Option<PathBuf>,
    /// Per-region average table holding the `world` row
    #[arg(long)]
    world_csv: Option<PathBuf>,
    /// Country boundaries (GeoJSON); downloaded when missing
    #[arg(long)]
    geometry: Option<PathBuf>,
    #[arg(long)]
    frames_dir: Option<PathBuf>,
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    fps: Option<f64>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) configure ────────────────────────────────────────────────
    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };
    if let Some(p) = args.change_csv {
        cfg.change_csv = p;
    }
    if let Some(p) = args.world_csv {
        cfg.world_csv = p;
    }
    if let Some(p) = args.geometry {
        cfg.geometry_path = p;
    }
    if let Some(p) = args.frames_dir {
        cfg.frames_dir = p;
    }
    if let Some(p) = args.output {
        cfg.animation_path = p;
    }
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }

    // ─── 3) run ──────────────────────────────────────────────────────
    debug!("resolved config:\n{}", cfg.to_yaml()?);

    let summary = pipeline::run(&cfg)?;
    info!(
        years = summary.years.len(),
        records = summary.records,
        out = %summary.animation.display(),
        "finished"
    );
    Ok(())
}
