use anyhow::{bail, Result};
use clap::Parser;
use globaltemps::animate::{collect_frames, encode_gif};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Re-encode an existing directory of year frames without re-rendering.
#[derive(Parser)]
#[command(author, version, about = "Assemble rendered PNG frames into a looping GIF")]
struct Args {
    #[arg(long, default_value = "./images")]
    frames: PathBuf,
    #[arg(long, default_value = "./gif/temperature_change_FINAL.gif")]
    output: PathBuf,
    #[arg(long, default_value_t = 1.75)]
    fps: f64,
    /// Downsample frames to this width
    #[arg(long)]
    width: Option<u32>,
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let frames = collect_frames(&args.frames)?;
    if frames.is_empty() {
        bail!("no .png frames in {}", args.frames.display());
    }
    info!(count = frames.len(), dir = %args.frames.display(), "found frames");

    encode_gif(&frames, &args.output, args.fps, args.width)?;
    Ok(())
}
