// src/animate.rs

use anyhow::{bail, Context, Result};
use glob::{glob, Pattern};
use image::{
    codecs::gif::{GifEncoder, Repeat},
    imageops::{self, FilterType},
    Delay, Frame,
};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

/// NeuQuant sampling factor: 1 is best quality and slowest, 30 fastest.
const GIF_SPEED: i32 = 10;

/// Encode `frames`, in the given order, into one GIF at `out` that loops
/// forever. Each frame is shown for `1 / fps` seconds; with `width` set,
/// frames are downsampled to that width first.
///
/// Frames are streamed one at a time. The GIF is written to `<out>.tmp` and
/// renamed into place once every frame is in, so a failed run never leaves a
/// partial animation at `out`. Returns the number of frames written.
pub fn encode_gif<P: AsRef<Path>>(
    frames: &[PathBuf],
    out: P,
    fps: f64,
    width: Option<u32>,
) -> Result<usize> {
    let out = out.as_ref();
    if !(fps.is_finite() && fps > 0.0) {
        bail!("fps must be positive, got {}", fps);
    }
    if frames.is_empty() {
        bail!("no frames to encode into {}", out.display());
    }

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let mut tmp = out.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let delay = Delay::from_saturating_duration(Duration::from_secs_f64(1.0 / fps));
    {
        let file =
            File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), GIF_SPEED);
        encoder
            .set_repeat(Repeat::Infinite)
            .context("setting GIF loop")?;

        for path in frames {
            let mut img = image::open(path)
                .with_context(|| format!("reading frame {}", path.display()))?
                .to_rgba8();

            if let Some(w) = width.filter(|w| *w > 0 && *w != img.width()) {
                let h = ((img.height() as f64 * w as f64 / img.width() as f64).round() as u32).max(1);
                img = imageops::resize(&img, w, h, FilterType::Triangle);
            }

            encoder
                .encode_frame(Frame::from_parts(img, 0, 0, delay))
                .with_context(|| format!("encoding frame {}", path.display()))?;
            debug!(frame = %path.display(), "encoded");
        }
    }

    fs::rename(&tmp, out).with_context(|| format!("renaming into {}", out.display()))?;
    info!(frames = frames.len(), out = %out.display(), "animation written");
    Ok(frames.len())
}

/// Every `*.png` in `dir`, ordered by file stem: numerically when all stems
/// are integers (years), lexically otherwise.
pub fn collect_frames<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    // the directory itself may contain glob metacharacters like `[`
    let root = Pattern::escape(&dir.as_ref().display().to_string());
    let pattern = format!("{}/*.png", root);
    let mut paths: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("bad frame pattern {}", pattern))?
        .filter_map(Result::ok)
        .collect();

    let stem = |p: &PathBuf| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    };
    let all_numeric = paths.iter().all(|p| stem(p).parse::<i64>().is_ok());
    if all_numeric {
        paths.sort_by_key(|p| stem(p).parse::<i64>().unwrap_or_default());
    } else {
        paths.sort_by_key(|p| stem(p));
    }
    Ok(paths)
}
