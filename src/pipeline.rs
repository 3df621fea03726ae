// src/pipeline.rs

use anyhow::{Context, Result};
use std::{path::PathBuf, time::Instant};
use tracing::{info, warn};

use crate::{
    animate,
    config::Config,
    export,
    geometry::{self, CountryGeometry},
    render::{FrameRenderer, RenderedFrame},
    table::{self, records_for_year, WorldAverage},
};

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Year columns, in the order they were rendered.
    pub years: Vec<String>,
    pub records: usize,
    pub frames: Vec<RenderedFrame>,
    pub animation: PathBuf,
}

/// Full run: fetch geometry if needed, then [`run_with_geometry`].
pub fn run(cfg: &Config) -> Result<RunSummary> {
    cfg.validate()?;
    geometry::ensure_geometry(&cfg.geometry_path, &cfg.geometry_url)?;
    let geometry = geometry::load_geojson(&cfg.geometry_path, &cfg.geometry_code_property)?;
    info!(countries = geometry.len(), "loaded country geometry");
    run_with_geometry(cfg, &geometry)
}

/// Load → melt → one frame per year → GIF.
pub fn run_with_geometry(cfg: &Config, geometry: &CountryGeometry) -> Result<RunSummary> {
    let start = Instant::now();

    // ─── 1) load tables ──────────────────────────────────────────────
    let change = table::load_wide_csv(&cfg.change_csv)?;
    let regions = table::load_wide_csv(&cfg.world_csv)?;
    let world = WorldAverage::from_table(&regions, &cfg.world_key)
        .with_context(|| format!("reading world averages from {:?}", cfg.world_csv))?;
    world.check_covers(&change.years)?;
    info!(
        countries = change.rows.len(),
        years = change.years.len(),
        "loaded change table"
    );

    // ─── 2) reshape ──────────────────────────────────────────────────
    let records = table::melt(&change);
    if let Some(path) = &cfg.long_table_parquet {
        export::write_long_table(&records, path)?;
    }

    // ─── 3) one frame per year ───────────────────────────────────────
    let renderer = FrameRenderer::new(&cfg.style, geometry)?;
    let total = change.years.len();
    let mut frames = Vec::with_capacity(total);
    for (i, year) in change.years.iter().enumerate() {
        info!("running year {} ({}/{})", year, i + 1, total);
        let avg = world.require(year)?;
        let frame = renderer
            .render_to_file(year, records_for_year(&records, year), avg, &cfg.frames_dir)
            .with_context(|| format!("rendering year {}", year))?;
        if frame.filled == 0 {
            warn!(year = %year, "no country matched any geometry");
        }
        frames.push(frame);
    }

    // ─── 4) animate ──────────────────────────────────────────────────
    let paths: Vec<PathBuf> = frames.iter().map(|f| f.path.clone()).collect();
    animate::encode_gif(&paths, &cfg.animation_path, cfg.fps, cfg.animation_width)?;

    info!(
        frames = frames.len(),
        elapsed = ?start.elapsed(),
        out = %cfg.animation_path.display(),
        "all done"
    );
    Ok(RunSummary {
        years: change.years,
        records: records.len(),
        frames,
        animation: cfg.animation_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{codecs::gif::GifDecoder, AnimationDecoder, RgbaImage};
    use std::{
        fs::{self, File},
        io::BufReader,
        path::Path,
    };
    use tempfile::{tempdir, TempDir};
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,globaltemps=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const GEOJSON: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {"type": "Feature", "properties": {"ISO_A3": "AAA"},
         "geometry": {"type": "Polygon", "coordinates": [[[-100,-40],[-20,-40],[-20,40],[-100,40],[-100,-40]]]}},
        {"type": "Feature", "properties": {"ISO_A3": "BBB"},
         "geometry": {"type": "Polygon", "coordinates": [[[20,-40],[100,-40],[100,40],[20,40],[20,-40]]]}}
      ]
    }"#;

    fn fixture(change: &str, world: &str) -> Result<(TempDir, Config)> {
        let dir = tempdir()?;
        let root = dir.path();
        fs::write(root.join("iso3change.csv"), change)?;
        fs::write(root.join("worldtemp.csv"), world)?;
        fs::write(root.join("countries.geojson"), GEOJSON)?;

        let mut cfg = Config::default();
        cfg.change_csv = root.join("iso3change.csv");
        cfg.world_csv = root.join("worldtemp.csv");
        cfg.geometry_path = root.join("countries.geojson");
        cfg.geometry_url = "http://127.0.0.1:9/unused".into();
        cfg.frames_dir = root.join("images");
        cfg.animation_path = root.join("gif").join("temperature_change_FINAL.gif");
        cfg.style.dpi = 30;
        Ok((dir, cfg))
    }

    fn png_names(dir: &Path) -> Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    fn distance(a: &RgbaImage, b: &RgbaImage) -> u64 {
        a.pixels()
            .zip(b.pixels())
            .map(|(p, q)| {
                (0..3)
                    .map(|k| (p.0[k] as i64 - q.0[k] as i64).unsigned_abs())
                    .sum::<u64>()
            })
            .sum()
    }

    #[test]
    fn two_years_two_countries_end_to_end() -> Result<()> {
        init_test_logging();
        let (_dir, cfg) = fixture(
            "iso3,1961,1962\nAAA,-1.8,1.9\nBBB,0.4,\n",
            "region,1961,1962\nafrica,0.1,0.2\nworld,-0.25,0.61\n",
        )?;

        let summary = run(&cfg)?;

        assert_eq!(summary.years, vec!["1961", "1962"]);
        assert_eq!(summary.records, 4);
        assert_eq!(png_names(&cfg.frames_dir)?, vec!["1961.png", "1962.png"]);

        // marker follows the world row
        assert_eq!(summary.frames[0].marker.value, -0.25);
        assert_eq!(summary.frames[1].marker.value, 0.61);
        // BBB is blank in 1962
        assert_eq!((summary.frames[1].filled, summary.frames[1].blank), (1, 1));

        // one GIF with both frames, in year order
        let reader = BufReader::new(File::open(&summary.animation)?);
        let decoded = GifDecoder::new(reader)?.into_frames().collect_frames()?;
        assert_eq!(decoded.len(), 2);

        let pngs: Vec<RgbaImage> = summary
            .frames
            .iter()
            .map(|f| image::open(&f.path).map(|i| i.to_rgba8()))
            .collect::<Result<_, _>>()?;
        for (i, frame) in decoded.iter().enumerate() {
            let own = distance(frame.buffer(), &pngs[i]);
            let other = distance(frame.buffer(), &pngs[1 - i]);
            assert!(own < other, "gif frame {} looks like png {}", i, 1 - i);
        }
        Ok(())
    }

    #[test]
    fn missing_world_average_aborts_before_rendering() -> Result<()> {
        init_test_logging();
        let (_dir, cfg) = fixture(
            "iso3,1961,1962\nAAA,1,2\n",
            "region,1961\nworld,0.3\n",
        )?;

        let err = run(&cfg).unwrap_err();
        assert!(format!("{:#}", err).contains("1962"));
        assert!(!cfg.frames_dir.exists());
        assert!(!cfg.animation_path.exists());
        Ok(())
    }

    #[test]
    fn duplicate_year_columns_abort_the_run() -> Result<()> {
        init_test_logging();
        let (_dir, cfg) = fixture(
            "iso3,2000,2000\nAAA,-1.9,1.9\n",
            "region,2000,2001\nworld,0.1,0.2\n",
        )?;

        let err = run(&cfg).unwrap_err();
        assert!(format!("{:#}", err).contains("`2000` repeated"));
        assert!(!cfg.frames_dir.exists());
        assert!(!cfg.animation_path.exists());
        Ok(())
    }

    #[test]
    fn unmatched_codes_render_blank_frames() -> Result<()> {
        init_test_logging();
        let (_dir, mut cfg) = fixture(
            "iso3,2000\nXXX,1.0\n",
            "region,2000\nworld,0.0\n",
        )?;
        cfg.long_table_parquet = Some(cfg.frames_dir.join("long.parquet"));

        let summary = run(&cfg)?;
        assert_eq!(summary.frames.len(), 1);
        assert_eq!(summary.frames[0].filled, 0);
        assert!(cfg.frames_dir.join("2000.png").exists());
        assert!(cfg.frames_dir.join("long.parquet").exists());
        Ok(())
    }
}
