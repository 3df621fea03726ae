// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Natural Earth 1:110m admin-0 countries.
pub const DEFAULT_GEOMETRY_URL: &str =
    "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson/ne_110m_admin_0_countries.geojson";

/// Every knob of a run. `Config::default()` reproduces the hard-coded run;
/// a YAML file may override any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wide per-country table: `iso3,<year>,<year>,...`
    pub change_csv: PathBuf,
    /// Per-region averages, first column is the region name.
    pub world_csv: PathBuf,
    /// Row of `world_csv` holding the global average.
    pub world_key: String,

    pub geometry_path: PathBuf,
    pub geometry_url: String,
    /// GeoJSON property carrying the ISO-3 code.
    pub geometry_code_property: String,

    pub frames_dir: PathBuf,
    pub animation_path: PathBuf,
    pub fps: f64,
    /// Downsample frames to this width before encoding the GIF.
    pub animation_width: Option<u32>,

    /// Optional Parquet dump of the reshaped table.
    pub long_table_parquet: Option<PathBuf>,

    pub style: Style,
}

/// Figure geometry and color scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub vmin: f64,
    pub vmax: f64,
    /// Figure size in inches.
    pub fig_width: f64,
    pub fig_height: f64,
    pub dpi: u32,
    pub background: [u8; 3],
    pub foreground: [u8; 3],
    pub title: String,
    pub colorbar_label: String,
    pub caption: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            change_csv: PathBuf::from("iso3change.csv"),
            world_csv: PathBuf::from("worldtemp.csv"),
            world_key: "world".into(),
            geometry_path: PathBuf::from("naturalearth_lowres.geojson"),
            geometry_url: DEFAULT_GEOMETRY_URL.into(),
            geometry_code_property: "ISO_A3".into(),
            frames_dir: PathBuf::from("images"),
            animation_path: PathBuf::from("gif/temperature_change_FINAL.gif"),
            fps: 1.75,
            animation_width: None,
            long_table_parquet: None,
            style: Style::default(),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            vmin: -2.0,
            vmax: 2.0,
            fig_width: 10.0,
            fig_height: 5.0,
            dpi: 300,
            background: [0x2c, 0x2c, 0x2c],
            foreground: [0xff, 0xff, 0xff],
            title: "Global Surface Temperature Change".into(),
            colorbar_label: "Global Average Change".into(),
            caption: "Celsius".into(),
        }
    }
}

impl Style {
    /// Pixel size of the figure.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.fig_width * dpi).round().max(1.0) as u32,
            (self.fig_height * dpi).round().max(1.0) as u32,
        )
    }

    /// Converts a size in points to pixels at this figure's dpi.
    pub fn points(&self, pt: f64) -> f64 {
        pt * self.dpi as f64 / 72.0
    }
}

impl Config {
    /// Load overrides from a YAML file on top of the defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing config {:?}", path))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// The full resolved config as YAML, defaults included.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serializing config")
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.fps.is_finite() && self.fps > 0.0,
            "fps must be positive, got {}",
            self.fps
        );
        anyhow::ensure!(
            self.style.vmax > self.style.vmin,
            "vmax ({}) must exceed vmin ({})",
            self.style.vmax,
            self.style.vmin
        );
        anyhow::ensure!(self.style.dpi > 0, "dpi must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hard_coded_run() {
        let cfg = Config::default();
        assert_eq!(cfg.change_csv, PathBuf::from("iso3change.csv"));
        assert_eq!(cfg.world_csv, PathBuf::from("worldtemp.csv"));
        assert_eq!(
            cfg.animation_path,
            PathBuf::from("gif/temperature_change_FINAL.gif")
        );
        assert_eq!(cfg.fps, 1.75);
        assert_eq!(cfg.style.pixel_size(), (3000, 1500));
        assert_eq!((cfg.style.vmin, cfg.style.vmax), (-2.0, 2.0));
    }

    #[test]
    fn yaml_overrides_merge_onto_defaults() -> Result<()> {
        let cfg = Config::from_yaml_str(
            r#"
frames_dir: out/frames
fps: 4
style:
  dpi: 50
"#,
        )?;
        assert_eq!(cfg.frames_dir, PathBuf::from("out/frames"));
        assert_eq!(cfg.fps, 4.0);
        assert_eq!(cfg.style.dpi, 50);
        // untouched fields keep their defaults
        assert_eq!(cfg.style.fig_width, 10.0);
        assert_eq!(cfg.world_key, "world");
        Ok(())
    }

    #[test]
    fn resolved_yaml_reloads_to_same_config() -> Result<()> {
        let mut cfg = Config::default();
        cfg.animation_width = Some(800);
        cfg.long_table_parquet = Some(PathBuf::from("out/long.parquet"));
        cfg.style.title = "Anomaly: 1961".into();

        let text = cfg.to_yaml()?;
        assert!(text.contains("animation_width: 800"), "{}", text);
        assert_eq!(Config::from_yaml_str(&text)?, cfg);
        Ok(())
    }

    #[test]
    fn rejects_inverted_color_bounds() {
        let err = Config::from_yaml_str("style:\n  vmin: 3\n  vmax: 1\n").unwrap_err();
        assert!(err.to_string().contains("vmax"));
    }
}
