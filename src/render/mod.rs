// src/render/mod.rs
pub mod canvas;
pub mod colorbar;
pub mod colormap;
pub mod font;
pub mod projection;

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

use crate::{
    config::Style,
    geometry::{CountryGeometry, CountryShape},
    table::ChangeRecord,
};
use canvas::{Canvas, HAlign, VAlign};
use colorbar::{rgb, Colorbar, Marker, COLORBAR_BOX};
use colormap::DivergingScale;
use projection::{Projection, Rect};

/// Map axes as figure fractions `[left, bottom, width, height]`.
const MAP_BOX: [f64; 4] = [0.125, 0.11, 0.775, 0.77];

/// One geometry with its value for the year being drawn.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRegion<'a> {
    pub shape: &'a CountryShape,
    pub value: Option<f64>,
}

/// Left join of a year's records onto the geometry, in geometry order.
///
/// Shapes without a record (or with a missing value) come back as `None`.
/// Records naming unknown codes are dropped; on duplicate codes the first
/// record wins.
pub fn join_year<'a, 'r, I>(geometry: &'a CountryGeometry, records: I) -> Vec<JoinedRegion<'a>>
where
    I: IntoIterator<Item = &'r ChangeRecord>,
{
    let mut by_code: HashMap<&str, Option<f64>> = HashMap::new();
    for rec in records {
        by_code
            .entry(rec.country_code.as_str())
            .or_insert(rec.change_index);
    }

    geometry
        .shapes
        .iter()
        .map(|shape| JoinedRegion {
            shape,
            value: by_code.get(shape.code.as_str()).copied().flatten(),
        })
        .collect()
}

/// What came out of drawing one year.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub year: String,
    pub path: PathBuf,
    pub marker: Marker,
    /// Shapes that were painted.
    pub filled: usize,
    /// Shapes left as background.
    pub blank: usize,
}

/// Draws one choropleth per year. Geometry is projected once up front.
pub struct FrameRenderer<'a> {
    style: &'a Style,
    width: u32,
    height: u32,
    map_extent: Rect,
    colorbar: Colorbar,
    /// Projected rings per shape, same order as the geometry.
    projected: Vec<Vec<Vec<[f64; 2]>>>,
    geometry: &'a CountryGeometry,
}

impl<'a> FrameRenderer<'a> {
    pub fn new(style: &'a Style, geometry: &'a CountryGeometry) -> Result<Self> {
        let (width, height) = style.pixel_size();
        let (fw, fh) = (width as f64, height as f64);

        let bounds = geometry
            .bounds()
            .ok_or_else(|| anyhow!("country geometry has no points"))?;
        let projection = Projection::fit(bounds, Rect::from_figure_fraction(MAP_BOX, fw, fh));

        let projected: Vec<Vec<Vec<[f64; 2]>>> = geometry
            .shapes
            .iter()
            .map(|shape| {
                shape
                    .polygons
                    .iter()
                    .flat_map(|p| p.rings())
                    .map(|ring| ring.iter().map(|&pt| projection.project(pt)).collect::<Vec<_>>())
                    .collect()
            })
            .collect();

        Ok(Self {
            style,
            width,
            height,
            map_extent: projection.extent(),
            colorbar: Colorbar::new(
                Rect::from_figure_fraction(COLORBAR_BOX, fw, fh),
                DivergingScale::new(style.vmin, style.vmax),
            ),
            projected,
            geometry,
        })
    }

    pub fn colorbar(&self) -> &Colorbar {
        &self.colorbar
    }

    /// Compose the frame for `year` in memory.
    pub fn render<'r, I>(&self, year: &str, records: I, world_average: f64) -> (RgbaImage, RenderedFrame)
    where
        I: IntoIterator<Item = &'r ChangeRecord>,
    {
        let style = self.style;
        let fg = rgb(style.foreground);
        let mut canvas = Canvas::new(self.width, self.height, rgb(style.background));

        let joined = join_year(self.geometry, records);
        let (mut filled, mut blank) = (0, 0);
        for (region, rings) in joined.iter().zip(&self.projected) {
            match region.value {
                Some(v) => {
                    canvas.fill_rings(rings.iter().map(Vec::as_slice), self.colorbar.scale.color(v));
                    filled += 1;
                }
                None => blank += 1,
            }
        }
        debug!(year, filled, blank, "joined year onto geometry");

        canvas.text(
            &format!("{} ({})", style.title, year),
            self.map_extent.center_x(),
            self.map_extent.y - style.points(6.0),
            style.points(12.0),
            (HAlign::Center, VAlign::Bottom),
            fg,
        );

        let marker = self.colorbar.draw(&mut canvas, style, world_average);

        canvas.text(
            &style.caption,
            self.width as f64 / 2.0,
            self.height as f64 * (1.0 - 0.05),
            style.points(8.0),
            (HAlign::Center, VAlign::Top),
            fg,
        );

        let frame = RenderedFrame {
            year: year.to_string(),
            path: PathBuf::new(),
            marker,
            filled,
            blank,
        };
        (canvas.into_image(), frame)
    }

    /// Render `year` and save it as `<dir>/<year>.png`.
    #[instrument(level = "debug", skip(self, records, dir), fields(dir = %dir.as_ref().display()))]
    pub fn render_to_file<'r, I, P>(
        &self,
        year: &str,
        records: I,
        world_average: f64,
        dir: P,
    ) -> Result<RenderedFrame>
    where
        I: IntoIterator<Item = &'r ChangeRecord>,
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).with_context(|| format!("creating frames directory {:?}", dir))?;

        let (img, mut frame) = self.render(year, records, world_average);
        let path = frame_path(dir, year);
        img.save(&path)
            .with_context(|| format!("saving frame {}", path.display()))?;

        frame.path = path;
        Ok(frame)
    }
}

/// `<dir>/<year>.png`
pub fn frame_path(dir: &Path, year: &str) -> PathBuf {
    dir.join(format!("{}.png", year))
}
