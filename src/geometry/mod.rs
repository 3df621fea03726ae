// src/geometry/mod.rs
pub mod fetch;
pub mod geojson;

pub use fetch::ensure_geometry;
pub use geojson::{load_geojson, parse_geojson};

/// A closed ring of `[lon, lat]` points.
pub type Ring = Vec<[f64; 2]>;

/// Exterior ring plus holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    /// ISO-3 code, the join key.
    pub code: String,
    pub name: Option<String>,
    pub polygons: Vec<Polygon>,
}

/// Lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Country boundaries in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryGeometry {
    pub shapes: Vec<CountryShape>,
}

impl CountryGeometry {
    pub fn new(shapes: Vec<CountryShape>) -> Self {
        Self { shapes }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CountryShape> {
        self.shapes.iter().find(|s| s.code == code)
    }

    /// Bounding box over every point, or `None` when there are no points.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self
            .shapes
            .iter()
            .flat_map(|s| &s.polygons)
            .flat_map(|p| p.rings())
            .flatten();

        let first = points.next()?;
        let init = Bounds {
            min_x: first[0],
            min_y: first[1],
            max_x: first[0],
            max_y: first[1],
        };
        Some(points.fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p[0]),
            min_y: b.min_y.min(p[1]),
            max_x: b.max_x.max(p[0]),
            max_y: b.max_y.max(p[1]),
        }))
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Axis-aligned square country.
    pub fn square(code: &str, x0: f64, y0: f64, size: f64) -> CountryShape {
        CountryShape {
            code: code.to_string(),
            name: None,
            polygons: vec![Polygon {
                exterior: vec![
                    [x0, y0],
                    [x0 + size, y0],
                    [x0 + size, y0 + size],
                    [x0, y0 + size],
                    [x0, y0],
                ],
                holes: vec![],
            }],
        }
    }
}
