use crate::geometry::Bounds;

/// Pixel rectangle, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Build from figure fractions `[left, bottom, width, height]` measured
    /// from the bottom-left corner, as figure axes are usually specified.
    pub fn from_figure_fraction(frac: [f64; 4], fig_w: f64, fig_h: f64) -> Self {
        let [left, bottom, width, height] = frac;
        Self {
            x: left * fig_w,
            y: (1.0 - bottom - height) * fig_h,
            w: width * fig_w,
            h: height * fig_h,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }
}

/// Equirectangular lon/lat to pixel mapping with equal aspect, centered in
/// its target box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    bounds: Bounds,
    scale: f64,
    origin_x: f64,
    origin_y: f64,
}

impl Projection {
    pub fn fit(bounds: Bounds, target: Rect) -> Self {
        let bw = bounds.width().max(f64::EPSILON);
        let bh = bounds.height().max(f64::EPSILON);
        let scale = (target.w / bw).min(target.h / bh);
        Self {
            bounds,
            scale,
            origin_x: target.x + (target.w - bw * scale) / 2.0,
            origin_y: target.y + (target.h - bh * scale) / 2.0,
        }
    }

    pub fn project(&self, p: [f64; 2]) -> [f64; 2] {
        [
            self.origin_x + (p[0] - self.bounds.min_x) * self.scale,
            self.origin_y + (self.bounds.max_y - p[1]) * self.scale,
        ]
    }

    /// Where the data actually lands inside the target box.
    pub fn extent(&self) -> Rect {
        Rect {
            x: self.origin_x,
            y: self.origin_y,
            w: self.bounds.width() * self.scale,
            h: self.bounds.height() * self.scale,
        }
    }
}
