use image::{Rgba, RgbaImage};

use super::font;

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Opaque RGBA drawing surface in pixel coordinates, y pointing down.
pub struct Canvas {
    img: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            img: RgbaImage::from_pixel(width, height, background),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.img.get_pixel(x, y)
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.img.width() && (y as u32) < self.img.height() {
            self.img.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Fill pixels whose centers fall inside `[x0, x1) × [y0, y1)`.
    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba<u8>) {
        let (w, h) = (self.img.width() as f64, self.img.height() as f64);
        let xs = (x0.min(x1) - 0.5).ceil().max(0.0) as u32;
        let xe = (x0.max(x1) - 0.5).ceil().min(w).max(0.0) as u32;
        let ys = (y0.min(y1) - 0.5).ceil().max(0.0) as u32;
        let ye = (y0.max(y1) - 0.5).ceil().min(h).max(0.0) as u32;
        for y in ys..ye {
            for x in xs..xe {
                self.img.put_pixel(x, y, color);
            }
        }
    }

    /// Vertical line `width` pixels wide (at least one) centered on `x`.
    pub fn vline(&mut self, x: f64, y0: f64, y1: f64, width: f64, color: Rgba<u8>) {
        let half = width.max(1.0) / 2.0;
        self.fill_rect(x - half, y0, x + half, y1, color);
    }

    /// Horizontal gradient across `[x0, x1)`: `color_at(t)` with `t` in `0..1`.
    pub fn fill_gradient<F>(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color_at: F)
    where
        F: Fn(f64) -> Rgba<u8>,
    {
        let span = (x1 - x0).max(f64::EPSILON);
        let w = self.img.width() as f64;
        let xs = (x0 - 0.5).ceil().max(0.0) as u32;
        let xe = (x1 - 0.5).ceil().min(w).max(0.0) as u32;
        for x in xs..xe {
            let t = ((x as f64 + 0.5) - x0) / span;
            self.fill_rect(x as f64, y0, x as f64 + 1.0, y1, color_at(t));
        }
    }

    /// Even-odd scanline fill of a set of rings. Holes are just more rings,
    /// so they come out unpainted.
    pub fn fill_rings<'a, I>(&mut self, rings: I, color: Rgba<u8>)
    where
        I: IntoIterator<Item = &'a [[f64; 2]]>,
    {
        let edges: Vec<([f64; 2], [f64; 2])> = rings
            .into_iter()
            .filter(|r| r.len() >= 3)
            .flat_map(|r| {
                let n = r.len();
                (0..n).map(move |i| (r[i], r[(i + 1) % n]))
            })
            .filter(|(a, b)| a[1] != b[1])
            .collect();
        if edges.is_empty() {
            return;
        }

        let (min_y, max_y) = edges.iter().fold((f64::MAX, f64::MIN), |(lo, hi), (a, b)| {
            (lo.min(a[1]).min(b[1]), hi.max(a[1]).max(b[1]))
        });
        let h = self.img.height() as f64;
        let ys = (min_y - 0.5).ceil().max(0.0) as u32;
        let ye = (max_y - 0.5).ceil().min(h).max(0.0) as u32;

        let mut xs: Vec<f64> = Vec::new();
        for y in ys..ye {
            let cy = y as f64 + 0.5;
            xs.clear();
            for (a, b) in &edges {
                let (lo, hi) = if a[1] < b[1] { (a, b) } else { (b, a) };
                // half-open so shared vertices count once
                if cy >= lo[1] && cy < hi[1] {
                    let t = (cy - lo[1]) / (hi[1] - lo[1]);
                    xs.push(lo[0] + t * (hi[0] - lo[0]));
                }
            }
            xs.sort_by(|a, b| a.total_cmp(b));
            for pair in xs.chunks_exact(2) {
                self.fill_rect(pair[0], y as f64, pair[1], y as f64 + 1.0, color);
            }
        }
    }

    pub fn fill_triangle(&mut self, pts: [[f64; 2]; 3], color: Rgba<u8>) {
        self.fill_rings([&pts[..]], color);
    }

    /// Draw `text` roughly `size_px` tall, aligned around `(x, y)`.
    pub fn text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        size_px: f64,
        align: (HAlign, VAlign),
        color: Rgba<u8>,
    ) {
        let scale = font::scale_for(size_px);
        let (w, h) = font::measure(text, scale);
        let left = match align.0 {
            HAlign::Left => x,
            HAlign::Center => x - w as f64 / 2.0,
            HAlign::Right => x - w as f64,
        };
        let top = match align.1 {
            VAlign::Top => y,
            VAlign::Center => y - h as f64 / 2.0,
            VAlign::Bottom => y - h as f64,
        };
        font::rasterize(text, left.round() as i64, top.round() as i64, scale, |px, py| {
            self.put(px, py, color)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const FG: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn count(canvas: &Canvas, color: Rgba<u8>) -> usize {
        let mut n = 0;
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                if canvas.pixel(x, y) == color {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn square_fills_exact_area() {
        let mut c = Canvas::new(20, 20, BG);
        let sq: Vec<[f64; 2]> = vec![[2.0, 2.0], [12.0, 2.0], [12.0, 12.0], [2.0, 12.0]];
        c.fill_rings([sq.as_slice()], FG);
        assert_eq!(count(&c, FG), 100);
        assert_eq!(c.pixel(2, 2), FG);
        assert_eq!(c.pixel(11, 11), FG);
        assert_eq!(c.pixel(12, 12), BG);
    }

    #[test]
    fn holes_stay_unpainted() {
        let mut c = Canvas::new(20, 20, BG);
        let outer: Vec<[f64; 2]> = vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        let hole: Vec<[f64; 2]> = vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0]];
        c.fill_rings([outer.as_slice(), hole.as_slice()], FG);
        assert_eq!(count(&c, FG), 100 - 4);
        assert_eq!(c.pixel(5, 5), BG);
        assert_eq!(c.pixel(1, 1), FG);
    }

    #[test]
    fn shapes_are_clipped_to_canvas() {
        let mut c = Canvas::new(10, 10, BG);
        let big: Vec<[f64; 2]> = vec![[-50.0, -50.0], [50.0, -50.0], [50.0, 50.0], [-50.0, 50.0]];
        c.fill_rings([big.as_slice()], FG);
        assert_eq!(count(&c, FG), 100);
        c.text("-1.50", -3.0, 8.0, 7.0, (HAlign::Left, VAlign::Top), BG);
    }

    #[test]
    fn centered_text_straddles_anchor() {
        let mut c = Canvas::new(60, 20, BG);
        c.text("HHHH", 30.0, 10.0, 7.0, (HAlign::Center, VAlign::Center), FG);
        let left = (0..30).any(|x| (0..20).any(|y| c.pixel(x, y) == FG));
        let right = (30..60).any(|x| (0..20).any(|y| c.pixel(x, y) == FG));
        assert!(left && right);
    }
}
