use image::Rgba;
use tracing::warn;

use super::{
    canvas::{Canvas, HAlign, VAlign},
    colormap::DivergingScale,
    projection::Rect,
};
use crate::config::Style;

/// Colorbar position as figure fractions `[left, bottom, width, height]`.
pub const COLORBAR_BOX: [f64; 4] = [0.2, 0.15, 0.6, 0.02];

const MARKER: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Gap between the marker value text and the triangle, in points.
const LEADER_PT: f64 = 6.0;

/// Where the reference marker was drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub value: f64,
    /// Pixel column of the marker line.
    pub x: f64,
}

/// Horizontal colorbar with ticks, a label, and a reference marker.
pub struct Colorbar {
    pub rect: Rect,
    pub scale: DivergingScale,
}

impl Colorbar {
    pub fn new(rect: Rect, scale: DivergingScale) -> Self {
        Self { rect, scale }
    }

    /// Pixel column for `value`, clamped to the bar.
    pub fn value_to_x(&self, value: f64) -> f64 {
        self.rect.x + self.scale.normalize(value) * self.rect.w
    }

    pub fn draw(&self, canvas: &mut Canvas, style: &Style, marker_value: f64) -> Marker {
        let r = self.rect;
        let fg = rgb(style.foreground);

        canvas.fill_gradient(r.x, r.y, r.right(), r.bottom(), |t| {
            self.scale.color(self.scale.vmin + t * (self.scale.vmax - self.scale.vmin))
        });

        // ticks and tick labels below the bar
        let tick_len = style.points(3.5);
        let tick_w = style.points(0.8);
        let label_size = style.points(10.0);
        let label_top = r.bottom() + tick_len + style.points(3.5);
        let ticks = nice_ticks(self.scale.vmin, self.scale.vmax, 9);
        let step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 1.0 };
        for &t in &ticks {
            let x = self.value_to_x(t);
            canvas.vline(x, r.bottom(), r.bottom() + tick_len, tick_w, fg);
            canvas.text(
                &tick_label(t, step),
                x,
                label_top,
                label_size,
                (HAlign::Center, VAlign::Top),
                fg,
            );
        }
        canvas.text(
            &style.colorbar_label,
            r.center_x(),
            label_top + label_size + style.points(3.5),
            label_size,
            (HAlign::Center, VAlign::Top),
            fg,
        );

        // reference marker: line through the bar, downward triangle resting on
        // top of it, value printed above
        if marker_value < self.scale.vmin || marker_value > self.scale.vmax {
            warn!(
                value = marker_value,
                "marker outside color range, pinned to the bar edge"
            );
        }
        let x = self.value_to_x(marker_value);
        canvas.vline(x, r.y, r.bottom(), style.points(1.5), MARKER);

        let half = style.points(20.0) / 2.0;
        let base = r.y - 2.0 * half;
        canvas.fill_triangle([[x - half, base], [x + half, base], [x, r.y]], MARKER);

        // thin leader from the value text down to the triangle
        let text_bottom = base - style.points(LEADER_PT);
        canvas.vline(x, text_bottom, base, style.points(0.75), fg);
        canvas.text(
            &format!("{:.2}", marker_value),
            x,
            text_bottom,
            style.points(8.0),
            (HAlign::Center, VAlign::Bottom),
            fg,
        );

        Marker {
            value: marker_value,
            x,
        }
    }
}

pub(crate) fn rgb(c: [u8; 3]) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 255])
}

/// Evenly spaced round tick values covering `[vmin, vmax]`, at most
/// `max_ticks` of them.
pub fn nice_ticks(vmin: f64, vmax: f64, max_ticks: usize) -> Vec<f64> {
    let span = vmax - vmin;
    if span.is_nan() || span <= 0.0 || max_ticks < 2 {
        return vec![vmin];
    }

    let raw = span / (max_ticks - 1) as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * mag)
        .find(|s| *s >= raw - 1e-12)
        .unwrap_or(10.0 * mag);

    let first = (vmin / step).ceil() as i64;
    let last = (vmax / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Tick text with just enough decimals for `step`, negatives with U+2212.
fn tick_label(value: f64, step: f64) -> String {
    let decimals = (-step.log10().floor()).max(0.0) as usize;
    let s = format!("{:.*}", decimals, value.abs());
    if value < 0.0 && s.chars().any(|c| c != '0' && c != '.') {
        format!("\u{2212}{}", s)
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_for_default_range() {
        let ticks = nice_ticks(-2.0, 2.0, 9);
        assert_eq!(
            ticks,
            vec![-2.0, -1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 2.0]
        );
        let labels: Vec<String> = ticks.iter().map(|t| tick_label(*t, 0.5)).collect();
        assert_eq!(labels[0], "\u{2212}2.0");
        assert_eq!(labels[4], "0.0");
        assert_eq!(labels[8], "2.0");
    }

    #[test]
    fn ticks_for_wide_range() {
        let ticks = nice_ticks(0.0, 100.0, 9);
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks.last(), Some(&100.0));
        assert!(ticks.len() <= 9);
        assert_eq!(tick_label(25.0, 25.0), "25");
    }

    #[test]
    fn marker_lands_on_value_and_clamps() {
        let style = Style {
            dpi: 40,
            ..Style::default()
        };
        let (w, h) = style.pixel_size();
        let rect = Rect::from_figure_fraction(COLORBAR_BOX, w as f64, h as f64);
        let bar = Colorbar::new(rect, DivergingScale::new(-2.0, 2.0));
        let mut canvas = Canvas::new(w, h, rgb(style.background));

        let m = bar.draw(&mut canvas, &style, 0.0);
        assert_eq!(m.value, 0.0);
        assert!((m.x - rect.center_x()).abs() < 1e-9);
        let mid_y = (rect.y + rect.h / 2.0) as u32;
        let col = m.x.round() as u32;
        assert!(
            canvas.pixel(col - 1, mid_y) == MARKER || canvas.pixel(col, mid_y) == MARKER,
            "no marker line at x={}",
            m.x
        );

        assert_eq!(bar.value_to_x(5.0), rect.right());
        assert_eq!(bar.value_to_x(-5.0), rect.x);
    }

    #[test]
    fn value_text_is_connected_to_marker() {
        let style = Style {
            dpi: 72,
            ..Style::default()
        };
        let (w, h) = style.pixel_size();
        let rect = Rect::from_figure_fraction(COLORBAR_BOX, w as f64, h as f64);
        let bar = Colorbar::new(rect, DivergingScale::new(-2.0, 2.0));
        let mut canvas = Canvas::new(w, h, rgb(style.background));

        let m = bar.draw(&mut canvas, &style, 0.73);
        let fg = rgb(style.foreground);
        let base = rect.y - style.points(20.0);
        let col = m.x.round() as u32;
        // every row of the gap between text and triangle carries the leader
        let top = (base - style.points(LEADER_PT)).ceil() as u32;
        for y in top..base.floor() as u32 {
            assert!(
                canvas.pixel(col - 1, y) == fg || canvas.pixel(col, y) == fg,
                "leader missing at y={}",
                y
            );
        }
    }
}
