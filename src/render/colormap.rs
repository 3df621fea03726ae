use image::Rgba;

/// Moreland's diverging blue-white-red scale (the `coolwarm` map), sampled at
/// 33 evenly spaced stops.
const COOLWARM: [[u8; 3]; 33] = [
    [59, 76, 192],
    [68, 90, 204],
    [77, 104, 215],
    [87, 117, 225],
    [98, 130, 234],
    [108, 142, 241],
    [119, 154, 247],
    [130, 165, 251],
    [141, 176, 254],
    [152, 185, 255],
    [163, 194, 255],
    [174, 201, 253],
    [184, 208, 249],
    [194, 213, 244],
    [204, 217, 238],
    [213, 219, 230],
    [221, 221, 221],
    [229, 216, 209],
    [236, 211, 197],
    [241, 204, 184],
    [245, 196, 172],
    [247, 187, 160],
    [247, 177, 148],
    [247, 166, 135],
    [244, 154, 123],
    [241, 141, 111],
    [236, 127, 99],
    [229, 112, 88],
    [222, 96, 77],
    [213, 80, 66],
    [203, 62, 56],
    [192, 40, 47],
    [180, 4, 38],
];

/// Maps values in `[vmin, vmax]` onto the diverging scale. Values outside
/// the range take the end colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergingScale {
    pub vmin: f64,
    pub vmax: f64,
}

impl DivergingScale {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Position of `value` on the scale, clamped to `0.0..=1.0`.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span <= 0.0 || value.is_nan() {
            return 0.5;
        }
        ((value - self.vmin) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Rgba<u8> {
        sample(self.normalize(value))
    }
}

/// Linear interpolation between the two stops around `t`.
pub fn sample(t: f64) -> Rgba<u8> {
    let last = COOLWARM.len() - 1;
    let pos = t.clamp(0.0, 1.0) * last as f64;
    let i = (pos.floor() as usize).min(last - 1);
    let frac = pos - i as f64;

    let (a, b) = (COOLWARM[i], COOLWARM[i + 1]);
    let mix = |k: usize| (a[k] as f64 + (b[k] as f64 - a[k] as f64) * frac).round() as u8;
    Rgba([mix(0), mix(1), mix(2), 255])
}
