//! Heatmap rasterization of pointer-move samples.
//!
//! Two passes over a per-pixel intensity buffer:
//!
//! 1. **Stamp**: every sample adds a radial falloff (full weight at the
//!    centre, linearly down to zero at `radius`). Stamps combine additively
//!    and saturate at 1.0, so dense areas glow without growing unbounded.
//! 2. **Colorize**: each intensity is gamma-compressed and looked up in a
//!    256-entry palette baked from the gradient stops.
//!
//! The buffer is cleared at the start of every render. A render is always a
//! pure function of the sample set passed in.

use serde::{Deserialize, Serialize};
use wf_core::geometry::MAX_CANVAS_SIDE;
use wf_core::model::{Color, GradientStop};

/// Heatmap look, adjustable by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Stamp radius in logical px.
    pub radius: f32,
    /// Weight added at the centre of a stamp.
    pub center_alpha: f32,
    /// Exponent applied to intensity before colorizing.
    pub gamma: f32,
    pub stops: Vec<GradientStop>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        let stop = |offset: f32, hex: &str| GradientStop {
            offset,
            color: Color::from_hex(hex).unwrap_or(Color::TRANSPARENT),
        };
        Self {
            radius: 56.0,
            center_alpha: 0.42,
            gamma: 0.65,
            stops: vec![
                stop(0.0, "#22C55E00"),
                stop(0.25, "#22C55E8C"),
                stop(0.5, "#FACC15B3"),
                stop(0.75, "#F97316CC"),
                stop(1.0, "#EF4444E6"),
            ],
        }
    }
}

/// A rendered RGBA8 overlay, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl HeatmapImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.rgba.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Sample a piecewise-linear gradient at `t` in [0, 1].
pub fn gradient_at(stops: &[GradientStop], t: f32) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let Some(first) = stops.first() else {
        return Color::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    if let Some(last) = stops.last()
        && t >= last.offset
    {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.color;
            }
            return a.color.lerp(&b.color, (t - a.offset) / span);
        }
    }
    stops.last().map_or(Color::TRANSPARENT, |s| s.color)
}

/// Reusable heatmap rasterizer. Keeps its intensity buffer between renders
/// to avoid reallocating, but never carries values across them.
#[derive(Debug, Clone)]
pub struct HeatmapRenderer {
    config: HeatmapConfig,
    palette: Vec<[u8; 4]>,
    intensity: Vec<f32>,
    width: u32,
    height: u32,
}

impl Default for HeatmapRenderer {
    fn default() -> Self {
        Self::new(HeatmapConfig::default())
    }
}

impl HeatmapRenderer {
    pub fn new(config: HeatmapConfig) -> Self {
        let palette = (0..256)
            .map(|i| gradient_at(&config.stops, i as f32 / 255.0).to_rgba8())
            .collect();
        Self {
            config,
            palette,
            intensity: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Intensity left by the last render at pixel (x, y), in [0, 1].
    pub fn intensity_at(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.intensity
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .unwrap_or(0.0)
    }

    /// Rebuild the heatmap for a `width × height` canvas from the complete
    /// current sample set.
    ///
    /// A canvas with a side above `MAX_CANVAS_SIDE` renders as an empty
    /// 0×0 image.
    pub fn render<I>(&mut self, width: u32, height: u32, samples: I) -> HeatmapImage
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let (width, height) = if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
            log::debug!("heatmap {width}x{height} exceeds the canvas limit, skipped");
            (0, 0)
        } else {
            (width, height)
        };
        self.width = width;
        self.height = height;
        self.intensity.clear();
        self.intensity.resize(width as usize * height as usize, 0.0);

        let mut stamped = 0usize;
        for (x, y) in samples {
            if self.stamp(x, y) {
                stamped += 1;
            }
        }
        log::trace!("heatmap {width}x{height}: {stamped} stamps");

        let gamma = if self.config.gamma.is_finite() && self.config.gamma > 0.0 {
            self.config.gamma
        } else {
            1.0
        };
        let mut rgba = Vec::with_capacity(self.intensity.len() * 4);
        for &value in &self.intensity {
            if value <= 0.0 {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            let level = (value.powf(gamma) * 255.0).round() as usize;
            let color = self.palette.get(level.min(255)).copied().unwrap_or([0; 4]);
            rgba.extend_from_slice(&color);
        }
        HeatmapImage {
            width,
            height,
            rgba,
        }
    }

    /// Add one radial stamp. Returns false if it touched no pixel.
    fn stamp(&mut self, cx: f32, cy: f32) -> bool {
        let radius = self.config.radius;
        if radius.is_nan() || radius <= 0.0 || !cx.is_finite() || !cy.is_finite() {
            return false;
        }
        let (w, h) = (self.width as i64, self.height as i64);
        let x0 = ((cx - radius).floor() as i64).max(0);
        let y0 = ((cy - radius).floor() as i64).max(0);
        let x1 = ((cx + radius).ceil() as i64).min(w - 1);
        let y1 = ((cy + radius).ceil() as i64).min(h - 1);
        if x0 > x1 || y0 > y1 {
            return false;
        }

        let peak = self.config.center_alpha;
        for py in y0..=y1 {
            let dy = py as f32 + 0.5 - cy;
            let row = py as usize * self.width as usize;
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist >= radius {
                    continue;
                }
                let weight = peak * (1.0 - dist / radius);
                let cell = &mut self.intensity[row + px as usize];
                *cell = (*cell + weight).min(1.0);
            }
        }
        true
    }
}
