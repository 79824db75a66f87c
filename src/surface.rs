//! 2D drawing surface and a software RGBA rasterizer behind it.

/// CSS-style color: hue in degrees, saturation/lightness in percent,
/// alpha in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub const fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    pub fn alpha(&self) -> f32 {
        if self.a.is_finite() { self.a.clamp(0.0, 1.0) } else { 0.0 }
    }

    pub fn to_rgb(&self) -> [u8; 3] {
        hsl_to_rgb(self.h, self.s / 100.0, self.l / 100.0)
    }

    pub fn to_rgba(&self) -> Rgba {
        Rgba {
            rgb: self.to_rgb(),
            a: self.alpha(),
        }
    }
}

/// Straight (non-premultiplied) color, alpha in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: [u8; 3],
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        rgb: [0, 0, 0],
        a: 0.0,
    };

    /// Blend in premultiplied space so a fade to a transparent stop keeps
    /// the opaque stop's color.
    fn lerp(&self, other: &Rgba, t: f32) -> Rgba {
        let a = self.a + (other.a - self.a) * t;
        if a <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        let mut rgb = [0u8; 3];
        for (c, out) in rgb.iter_mut().enumerate() {
            let p0 = self.rgb[c] as f32 * self.a;
            let p1 = other.rgb[c] as f32 * other.a;
            *out = ((p0 + (p1 - p0) * t) / a).round().clamp(0.0, 255.0) as u8;
        }
        Rgba { rgb, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Hsla,
}

/// Circular gradient from `(cx, cy)` out to `radius`, stops sorted by offset.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub stops: Vec<ColorStop>,
}

impl RadialGradient {
    /// Color at normalized distance `t`; stops are converted to RGB first.
    pub fn color_at(&self, t: f32) -> Rgba {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgba::TRANSPARENT;
        };
        if t <= first.offset {
            return first.color.to_rgba();
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t <= b.offset {
                let span = (b.offset - a.offset).max(1e-6);
                return a.color.to_rgba().lerp(&b.color.to_rgba(), (t - a.offset) / span);
            }
        }
        last.color.to_rgba()
    }
}

/// Immediate-mode drawing in logical (viewport) pixels.
pub trait Surface {
    /// Logical width and height.
    fn size(&self) -> (f32, f32);
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Hsla);
    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Hsla);
    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: Hsla);
    /// Fill the gradient's bounding square; outside the radius stays untouched.
    fn fill_radial(&mut self, gradient: &RadialGradient);
}

/// RGBA raster showing a logical viewport scaled to fit.
///
/// Shapes never shrink below one raster pixel, so thin strokes and small
/// particles stay visible on coarse rasters such as terminal cells.
pub struct PixelCanvas {
    w: usize,
    h: usize,
    logical_w: f32,
    logical_h: f32,
    sx: f32,
    sy: f32,
    background: [u8; 3],
    pixels: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(w: usize, h: usize, logical_w: f32, logical_h: f32) -> Self {
        let mut c = Self {
            w: 0,
            h: 0,
            logical_w: 0.0,
            logical_h: 0.0,
            sx: 1.0,
            sy: 1.0,
            background: [0, 0, 0],
            pixels: Vec::new(),
        };
        c.resize(w, h, logical_w, logical_h);
        c
    }

    pub fn resize(&mut self, w: usize, h: usize, logical_w: f32, logical_h: f32) {
        self.w = w;
        self.h = h;
        self.logical_w = logical_w.max(0.0);
        self.logical_h = logical_h.max(0.0);
        self.sx = if self.logical_w > 0.0 { w as f32 / self.logical_w } else { 1.0 };
        self.sy = if self.logical_h > 0.0 { h as f32 / self.logical_h } else { 1.0 };
        self.pixels.resize(w.saturating_mul(h).saturating_mul(4), 0);
        self.clear();
    }

    pub fn set_background(&mut self, rgb: [u8; 3]) {
        self.background = rgb;
    }

    pub fn raster_size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let i = (y * self.w + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    fn scale(&self) -> f32 {
        (self.sx + self.sy) * 0.5
    }

    /// Raster pixel range covering logical `[lo, hi]` along one axis.
    fn span(lo: f32, hi: f32, s: f32, n: usize) -> Option<(usize, usize)> {
        if n == 0 || !lo.is_finite() || !hi.is_finite() {
            return None;
        }
        let a = (lo * s).floor().max(0.0);
        let b = (hi * s).ceil().min(n as f32);
        if b <= a {
            return None;
        }
        Some((a as usize, b as usize))
    }

    #[inline]
    fn blend(&mut self, x: usize, y: usize, rgb: [u8; 3], alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let i = (y * self.w + x) * 4;
        let a = alpha.min(1.0);
        let ia = 1.0 - a;
        for c in 0..3 {
            let v = self.pixels[i + c] as f32 * ia + rgb[c] as f32 * a;
            self.pixels[i + c] = v.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = 255;
    }
}

impl Surface for PixelCanvas {
    fn size(&self) -> (f32, f32) {
        (self.logical_w, self.logical_h)
    }

    fn clear(&mut self) {
        let [r, g, b] = self.background;
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = 255;
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Hsla) {
        let alpha = color.alpha();
        if alpha <= 0.0 || w <= 0.0 || h <= 0.0 {
            return;
        }
        let Some((x0, x1)) = Self::span(x, x + w, self.sx, self.w) else {
            return;
        };
        let Some((y0, y1)) = Self::span(y, y + h, self.sy, self.h) else {
            return;
        };
        let rgb = color.to_rgb();
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, rgb, alpha);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Hsla) {
        let alpha = color.alpha();
        if alpha <= 0.0 || r.is_nan() || r <= 0.0 {
            return;
        }
        let rr = (r * self.scale()).max(0.5);
        let (rcx, rcy) = (cx * self.sx, cy * self.sy);
        let Some((x0, x1)) = Self::span(rcx - rr - 1.0, rcx + rr + 1.0, 1.0, self.w) else {
            return;
        };
        let Some((y0, y1)) = Self::span(rcy - rr - 1.0, rcy + rr + 1.0, 1.0, self.h) else {
            return;
        };
        let rgb = color.to_rgb();
        for py in y0..y1 {
            let dy = py as f32 + 0.5 - rcy;
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - rcx;
                let d = (dx * dx + dy * dy).sqrt();
                let coverage = (rr + 0.5 - d).clamp(0.0, 1.0);
                self.blend(px, py, rgb, alpha * coverage);
            }
        }
    }

    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: Hsla) {
        let alpha = color.alpha();
        if alpha <= 0.0 {
            return;
        }
        let half = (width * self.scale() * 0.5).max(0.5);
        let (ax, ay) = (x0 * self.sx, y0 * self.sy);
        let (bx, by) = (x1 * self.sx, y1 * self.sy);
        let Some((px0, px1)) =
            Self::span(ax.min(bx) - half - 1.0, ax.max(bx) + half + 1.0, 1.0, self.w)
        else {
            return;
        };
        let Some((py0, py1)) =
            Self::span(ay.min(by) - half - 1.0, ay.max(by) + half + 1.0, 1.0, self.h)
        else {
            return;
        };

        let (vx, vy) = (bx - ax, by - ay);
        let len2 = vx * vx + vy * vy;
        let rgb = color.to_rgb();
        for py in py0..py1 {
            let cy = py as f32 + 0.5;
            for px in px0..px1 {
                let cx = px as f32 + 0.5;
                let t = if len2 > 1e-9 {
                    (((cx - ax) * vx + (cy - ay) * vy) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (qx, qy) = (ax + vx * t - cx, ay + vy * t - cy);
                let d = (qx * qx + qy * qy).sqrt();
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                self.blend(px, py, rgb, alpha * coverage);
            }
        }
    }

    fn fill_radial(&mut self, gradient: &RadialGradient) {
        let r = gradient.radius;
        if r.is_nan() || r <= 0.0 || gradient.stops.is_empty() {
            return;
        }
        let (cx, cy) = (gradient.cx, gradient.cy);
        let Some((x0, x1)) = Self::span(cx - r, cx + r, self.sx, self.w) else {
            return;
        };
        let Some((y0, y1)) = Self::span(cy - r, cy + r, self.sy, self.h) else {
            return;
        };
        for py in y0..y1 {
            let ly = (py as f32 + 0.5) / self.sy - cy;
            for px in x0..x1 {
                let lx = (px as f32 + 0.5) / self.sx - cx;
                let t = (lx * lx + ly * ly).sqrt() / r;
                if t >= 1.0 {
                    continue;
                }
                let c = gradient.color_at(t);
                self.blend(px, py, c.rgb, c.a);
            }
        }
    }
}

pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [u8; 3] {
    let h = if h.is_finite() { h.rem_euclid(360.0) / 360.0 } else { 0.0 };
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t - t.floor();
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}
