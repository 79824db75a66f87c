use crate::surface::{ColorStop, Hsla, RadialGradient};
use std::f32::consts::TAU;

/// Normalized bounds a nebula drifts within before bouncing.
pub const NEBULA_MIN: f32 = -0.2;
pub const NEBULA_MAX: f32 = 1.2;

/// Soft background glow in normalized viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nebula {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub hue_offset: f32,
    pub phase: f32,
    pub speed: f32,
    pub drift_x: f32,
    pub drift_y: f32,
}

impl Nebula {
    pub fn spawn(rng: &mut fastrand::Rng) -> Self {
        Self {
            x: rng.f32(),
            y: rng.f32(),
            size: 200.0 + rng.f32() * 400.0,
            hue_offset: rng.f32() * 60.0,
            phase: rng.f32() * TAU,
            speed: 0.0003 + rng.f32() * 0.0005,
            drift_x: (rng.f32() - 0.5) * 0.00005,
            drift_y: (rng.f32() - 0.5) * 0.00005,
        }
    }

    pub fn advance(&mut self) {
        self.phase += self.speed;
        self.x += self.drift_x;
        self.y += self.drift_y;
        if self.x < NEBULA_MIN || self.x > NEBULA_MAX {
            self.drift_x = -self.drift_x;
        }
        if self.y < NEBULA_MIN || self.y > NEBULA_MAX {
            self.drift_y = -self.drift_y;
        }
    }

    pub fn gradient(&self, w: f32, h: f32, hue: f32, bass: f32, energy: f32) -> RadialGradient {
        let cx = self.x * w + self.phase.sin() * 60.0;
        let cy = self.y * h + (self.phase * 0.7).cos() * 40.0;
        let alpha = 0.03 + energy * 0.08;
        let base = hue + self.hue_offset;
        RadialGradient {
            cx,
            cy,
            radius: self.size * (1.0 + bass * 0.8),
            stops: vec![
                ColorStop {
                    offset: 0.0,
                    color: Hsla::new(base, 70.0, 45.0, alpha),
                },
                ColorStop {
                    offset: 0.5,
                    color: Hsla::new(base + 30.0, 60.0, 30.0, alpha * 0.4),
                },
                ColorStop {
                    offset: 1.0,
                    color: Hsla::new(base, 50.0, 20.0, 0.0),
                },
            ],
        }
    }
}
