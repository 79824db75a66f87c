mod nebula;
mod particle;

pub use nebula::{Nebula, NEBULA_MAX, NEBULA_MIN};
pub use particle::{particle_count, wrap_coord, Particle};

use crate::reactive::{Magnitude, PeakCursor, ReactiveState};
use crate::surface::{Hsla, Surface};
use crate::tuning::FieldTuning;

/// Where the pointer rests when nobody is moving it.
pub const POINTER_PARKED: (f32, f32) = (-1000.0, -1000.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFrame {
    pub links: usize,
    pub peak: bool,
}

/// Audio-modulated particles and nebulae over a logical viewport.
pub struct ParticleField {
    tuning: FieldTuning,
    rng: fastrand::Rng,
    w: f32,
    h: f32,
    particles: Vec<Particle>,
    nebulae: Vec<Nebula>,
    pointer: (f32, f32),
    pointer_idle: u32,
    peaks: PeakCursor,
}

impl ParticleField {
    /// Nebulae are created here once; particles wait for the first `resize`.
    pub fn new(tuning: FieldTuning, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let nebulae = (0..tuning.nebula_count)
            .map(|_| Nebula::spawn(&mut rng))
            .collect();
        Self {
            tuning,
            rng,
            w: 0.0,
            h: 0.0,
            particles: Vec::new(),
            nebulae,
            pointer: POINTER_PARKED,
            pointer_idle: 0,
            peaks: PeakCursor::new(),
        }
    }

    /// Adopt a new viewport and regenerate every particle.
    pub fn resize(&mut self, w: f32, h: f32) {
        self.w = if w.is_finite() { w.max(0.0) } else { 0.0 };
        self.h = if h.is_finite() { h.max(0.0) } else { 0.0 };
        let n = particle_count(
            self.w,
            self.h,
            self.tuning.area_per_particle,
            self.tuning.max_particles,
        );
        let rng = &mut self.rng;
        let (w, h) = (self.w, self.h);
        self.particles = (0..n).map(|_| Particle::spawn(rng, w, h)).collect();
        log::debug!("field resized to {:.0}x{:.0}: {} particles", self.w, self.h, n);
    }

    pub fn size(&self) -> (f32, f32) {
        (self.w, self.h)
    }

    pub fn tuning(&self) -> &FieldTuning {
        &self.tuning
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn nebulae(&self) -> &[Nebula] {
        &self.nebulae
    }

    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.pointer = (x, y);
            self.pointer_idle = 0;
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer = POINTER_PARKED;
        self.pointer_idle = 0;
    }

    /// Advance one frame and paint it.
    pub fn frame(
        &mut self,
        state: &ReactiveState,
        hue: f32,
        surface: &mut dyn Surface,
    ) -> FieldFrame {
        self.tick_pointer();
        let peak = self.peaks.take(state);

        let bass = state.bass.unit();
        let mid = state.mid.unit();
        let high = state.high.unit();
        let energy = state.energy.unit();

        surface.clear();

        for n in &mut self.nebulae {
            n.advance();
            surface.fill_radial(&n.gradient(self.w, self.h, hue, bass, energy));
        }

        let links = self.draw_links(surface, hue, bass, mid, high, energy);

        let t = self.tuning;
        let (w, h) = (self.w, self.h);
        let (cx, cy) = (w * 0.5, h * 0.5);
        let pointer = self.pointer;

        for p in &mut self.particles {
            p.pulse += 0.02 + energy * 0.04;
            p.orbit_phase += p.orbit_speed * (1.0 + bass * 3.0);
            let reach = p.orbit_radius * 0.01 * (1.0 + mid * 2.0);
            let ox = p.orbit_phase.cos() * reach;
            let oy = p.orbit_phase.sin() * reach;

            let dx = pointer.0 - p.x;
            let dy = pointer.1 - p.y;
            let dist = (dx * dx + dy * dy).sqrt();
            let (mut mx, mut my) = (0.0, 0.0);
            if dist < t.pointer_radius {
                let f = (t.pointer_radius - dist) / t.pointer_radius * t.pointer_strength;
                mx = -dx * f;
                my = -dy * f;
            }

            let (mut kx, mut ky) = (0.0, 0.0);
            if peak {
                let a = (p.y - cy).atan2(p.x - cx);
                kx = a.cos() * bass * t.peak_kick;
                ky = a.sin() * bass * t.peak_kick;
            }

            p.x = wrap_coord(p.x + (p.base_vx + ox + mx + kx) * p.z, w, t.edge_margin);
            p.y = wrap_coord(p.y + (p.base_vy + oy + my + ky) * p.z, h, t.edge_margin);

            let glow = 0.3 + p.pulse.sin() * 0.2 + energy * 0.3;
            let radius = p.size * p.z * (1.0 + bass * 0.8);
            let ph = hue + p.hue_offset + high * 60.0;

            surface.fill_circle(
                p.x,
                p.y,
                radius,
                Hsla::new(ph, 85.0, 60.0 + energy * 20.0, glow),
            );
            surface.fill_circle(
                p.x,
                p.y,
                radius * (3.0 + energy * 4.0),
                Hsla::new(ph, 80.0, 55.0, glow * (0.04 + energy * 0.07)),
            );
        }

        if peak {
            surface.fill_rect(0.0, 0.0, w, h, Hsla::new(hue, 80.0, 70.0, 0.02 + bass * 0.05));
        }

        FieldFrame { links, peak }
    }

    fn tick_pointer(&mut self) {
        if self.pointer == POINTER_PARKED {
            return;
        }
        self.pointer_idle = self.pointer_idle.saturating_add(1);
        let limit = self.tuning.pointer_idle_frames;
        if limit > 0 && self.pointer_idle >= limit {
            log::trace!("pointer idle for {limit} frames, parking");
            self.pointer_left();
        }
    }

    fn draw_links(
        &self,
        surface: &mut dyn Surface,
        hue: f32,
        bass: f32,
        mid: f32,
        high: f32,
        energy: f32,
    ) -> usize {
        let reach = self.tuning.link_distance + bass * self.tuning.link_bass_gain;
        if reach.is_nan() || reach <= 0.0 {
            return 0;
        }
        let reach2 = reach * reach;
        let width = 0.5 + energy;
        let mut links = 0usize;

        for (i, p) in self.particles.iter().enumerate() {
            for q in &self.particles[i + 1..] {
                let dx = p.x - q.x;
                let dy = p.y - q.y;
                let d2 = dx * dx + dy * dy;
                if d2 >= reach2 {
                    continue;
                }
                let dist = d2.sqrt();
                let alpha = (1.0 - dist / reach) * (0.1 + energy * 0.2) * p.z.min(q.z);
                surface.stroke_line(
                    p.x,
                    p.y,
                    q.x,
                    q.y,
                    width,
                    Hsla::new(hue + mid * 40.0, 80.0, 55.0 + high * 20.0, alpha),
                );
                links += 1;
            }
        }
        links
    }
}
