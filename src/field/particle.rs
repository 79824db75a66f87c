use std::f32::consts::TAU;

/// One drifting point of light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Depth factor: scales speed, size and link opacity.
    pub z: f32,
    pub base_vx: f32,
    pub base_vy: f32,
    pub size: f32,
    pub pulse: f32,
    pub hue_offset: f32,
    pub orbit_speed: f32,
    pub orbit_phase: f32,
    pub orbit_radius: f32,
}

impl Particle {
    pub fn spawn(rng: &mut fastrand::Rng, w: f32, h: f32) -> Self {
        Self {
            x: rng.f32() * w,
            y: rng.f32() * h,
            z: rng.f32() * 2.0 + 0.5,
            base_vx: (rng.f32() - 0.5) * 0.3,
            base_vy: (rng.f32() - 0.5) * 0.3,
            size: rng.f32() * 2.0 + 0.5,
            pulse: rng.f32() * TAU,
            hue_offset: rng.f32() * 60.0 - 30.0,
            orbit_speed: 0.002 + rng.f32() * 0.004,
            orbit_phase: rng.f32() * TAU,
            orbit_radius: 30.0 + rng.f32() * 80.0,
        }
    }
}

/// Particle budget for a `w × h` viewport.
pub fn particle_count(w: f32, h: f32, area_per_particle: f32, max: usize) -> usize {
    if [w, h, area_per_particle].iter().any(|v| v.is_nan() || *v <= 0.0) {
        return 0;
    }
    let n = ((w as f64 * h as f64) / area_per_particle as f64).floor();
    if n >= max as f64 { max } else { n as usize }
}

/// Wrap `v` into `[-margin, extent + margin)`.
pub fn wrap_coord(v: f32, extent: f32, margin: f32) -> f32 {
    let span = extent + 2.0 * margin;
    if span.is_nan() || span <= 0.0 || !v.is_finite() {
        return -margin;
    }
    if v >= -margin && v < extent + margin {
        return v;
    }
    let r = (v + margin).rem_euclid(span) - margin;
    if r >= extent + margin { -margin } else { r }
}
