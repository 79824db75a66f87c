use super::SignalSource;
use std::f32::consts::PI;

/// Deterministic stand-in for a music track: four-on-the-floor kicks with a
/// noise burst, a slowly breathing pad and off-beat hats.
///
/// Every `pull` advances by one display frame's worth of samples, so the
/// signal runs in lockstep with the frame loop rather than the wall clock.
pub struct PulseSynth {
    sample_rate_hz: u32,
    samples_per_pull: usize,
    bpm: f32,
    cursor: u64,
    kick_phase: f32,
    rng: fastrand::Rng,
}

impl PulseSynth {
    pub fn new(sample_rate_hz: u32, frame_rate: u32, seed: u64) -> Self {
        let sample_rate_hz = sample_rate_hz.clamp(8_000, 192_000);
        let frame_rate = frame_rate.max(1);
        Self {
            sample_rate_hz,
            samples_per_pull: (sample_rate_hz / frame_rate).max(1) as usize,
            bpm: 120.0,
            cursor: 0,
            kick_phase: 0.0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn with_bpm(mut self, bpm: f32) -> Self {
        self.bpm = bpm.clamp(30.0, 300.0);
        self
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn samples_per_pull(&self) -> usize {
        self.samples_per_pull
    }

    fn next_sample(&mut self) -> f32 {
        let sr = self.sample_rate_hz as f32;
        let t = self.cursor as f32 / sr;
        self.cursor += 1;

        let beats = t * self.bpm / 60.0;
        let beat_pos = beats - beats.floor();

        // Kick: pitch falls from ~110 Hz to 45 Hz inside each beat.
        let kick_hz = 45.0 + 65.0 * (-beat_pos * 30.0).exp();
        self.kick_phase = (self.kick_phase + kick_hz / sr).fract();
        let kick = (2.0 * PI * self.kick_phase).sin() * (-beat_pos * 14.0).exp() * 0.9;

        // Broadband burst on the downbeat so every band lifts together.
        let burst = (self.rng.f32() * 2.0 - 1.0) * 0.5 * (-beat_pos * 8.0).exp();

        let swell = 0.5 + 0.5 * (2.0 * PI * 0.07 * t).sin();
        let pad = ((2.0 * PI * 220.0 * t).sin() + 0.6 * (2.0 * PI * 329.6 * t).sin())
            * 0.08
            * swell;

        let hat = if beat_pos >= 0.5 {
            let env = (-(beat_pos - 0.5) * 80.0).exp();
            (self.rng.f32() * 2.0 - 1.0) * 0.25 * env
        } else {
            0.0
        };

        (kick + burst + pad + hat).clamp(-1.0, 1.0)
    }
}

impl SignalSource for PulseSynth {
    fn name(&self) -> &'static str {
        "synth"
    }

    fn pull(&mut self, out: &mut Vec<f32>) {
        out.reserve(self.samples_per_pull);
        for _ in 0..self.samples_per_pull {
            let s = self.next_sample();
            out.push(s);
        }
    }
}
