use super::{FrequencyAnalyzer, SignalSource};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::cmp::Ordering;
use std::f32::consts::PI;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerSettings {
    pub fft_size: usize,
    /// Weight of the previous frame's magnitude, 0 = no smoothing.
    pub smoothing: f32,
    pub min_db: f32,
    pub max_db: f32,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzerError {
    #[error("fft size must be a power of two in 32..=32768, got {0}")]
    FftSize(usize),
    #[error("smoothing must lie in 0..=1, got {0}")]
    Smoothing(f32),
    #[error("decibel range is empty (min {min} dB, max {max} dB)")]
    DecibelRange { min: f32, max: f32 },
}

impl AnalyzerSettings {
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(AnalyzerError::FftSize(self.fft_size));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(AnalyzerError::Smoothing(self.smoothing));
        }
        if self.min_db.partial_cmp(&self.max_db) != Some(Ordering::Less) {
            return Err(AnalyzerError::DecibelRange {
                min: self.min_db,
                max: self.max_db,
            });
        }
        Ok(())
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// Rolling-window FFT analyser producing byte magnitudes on a decibel scale.
///
/// Each call pulls fresh samples from the source, windows the most recent
/// `fft_size` of them (Blackman), smooths the bin magnitudes against the
/// previous call and maps `[min_db, max_db]` onto `0..=255`.
pub struct SpectrumAnalyzer<S> {
    source: S,
    settings: AnalyzerSettings,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    history: Vec<f32>,
    write_pos: usize,
    fft_buf: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    incoming: Vec<f32>,
}

impl<S: SignalSource> SpectrumAnalyzer<S> {
    pub fn new(source: S, settings: AnalyzerSettings) -> Result<Self, AnalyzerError> {
        settings.validate()?;
        let n = settings.fft_size;

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n);

        Ok(Self {
            source,
            settings,
            fft,
            window: blackman(n),
            history: vec![0.0; n],
            write_pos: 0,
            fft_buf: vec![Complex { re: 0.0, im: 0.0 }; n],
            smoothed: vec![0.0; n / 2],
            incoming: Vec::with_capacity(n),
        })
    }

    pub fn settings(&self) -> AnalyzerSettings {
        self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Smoothed linear magnitudes from the last analysis.
    pub fn magnitudes(&self) -> &[f32] {
        &self.smoothed
    }

    fn ingest(&mut self) {
        self.incoming.clear();
        self.source.pull(&mut self.incoming);

        let n = self.history.len();
        // Only the newest window matters when a frame stalled.
        let skip = self.incoming.len().saturating_sub(n);
        for &s in &self.incoming[skip..] {
            self.history[self.write_pos] = if s.is_finite() { s } else { 0.0 };
            self.write_pos = (self.write_pos + 1) % n;
        }
    }

    fn analyze(&mut self) {
        let n = self.history.len();
        for i in 0..n {
            let s = self.history[(self.write_pos + i) % n];
            self.fft_buf[i] = Complex {
                re: s * self.window[i],
                im: 0.0,
            };
        }

        self.fft.process(&mut self.fft_buf);

        let tau = self.settings.smoothing;
        let norm = 1.0 / n as f32;
        for (k, s) in self.smoothed.iter_mut().enumerate() {
            let mag = self.fft_buf[k].norm() * norm;
            *s = tau * *s + (1.0 - tau) * mag;
        }
    }
}

impl<S: SignalSource> FrequencyAnalyzer for SpectrumAnalyzer<S> {
    fn name(&self) -> &'static str {
        self.source.name()
    }

    fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    fn byte_frequency_data(&mut self, out: &mut Vec<u8>) {
        self.ingest();
        self.analyze();

        let min_db = self.settings.min_db;
        let range = self.settings.max_db - min_db;
        out.clear();
        out.extend(self.smoothed.iter().map(|&m| {
            if m <= 0.0 {
                return 0;
            }
            let db = 20.0 * m.log10();
            (255.0 * (db - min_db) / range).clamp(0.0, 255.0) as u8
        }));
    }
}

fn blackman(n: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42f32, 0.5f32, 0.08f32);
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}
