//! Frequency snapshot → band energies → shared reactive state.

use crate::hue::{normalize_hue, HueSink};

/// Rise over the previous frame's bass that counts as a peak.
pub const PEAK_RISE: f32 = 0.15;
/// Bass level a peak must exceed outright.
pub const PEAK_FLOOR: f32 = 0.5;

/// A single frequency-bin sample that can be normalized into `[0, 1]`.
pub trait Magnitude: Copy {
    fn unit(self) -> f32;
}

impl Magnitude for u8 {
    fn unit(self) -> f32 {
        self as f32 / 255.0
    }
}

impl Magnitude for f32 {
    fn unit(self) -> f32 {
        if self.is_finite() { self.clamp(0.0, 1.0) } else { 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Bass,
    Mid,
    High,
}

/// Index partition of a snapshot: `[0, bass_end)`, `[bass_end, mid_end)`,
/// `[mid_end, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandBounds {
    pub bass_end: usize,
    pub mid_end: usize,
    pub len: usize,
}

impl BandBounds {
    /// `None` for an empty snapshot.
    pub fn for_len(len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        // ceil(0.15 * len) in integers; float rounding would overshoot at 20, 40, ...
        let bass_end = ((len * 15).div_ceil(100)).clamp(1, len);
        let mid_end = (len / 2).max(bass_end);
        Some(Self {
            bass_end,
            mid_end,
            len,
        })
    }

    pub fn band_of(&self, idx: usize) -> Band {
        if idx < self.bass_end {
            Band::Bass
        } else if idx < self.mid_end {
            Band::Mid
        } else {
            Band::High
        }
    }

    pub fn bass_len(&self) -> usize {
        self.bass_end
    }

    pub fn mid_len(&self) -> usize {
        self.mid_end - self.bass_end
    }

    pub fn high_len(&self) -> usize {
        self.len - self.mid_end
    }
}

pub fn composite_energy(bass: f32, mid: f32, high: f32) -> f32 {
    0.5 * bass + 0.3 * mid + 0.2 * high
}

/// Palette hue suggested by the band mix, in `[0, 360)`.
pub fn derived_hue(bass: f32, mid: f32, high: f32) -> f32 {
    normalize_hue(180.0 + bass * 40.0 + mid * 60.0 + high * 80.0).unwrap_or(180.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandReading {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub energy: f32,
    pub peak: bool,
}

/// Per-frame audio summary read by every visual consumer.
///
/// The default value (all zero, no peaks) is what readers see before any
/// audio has been analyzed. Peaks are counted rather than flagged so that
/// each consumer can track them independently with a [`PeakCursor`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReactiveState {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub energy: f32,
    peak_seq: u64,
}

impl ReactiveState {
    pub fn peak_seq(&self) -> u64 {
        self.peak_seq
    }

    fn publish(&mut self, r: &BandReading) {
        self.bass = r.bass;
        self.mid = r.mid;
        self.high = r.high;
        self.energy = r.energy;
        if r.peak {
            self.peak_seq += 1;
        }
    }
}

/// One consumer's view of the peak counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeakCursor {
    seen: u64,
}

impl PeakCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor that ignores peaks published before now.
    pub fn at(state: &ReactiveState) -> Self {
        Self {
            seen: state.peak_seq,
        }
    }

    /// Peaks published since this cursor last caught up.
    pub fn pending(&self, state: &ReactiveState) -> u64 {
        state.peak_seq.saturating_sub(self.seen)
    }

    /// True once per batch of new peaks; catches the cursor up.
    pub fn take(&mut self, state: &ReactiveState) -> bool {
        let fresh = self.pending(state) > 0;
        self.seen = state.peak_seq;
        fresh
    }
}

#[derive(Debug, Default)]
pub struct Aggregator {
    previous_bass: f32,
    frames: u64,
    peaks: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_bass(&self) -> f32 {
        self.previous_bass
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Peak test against the previous call's bass; always remembers `bass`.
    pub fn observe_bass(&mut self, bass: f32) -> bool {
        let peak = bass > self.previous_bass + PEAK_RISE && bass > PEAK_FLOOR;
        self.previous_bass = bass;
        peak
    }

    /// Band energies for one snapshot. An empty snapshot yields `None` and
    /// leaves the peak detector untouched.
    pub fn analyze<M: Magnitude>(&mut self, snapshot: &[M]) -> Option<BandReading> {
        let bounds = BandBounds::for_len(snapshot.len())?;

        let mut sums = [0.0f32; 3];
        for (i, &m) in snapshot.iter().enumerate() {
            let slot = match bounds.band_of(i) {
                Band::Bass => 0,
                Band::Mid => 1,
                Band::High => 2,
            };
            sums[slot] += m.unit();
        }

        let bass = sums[0] / bounds.bass_len().max(1) as f32;
        let mid = sums[1] / bounds.mid_len().max(1) as f32;
        let high = sums[2] / bounds.high_len().max(1) as f32;
        let peak = self.observe_bass(bass);

        self.frames += 1;
        if peak {
            self.peaks += 1;
            log::debug!("peak #{} at frame {}: bass {bass:.3}", self.peaks, self.frames);
        }

        Some(BandReading {
            bass,
            mid,
            high,
            energy: composite_energy(bass, mid, high),
            peak,
        })
    }

    /// Analyze, publish into `state` and forward the derived hue to `sink`.
    pub fn update<M: Magnitude>(
        &mut self,
        snapshot: &[M],
        state: &mut ReactiveState,
        sink: Option<&mut dyn HueSink>,
    ) -> Option<BandReading> {
        let Some(reading) = self.analyze(snapshot) else {
            log::trace!("empty snapshot, skipping frame");
            return None;
        };
        state.publish(&reading);
        if let Some(sink) = sink {
            sink.set_hue(derived_hue(reading.bass, reading.mid, reading.high));
        }
        Some(reading)
    }
}
