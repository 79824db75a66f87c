use crate::audio::AnalyzerSlot;
use crate::field::{FieldFrame, ParticleField};
use crate::hue::{HueController, HueSink};
use crate::reactive::{Aggregator, BandReading, ReactiveState};
use crate::surface::Surface;
use crate::tuning::FieldTuning;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    /// Analyzer read this frame, `None` when no audio is installed yet.
    pub analyzer: Option<&'static str>,
    pub reading: Option<BandReading>,
    pub hue: f32,
    pub particles: usize,
    pub field: FieldFrame,
}

/// Everything one background owns: the audio indirection, the single
/// reactive state, the hue loop and the field.
pub struct Scene {
    analyzers: AnalyzerSlot,
    aggregator: Aggregator,
    state: ReactiveState,
    hue: HueController,
    field: ParticleField,
    snapshot: Vec<u8>,
    frames: u64,
}

impl Scene {
    pub fn new(tuning: FieldTuning, seed: u64) -> Self {
        Self {
            analyzers: AnalyzerSlot::new(),
            aggregator: Aggregator::new(),
            state: ReactiveState::default(),
            hue: HueController::new(tuning.initial_hue, tuning.hue_rate),
            field: ParticleField::new(tuning, seed),
            snapshot: Vec::new(),
            frames: 0,
        }
    }

    pub fn analyzers(&self) -> &AnalyzerSlot {
        &self.analyzers
    }

    pub fn analyzers_mut(&mut self) -> &mut AnalyzerSlot {
        &mut self.analyzers
    }

    pub fn state(&self) -> &ReactiveState {
        &self.state
    }

    pub fn hue(&self) -> &HueController {
        &self.hue
    }

    pub fn hue_mut(&mut self) -> &mut HueController {
        &mut self.hue
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Rebuild the field for a new viewport; completes before the next tick.
    pub fn resize(&mut self, w: f32, h: f32) {
        self.field.resize(w, h);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.field.pointer_moved(x, y);
    }

    pub fn pointer_left(&mut self) {
        self.field.pointer_left();
    }

    /// One display frame: analyze, publish, chase the hue, paint.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> FrameStats {
        self.frames += 1;

        let mut analyzer = None;
        let mut reading = None;
        if let Some(a) = self.analyzers.current() {
            analyzer = Some(a.name());
            a.byte_frequency_data(&mut self.snapshot);
            reading = self.aggregator.update(
                &self.snapshot,
                &mut self.state,
                Some(&mut self.hue as &mut dyn HueSink),
            );
        }

        let hue = self.hue.step();
        let field = self.field.frame(&self.state, hue, surface);

        FrameStats {
            frame: self.frames,
            analyzer,
            reading,
            hue,
            particles: self.field.particles().len(),
            field,
        }
    }
}
