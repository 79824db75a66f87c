mod capture;
mod spectrum;
mod synth;

pub use capture::{list_input_devices, MicCapture};
pub use spectrum::{AnalyzerError, AnalyzerSettings, SpectrumAnalyzer};
pub use synth::PulseSynth;

/// A producer of mono samples in -1..=1.
pub trait SignalSource {
    fn name(&self) -> &'static str;
    /// Append every sample that became available since the last call.
    fn pull(&mut self, out: &mut Vec<f32>);
}

/// Per-frame spectral snapshot provider.
pub trait FrequencyAnalyzer {
    fn name(&self) -> &'static str;
    fn bin_count(&self) -> usize;
    /// Replace `out` with the current byte magnitudes (0..=255), one per bin.
    fn byte_frequency_data(&mut self, out: &mut Vec<u8>);
}

/// Which analyzer the scene reads each frame.
///
/// The override slot stands in for a second audio pipeline: while it is
/// occupied it shadows the primary analyzer, and clearing it falls back
/// without the consumer noticing. Both slots start empty, which consumers
/// treat as "no audio yet".
#[derive(Default)]
pub struct AnalyzerSlot {
    primary: Option<Box<dyn FrequencyAnalyzer>>,
    overlay: Option<Box<dyn FrequencyAnalyzer>>,
}

impl AnalyzerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_primary(&mut self, analyzer: Box<dyn FrequencyAnalyzer>) {
        log::info!("primary analyzer: {}", analyzer.name());
        self.primary = Some(analyzer);
    }

    pub fn take_primary(&mut self) -> Option<Box<dyn FrequencyAnalyzer>> {
        self.primary.take()
    }

    pub fn set_override(&mut self, analyzer: Box<dyn FrequencyAnalyzer>) {
        log::info!("override analyzer: {}", analyzer.name());
        self.overlay = Some(analyzer);
    }

    pub fn clear_override(&mut self) -> Option<Box<dyn FrequencyAnalyzer>> {
        let prev = self.overlay.take();
        if let Some(a) = &prev {
            log::info!("override analyzer removed: {}", a.name());
        }
        prev
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn has_override(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn current(&mut self) -> Option<&mut (dyn FrequencyAnalyzer + 'static)> {
        match self.overlay.as_deref_mut() {
            Some(a) => Some(a),
            None => self.primary.as_deref_mut(),
        }
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.overlay
            .as_deref()
            .or(self.primary.as_deref())
            .map(|a| a.name())
    }
}
