use crate::audio::{AnalyzerSettings, FrequencyAnalyzer, MicCapture, PulseSynth, SpectrumAnalyzer};
use crate::config::{AudioSource, Config};
use crate::frame_loop::{run_frames, Flow, Pacing, StopHandle};
use crate::render::{Frame, HalfBlockRenderer, Renderer};
use crate::scene::{FrameStats, Scene};
use crate::surface::PixelCanvas;
use crate::terminal::{logical_viewport, surface_available, TerminalGuard};
use crate::tuning::{tuning_storage_path, FieldTuning};
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use std::cell::Cell;
use std::io::BufWriter;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Sample rate of the synthesized override signal.
const SYNTH_SAMPLE_RATE_HZ: u32 = 48_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    StartCapture,
    ToggleSynth,
    ToggleStatus,
}

/// Terminal cells → raster pixels → logical viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    cols: u16,
    rows: u16,
    visual_rows: u16,
    raster: (usize, usize),
    logical: (f32, f32),
}

impl Layout {
    fn measure(size: (u16, u16), show_status: bool, renderer: &dyn Renderer) -> Self {
        let (cols, rows) = size;
        let status_rows = u16::from(show_status && rows > 1);
        let visual_rows = rows.saturating_sub(status_rows);
        Self {
            cols,
            rows,
            visual_rows,
            raster: renderer.raster_size(cols, visual_rows),
            logical: logical_viewport(cols, visual_rows),
        }
    }

    fn cell_to_logical(&self, col: u16, row: u16) -> Option<(f32, f32)> {
        if self.cols == 0 || self.visual_rows == 0 || row >= self.visual_rows {
            return None;
        }
        let x = (col as f32 + 0.5) / self.cols as f32 * self.logical.0;
        let y = (row as f32 + 0.5) / self.visual_rows as f32 * self.logical.1;
        Some((x, y))
    }

    fn apply(&self, scene: &mut Scene, canvas: &mut PixelCanvas) {
        let (w, h) = self.raster;
        canvas.resize(w, h, self.logical.0, self.logical.1);
        scene.resize(self.logical.0, self.logical.1);
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    if !surface_available() {
        log::info!("no terminal to draw into; nothing to do");
        return Ok(());
    }

    let settings = AnalyzerSettings {
        fft_size: cfg.fft_size,
        smoothing: cfg.smoothing,
        ..AnalyzerSettings::default()
    };
    settings.validate().context("analyzer settings")?;

    let tuning_path = cfg.tuning.clone().or_else(tuning_storage_path);
    let tuning = FieldTuning::load(tuning_path.as_deref()).context("load tuning")?;
    let seed = cfg.seed.unwrap_or_else(|| fastrand::u64(..));
    log::info!("seed {seed}");

    let mut scene = Scene::new(tuning, seed);
    match cfg.source {
        AudioSource::Mic => {
            if let Some(a) = start_capture(&cfg, settings) {
                scene.analyzers_mut().set_primary(a);
            }
        }
        AudioSource::Synth => {
            scene
                .analyzers_mut()
                .set_primary(synth_analyzer(settings, cfg.fps, seed)?);
        }
        AudioSource::Silent => log::info!("starting without audio"),
    }

    let target_hue = Rc::new(Cell::new(scene.hue().target()));
    {
        let target_hue = Rc::clone(&target_hue);
        scene.hue_mut().subscribe(move |h| target_hue.set(h));
    }

    let mut canvas = PixelCanvas::new(0, 0, 0.0, 0.0);
    canvas.set_background(tuning.background);

    // Declared before the guard so it drops after the screen is restored.
    let _log_hold = crate::logging::hold_stderr();
    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());
    let mut renderer = HalfBlockRenderer::new();

    let mut show_status = cfg.status;
    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    let mut layout = Layout::measure(last_size, show_status, &renderer);
    layout.apply(&mut scene, &mut canvas);

    let mut fps = FpsCounter::new();
    let stop = StopHandle::new();

    run_frames(Pacing::from_fps(cfg.fps), &stop, |_| {
        let mut relayout = false;

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    match key_action(k.code, k.modifiers) {
                        Some(Action::Quit) => return Ok(Flow::Stop),
                        Some(Action::StartCapture) => {
                            if scene.analyzers().has_primary() {
                                log::info!("capture already running");
                            } else if let Some(a) = start_capture(&cfg, settings) {
                                scene.analyzers_mut().set_primary(a);
                            }
                        }
                        Some(Action::ToggleSynth) => {
                            if scene.analyzers().has_override() {
                                scene.analyzers_mut().clear_override();
                            } else {
                                let a = synth_analyzer(settings, cfg.fps, fastrand::u64(..))?;
                                scene.analyzers_mut().set_override(a);
                            }
                        }
                        Some(Action::ToggleStatus) => {
                            show_status = !show_status;
                            relayout = true;
                        }
                        None => {}
                    }
                }
                Event::Mouse(m) => match m.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                        match layout.cell_to_logical(m.column, m.row) {
                            Some((x, y)) => scene.pointer_moved(x, y),
                            None => scene.pointer_left(),
                        }
                    }
                    _ => {}
                },
                Event::FocusLost => scene.pointer_left(),
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    relayout = true;
                }
                _ => {}
            }
        }

        // Resize events can be missed in some terminals.
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
            relayout = true;
        }
        if relayout {
            layout = Layout::measure(last_size, show_status, &renderer);
            layout.apply(&mut scene, &mut canvas);
        }

        let stats = scene.tick(&mut canvas);
        fps.tick();

        let status = if show_status {
            status_line(&stats, &scene, target_hue.get(), fps.fps())
        } else {
            String::new()
        };

        let (pixel_width, pixel_height) = canvas.raster_size();
        let frame = Frame {
            term_cols: layout.cols,
            term_rows: layout.rows,
            visual_rows: layout.visual_rows,
            pixel_width,
            pixel_height,
            pixels_rgba: canvas.pixels(),
            status: &status,
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        Ok(Flow::Continue)
    })?;

    Ok(())
}

fn key_action(code: KeyCode, mods: KeyModifiers) -> Option<Action> {
    match code {
        KeyCode::Char('c') if mods.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('a') => Some(Action::StartCapture),
        KeyCode::Char('s') => Some(Action::ToggleSynth),
        KeyCode::Char('h') => Some(Action::ToggleStatus),
        _ => None,
    }
}

/// Capture failure means "no audio", not an error.
fn start_capture(cfg: &Config, settings: AnalyzerSettings) -> Option<Box<dyn FrequencyAnalyzer>> {
    let capture = match MicCapture::start(cfg.device.as_deref(), cfg.input_gain) {
        Ok(c) => c,
        Err(err) => {
            log::warn!("audio capture unavailable: {err:#}");
            return None;
        }
    };
    match SpectrumAnalyzer::new(capture, settings) {
        Ok(a) => Some(Box::new(a)),
        Err(err) => {
            log::warn!("analyzer setup failed: {err}");
            None
        }
    }
}

fn synth_analyzer(
    settings: AnalyzerSettings,
    fps: u32,
    seed: u64,
) -> anyhow::Result<Box<dyn FrequencyAnalyzer>> {
    let synth = PulseSynth::new(SYNTH_SAMPLE_RATE_HZ, fps, seed);
    let analyzer = SpectrumAnalyzer::new(synth, settings).context("synth analyzer")?;
    Ok(Box::new(analyzer))
}

fn status_line(stats: &FrameStats, scene: &Scene, target_hue: f32, fps: f32) -> String {
    let s = scene.state();
    format!(
        "{} | bass {:.2} mid {:.2} high {:.2} energy {:.2} | peaks {} | hue {:.0}->{:.0} | {} particles | {:.0} fps | a:capture s:synth h:status q:quit",
        stats.analyzer.unwrap_or("no audio"),
        s.bass,
        s.mid,
        s.high,
        s.energy,
        s.peak_seq(),
        stats.hue,
        target_hue,
        stats.particles,
        fps,
    )
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
