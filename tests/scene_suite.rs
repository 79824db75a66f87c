use ambient_field::audio::FrequencyAnalyzer;
use ambient_field::frame_loop::{run_frames, Flow, Pacing, StopHandle};
use ambient_field::scene::Scene;
use ambient_field::surface::PixelCanvas;
use ambient_field::tuning::FieldTuning;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

struct Constant {
    name: &'static str,
    value: u8,
}

impl FrequencyAnalyzer for Constant {
    fn name(&self) -> &'static str {
        self.name
    }

    fn bin_count(&self) -> usize {
        128
    }

    fn byte_frequency_data(&mut self, out: &mut Vec<u8>) {
        out.clear();
        out.resize(128, self.value);
    }
}

fn scene_with_canvas() -> (Scene, PixelCanvas) {
    let mut scene = Scene::new(FieldTuning::default(), 21);
    scene.resize(640.0, 384.0);
    let canvas = PixelCanvas::new(80, 48, 640.0, 384.0);
    (scene, canvas)
}

// ── Scene ───────────────────────────────────────────────────────────────────

#[test]
fn silent_scene_still_animates() {
    let (mut scene, mut canvas) = scene_with_canvas();
    let stats = scene.tick(&mut canvas);

    assert_eq!(stats.frame, 1);
    assert_eq!(stats.analyzer, None);
    assert!(stats.reading.is_none());
    assert_eq!(stats.particles, 24);
    assert_eq!(*scene.state(), Default::default());
    // Displayed hue starts at 0 and chases the initial 200.
    assert!((stats.hue - 4.0).abs() < 1e-3);
}

#[test]
fn analyzer_feeds_state_and_hue_target() {
    let (mut scene, mut canvas) = scene_with_canvas();
    scene.analyzers_mut().set_primary(Box::new(Constant {
        name: "loud",
        value: 255,
    }));

    let stats = scene.tick(&mut canvas);
    assert_eq!(stats.analyzer, Some("loud"));
    let reading = stats.reading.expect("reading");
    assert!(reading.peak);
    assert!(stats.field.peak);
    assert!((scene.state().energy - 1.0).abs() < 1e-4);
    assert_eq!(scene.state().peak_seq(), 1);
    assert!(scene.hue().target().abs() < 1e-3);
}

#[test]
fn audio_can_arrive_late() {
    let (mut scene, mut canvas) = scene_with_canvas();
    for _ in 0..10 {
        assert!(scene.tick(&mut canvas).reading.is_none());
    }
    scene.analyzers_mut().set_primary(Box::new(Constant {
        name: "mic",
        value: 128,
    }));
    assert!(scene.tick(&mut canvas).reading.is_some());
    assert_eq!(scene.frames(), 11);
}

#[test]
fn override_analyzer_takes_over_and_releases() {
    let (mut scene, mut canvas) = scene_with_canvas();
    scene.analyzers_mut().set_primary(Box::new(Constant {
        name: "mic",
        value: 0,
    }));
    scene.analyzers_mut().set_override(Box::new(Constant {
        name: "synth",
        value: 200,
    }));

    assert_eq!(scene.tick(&mut canvas).analyzer, Some("synth"));
    assert!(scene.state().bass > 0.7);

    scene.analyzers_mut().clear_override();
    assert_eq!(scene.tick(&mut canvas).analyzer, Some("mic"));
    assert_eq!(scene.state().bass, 0.0);
}

#[test]
fn hue_listeners_hear_every_analyzed_frame() {
    let (mut scene, mut canvas) = scene_with_canvas();
    let calls = Rc::new(Cell::new(0u32));
    {
        let calls = Rc::clone(&calls);
        scene.hue_mut().subscribe(move |_| calls.set(calls.get() + 1));
    }
    scene.tick(&mut canvas);
    assert_eq!(calls.get(), 0);

    scene.analyzers_mut().set_primary(Box::new(Constant {
        name: "mic",
        value: 64,
    }));
    for _ in 0..3 {
        scene.tick(&mut canvas);
    }
    assert_eq!(calls.get(), 3);
}

#[test]
fn resize_applies_before_next_frame() {
    let (mut scene, mut canvas) = scene_with_canvas();
    scene.tick(&mut canvas);
    scene.resize(1600.0, 1200.0);
    canvas.resize(200, 150, 1600.0, 1200.0);
    assert_eq!(scene.tick(&mut canvas).particles, 140);
    assert_eq!(scene.field().size(), (1600.0, 1200.0));
}

#[test]
fn pointer_events_reach_the_field() {
    let (mut scene, _) = scene_with_canvas();
    scene.pointer_moved(12.0, 34.0);
    assert_eq!(scene.field().pointer(), (12.0, 34.0));
    scene.pointer_left();
    assert_ne!(scene.field().pointer(), (12.0, 34.0));
}

// ── Frame loop ──────────────────────────────────────────────────────────────

#[test]
fn loop_runs_until_flow_stop() {
    let stop = StopHandle::new();
    let n = run_frames(Pacing::unpaced(), &stop, |i| {
        Ok(if i == 4 { Flow::Stop } else { Flow::Continue })
    })
    .expect("loop");
    assert_eq!(n, 5);
}

#[test]
fn stopped_handle_runs_nothing() {
    let stop = StopHandle::new();
    stop.stop();
    let n = run_frames(Pacing::unpaced(), &stop, |_| Ok(Flow::Continue)).expect("loop");
    assert_eq!(n, 0);
}

#[test]
fn stop_from_a_clone_ends_at_frame_boundary() {
    let stop = StopHandle::new();
    let remote = stop.clone();
    let n = run_frames(Pacing::unpaced(), &stop, |i| {
        if i == 2 {
            remote.stop();
        }
        Ok(Flow::Continue)
    })
    .expect("loop");
    assert_eq!(n, 3);
    assert!(stop.is_stopped());
}

#[test]
fn frame_errors_propagate() {
    let stop = StopHandle::new();
    let res = run_frames(Pacing::unpaced(), &stop, |i| {
        if i == 1 {
            anyhow::bail!("surface lost");
        }
        Ok(Flow::Continue)
    });
    assert!(res.is_err());
}

#[test]
fn pacing_from_fps() {
    assert_eq!(
        Pacing::from_fps(50).frame_duration(),
        Some(Duration::from_millis(20))
    );
    assert_eq!(Pacing::unpaced().frame_duration(), None);
    assert!(Pacing::from_fps(0).frame_duration().is_some());
}

#[test]
fn paced_loop_drives_a_scene() {
    let (mut scene, mut canvas) = scene_with_canvas();
    let stop = StopHandle::new();
    let n = run_frames(Pacing::from_fps(240), &stop, |i| {
        scene.tick(&mut canvas);
        Ok(if i + 1 == 6 { Flow::Stop } else { Flow::Continue })
    })
    .expect("loop");
    assert_eq!(n, 6);
    assert_eq!(scene.frames(), 6);
}
