use std::time::{Duration, Instant};

use ambient_field::audio::{AnalyzerSettings, PulseSynth, SpectrumAnalyzer};
use ambient_field::scene::Scene;
use ambient_field::surface::PixelCanvas;
use ambient_field::tuning::FieldTuning;
use anyhow::Result;

struct Args {
    frames: usize,
    cols: usize,
    rows: usize,
    fps: u32,
    seed: u64,
    ci_smoke: bool,
    max_ms: f64,
}

fn parse_args() -> Args {
    let mut args = Args {
        frames: 600,
        cols: 160,
        rows: 48,
        fps: 60,
        seed: 7,
        ci_smoke: false,
        max_ms: 16.0,
    };

    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--frames", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.frames = n.max(1);
                }
                i += 2;
            }
            ("--cols", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.cols = n.max(1);
                }
                i += 2;
            }
            ("--rows", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.rows = n.max(1);
                }
                i += 2;
            }
            ("--fps", Some(x)) => {
                if let Ok(n) = x.parse::<u32>() {
                    args.fps = n.clamp(1, 240);
                }
                i += 2;
            }
            ("--seed", Some(x)) => {
                if let Ok(n) = x.parse::<u64>() {
                    args.seed = n;
                }
                i += 2;
            }
            ("--ci-smoke", _) => {
                args.ci_smoke = true;
                i += 1;
            }
            ("--max-ms", Some(x)) => {
                if let Ok(v) = x.parse::<f64>() {
                    args.max_ms = v.max(0.1);
                }
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }
    args
}

fn main() -> Result<()> {
    let args = parse_args();

    // Same geometry as a terminal: half-block raster, 8x16 px cells.
    let (raster_w, raster_h) = (args.cols, args.rows * 2);
    let (logical_w, logical_h) = (args.cols as f32 * 8.0, args.rows as f32 * 16.0);

    let mut scene = Scene::new(FieldTuning::default(), args.seed);
    let synth = PulseSynth::new(48_000, args.fps, args.seed);
    scene
        .analyzers_mut()
        .set_override(Box::new(SpectrumAnalyzer::new(synth, AnalyzerSettings::default())?));
    scene.resize(logical_w, logical_h);

    let mut canvas = PixelCanvas::new(raster_w, raster_h, logical_w, logical_h);
    canvas.set_background(FieldTuning::default().background);

    println!(
        "field benchmark: frames={} raster={}x{} viewport={:.0}x{:.0} particles={}",
        args.frames,
        raster_w,
        raster_h,
        logical_w,
        logical_h,
        scene.field().particles().len()
    );

    let mut times = Vec::<Duration>::with_capacity(args.frames);
    let mut peaks = 0usize;
    let mut links = 0usize;
    for _ in 0..args.frames {
        let start = Instant::now();
        let stats = scene.tick(&mut canvas);
        times.push(start.elapsed());
        if stats.field.peak {
            peaks += 1;
        }
        links += stats.field.links;
    }

    let total: Duration = times.iter().sum();
    let avg_ms = total.as_secs_f64() * 1000.0 / times.len().max(1) as f64;
    times.sort_unstable();
    let p95_idx = (times.len() * 95 / 100).min(times.len().saturating_sub(1));
    let p95_ms = times.get(p95_idx).map_or(0.0, |d| d.as_secs_f64() * 1000.0);
    let fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };

    println!(
        "summary: {:>8.3} ms/frame avg  {:>8.3} ms p95  {:>7.2} FPS  peaks={}  links/frame={:.1}",
        avg_ms,
        p95_ms,
        fps,
        peaks,
        links as f64 / args.frames as f64
    );

    if args.ci_smoke {
        if p95_ms > args.max_ms {
            eprintln!("CI smoke: FAIL ({:.3} ms p95 > {:.3})", p95_ms, args.max_ms);
            anyhow::bail!("ci smoke failed");
        }
        println!("CI smoke: PASS (max_ms={:.3})", args.max_ms);
    }

    Ok(())
}
