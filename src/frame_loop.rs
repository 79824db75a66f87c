use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cloneable cancellation flag shared with whoever may end the loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    frame: Option<Duration>,
}

impl Pacing {
    pub fn from_fps(fps: u32) -> Self {
        Self {
            frame: Some(Duration::from_secs_f64(1.0 / fps.max(1) as f64)),
        }
    }

    /// Run frames back to back; used by headless runs and tests.
    pub fn unpaced() -> Self {
        Self { frame: None }
    }

    pub fn frame_duration(&self) -> Option<Duration> {
        self.frame
    }
}

/// Call `frame` once per tick until stopped. Returns the number of frames run.
///
/// The stop handle is checked before every frame, so a stop requested from
/// inside `frame` or from another thread ends the loop at the next boundary.
pub fn run_frames<F>(pacing: Pacing, stop: &StopHandle, mut frame: F) -> anyhow::Result<u64>
where
    F: FnMut(u64) -> anyhow::Result<Flow>,
{
    let mut count = 0u64;
    while !stop.is_stopped() {
        let start = Instant::now();
        let flow = frame(count)?;
        count += 1;
        if flow == Flow::Stop {
            break;
        }

        if let Some(target) = pacing.frame {
            let elapsed = start.elapsed();
            if elapsed < target {
                std::thread::sleep(target - elapsed);
            }
        }
    }
    log::debug!("frame loop ended after {count} frames");
    Ok(count)
}
