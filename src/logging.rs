use anyhow::Context;
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

static STDERR_GATE: OnceLock<LogGate> = OnceLock::new();

/// Route `log` records to `log_file`, or to stderr when none is given.
///
/// Stderr shares the tty with the picture, so records go through a
/// [`LogGate`] that `app` holds shut while the alternate screen is up.
/// Without a file only warnings and errors pass by default. `RUST_LOG`
/// overrides either default.
pub fn init_logger(log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_filter = if log_file.is_some() {
        "ambient_field=info"
    } else {
        "ambient_field=warn"
    };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} [{}][{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.module_path().unwrap_or("<unknown>"),
                record.args()
            )
        });
    } else {
        let gate = STDERR_GATE.get_or_init(LogGate::stderr);
        builder.target(Target::Pipe(Box::new(gate.clone())));
    }

    let _ = builder.try_init();
    Ok(())
}

/// Hold stderr logging until the returned guard drops.
///
/// `None` when records go to a file, or before `init_logger` ran.
pub fn hold_stderr() -> Option<LogHold> {
    STDERR_GATE.get().map(LogGate::hold)
}

struct GateState {
    holds: usize,
    pending: Vec<u8>,
    out: Box<dyn Write + Send>,
}

/// Log writer that passes bytes straight through, or keeps them back while
/// any [`LogHold`] is alive and replays them once the last one drops.
#[derive(Clone)]
pub struct LogGate {
    state: Arc<Mutex<GateState>>,
}

impl LogGate {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            state: Arc::new(Mutex::new(GateState {
                holds: 0,
                pending: Vec::new(),
                out,
            })),
        }
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    pub fn hold(&self) -> LogHold {
        self.lock().holds += 1;
        LogHold { gate: self.clone() }
    }

    pub fn is_held(&self) -> bool {
        self.lock().holds > 0
    }

    /// Bytes waiting for the hold to lift.
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    // A panic while logging must not silence every later record.
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for LogGate {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        if state.holds > 0 {
            state.pending.extend_from_slice(buf);
            Ok(buf.len())
        } else {
            state.out.write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.lock();
        if state.holds > 0 {
            Ok(())
        } else {
            state.out.flush()
        }
    }
}

/// Keeps its [`LogGate`] shut; dropping the last hold replays what was kept.
pub struct LogHold {
    gate: LogGate,
}

impl Drop for LogHold {
    fn drop(&mut self) {
        let mut state = self.gate.lock();
        state.holds = state.holds.saturating_sub(1);
        if state.holds > 0 || state.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut state.pending);
        let _ = state.out.write_all(&pending);
        let _ = state.out.flush();
    }
}
