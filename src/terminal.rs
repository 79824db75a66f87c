use anyhow::Context;
use crossterm::{
    cursor,
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    terminal::{self, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, IsTerminal, Stdout, Write};

/// Assumed cell size when the terminal does not report its pixel size.
pub const FALLBACK_CELL_PX: (f32, f32) = (8.0, 16.0);

/// Raw mode, alternate screen, hidden cursor and mouse reporting for as long
/// as the guard lives.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Guard exists from here on so Drop undoes raw mode if a later step fails.
        let guard = Self { _private: () };

        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)
            .context("enter alternate screen")?;
        out.execute(terminal::Clear(ClearType::All))
            .context("clear screen")?;
        out.execute(cursor::Hide).context("hide cursor")?;
        out.execute(EnableMouseCapture).context("enable mouse capture")?;
        // Not every terminal reports focus; losing it is only a nicety.
        let _ = out.execute(EnableFocusChange);

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        let _ = out.execute(DisableFocusChange);
        let _ = out.execute(DisableMouseCapture);
        let _ = terminal::disable_raw_mode();
        let _ = out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m");
        let _ = out.flush();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
    }
}

/// Whether there is a terminal to draw into at all.
pub fn surface_available() -> bool {
    if !stdout().is_terminal() {
        return false;
    }
    matches!(terminal::size(), Ok((c, r)) if c > 0 && r > 0)
}

/// Logical viewport for a `cols × rows` picture area, in pixels.
///
/// Uses the window's pixel size when the terminal reports one, scaled to the
/// rows actually used for the picture.
pub fn logical_viewport(cols: u16, rows: u16) -> (f32, f32) {
    if let Ok(ws) = terminal::window_size() {
        if ws.width > 0 && ws.height > 0 && ws.columns > 0 && ws.rows > 0 {
            let cell_w = ws.width as f32 / ws.columns as f32;
            let cell_h = ws.height as f32 / ws.rows as f32;
            return (cols as f32 * cell_w, rows as f32 * cell_h);
        }
    }
    (
        cols as f32 * FALLBACK_CELL_PX.0,
        rows as f32 * FALLBACK_CELL_PX.1,
    )
}
