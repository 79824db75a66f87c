use crate::render::{Frame, Renderer};
use std::io::Write;

const UPPER_HALF: char = '\u{2580}';

/// Two raster pixels per cell: the top one as foreground of `▀`, the bottom
/// one as background. Color escapes are only emitted when they change.
#[derive(Default)]
pub struct HalfBlockRenderer {
    last_fg: Option<[u8; 3]>,
    last_bg: Option<[u8; 3]>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_fg(&mut self, out: &mut dyn Write, c: [u8; 3]) -> std::io::Result<()> {
        if self.last_fg != Some(c) {
            write!(out, "\x1b[38;2;{};{};{}m", c[0], c[1], c[2])?;
            self.last_fg = Some(c);
        }
        Ok(())
    }

    fn set_bg(&mut self, out: &mut dyn Write, c: [u8; 3]) -> std::io::Result<()> {
        if self.last_bg != Some(c) {
            write!(out, "\x1b[48;2;{};{};{}m", c[0], c[1], c[2])?;
            self.last_bg = Some(c);
        }
        Ok(())
    }
}

fn rgb_at(pixels: &[u8], w: usize, x: usize, y: usize) -> [u8; 3] {
    let i = (y * w + x) * 4;
    [pixels[i], pixels[i + 1], pixels[i + 2]]
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn raster_size(&self, cols: u16, rows: u16) -> (usize, usize) {
        (cols as usize, (rows as usize).saturating_mul(2))
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        if w != cols || h != rows.saturating_mul(2) {
            log::warn!("raster {w}x{h} does not match {cols}x{rows} cells, frame dropped");
            return Ok(());
        }
        if frame.pixels_rgba.len() < w.saturating_mul(h).saturating_mul(4) {
            log::warn!("pixel buffer too small ({} bytes), frame dropped", frame.pixels_rgba.len());
            return Ok(());
        }

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }
        // Home, reset, autowrap off so full-width rows don't spill.
        out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..rows {
            for x in 0..cols {
                self.set_fg(out, rgb_at(frame.pixels_rgba, w, x, row * 2))?;
                self.set_bg(out, rgb_at(frame.pixels_rgba, w, x, row * 2 + 1))?;
                write!(out, "{UPPER_HALF}")?;
            }
            out.write_all(b"\r\n")?;
        }

        let mut status_lines = frame.status.lines();
        for i in 0..frame.status_rows() as usize {
            write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", rows + i + 1)?;
            if let Some(line) = status_lines.next() {
                let clipped: String = line.chars().take(cols).collect();
                write!(out, "{clipped}")?;
            }
        }

        out.write_all(b"\x1b[0m\x1b[?7h")?;
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        Ok(())
    }
}
