mod halfblock;

pub use halfblock::HalfBlockRenderer;

use std::io::Write;

/// One composed frame ready for the terminal.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    /// Rows given to the picture; the rest (if any) hold the status line.
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub status: &'a str,
    pub sync_updates: bool,
}

impl Frame<'_> {
    pub fn status_rows(&self) -> u16 {
        self.term_rows.saturating_sub(self.visual_rows)
    }
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    /// Raster size this renderer expects for a `cols × rows` picture area.
    fn raster_size(&self, cols: u16, rows: u16) -> (usize, usize);
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}
