use std::io::{self, Write};

use ascii_live::{DisplaySurface, TextFrame, Viewport};
use log::{debug, warn};

const CLEAR_SCREEN: &str = "\x1b[2J";
const CURSOR_HOME: &str = "\x1b[H";

/// Draws frames in place on an ANSI terminal.
pub struct TerminalSurface<W: Write> {
    out: W,
    viewport: Viewport,
    font_size: Option<f32>,
    cleared: bool,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout(viewport: Viewport) -> Self {
        Self::new(io::stdout(), viewport)
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, viewport: Viewport) -> Self {
        Self { out, viewport, font_size: None, cleared: false }
    }

    pub fn font_size(&self) -> Option<f32> {
        self.font_size
    }

    fn write_frame(&mut self, text: &str) -> io::Result<()> {
        if !self.cleared {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
            self.cleared = true;
        }
        self.out.write_all(CURSOR_HOME.as_bytes())?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn present(&mut self, frame: &TextFrame) {
        if let Err(err) = self.write_frame(frame.as_str()) {
            warn!("failed to draw frame: {err}");
        }
    }

    fn set_font_size(&mut self, size: f32) {
        // Terminals pick their own font; keep the hint for diagnostics.
        if self.font_size != Some(size) {
            debug!("font size hint {size:.2}px");
        }
        self.font_size = Some(size);
    }

    fn show_message(&mut self, message: &str) {
        if let Err(err) = writeln!(self.out, "{message}").and_then(|_| self.out.flush()) {
            warn!("failed to show message: {err}");
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
