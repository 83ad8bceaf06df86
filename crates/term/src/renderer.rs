//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! Only rows that differ from the previous frame are rewritten. The renderer
//! is also the session's render sink: each frame the session pushes is laid
//! out by [`GameView`] and drawn straight away.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};
use tracing::debug;

use crate::core::{Frame, RenderSink, SinkError};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::game_view::GameView;

pub struct TerminalRenderer {
    stdout: io::Stdout,
    view: GameView,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl TerminalRenderer {
    pub fn new(view: GameView) -> Self {
        Self {
            stdout: io::stdout(),
            view,
            last: None,
            buf: Vec::with_capacity(16 * 1024),
        }
    }

    /// Draw a framebuffer, rewriting only the rows that changed
    pub fn draw(&mut self, fb: FrameBuffer) -> Result<()> {
        self.buf.clear();
        if self.last.is_none() {
            debug!(width = fb.width(), height = fb.height(), "full redraw");
        }
        encode_rows_into(self.last.as_ref(), &fb, &mut self.buf)?;
        self.flush_buf()?;
        self.last = Some(fb);
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Raw mode plus alternate screen for as long as it lives
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut buf: Vec<u8> = Vec::new();
        buf.queue(terminal::EnterAlternateScreen)?;
        buf.queue(cursor::Hide)?;
        buf.queue(terminal::DisableLineWrap)?;
        buf.queue(terminal::Clear(terminal::ClearType::All))?;
        write_all(&buf)?;
        Ok(Self { active: true })
    }

    /// Restore the terminal, reporting failures
    pub fn exit(mut self) -> Result<()> {
        self.active = false;
        restore_terminal()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = restore_terminal();
        }
    }
}

fn restore_terminal() -> Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    buf.queue(ResetColor)?;
    buf.queue(SetAttribute(Attribute::Reset))?;
    buf.queue(terminal::EnableLineWrap)?;
    buf.queue(cursor::Show)?;
    buf.queue(terminal::LeaveAlternateScreen)?;
    write_all(&buf)?;
    terminal::disable_raw_mode()?;
    Ok(())
}

fn write_all(buf: &[u8]) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(buf)?;
    stdout.flush()?;
    Ok(())
}

impl RenderSink for TerminalRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> std::result::Result<(), SinkError> {
        let fb = self.view.render(frame);
        self.draw(fb).map_err(|err| SinkError::new(format!("{err:#}")))
    }
}

/// Encode the rows of `next` that differ from `prev` into `out`.
///
/// With no previous frame, or one of a different size, every row is written.
/// Nothing is queued when the frames are identical.
pub fn encode_rows_into(prev: Option<&FrameBuffer>, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let comparable = prev.filter(|p| p.width() == next.width() && p.height() == next.height());
    let mut current_style: Option<CellStyle> = None;
    let mut wrote = false;

    for y in 0..next.height() {
        let row = next.row(y);
        if comparable.is_some_and(|p| p.row(y) == row) {
            continue;
        }
        out.queue(cursor::MoveTo(0, y))?;
        for cell in row {
            if current_style != Some(cell.style) {
                apply_style_into(out, cell.style)?;
                current_style = Some(cell.style);
            }
            out.queue(Print(cell.ch))?;
        }
        wrote = true;
    }

    if wrote {
        out.queue(ResetColor)?;
        out.queue(SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

fn apply_style_into(out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
    out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
    out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
    out.queue(SetAttribute(Attribute::Reset))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
