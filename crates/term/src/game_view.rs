//! GameView: lays out a session [`Frame`] in a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! ```text
//! +--------------------+  SCORE
//! | . . . .[][][] . . .|  1200
//! | . . . . .[] . . . .|  LEVEL
//! ...                     ...
//! +--------------------+
//! ```

use crate::core::{format_time, get_shape, ActivePiece, Frame};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{PieceKind, Rotation, SessionPhase, BOARD_HEIGHT, BOARD_WIDTH};

/// Board cell width in terminal columns (2 keeps cells roughly square)
const CELL_W: u16 = 2;
const BOARD_COLS: u16 = BOARD_WIDTH as u16 * CELL_W + 2;
const BOARD_ROWS: u16 = BOARD_HEIGHT as u16 + 2;
const PANEL_X: u16 = BOARD_COLS + 2;

pub const VIEW_WIDTH: u16 = PANEL_X + 16;
pub const VIEW_HEIGHT: u16 = BOARD_ROWS + 1;

const FILLED: &str = "[]";
const GHOST: &str = "::";
const EMPTY: &str = " .";

fn piece_rgb(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(0, 240, 240),
        PieceKind::O => Rgb::new(240, 240, 0),
        PieceKind::T => Rgb::new(160, 0, 240),
        PieceKind::S => Rgb::new(0, 240, 0),
        PieceKind::Z => Rgb::new(240, 0, 0),
        PieceKind::J => Rgb::new(0, 0, 240),
        PieceKind::L => Rgb::new(240, 160, 0),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GameView {
    show_ghost: bool,
    border: CellStyle,
    label: CellStyle,
    value: CellStyle,
    empty: CellStyle,
    banner: CellStyle,
}

impl Default for GameView {
    fn default() -> Self {
        Self {
            show_ghost: true,
            border: CellStyle::fg(Rgb::new(120, 120, 140)),
            label: CellStyle::fg(Rgb::new(150, 150, 170)).dim(),
            value: CellStyle::fg(Rgb::new(240, 240, 240)).bold(),
            empty: CellStyle::fg(Rgb::new(60, 60, 70)),
            banner: CellStyle::fg(Rgb::new(255, 255, 255)).bold(),
        }
    }
}

impl GameView {
    pub fn with_ghost(mut self, show_ghost: bool) -> Self {
        self.show_ghost = show_ghost;
        self
    }

    /// Render into a new framebuffer
    pub fn render(&self, frame: &Frame<'_>) -> FrameBuffer {
        let mut fb = FrameBuffer::new(VIEW_WIDTH, VIEW_HEIGHT);
        self.render_into(frame, &mut fb);
        fb
    }

    /// Render into an existing framebuffer (cleared first)
    pub fn render_into(&self, frame: &Frame<'_>, fb: &mut FrameBuffer) {
        fb.clear();
        self.draw_board(frame, fb);
        self.draw_panel(frame, fb);
        self.draw_banner(frame, fb);
        self.draw_hint(frame.phase, fb);
    }

    fn draw_board(&self, frame: &Frame<'_>, fb: &mut FrameBuffer) {
        let edge = format!("+{}+", "-".repeat((BOARD_COLS - 2) as usize));
        fb.put_str(0, 0, &edge, self.border);
        fb.put_str(0, BOARD_ROWS - 1, &edge, self.border);

        for y in 0..BOARD_HEIGHT {
            let row = y as u16 + 1;
            fb.put_char(0, row, '|', self.border);
            fb.put_char(BOARD_COLS - 1, row, '|', self.border);
            for x in 0..BOARD_WIDTH {
                let (text, style) = match frame.board.get(x as i8, y as i8).flatten() {
                    Some(kind) => (FILLED, CellStyle::fg(piece_rgb(kind))),
                    None => (EMPTY, self.empty),
                };
                fb.put_str(1 + x as u16 * CELL_W, row, text, style);
            }
        }

        let Some(active) = frame.active else {
            return;
        };
        if self.show_ghost {
            if let Some(ghost_y) = frame.ghost_y.filter(|&gy| gy != active.y) {
                let ghost = ActivePiece {
                    y: ghost_y,
                    ..active
                };
                let style = CellStyle::fg(piece_rgb(active.kind)).dim();
                self.draw_cells(fb, &ghost, GHOST, style);
            }
        }
        self.draw_cells(fb, &active, FILLED, CellStyle::fg(piece_rgb(active.kind)).bold());
    }

    fn draw_cells(&self, fb: &mut FrameBuffer, piece: &ActivePiece, text: &str, style: CellStyle) {
        for (x, y) in piece.cells() {
            // Rows above the board are not drawn.
            if y < 0 || x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
                continue;
            }
            fb.put_str(1 + x as u16 * CELL_W, y as u16 + 1, text, style);
        }
    }

    fn draw_panel(&self, frame: &Frame<'_>, fb: &mut FrameBuffer) {
        let rows: [(&str, String); 5] = [
            ("SCORE", frame.score.to_string()),
            ("LEVEL", frame.level.to_string()),
            ("LINES", frame.lines.to_string()),
            ("LIVES", frame.lives.to_string()),
            ("TIME", format_time(frame.elapsed_ms)),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            let y = 1 + i as u16 * 2;
            fb.put_str(PANEL_X, y, label, self.label);
            fb.put_str(PANEL_X, y + 1, value, self.value);
        }

        let next_y = 12;
        fb.put_str(PANEL_X, next_y, "NEXT", self.label);
        let Some((first, rest)) = frame.preview.split_first() else {
            return;
        };
        let shape = get_shape(*first, Rotation::North);
        let style = CellStyle::fg(piece_rgb(*first));
        for &(dx, dy) in shape.minos() {
            fb.put_str(
                PANEL_X + dx as u16 * CELL_W,
                next_y + 1 + dy as u16,
                FILLED,
                style,
            );
        }
        if !rest.is_empty() {
            let names: Vec<&str> = rest.iter().map(|k| k.as_str()).collect();
            fb.put_str(PANEL_X, next_y + 4, &names.join(" "), self.value);
        }
    }

    fn draw_banner(&self, frame: &Frame<'_>, fb: &mut FrameBuffer) {
        let lines: Vec<String> = match frame.phase {
            SessionPhase::Playing => return,
            SessionPhase::Start => vec!["TETROMINO".to_string()],
            SessionPhase::Paused => vec!["PAUSED".to_string()],
            SessionPhase::GameOver => vec!["GAME OVER".to_string(), frame.score.to_string()],
            SessionPhase::Completed => vec!["COMPLETE!".to_string(), frame.score.to_string()],
        };
        let top = BOARD_ROWS / 2 - 1;
        for (i, line) in lines.iter().enumerate() {
            let padded = format!(" {line} ");
            let width = padded.chars().count() as u16;
            let x = (BOARD_COLS.saturating_sub(width)) / 2;
            fb.put_str(x, top + i as u16, &padded, self.banner);
        }
    }

    fn draw_hint(&self, phase: SessionPhase, fb: &mut FrameBuffer) {
        let hint = match phase {
            SessionPhase::Start => "enter: start  q: quit",
            SessionPhase::Playing => "arrows  space: drop  p: pause",
            SessionPhase::Paused => "p: resume  q: quit",
            SessionPhase::GameOver | SessionPhase::Completed => "r: play again  q: quit",
        };
        fb.put_str(0, VIEW_HEIGHT - 1, hint, self.label);
    }
}
