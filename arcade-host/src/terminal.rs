//! Character-cell rendition of the display list, plus the terminal-side input glue.

use std::io::{self, Write};

use arcade_core::constants::PLAYER_NAME_MAX_CHARS;
use arcade_core::input::Key;
use arcade_core::render::{Color, Rgb};
use arcade_core::{DrawCmd, InputAdapter, InputEvent, Intent, Palette, Viewport};
use crossterm::event::{KeyCode, KeyEventKind};
use crossterm::{cursor, event, style, terminal, ExecutableCommand, QueueableCommand};

/// A direction key counts as held if a press or repeat arrived within this many frames.
/// Most terminals never report key releases; OS key repeat refreshes well inside this.
pub const HOLD_WINDOW_FRAMES: u64 = 8;

const SOLID: char = '█';
const SPECK: char = '·';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Rgb,
}

/// Downscaled grid of glyphs. Rects become solid cells, text keeps its characters.
#[derive(Clone, Debug)]
pub struct CellGrid {
    cols: usize,
    rows: usize,
    scale_x: f32,
    scale_y: f32,
    background: Rgb,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn new(cols: u16, rows: u16, viewport: Viewport) -> Self {
        let cols = usize::from(cols.max(1));
        let rows = usize::from(rows.max(1));
        let background = Rgb(0, 0, 0);
        Self {
            cols,
            rows,
            scale_x: cols as f32 / viewport.width,
            scale_y: rows as f32 / viewport.height,
            background,
            cells: vec![blank(background); cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    pub fn row_text(&self, row: usize) -> String {
        self.cells
            .iter()
            .skip(row * self.cols)
            .take(self.cols)
            .map(|cell| cell.glyph)
            .collect()
    }

    pub fn draw(&mut self, cmds: &[DrawCmd], palette: &Palette) {
        for cmd in cmds {
            match cmd {
                DrawCmd::Clear { color } => {
                    self.background = palette.resolve(*color);
                    self.cells.fill(blank(self.background));
                }
                DrawCmd::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    let glyph = if *color == Color::Background {
                        ' '
                    } else if width * self.scale_x < 1.0 && height * self.scale_y < 1.0 {
                        SPECK
                    } else {
                        SOLID
                    };
                    self.fill(*x, *y, *width, *height, glyph, palette.resolve(*color));
                }
                DrawCmd::StrokeRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => self.stroke(*x, *y, *width, *height, palette.resolve(*color)),
                DrawCmd::Text {
                    x, y, text, color, ..
                } => self.text(*x, *y, text, palette.resolve(*color)),
            }
        }
    }

    fn span(origin: f32, length: f32, scale: f32, limit: usize) -> Option<(usize, usize)> {
        let start = (origin * scale).floor().max(0.0);
        // Anything visible covers at least one cell.
        let end = ((origin + length) * scale).ceil().max(start + 1.0).min(limit as f32);
        if start >= end || end.is_nan() {
            return None;
        }
        Some((start as usize, end as usize))
    }

    fn fill(&mut self, x: f32, y: f32, width: f32, height: f32, glyph: char, color: Rgb) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let Some((c0, c1)) = Self::span(x, width, self.scale_x, self.cols) else {
            return;
        };
        let Some((r0, r1)) = Self::span(y, height, self.scale_y, self.rows) else {
            return;
        };
        for row in r0..r1 {
            let start = row * self.cols;
            self.cells[start + c0..start + c1].fill(Cell { glyph, color });
        }
    }

    fn stroke(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        let Some((c0, c1)) = Self::span(x, width, self.scale_x, self.cols) else {
            return;
        };
        let Some((r0, r1)) = Self::span(y, height, self.scale_y, self.rows) else {
            return;
        };
        let (right, bottom) = (c1 - 1, r1 - 1);
        for col in c0..=right {
            self.put(col, r0, '─', color);
            self.put(col, bottom, '─', color);
        }
        for row in r0..=bottom {
            self.put(c0, row, '│', color);
            self.put(right, row, '│', color);
        }
        self.put(c0, r0, '┌', color);
        self.put(right, r0, '┐', color);
        self.put(c0, bottom, '└', color);
        self.put(right, bottom, '┘', color);
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgb) {
        let row = (y * self.scale_y).floor();
        let col = (x * self.scale_x).floor();
        if row < 0.0 {
            return;
        }
        for (offset, glyph) in text.chars().enumerate() {
            let target = col + offset as f32;
            if target >= 0.0 {
                self.put(target as usize, row as usize, glyph, color);
            }
        }
    }

    fn put(&mut self, col: usize, row: usize, glyph: char, color: Rgb) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = Cell { glyph, color };
        }
    }
}

fn blank(background: Rgb) -> Cell {
    Cell {
        glyph: ' ',
        color: background,
    }
}

fn term_color(Rgb(r, g, b): Rgb) -> style::Color {
    style::Color::Rgb { r, g, b }
}

/// Queues one full frame. Color changes are only emitted between runs of differently
/// colored cells.
pub fn present<W: Write>(out: &mut W, grid: &CellGrid) -> io::Result<()> {
    out.queue(style::SetBackgroundColor(term_color(grid.background())))?;
    for row in 0..grid.rows() {
        out.queue(cursor::MoveTo(0, row as u16))?;
        let mut current = None;
        let mut run = String::new();
        for col in 0..grid.cols() {
            let Some(cell) = grid.cell(col, row) else {
                continue;
            };
            if current != Some(cell.color) {
                if let Some(color) = current {
                    out.queue(style::SetForegroundColor(term_color(color)))?;
                    out.queue(style::Print(&run))?;
                    run.clear();
                }
                current = Some(cell.color);
            }
            run.push(cell.glyph);
        }
        if let Some(color) = current {
            out.queue(style::SetForegroundColor(term_color(color)))?;
            out.queue(style::Print(&run))?;
        }
    }
    out.queue(style::ResetColor)?;
    out.flush()
}

/// Raw mode, alternate screen and mouse capture for the lifetime of the guard.
pub struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    pub fn enter<W: Write>(out: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;
        out.execute(event::EnableMouseCapture)?;
        // Kitty-protocol terminals report releases; the rest fall back to the hold window.
        let keyboard_enhanced = out
            .execute(event::PushKeyboardEnhancementFlags(
                event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();
        Ok(Self { keyboard_enhanced })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        if self.keyboard_enhanced {
            let _ = out.execute(event::PopKeyboardEnhancementFlags);
        }
        let _ = out.execute(event::DisableMouseCapture);
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub fn key_for_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Char(' ') => Key::Fire,
        KeyCode::Char(ch) => Key::from_key_name(ch.encode_utf8(&mut [0; 4])),
        _ => Key::Other,
    }
}

/// Feeds terminal key and mouse events into an [`InputAdapter`], synthesizing key
/// releases for terminals that never send them.
#[derive(Debug, Default)]
pub struct TerminalInput {
    adapter: InputAdapter,
    up_seen: Option<u64>,
    down_seen: Option<u64>,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, code: KeyCode, kind: KeyEventKind, frame: u64) {
        let key = key_for_code(code);
        let seen = match key {
            Key::Up => &mut self.up_seen,
            Key::Down => &mut self.down_seen,
            Key::Fire => {
                if kind != KeyEventKind::Release {
                    self.adapter.handle(InputEvent::KeyDown(Key::Fire));
                }
                return;
            }
            Key::Other => return,
        };

        if kind == KeyEventKind::Release {
            *seen = None;
            self.adapter.handle(InputEvent::KeyUp(key));
        } else {
            if seen.is_none() {
                self.adapter.handle(InputEvent::KeyDown(key));
            }
            *seen = Some(frame);
        }
    }

    pub fn click(&mut self) {
        self.adapter.handle(InputEvent::Click);
    }

    /// Expires stale held keys, then samples the adapter.
    pub fn snapshot(&mut self, frame: u64) -> Intent {
        for (key, seen) in [(Key::Up, &mut self.up_seen), (Key::Down, &mut self.down_seen)] {
            if seen.is_some_and(|last| frame.saturating_sub(last) > HOLD_WINDOW_FRAMES) {
                *seen = None;
                self.adapter.handle(InputEvent::KeyUp(key));
            }
        }
        self.adapter.snapshot()
    }

    /// Drops held keys and queued presses, e.g. when leaving the name prompt.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Text typed at the game-over prompt.
#[derive(Debug, Default)]
pub struct NameEntry {
    buffer: String,
}

impl NameEntry {
    pub fn push(&mut self, ch: char) {
        if !ch.is_control() && self.buffer.chars().count() < PLAYER_NAME_MAX_CHARS {
            self.buffer.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
