//! Terminal emulator
//!
//! Replays an ANSI byte stream into a fixed-size grid of styled cells. The
//! parsing is delegated to `vte`; this module owns the grid, the cursor and
//! the active SGR state, and applies the recognized control functions.
//!
//! The same input bytes produce the same final grid regardless of how the
//! stream is chunked across [`Term::process`] calls.

mod perform;
#[cfg(test)]
mod tests;

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellFlags};
use crate::color::Color;

const TAB_WIDTH: usize = 8;

/// A terminal emulator: grid, cursor and active style.
pub struct Term {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
    cursor_x: usize,
    cursor_y: usize,
    fg: Color,
    bg: Color,
    flags: CellFlags,
    parser: vte::Parser,
}

impl Term {
    /// Create an emulator with a blank grid. Dimensions must be positive.
    pub fn new(width: u16, height: u16) -> Self {
        assert!(width > 0 && height > 0, "terminal dimensions must be positive");
        let width = width as usize;
        let height = height as usize;
        Self {
            width,
            height,
            rows: vec![vec![Cell::default(); width]; height],
            cursor_x: 0,
            cursor_y: 0,
            fg: Color::Default,
            bg: Color::Default,
            flags: CellFlags::default(),
            parser: vte::Parser::new(),
        }
    }

    /// Feed bytes through the parser. May be called with arbitrary chunks.
    pub fn process(&mut self, bytes: &[u8]) {
        // The parser borrows the grid mutably while it drives Perform, so it
        // is swapped out for the duration of the call.
        let mut parser = std::mem::replace(&mut self.parser, vte::Parser::new());
        parser.advance(self, bytes);
        self.parser = parser;
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width as u16, self.height as u16)
    }

    pub fn cursor(&self) -> (u16, u16) {
        (self.cursor_x.min(self.width - 1) as u16, self.cursor_y as u16)
    }

    /// The grid as rows of exactly `width` cells each.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Plain-text rows with trailing whitespace trimmed.
    pub fn text_rows(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| {
                let text: String = row.iter().map(|cell| cell.c).collect();
                text.trim_end().to_string()
            })
            .collect()
    }

    /// Resize the grid in place, padding or truncating rows at the bottom and
    /// columns at the right. The cursor is clamped into the new bounds.
    pub fn resize(&mut self, width: u16, height: u16) {
        assert!(width > 0 && height > 0, "terminal dimensions must be positive");
        let width = width as usize;
        let height = height as usize;
        for row in &mut self.rows {
            row.resize(width, Cell::default());
        }
        self.rows.resize(height, vec![Cell::default(); width]);
        self.width = width;
        self.height = height;
        self.cursor_x = self.cursor_x.min(width - 1);
        self.cursor_y = self.cursor_y.min(height - 1);
    }

    fn blank_cell(&self) -> Cell {
        Cell {
            c: ' ',
            fg: Color::Default,
            bg: self.bg,
            flags: CellFlags::default(),
        }
    }

    fn styled_cell(&self, c: char) -> Cell {
        Cell {
            c,
            fg: self.fg,
            bg: self.bg,
            flags: self.flags,
        }
    }

    pub(crate) fn write_char(&mut self, c: char) {
        let advance = match c.width() {
            Some(w) if w > 0 => w,
            _ => return,
        };

        if self.cursor_x >= self.width {
            self.cursor_x = 0;
            self.line_feed();
        }

        self.rows[self.cursor_y][self.cursor_x] = self.styled_cell(c);
        // A double-width glyph owns the following cell as well.
        if advance == 2 && self.cursor_x + 1 < self.width {
            self.rows[self.cursor_y][self.cursor_x + 1] = self.styled_cell(' ');
        }
        self.cursor_x += advance;
    }

    pub(crate) fn carriage_return(&mut self) {
        self.cursor_x = 0;
    }

    pub(crate) fn line_feed(&mut self) {
        if self.cursor_y + 1 < self.height {
            self.cursor_y += 1;
        } else {
            self.scroll_up();
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.cursor_x = self.cursor_x.saturating_sub(1).min(self.width - 1);
    }

    pub(crate) fn horizontal_tab(&mut self) {
        let target = ((self.cursor_x / TAB_WIDTH) + 1) * TAB_WIDTH;
        while self.cursor_x < target && self.cursor_x < self.width {
            self.rows[self.cursor_y][self.cursor_x] = self.styled_cell(' ');
            self.cursor_x += 1;
        }
    }

    /// Drop the top row, append a blank one, keep the cursor on the last row.
    fn scroll_up(&mut self) {
        self.rows.remove(0);
        self.rows.push(vec![self.blank_cell(); self.width]);
        self.cursor_y = self.height - 1;
    }

    pub(crate) fn move_cursor_to(&mut self, col: usize, row: usize) {
        self.cursor_x = col.min(self.width - 1);
        self.cursor_y = row.min(self.height - 1);
    }

    pub(crate) fn move_up(&mut self, n: usize) {
        self.cursor_y = self.cursor_y.saturating_sub(n);
    }

    pub(crate) fn move_down(&mut self, n: usize) {
        self.cursor_y = (self.cursor_y + n).min(self.height - 1);
    }

    pub(crate) fn move_right(&mut self, n: usize) {
        self.cursor_x = (self.cursor_x.min(self.width - 1) + n).min(self.width - 1);
    }

    pub(crate) fn move_left(&mut self, n: usize) {
        self.cursor_x = self.cursor_x.min(self.width - 1).saturating_sub(n);
    }

    /// ED: erase in display. Modes 0 (cursor to end), 1 (start to cursor,
    /// inclusive), 2 and 3 (everything).
    pub(crate) fn erase_in_display(&mut self, mode: usize) {
        let blank = self.blank_cell();
        let x = self.cursor_x.min(self.width - 1);
        match mode {
            0 => {
                for cell in &mut self.rows[self.cursor_y][x..] {
                    *cell = blank;
                }
                for row in &mut self.rows[self.cursor_y + 1..] {
                    row.fill(blank);
                }
            }
            1 => {
                for row in &mut self.rows[..self.cursor_y] {
                    row.fill(blank);
                }
                for cell in &mut self.rows[self.cursor_y][..=x] {
                    *cell = blank;
                }
            }
            2 | 3 => {
                for row in &mut self.rows {
                    row.fill(blank);
                }
            }
            _ => {}
        }
    }

    /// EL: erase in line. Modes 0 (cursor to end), 1 (start to cursor,
    /// inclusive), 2 (whole line).
    pub(crate) fn erase_in_line(&mut self, mode: usize) {
        let blank = self.blank_cell();
        let x = self.cursor_x.min(self.width - 1);
        match mode {
            0 => self.rows[self.cursor_y][x..].fill(blank),
            1 => self.rows[self.cursor_y][..=x].fill(blank),
            2 => self.rows[self.cursor_y].fill(blank),
            _ => {}
        }
    }

    pub(crate) fn reset_style(&mut self) {
        self.fg = Color::Default;
        self.bg = Color::Default;
        self.flags = CellFlags::default();
    }

    pub(crate) fn set_fg(&mut self, color: Color) {
        self.fg = color;
    }

    pub(crate) fn set_bg(&mut self, color: Color) {
        self.bg = color;
    }

    pub(crate) fn set_flag(&mut self, flag: CellFlags, on: bool) {
        self.flags.set(flag, on);
    }
}
