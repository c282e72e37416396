//! VTE Perform trait implementation for Term
//!
//! The parser feeds recognized actions here; OSC and DCS sequences are
//! consumed by the parser and dropped without effect.

use vte::{Params, Perform};

use crate::cell::CellFlags;
use crate::color::Color;
use crate::term::Term;

impl Perform for Term {
    fn print(&mut self, c: char) {
        self.write_char(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\r' => self.carriage_return(),
            b'\n' => self.line_feed(),
            b'\x08' => self.backspace(),
            b'\t' => self.horizontal_tab(),
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        if !intermediates.is_empty() {
            return;
        }
        match action {
            'm' => self.handle_sgr(params),
            'H' | 'f' => {
                let mut iter = params.iter();
                let row = iter.next().and_then(|p| p.first()).copied().unwrap_or(1) as usize;
                let col = iter.next().and_then(|p| p.first()).copied().unwrap_or(1) as usize;
                self.move_cursor_to(col.saturating_sub(1), row.saturating_sub(1));
            }
            'A' => self.move_up(param_or_one(params)),
            'B' => self.move_down(param_or_one(params)),
            'C' => self.move_right(param_or_one(params)),
            'D' => self.move_left(param_or_one(params)),
            'G' => {
                let col = params
                    .iter()
                    .next()
                    .and_then(|p| p.first())
                    .copied()
                    .unwrap_or(1) as usize;
                let (_, row) = self.cursor();
                self.move_cursor_to(col.saturating_sub(1), row as usize);
            }
            'J' => self.erase_in_display(param_or_zero(params)),
            'K' => self.erase_in_line(param_or_zero(params)),
            _ => {}
        }
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}
}

fn param_or_one(params: &Params) -> usize {
    let n = params
        .iter()
        .next()
        .and_then(|p| p.first())
        .copied()
        .unwrap_or(1) as usize;
    if n == 0 {
        1
    } else {
        n
    }
}

fn param_or_zero(params: &Params) -> usize {
    params
        .iter()
        .next()
        .and_then(|p| p.first())
        .copied()
        .unwrap_or(0) as usize
}

impl Term {
    fn handle_sgr(&mut self, params: &Params) {
        if params.is_empty() {
            self.reset_style();
            return;
        }

        let mut iter = params.iter();
        while let Some(param_slice) = iter.next() {
            let param = param_slice.first().copied().unwrap_or(0);
            match param {
                0 => self.reset_style(),
                1 => self.set_flag(CellFlags::BOLD, true),
                3 => self.set_flag(CellFlags::ITALIC, true),
                4 => self.set_flag(CellFlags::UNDERLINE, true),
                9 => self.set_flag(CellFlags::STRIKETHROUGH, true),
                22 => self.set_flag(CellFlags::BOLD, false),
                23 => self.set_flag(CellFlags::ITALIC, false),
                24 => self.set_flag(CellFlags::UNDERLINE, false),
                29 => self.set_flag(CellFlags::STRIKETHROUGH, false),
                30..=37 => self.set_fg(Color::Ansi16((param - 30) as u8)),
                38 => {
                    if let Some(color) = extended_color(param_slice, &mut iter) {
                        self.set_fg(color);
                    }
                }
                39 => self.set_fg(Color::Default),
                40..=47 => self.set_bg(Color::Ansi16((param - 40) as u8)),
                48 => {
                    if let Some(color) = extended_color(param_slice, &mut iter) {
                        self.set_bg(color);
                    }
                }
                49 => self.set_bg(Color::Default),
                90..=97 => self.set_fg(Color::Ansi16((param - 90 + 8) as u8)),
                100..=107 => self.set_bg(Color::Ansi16((param - 100 + 8) as u8)),
                _ => {}
            }
        }
    }
}

/// Decode the `38`/`48` extended color forms, both the colon-separated
/// subparameter shape (`38:5:n` arrives as one slice) and the legacy
/// semicolon shape (`38;5;n` arrives as separate parameters).
fn extended_color<'a, I>(param_slice: &[u16], iter: &mut I) -> Option<Color>
where
    I: Iterator<Item = &'a [u16]>,
{
    if let Some(&mode) = param_slice.get(1) {
        match mode {
            2 => {
                let r = param_slice.get(2).copied().unwrap_or(0) as u8;
                let g = param_slice.get(3).copied().unwrap_or(0) as u8;
                let b = param_slice.get(4).copied().unwrap_or(0) as u8;
                Some(Color::Rgb(r, g, b))
            }
            5 => param_slice
                .get(2)
                .map(|&idx| Color::from_indexed(idx as u8)),
            _ => None,
        }
    } else {
        let mode = iter.next().and_then(|p| p.first()).copied()?;
        match mode {
            2 => {
                let r = iter.next().and_then(|p| p.first()).copied().unwrap_or(0) as u8;
                let g = iter.next().and_then(|p| p.first()).copied().unwrap_or(0) as u8;
                let b = iter.next().and_then(|p| p.first()).copied().unwrap_or(0) as u8;
                Some(Color::Rgb(r, g, b))
            }
            5 => iter
                .next()
                .and_then(|p| p.first())
                .map(|&idx| Color::from_indexed(idx as u8)),
            _ => None,
        }
    }
}
