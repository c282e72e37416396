//! Styled character cells

use bitflags::bitflags;

use crate::color::Color;

bitflags! {
    /// Text attributes carried by a cell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellFlags: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
    }
}

/// A single character cell: one Unicode scalar plus its style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character in this cell
    pub c: char,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text attributes
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            fg: Color::Default,
            bg: Color::Default,
            flags: CellFlags::default(),
        }
    }
}

impl Cell {
    /// True when the cell is a space in the default style.
    pub fn is_blank(&self) -> bool {
        self.c == ' '
            && self.fg == Color::Default
            && self.bg == Color::Default
            && self.flags.is_empty()
    }

    /// True when two cells share the same style (character ignored).
    pub fn same_style(&self, other: &Cell) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.flags == other.flags
    }

    /// Append the complete SGR sequence selecting this cell's style.
    ///
    /// Always starts from a reset so the result is independent of whatever
    /// style the receiving terminal currently has.
    pub fn push_sgr(&self, out: &mut String) {
        out.push_str("\x1b[0");
        if self.flags.contains(CellFlags::BOLD) {
            out.push_str(";1");
        }
        if self.flags.contains(CellFlags::ITALIC) {
            out.push_str(";3");
        }
        if self.flags.contains(CellFlags::UNDERLINE) {
            out.push_str(";4");
        }
        if self.flags.contains(CellFlags::STRIKETHROUGH) {
            out.push_str(";9");
        }
        if self.fg != Color::Default {
            out.push(';');
            self.fg.push_sgr_fg(out);
        }
        if self.bg != Color::Default {
            out.push(';');
            self.bg.push_sgr_bg(out);
        }
        out.push('m');
    }
}
