//! Terminal color representation

use std::fmt::Write as _;

/// A terminal color as carried by a cell.
///
/// `Default` means "whatever the terminal's default is" and is resolved to a
/// concrete RGB value only at render time, through the active [`Theme`].
///
/// [`Theme`]: crate::theme::Theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// The terminal default foreground/background
    #[default]
    Default,
    /// One of the 16 basic ANSI colors (0-7 normal, 8-15 bright)
    Ansi16(u8),
    /// 256-color palette index
    Palette256(u8),
    /// True color (24-bit RGB)
    Rgb(u8, u8, u8),
}

impl Color {
    /// Append the SGR parameters selecting `self` as the foreground color.
    ///
    /// `Default` maps to `39`, the basic 16 to `30-37`/`90-97`, palette
    /// colors to `38;5;n` and true color to `38;2;r;g;b`.
    pub fn push_sgr_fg(&self, out: &mut String) {
        match *self {
            Color::Default => out.push_str("39"),
            Color::Ansi16(n) if n < 8 => {
                let _ = write!(out, "{}", 30 + n as u16);
            }
            Color::Ansi16(n) => {
                let _ = write!(out, "{}", 90 + (n as u16 - 8));
            }
            Color::Palette256(n) => {
                let _ = write!(out, "38;5;{}", n);
            }
            Color::Rgb(r, g, b) => {
                let _ = write!(out, "38;2;{};{};{}", r, g, b);
            }
        }
    }

    /// Append the SGR parameters selecting `self` as the background color.
    pub fn push_sgr_bg(&self, out: &mut String) {
        match *self {
            Color::Default => out.push_str("49"),
            Color::Ansi16(n) if n < 8 => {
                let _ = write!(out, "{}", 40 + n as u16);
            }
            Color::Ansi16(n) => {
                let _ = write!(out, "{}", 100 + (n as u16 - 8));
            }
            Color::Palette256(n) => {
                let _ = write!(out, "48;5;{}", n);
            }
            Color::Rgb(r, g, b) => {
                let _ = write!(out, "48;2;{};{};{}", r, g, b);
            }
        }
    }

    /// Collapse a 256-color index into this enum: indices 0-15 become
    /// [`Color::Ansi16`], the rest stay [`Color::Palette256`].
    pub fn from_indexed(idx: u8) -> Self {
        if idx < 16 {
            Color::Ansi16(idx)
        } else {
            Color::Palette256(idx)
        }
    }
}
