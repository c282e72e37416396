//! Named color themes and 256-color palette resolution
//!
//! Themes are process-long immutable values; renderers hold a `&'static
//! Theme` and resolve cell colors through it.

use crate::color::Color;

/// A concrete 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build from a `0xRRGGBB` literal.
    pub const fn hex(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xff) as u8,
            g: ((v >> 8) & 0xff) as u8,
            b: (v & 0xff) as u8,
        }
    }

    /// CSS hex form, e.g. `#282a36`.
    pub fn css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A named terminal theme: default colors plus the 16-entry ANSI palette.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgb,
    pub foreground: Rgb,
    pub cursor: Rgb,
    pub palette: [Rgb; 16],
}

impl Theme {
    /// Look up a theme by name. Unknown names fall back to `asciinema`.
    pub fn named(name: &str) -> &'static Theme {
        THEMES
            .iter()
            .find(|t| t.name == name)
            .unwrap_or(&THEMES[0])
    }

    /// Resolve a 256-color index.
    ///
    /// 0-15 use the theme palette, 16-231 the 6x6x6 color cube and 232-255
    /// the 24-step grayscale ramp.
    pub fn color_for(&self, idx: u8) -> Rgb {
        match idx {
            0..=15 => self.palette[idx as usize],
            16..=231 => {
                let n = idx - 16;
                let cube = |a: u8| if a == 0 { 0 } else { 55 + 40 * a };
                Rgb {
                    r: cube(n / 36),
                    g: cube((n / 6) % 6),
                    b: cube(n % 6),
                }
            }
            232..=255 => {
                let v = 10 * (idx - 232) + 8;
                Rgb { r: v, g: v, b: v }
            }
        }
    }

    /// Resolve a foreground SGR code (30-37, 90-97, 39).
    pub fn fg_for(&self, code: u16) -> Rgb {
        match code {
            30..=37 => self.palette[(code - 30) as usize],
            90..=97 => self.palette[(code - 90 + 8) as usize],
            _ => self.foreground,
        }
    }

    /// Resolve a background SGR code (40-47, 100-107, 49).
    pub fn bg_for(&self, code: u16) -> Rgb {
        match code {
            40..=47 => self.palette[(code - 40) as usize],
            100..=107 => self.palette[(code - 100 + 8) as usize],
            _ => self.background,
        }
    }

    /// Resolve a cell foreground to a concrete color.
    pub fn resolve_fg(&self, color: Color) -> Rgb {
        match color {
            Color::Default => self.foreground,
            Color::Ansi16(n) => self.palette[(n & 0x0f) as usize],
            Color::Palette256(n) => self.color_for(n),
            Color::Rgb(r, g, b) => Rgb { r, g, b },
        }
    }

    /// Resolve a cell background to a concrete color.
    pub fn resolve_bg(&self, color: Color) -> Rgb {
        match color {
            Color::Default => self.background,
            Color::Ansi16(n) => self.palette[(n & 0x0f) as usize],
            Color::Palette256(n) => self.color_for(n),
            Color::Rgb(r, g, b) => Rgb { r, g, b },
        }
    }
}

macro_rules! palette {
    ($($c:literal),* $(,)?) => {
        [$(Rgb::hex($c)),*]
    };
}

/// All built-in themes, `asciinema` first (it doubles as the fallback).
pub static THEMES: &[Theme] = &[
    Theme {
        name: "asciinema",
        background: Rgb::hex(0x121314),
        foreground: Rgb::hex(0xcccccc),
        cursor: Rgb::hex(0xd9d9d9),
        palette: palette![
            0x000000, 0xdd3c69, 0x4ebf22, 0xddaf3c, 0x26b0d7, 0xb954e1, 0x54e1b9, 0xd9d9d9,
            0x4d4d4d, 0xdd3c69, 0x4ebf22, 0xddaf3c, 0x26b0d7, 0xb954e1, 0x54e1b9, 0xffffff,
        ],
    },
    Theme {
        name: "dracula",
        background: Rgb::hex(0x282a36),
        foreground: Rgb::hex(0xf8f8f2),
        cursor: Rgb::hex(0xf8f8f2),
        palette: palette![
            0x21222c, 0xff5555, 0x50fa7b, 0xf1fa8c, 0xbd93f9, 0xff79c6, 0x8be9fd, 0xf8f8f2,
            0x6272a4, 0xff6e6e, 0x69ff94, 0xffffa5, 0xd6acff, 0xff92df, 0xa4ffff, 0xffffff,
        ],
    },
    Theme {
        name: "monokai",
        background: Rgb::hex(0x272822),
        foreground: Rgb::hex(0xf8f8f2),
        cursor: Rgb::hex(0xf8f8f0),
        palette: palette![
            0x272822, 0xf92672, 0xa6e22e, 0xf4bf75, 0x66d9ef, 0xae81ff, 0xa1efe4, 0xf8f8f2,
            0x75715e, 0xf92672, 0xa6e22e, 0xf4bf75, 0x66d9ef, 0xae81ff, 0xa1efe4, 0xf9f8f5,
        ],
    },
    Theme {
        name: "solarized-dark",
        background: Rgb::hex(0x002b36),
        foreground: Rgb::hex(0x839496),
        cursor: Rgb::hex(0x93a1a1),
        palette: palette![
            0x073642, 0xdc322f, 0x859900, 0xb58900, 0x268bd2, 0xd33682, 0x2aa198, 0xeee8d5,
            0x002b36, 0xcb4b16, 0x586e75, 0x657b83, 0x839496, 0x6c71c4, 0x93a1a1, 0xfdf6e3,
        ],
    },
    Theme {
        name: "solarized-light",
        background: Rgb::hex(0xfdf6e3),
        foreground: Rgb::hex(0x657b83),
        cursor: Rgb::hex(0x586e75),
        palette: palette![
            0x073642, 0xdc322f, 0x859900, 0xb58900, 0x268bd2, 0xd33682, 0x2aa198, 0xeee8d5,
            0x002b36, 0xcb4b16, 0x586e75, 0x657b83, 0x839496, 0x6c71c4, 0x93a1a1, 0xfdf6e3,
        ],
    },
    Theme {
        name: "nord",
        background: Rgb::hex(0x2e3440),
        foreground: Rgb::hex(0xd8dee9),
        cursor: Rgb::hex(0xd8dee9),
        palette: palette![
            0x3b4252, 0xbf616a, 0xa3be8c, 0xebcb8b, 0x81a1c1, 0xb48ead, 0x88c0d0, 0xe5e9f0,
            0x4c566a, 0xbf616a, 0xa3be8c, 0xebcb8b, 0x81a1c1, 0xb48ead, 0x8fbcbb, 0xeceff4,
        ],
    },
    Theme {
        name: "one-dark",
        background: Rgb::hex(0x282c34),
        foreground: Rgb::hex(0xabb2bf),
        cursor: Rgb::hex(0x528bff),
        palette: palette![
            0x282c34, 0xe06c75, 0x98c379, 0xe5c07b, 0x61afef, 0xc678dd, 0x56b6c2, 0xabb2bf,
            0x545862, 0xe06c75, 0x98c379, 0xe5c07b, 0x61afef, 0xc678dd, 0x56b6c2, 0xc8ccd4,
        ],
    },
    Theme {
        name: "github-dark",
        background: Rgb::hex(0x0d1117),
        foreground: Rgb::hex(0xc9d1d9),
        cursor: Rgb::hex(0x58a6ff),
        palette: palette![
            0x484f58, 0xff7b72, 0x3fb950, 0xd29922, 0x58a6ff, 0xbc8cff, 0x39c5cf, 0xb1bac4,
            0x6e7681, 0xffa198, 0x56d364, 0xe3b341, 0x79c0ff, 0xd2a8ff, 0x56d4dd, 0xf0f6fc,
        ],
    },
    Theme {
        name: "tokyo-night",
        background: Rgb::hex(0x1a1b26),
        foreground: Rgb::hex(0xc0caf5),
        cursor: Rgb::hex(0xc0caf5),
        palette: palette![
            0x15161e, 0xf7768e, 0x9ece6a, 0xe0af68, 0x7aa2f7, 0xbb9af7, 0x7dcfff, 0xa9b1d6,
            0x414868, 0xf7768e, 0x9ece6a, 0xe0af68, 0x7aa2f7, 0xbb9af7, 0x7dcfff, 0xc0caf5,
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_lookup_and_fallback() {
        assert_eq!(Theme::named("dracula").name, "dracula");
        assert_eq!(Theme::named("nord").name, "nord");
        assert_eq!(Theme::named("no-such-theme").name, "asciinema");
    }

    #[test]
    fn test_dracula_background() {
        let t = Theme::named("dracula");
        assert_eq!(t.background.css(), "#282a36");
    }

    #[test]
    fn test_color_cube_formula() {
        let t = Theme::named("asciinema");
        // 16 is cube origin (0,0,0)
        assert_eq!(t.color_for(16), Rgb { r: 0, g: 0, b: 0 });
        // 231 is cube max (5,5,5) -> 255
        assert_eq!(
            t.color_for(231),
            Rgb {
                r: 255,
                g: 255,
                b: 255
            }
        );
        // axis value a maps to 55 + 40a for a > 0
        let c = t.color_for(16 + 36 * 3 + 6 * 1 + 2);
        assert_eq!(
            c,
            Rgb {
                r: 175,
                g: 95,
                b: 135
            }
        );
    }

    #[test]
    fn test_grayscale_ramp() {
        let t = Theme::named("asciinema");
        assert_eq!(t.color_for(232), Rgb { r: 8, g: 8, b: 8 });
        assert_eq!(
            t.color_for(255),
            Rgb {
                r: 238,
                g: 238,
                b: 238
            }
        );
    }

    #[test]
    fn test_palette_agrees_below_16() {
        for theme in THEMES {
            for k in 0..16u8 {
                assert_eq!(theme.color_for(k), theme.palette[k as usize]);
            }
        }
    }

    #[test]
    fn test_sgr_code_resolvers() {
        let t = Theme::named("dracula");
        assert_eq!(t.fg_for(31), t.palette[1]);
        assert_eq!(t.fg_for(97), t.palette[15]);
        assert_eq!(t.fg_for(39), t.foreground);
        assert_eq!(t.bg_for(44), t.palette[4]);
        assert_eq!(t.bg_for(100), t.palette[8]);
        assert_eq!(t.bg_for(49), t.background);
    }

    #[test]
    fn test_resolve_cell_colors() {
        let t = Theme::named("nord");
        assert_eq!(t.resolve_fg(Color::Default), t.foreground);
        assert_eq!(t.resolve_bg(Color::Default), t.background);
        assert_eq!(t.resolve_fg(Color::Ansi16(2)), t.palette[2]);
        assert_eq!(t.resolve_bg(Color::Palette256(232)), Rgb { r: 8, g: 8, b: 8 });
        assert_eq!(
            t.resolve_fg(Color::Rgb(1, 2, 3)),
            Rgb { r: 1, g: 2, b: 3 }
        );
    }
}
