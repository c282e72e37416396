//! Pixel frame renderer
//!
//! Rasterizes a grid of cells into an RGB buffer using the embedded bitmap
//! font, wrapped in window chrome: padding, a title bar and the three
//! traffic-light circles. Frames encode to portable pixmap (PPM P6), which
//! the video pipeline feeds to the muxer one frame at a time.

use crate::cell::{Cell, CellFlags};
use crate::render::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::theme::{Rgb, Theme};

/// Outer padding around the cell grid, in pixels.
const PADDING: usize = 10;
/// Height of the chrome title bar, in pixels.
const TITLE_BAR_HEIGHT: usize = 28;
/// Radius of the traffic-light circles.
const BUTTON_RADIUS: usize = 6;

const BUTTON_COLORS: [Rgb; 3] = [
    Rgb::hex(0xff5f57),
    Rgb::hex(0xfebc2e),
    Rgb::hex(0x28c840),
];

/// A rendered RGB frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    /// Row-major RGB triples, `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

impl Frame {
    fn filled(width: usize, height: usize, color: Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * 3;
            self.pixels[i] = color.r;
            self.pixels[i + 1] = color.g;
            self.pixels[i + 2] = color.b;
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.set(px, py, color);
            }
        }
    }

    fn fill_circle(&mut self, cx: usize, cy: usize, r: usize, color: Rgb) {
        let (cx, cy, r) = (cx as i64, cy as i64, r as i64);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    let x = cx + dx;
                    let y = cy + dy;
                    if x >= 0 && y >= 0 {
                        self.set(x as usize, y as usize, color);
                    }
                }
            }
        }
    }

    fn stamp_glyph(&mut self, x: usize, y: usize, c: char, color: Rgb, bold: bool) {
        let bitmap = font::glyph(c);
        for (row, &bits) in bitmap.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x80 >> col) != 0 {
                    self.set(x + col, y + row, color);
                    if bold {
                        self.set(x + col + 1, y + row, color);
                    }
                }
            }
        }
    }

    /// Encode as PPM P6: `P6\n<W> <H>\n255\n` followed by the raw RGB bytes.
    pub fn to_ppm(&self) -> Vec<u8> {
        let mut out = format!("P6\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.extend_from_slice(&self.pixels);
        out
    }
}

/// Pixel dimensions of the chrome-framed image for a given grid size.
pub fn frame_size(cols: u16, rows: u16) -> (usize, usize) {
    (
        cols as usize * GLYPH_WIDTH + 2 * PADDING,
        rows as usize * GLYPH_HEIGHT + TITLE_BAR_HEIGHT + 2 * PADDING,
    )
}

/// Render one frame of the given rows.
///
/// Every cell rectangle is filled with its resolved background, then the
/// glyph is stamped in the resolved foreground. Bold is an overstrike one
/// pixel to the right; underline and strikethrough are single pixel rows.
/// The cursor cell, when given, is painted as a block in the theme's cursor
/// color.
pub fn render_frame(
    rows: &[Vec<Cell>],
    cursor: Option<(u16, u16)>,
    title: Option<&str>,
    theme: &Theme,
) -> Frame {
    let grid_rows = rows.len() as u16;
    let grid_cols = rows.first().map_or(0, |r| r.len()) as u16;
    let (width, height) = frame_size(grid_cols, grid_rows);
    let mut frame = Frame::filled(width, height, theme.background);

    for (i, &color) in BUTTON_COLORS.iter().enumerate() {
        frame.fill_circle(
            PADDING + BUTTON_RADIUS + i * 20,
            TITLE_BAR_HEIGHT / 2,
            BUTTON_RADIUS,
            color,
        );
    }

    if let Some(title) = title {
        let max_chars = (grid_cols as usize).saturating_sub(10);
        let shown: String = title.chars().take(max_chars).collect();
        let text_w = shown.chars().count() * GLYPH_WIDTH;
        let x0 = width.saturating_sub(text_w) / 2;
        let y0 = (TITLE_BAR_HEIGHT - GLYPH_HEIGHT) / 2;
        for (i, c) in shown.chars().enumerate() {
            frame.stamp_glyph(x0 + i * GLYPH_WIDTH, y0, c, theme.foreground, false);
        }
    }

    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let x = PADDING + col_idx * GLYPH_WIDTH;
            let y = TITLE_BAR_HEIGHT + PADDING + row_idx * GLYPH_HEIGHT;

            let at_cursor = cursor == Some((col_idx as u16, row_idx as u16));
            let (bg, fg) = if at_cursor {
                (theme.cursor, theme.background)
            } else {
                (theme.resolve_bg(cell.bg), theme.resolve_fg(cell.fg))
            };

            frame.fill_rect(x, y, GLYPH_WIDTH, GLYPH_HEIGHT, bg);
            frame.stamp_glyph(x, y, cell.c, fg, cell.flags.contains(CellFlags::BOLD));

            if cell.flags.contains(CellFlags::UNDERLINE) {
                frame.fill_rect(x, y + GLYPH_HEIGHT - 2, GLYPH_WIDTH, 1, fg);
            }
            if cell.flags.contains(CellFlags::STRIKETHROUGH) {
                frame.fill_rect(x, y + GLYPH_HEIGHT / 2, GLYPH_WIDTH, 1, fg);
            }
        }
    }

    frame
}
