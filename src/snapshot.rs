//! Immutable screen buffer snapshots and ANSI delta computation
//!
//! A [`Snapshot`] is one visible console image: a row-major grid of styled
//! cells plus the cursor. The capture engine takes one per sampling tick and
//! turns consecutive pairs into minimal ANSI patches with [`Snapshot::diff`].

use std::fmt::Write as _;
use std::sync::OnceLock;
use std::time::Instant;

use crate::cell::Cell;

/// Changed-cell fraction above which an incremental patch is abandoned for a
/// full redraw. Untuned default.
pub const FULL_REDRAW_THRESHOLD_PCT: usize = 50;

/// Seconds since the first call in this process, from a monotonic clock.
pub fn monotonic_seconds() -> f64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// An immutable grid of styled cells plus cursor position.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    width: u16,
    height: u16,
    cursor_x: u16,
    cursor_y: u16,
    cells: Vec<Cell>,
    captured_at: f64,
}

impl Snapshot {
    /// Build a snapshot. Dimensions must be positive, `cells` must hold
    /// exactly `width * height` entries and the cursor must lie in bounds.
    pub fn new(
        width: u16,
        height: u16,
        cursor_x: u16,
        cursor_y: u16,
        cells: Vec<Cell>,
        captured_at: f64,
    ) -> Self {
        assert!(width > 0 && height > 0, "snapshot dimensions must be positive");
        assert_eq!(cells.len(), width as usize * height as usize);
        assert!(cursor_x < width && cursor_y < height, "cursor out of bounds");
        Self {
            width,
            height,
            cursor_x,
            cursor_y,
            cells,
            captured_at,
        }
    }

    /// An all-blank snapshot with the cursor at the origin.
    pub fn blank(width: u16, height: u16) -> Self {
        Self::new(
            width,
            height,
            0,
            0,
            vec![Cell::default(); width as usize * height as usize],
            monotonic_seconds(),
        )
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn cursor(&self) -> (u16, u16) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn captured_at(&self) -> f64 {
        self.captured_at
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row as a slice of exactly `width` cells.
    pub fn row(&self, y: u16) -> &[Cell] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// True when the visible image and cursor are identical. The capture
    /// timestamp is not part of the image.
    pub fn same_image(&self, other: &Snapshot) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.cursor_x == other.cursor_x
            && self.cursor_y == other.cursor_y
            && self.cells == other.cells
    }

    /// Compute the minimal ANSI patch turning `previous` into `self`.
    ///
    /// Without a previous image (or across a resize) this is a full-screen
    /// dump. With one, changed cells are rewritten in row-major order,
    /// emitting a cursor move only when the write position jumps and an SGR
    /// only when the style changes from the previously written cell. An
    /// empty vector means the two images are identical.
    pub fn diff(&self, previous: Option<&Snapshot>) -> Vec<u8> {
        let prev = match previous {
            Some(p) if p.width == self.width && p.height == self.height => p,
            _ => return self.full_dump(),
        };

        let total = self.cells.len();
        let changed: Vec<usize> = (0..total)
            .filter(|&i| self.cells[i] != prev.cells[i])
            .collect();

        if changed.is_empty() {
            if self.cursor() == prev.cursor() {
                return Vec::new();
            }
            let mut out = String::new();
            self.push_cursor_move(&mut out, self.cursor_x, self.cursor_y);
            return out.into_bytes();
        }

        if changed.len() * 100 > total * FULL_REDRAW_THRESHOLD_PCT {
            return self.full_dump();
        }

        let mut out = String::new();
        let mut last_pos: Option<(u16, u16)> = None;
        let mut last_style: Option<Cell> = None;

        for &i in &changed {
            let x = (i % self.width as usize) as u16;
            let y = (i / self.width as usize) as u16;
            let cell = self.cells[i];

            let contiguous = matches!(last_pos, Some((lx, ly)) if ly == y && lx + 1 == x);
            if !contiguous {
                self.push_cursor_move(&mut out, x, y);
            }
            if last_style.map_or(true, |s| !s.same_style(&cell)) {
                cell.push_sgr(&mut out);
            }
            out.push(cell.c);
            last_pos = Some((x, y));
            last_style = Some(cell);
        }

        // The write position after the last cell rarely matches the real
        // cursor, so finish with an explicit move whenever it is off.
        let implied = last_pos.map(|(x, y)| {
            if x + 1 < self.width {
                (x + 1, y)
            } else {
                (x, y)
            }
        });
        if implied != Some(self.cursor()) || self.cursor() != prev.cursor() {
            self.push_cursor_move(&mut out, self.cursor_x, self.cursor_y);
        }

        out.into_bytes()
    }

    /// Full-screen dump: home the cursor, repaint every cell with style runs,
    /// CRLF between rows, reset, then place the cursor.
    fn full_dump(&self) -> Vec<u8> {
        let mut out = String::from("\x1b[H");
        let mut last_style: Option<Cell> = None;

        for y in 0..self.height {
            if y > 0 {
                out.push_str("\r\n");
            }
            for cell in self.row(y) {
                if last_style.map_or(true, |s| !s.same_style(cell)) {
                    cell.push_sgr(&mut out);
                    last_style = Some(*cell);
                }
                out.push(cell.c);
            }
        }
        out.push_str("\x1b[0m");
        self.push_cursor_move(&mut out, self.cursor_x, self.cursor_y);
        out.into_bytes()
    }

    fn push_cursor_move(&self, out: &mut String, x: u16, y: u16) {
        let _ = write!(out, "\x1b[{};{}H", y + 1, x + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellFlags;
    use crate::color::Color;

    fn snap_from_text(width: u16, height: u16, rows: &[&str]) -> Snapshot {
        let mut cells = vec![Cell::default(); width as usize * height as usize];
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                cells[y * width as usize + x] = Cell {
                    c,
                    ..Cell::default()
                };
            }
        }
        Snapshot::new(width, height, 0, 0, cells, 0.0)
    }

    #[test]
    fn test_identical_snapshots_empty_diff() {
        let a = snap_from_text(10, 3, &["hello"]);
        let b = a.clone();
        assert!(b.diff(Some(&a)).is_empty());
    }

    #[test]
    fn test_full_dump_without_previous() {
        let snap = snap_from_text(4, 2, &["ab"]);
        let bytes = snap.diff(None);
        let s = String::from_utf8(bytes).unwrap();
        assert!(s.starts_with("\x1b[H"));
        assert!(s.contains("ab"));
        assert!(s.contains("\r\n"));
        assert!(s.contains("\x1b[0m"));
    }

    #[test]
    fn test_cursor_only_change() {
        let a = snap_from_text(10, 2, &["hi"]);
        let mut b = a.clone();
        b.cursor_x = 5;
        b.cursor_y = 1;
        let s = String::from_utf8(b.diff(Some(&a))).unwrap();
        assert_eq!(s, "\x1b[2;6H");
    }

    #[test]
    fn test_incremental_single_cell() {
        let a = snap_from_text(10, 2, &["hello"]);
        let b = snap_from_text(10, 2, &["hallo"]);
        let s = String::from_utf8(b.diff(Some(&a))).unwrap();
        // One cursor move to (1,2) 1-based, one SGR, the cell, cursor restore
        assert!(s.starts_with("\x1b[1;2H"));
        assert!(s.contains('a'));
        assert!(!s.contains('h'));
    }

    #[test]
    fn test_contiguous_run_single_move() {
        let a = snap_from_text(10, 1, &["aaaa"]);
        let b = snap_from_text(10, 1, &["bbbb"]);
        let s = String::from_utf8(b.diff(Some(&a))).unwrap();
        // Only the leading move plus the final cursor restore may appear
        let moves = s.matches("\x1b[").count();
        // one move + one SGR + one trailing move
        assert_eq!(moves, 3, "patch was: {:?}", s);
        assert!(s.contains("bbbb"));
    }

    #[test]
    fn test_style_transition_emits_sgr_once() {
        let a = snap_from_text(10, 1, &["    "]);
        let mut b = a.clone();
        for x in 0..4usize {
            b.cells[x] = Cell {
                c: 'x',
                fg: Color::Ansi16(1),
                bg: Color::Default,
                flags: CellFlags::empty(),
            };
        }
        let s = String::from_utf8(b.diff(Some(&a))).unwrap();
        assert_eq!(s.matches("\x1b[0;31m").count(), 1, "patch was: {:?}", s);
    }

    #[test]
    fn test_majority_change_switches_to_full_dump() {
        let width = 10u16;
        let a = snap_from_text(width, 2, &[""]);
        // change 11 of 20 cells: > 50%
        let mut b = a.clone();
        for i in 0..11usize {
            b.cells[i] = Cell {
                c: 'z',
                ..Cell::default()
            };
        }
        let s = String::from_utf8(b.diff(Some(&a))).unwrap();
        assert!(s.starts_with("\x1b[H"));
        assert!(s.contains("\r\n"));
    }

    #[test]
    fn test_exactly_half_stays_incremental() {
        let a = snap_from_text(10, 2, &[""]);
        // exactly 10 of 20 cells
        let mut b = a.clone();
        for i in 0..10usize {
            b.cells[i] = Cell {
                c: 'z',
                ..Cell::default()
            };
        }
        let s = String::from_utf8(b.diff(Some(&a))).unwrap();
        assert!(!s.starts_with("\x1b[H"));
    }

    #[test]
    fn test_resize_forces_full_dump() {
        let a = snap_from_text(10, 2, &["hi"]);
        let b = snap_from_text(12, 2, &["hi"]);
        let s = String::from_utf8(b.diff(Some(&a))).unwrap();
        assert!(s.starts_with("\x1b[H"));
    }

    #[test]
    #[should_panic(expected = "cursor out of bounds")]
    fn test_cursor_bounds_enforced() {
        Snapshot::new(2, 2, 2, 0, vec![Cell::default(); 4], 0.0);
    }
}
