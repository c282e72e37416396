//! SVG renderer
//!
//! Produces a standalone SVG document: a rounded window with title bar and
//! traffic-light circles, then one text span per run of identically styled
//! characters. Spans of default-styled whitespace are dropped entirely, and
//! non-default backgrounds become rects painted behind their span.

use std::fmt::Write as _;

use crate::cell::{Cell, CellFlags};
use crate::render::font::{GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::render::frame::frame_size;
use crate::theme::Theme;

const PADDING: usize = 10;
const TITLE_BAR_HEIGHT: usize = 28;
const FONT_SIZE: usize = 13;
/// Baseline offset within a cell row.
const BASELINE: usize = 12;

const FONT_STACK: &str = "Menlo, Monaco, 'Ubuntu Mono', Consolas, monospace";

/// Render rows at natural size (one pixel per font pixel).
pub fn render_svg(rows: &[Vec<Cell>], title: Option<&str>, theme: &Theme) -> String {
    render(rows, title, theme, None)
}

/// Render a thumbnail scaled to explicit pixel dimensions. The viewBox keeps
/// the natural coordinate system, so all positions scale uniformly.
pub fn render_thumbnail(
    rows: &[Vec<Cell>],
    title: Option<&str>,
    theme: &Theme,
    width_px: u32,
    height_px: u32,
) -> String {
    render(rows, title, theme, Some((width_px, height_px)))
}

fn render(
    rows: &[Vec<Cell>],
    title: Option<&str>,
    theme: &Theme,
    pixel_size: Option<(u32, u32)>,
) -> String {
    let grid_rows = rows.len() as u16;
    let grid_cols = rows.first().map_or(0, |r| r.len()) as u16;
    let (natural_w, natural_h) = frame_size(grid_cols, grid_rows);
    let (out_w, out_h) = pixel_size.unwrap_or((natural_w as u32, natural_h as u32));

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" \
         viewBox=\"0 0 {} {}\" font-family=\"{}\" font-size=\"{}\">\n",
        out_w, out_h, natural_w, natural_h, FONT_STACK, FONT_SIZE
    );

    let _ = write!(
        svg,
        "  <rect width=\"{}\" height=\"{}\" rx=\"6\" fill=\"{}\"/>\n",
        natural_w,
        natural_h,
        theme.background.css()
    );

    for (i, color) in ["#ff5f57", "#febc2e", "#28c840"].iter().enumerate() {
        let _ = write!(
            svg,
            "  <circle cx=\"{}\" cy=\"{}\" r=\"6\" fill=\"{}\"/>\n",
            PADDING + 6 + i * 20,
            TITLE_BAR_HEIGHT / 2,
            color
        );
    }

    if let Some(title) = title {
        let _ = write!(
            svg,
            "  <text x=\"{}\" y=\"{}\" fill=\"{}\" text-anchor=\"middle\">{}</text>\n",
            natural_w / 2,
            TITLE_BAR_HEIGHT / 2 + FONT_SIZE / 2,
            theme.foreground.css(),
            escape_xml(title)
        );
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let y = TITLE_BAR_HEIGHT + PADDING + row_idx * GLYPH_HEIGHT;
        for run in style_runs(row) {
            let text: String = row[run.start..run.end].iter().map(|c| c.c).collect();
            let style = row[run.start];
            if style_is_default(&style) && text.trim().is_empty() {
                continue;
            }

            let x = PADDING + run.start * GLYPH_WIDTH;
            let bg = theme.resolve_bg(style.bg);
            if bg != theme.background {
                let _ = write!(
                    svg,
                    "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
                    x,
                    y,
                    (run.end - run.start) * GLYPH_WIDTH,
                    GLYPH_HEIGHT,
                    bg.css()
                );
            }

            let mut attrs = String::new();
            if style.flags.contains(CellFlags::BOLD) {
                attrs.push_str(" font-weight=\"bold\"");
            }
            if style.flags.contains(CellFlags::ITALIC) {
                attrs.push_str(" font-style=\"italic\"");
            }
            let mut decorations = Vec::new();
            if style.flags.contains(CellFlags::UNDERLINE) {
                decorations.push("underline");
            }
            if style.flags.contains(CellFlags::STRIKETHROUGH) {
                decorations.push("line-through");
            }
            if !decorations.is_empty() {
                let _ = write!(attrs, " text-decoration=\"{}\"", decorations.join(" "));
            }

            let _ = write!(
                svg,
                "  <text x=\"{}\" y=\"{}\" fill=\"{}\"{} xml:space=\"preserve\">{}</text>\n",
                x,
                y + BASELINE,
                theme.resolve_fg(style.fg).css(),
                attrs,
                escape_xml(&text)
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

struct Run {
    start: usize,
    end: usize,
}

/// Split a row into maximal runs of cells sharing a style.
fn style_runs(row: &[Cell]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=row.len() {
        if i == row.len() || !row[i].same_style(&row[start]) {
            runs.push(Run { start, end: i });
            start = i;
        }
    }
    runs
}

fn style_is_default(cell: &Cell) -> bool {
    cell.same_style(&Cell::default())
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_three_cell_scenario() {
        // [A fg=red][ ][B bold] with dracula
        let row = vec![
            Cell {
                c: 'A',
                fg: Color::Ansi16(1),
                ..Cell::default()
            },
            Cell::default(),
            Cell {
                c: 'B',
                flags: CellFlags::BOLD,
                ..Cell::default()
            },
        ];
        let svg = render_svg(&[row].to_vec(), None, Theme::named("dracula"));

        assert_eq!(count(&svg, "<text"), 2, "svg was: {}", svg);
        assert!(svg.contains("fill=\"#282a36\""));
        // The red span carries dracula's red, the bold span the bold weight.
        assert!(svg.contains("#ff5555"));
        assert!(svg.contains("font-weight=\"bold\""));
    }

    #[test]
    fn test_adjacent_same_style_coalesced() {
        let row: Vec<Cell> = "hello"
            .chars()
            .map(|c| Cell {
                c,
                fg: Color::Ansi16(2),
                ..Cell::default()
            })
            .collect();
        let svg = render_svg(&[row].to_vec(), None, Theme::named("asciinema"));
        assert_eq!(count(&svg, "<text"), 1);
        assert!(svg.contains(">hello<"));
    }

    #[test]
    fn test_default_whitespace_omitted() {
        let row = vec![Cell::default(); 20];
        let svg = render_svg(&[row].to_vec(), None, Theme::named("asciinema"));
        assert_eq!(count(&svg, "<text"), 0);
    }

    #[test]
    fn test_styled_whitespace_kept_as_background_rect() {
        let mut row = vec![Cell::default(); 4];
        for cell in &mut row[0..2] {
            cell.bg = Color::Ansi16(4);
        }
        let svg = render_svg(&[row].to_vec(), None, Theme::named("asciinema"));
        // Root rect plus one background rect
        assert_eq!(count(&svg, "<rect"), 2);
    }

    #[test]
    fn test_xml_escaping() {
        let row: Vec<Cell> = "<&>'\""
            .chars()
            .map(|c| Cell {
                c,
                fg: Color::Ansi16(1),
                ..Cell::default()
            })
            .collect();
        let svg = render_svg(&[row].to_vec(), None, Theme::named("asciinema"));
        assert!(svg.contains("&lt;&amp;&gt;&apos;&quot;"));
    }

    #[test]
    fn test_decorations() {
        let row = vec![Cell {
            c: 'u',
            flags: CellFlags::UNDERLINE | CellFlags::STRIKETHROUGH | CellFlags::ITALIC,
            ..Cell::default()
        }];
        let svg = render_svg(&[row].to_vec(), None, Theme::named("asciinema"));
        assert!(svg.contains("text-decoration=\"underline line-through\""));
        assert!(svg.contains("font-style=\"italic\""));
    }

    #[test]
    fn test_title_rendered_in_chrome() {
        let row = vec![Cell::default(); 2];
        let svg = render_svg(&[row].to_vec(), Some("demo <1>"), Theme::named("asciinema"));
        assert!(svg.contains("demo &lt;1&gt;"));
    }

    #[test]
    fn test_thumbnail_scales_via_viewbox() {
        let row = vec![Cell::default(); 10];
        let svg = render_thumbnail(&[row].to_vec(), None, Theme::named("asciinema"), 320, 180);
        assert!(svg.contains("width=\"320\" height=\"180\""));
        assert!(svg.contains("viewBox=\"0 0 "));
    }
}
