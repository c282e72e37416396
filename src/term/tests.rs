use super::*;

fn term_with(width: u16, height: u16, input: &str) -> Term {
    let mut term = Term::new(width, height);
    term.process(input.as_bytes());
    term
}

fn cell(term: &Term, row: usize, col: usize) -> Cell {
    term.rows()[row][col]
}

fn row_text(term: &Term, row: usize) -> String {
    term.rows()[row].iter().map(|c| c.c).collect()
}

#[test]
fn test_plain_text() {
    let term = term_with(10, 3, "hello");
    assert_eq!(term.text_rows()[0], "hello");
    assert_eq!(term.cursor(), (5, 0));
}

#[test]
fn test_crlf_moves_to_next_row() {
    let term = term_with(10, 3, "ab\r\ncd");
    assert_eq!(term.text_rows()[0], "ab");
    assert_eq!(term.text_rows()[1], "cd");
    assert_eq!(term.cursor(), (2, 1));
}

#[test]
fn test_bare_lf_keeps_column() {
    let term = term_with(10, 3, "abc\ndef");
    assert_eq!(term.text_rows()[0], "abc");
    assert_eq!(term.text_rows()[1], "   def");
}

#[test]
fn test_backspace_clamps_at_left_edge() {
    let mut term = Term::new(10, 2);
    term.process(b"a\x08\x08\x08b");
    assert_eq!(term.text_rows()[0], "b");
    assert_eq!(term.cursor(), (1, 0));
}

#[test]
fn test_tab_advances_to_next_stop_writing_spaces() {
    let mut term = Term::new(20, 2);
    term.process(b"ab\tx");
    assert_eq!(term.cursor(), (9, 0));
    assert_eq!(row_text(&term, 0), "ab      x           ");
}

#[test]
fn test_tab_stops_at_row_edge() {
    let mut term = Term::new(10, 2);
    term.process(b"12345678\ty");
    // tab from column 8 targets 16, clamped to the row; y then wraps
    assert_eq!(term.text_rows()[1], "y");
}

#[test]
fn test_wrap_at_right_edge() {
    let term = term_with(4, 3, "abcdef");
    assert_eq!(term.text_rows()[0], "abcd");
    assert_eq!(term.text_rows()[1], "ef");
    assert_eq!(term.cursor(), (2, 1));
}

#[test]
fn test_scroll_drops_top_row() {
    let term = term_with(5, 2, "aa\r\nbb\r\ncc");
    assert_eq!(term.text_rows()[0], "bb");
    assert_eq!(term.text_rows()[1], "cc");
    assert_eq!(term.cursor(), (2, 1));
}

#[test]
fn test_wrap_past_last_row_scrolls() {
    let term = term_with(3, 2, "abcdefghi");
    assert_eq!(term.text_rows()[0], "def");
    assert_eq!(term.text_rows()[1], "ghi");
}

#[test]
fn test_sgr_color_and_bold_sequence() {
    // \e[31mA\e[1mB\e[0mC
    let term = term_with(80, 24, "\x1b[31mA\x1b[1mB\x1b[0mC");

    let a = cell(&term, 0, 0);
    assert_eq!(a.c, 'A');
    assert_eq!(a.fg, Color::Ansi16(1));
    assert!(!a.flags.contains(CellFlags::BOLD));

    let b = cell(&term, 0, 1);
    assert_eq!(b.c, 'B');
    assert_eq!(b.fg, Color::Ansi16(1));
    assert!(b.flags.contains(CellFlags::BOLD));

    let c = cell(&term, 0, 2);
    assert_eq!(c.c, 'C');
    assert_eq!(c.fg, Color::Default);
    assert!(!c.flags.contains(CellFlags::BOLD));
}

#[test]
fn test_cursor_horizontal_absolute() {
    // ABCD then CHA to column 2, overwrite with XYZ
    let term = term_with(10, 2, "ABCD\x1b[2GXYZ");
    assert_eq!(row_text(&term, 0), "AXYZ      ");
}

#[test]
fn test_cursor_position_one_based() {
    let term = term_with(10, 5, "\x1b[3;4Hx");
    assert_eq!(cell(&term, 2, 3).c, 'x');
}

#[test]
fn test_cursor_position_clamps_to_bounds() {
    let term = term_with(10, 5, "\x1b[99;99Hx");
    assert_eq!(cell(&term, 4, 9).c, 'x');
}

#[test]
fn test_relative_motion() {
    let mut term = Term::new(10, 5);
    term.process(b"\x1b[3;3H\x1b[A\x1b[2Cx");
    // up from (2,2) to (2,1), right 2 to (4,1)
    assert_eq!(cell(&term, 1, 4).c, 'x');

    term.process(b"\x1b[5D\x1b[By");
    // left 5 clamps at 0, down 1
    assert_eq!(cell(&term, 2, 0).c, 'y');
}

#[test]
fn test_erase_in_line_modes() {
    let mut term = term_with(6, 1, "abcdef");
    term.process(b"\x1b[1;4H\x1b[K");
    assert_eq!(row_text(&term, 0), "abc   ");

    let mut term = term_with(6, 1, "abcdef");
    term.process(b"\x1b[1;3H\x1b[1K");
    assert_eq!(row_text(&term, 0), "   def");

    let mut term = term_with(6, 1, "abcdef");
    term.process(b"\x1b[2K");
    assert_eq!(row_text(&term, 0), "      ");
}

#[test]
fn test_erase_in_display_modes() {
    let mut term = term_with(4, 3, "aaaa\r\nbbbb\r\ncccc");
    term.process(b"\x1b[2;2H\x1b[J");
    assert_eq!(term.text_rows(), vec!["aaaa", "b", ""]);

    let mut term = term_with(4, 3, "aaaa\r\nbbbb\r\ncccc");
    term.process(b"\x1b[2;2H\x1b[1J");
    assert_eq!(term.text_rows(), vec!["", "  bb", "cccc"]);

    let mut term = term_with(4, 3, "aaaa\r\nbbbb\r\ncccc");
    term.process(b"\x1b[2J");
    assert_eq!(term.text_rows(), vec!["", "", ""]);
}

#[test]
fn test_extended_colors_semicolon_form() {
    let term = term_with(10, 1, "\x1b[38;5;208ma\x1b[48;2;1;2;3mb");
    assert_eq!(cell(&term, 0, 0).fg, Color::Palette256(208));
    assert_eq!(cell(&term, 0, 1).bg, Color::Rgb(1, 2, 3));
}

#[test]
fn test_extended_color_low_indexes_collapse_to_ansi16() {
    let term = term_with(10, 1, "\x1b[38;5;3ma");
    assert_eq!(cell(&term, 0, 0).fg, Color::Ansi16(3));
}

#[test]
fn test_bright_and_background_ranges() {
    let term = term_with(10, 1, "\x1b[93;104ma");
    let a = cell(&term, 0, 0);
    assert_eq!(a.fg, Color::Ansi16(11));
    assert_eq!(a.bg, Color::Ansi16(12));
}

#[test]
fn test_attribute_toggles() {
    let term = term_with(10, 1, "\x1b[1;3;4;9ma\x1b[22;23;24;29mb");
    let a = cell(&term, 0, 0);
    assert_eq!(
        a.flags,
        CellFlags::BOLD | CellFlags::ITALIC | CellFlags::UNDERLINE | CellFlags::STRIKETHROUGH
    );
    assert!(cell(&term, 0, 1).flags.is_empty());
}

#[test]
fn test_osc_sequences_ignored() {
    let term = term_with(20, 2, "\x1b]0;window title\x07visible");
    assert_eq!(term.text_rows()[0], "visible");
}

#[test]
fn test_unhandled_controls_ignored() {
    let term = term_with(10, 2, "a\x01\x02\x05b");
    assert_eq!(term.text_rows()[0], "ab");
}

#[test]
fn test_chunk_boundaries_do_not_matter() {
    let input = "ab\x1b[31mcd\x1b[38;5;100mef\r\ngh\x1b[0m\x1b[2;3Hij".as_bytes();
    let mut whole = Term::new(12, 4);
    whole.process(input);

    let mut split = Term::new(12, 4);
    for chunk in input.chunks(1) {
        split.process(chunk);
    }

    assert_eq!(whole.rows(), split.rows());
    assert_eq!(whole.cursor(), split.cursor());
}

#[test]
fn test_scrolled_in_row_uses_current_background() {
    let mut term = Term::new(4, 2);
    term.process(b"\x1b[41ma\r\nb\r\nc");
    let last = term.rows()[1][3];
    assert_eq!(last.bg, Color::Ansi16(1));
}

#[test]
fn test_resize_preserves_content_and_clamps_cursor() {
    let mut term = term_with(6, 3, "abcdef\r\nghijkl");
    term.resize(4, 2);
    assert_eq!(term.size(), (4, 2));
    assert_eq!(term.text_rows(), vec!["abcd", "ghij"]);
    let (x, y) = term.cursor();
    assert!(x < 4 && y < 2);

    term.resize(8, 3);
    assert_eq!(term.text_rows(), vec!["abcd", "ghij", ""]);
}

#[test]
fn test_wide_glyph_occupies_two_columns() {
    let term = term_with(10, 1, "日x");
    assert_eq!(cell(&term, 0, 0).c, '日');
    assert_eq!(cell(&term, 0, 1).c, ' ');
    assert_eq!(cell(&term, 0, 2).c, 'x');
}
