//! Emulator and delta interplay: a diff applied to a terminal showing the
//! previous image must reproduce the next image.

use wincast::{Cell, Snapshot, Term};

fn snapshot_of(term: &Term) -> Snapshot {
    let (width, height) = term.size();
    let (cx, cy) = term.cursor();
    let cells: Vec<Cell> = term.rows().iter().flatten().copied().collect();
    Snapshot::new(width, height, cx, cy, cells, 0.0)
}

fn emulate(width: u16, height: u16, bytes: &[u8]) -> Term {
    let mut term = Term::new(width, height);
    term.process(bytes);
    term
}

#[test]
fn test_full_dump_reproduces_emulated_grid() {
    let inputs: [&[u8]; 4] = [
        b"hello world",
        b"\x1b[31mred\x1b[0m plain \x1b[1;44mbold-on-blue\x1b[0m",
        b"line1\r\nline2\r\n\x1b[2;3Hovertype",
        b"wrap this text around the edge of a narrow grid \x1b[38;5;208morange",
    ];
    for input in inputs {
        let original = emulate(20, 6, input);
        let dump = snapshot_of(&original).diff(None);

        let replayed = emulate(20, 6, &dump);
        assert_eq!(
            original.rows(),
            replayed.rows(),
            "grid mismatch for {:?}",
            String::from_utf8_lossy(input)
        );
        assert_eq!(original.cursor(), replayed.cursor());
    }
}

#[test]
fn test_incremental_diff_turns_previous_into_next() {
    let steps: [&[u8]; 4] = [
        b"$ dir\r\n",
        b" Volume in drive C is System\r\n",
        b"\x1b[33m  warning: low disk space\x1b[0m\r\n",
        b"$ \x1b[Kcls",
    ];

    // The "real" console accumulates all steps; the replay side applies one
    // diff per step onto its own terminal.
    let mut live = Term::new(40, 8);
    let mut replay = Term::new(40, 8);
    let mut previous: Option<Snapshot> = None;

    for step in steps {
        live.process(step);
        let current = snapshot_of(&live);
        let patch = current.diff(previous.as_ref());
        replay.process(&patch);

        assert_eq!(live.rows(), replay.rows());
        assert_eq!(live.cursor(), replay.cursor());
        previous = Some(current);
    }
}

#[test]
fn test_full_dump_equals_per_cell_writes() {
    let original = emulate(12, 4, b"ab\x1b[35mcd\r\nef\x1b[0mgh");
    let snap = snapshot_of(&original);

    // Apply the dump in one shot.
    let mut via_dump = Term::new(12, 4);
    via_dump.process(&snap.diff(None));

    // Write every cell individually with explicit addressing.
    let mut via_cells = Term::new(12, 4);
    for y in 0..4u16 {
        for (x, cell) in snap.row(y).iter().enumerate() {
            let mut bytes = format!("\x1b[{};{}H", y + 1, x + 1).into_bytes();
            let mut sgr = String::new();
            cell.push_sgr(&mut sgr);
            bytes.extend_from_slice(sgr.as_bytes());
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(cell.c.encode_utf8(&mut buf).as_bytes());
            via_cells.process(&bytes);
        }
    }

    assert_eq!(via_dump.rows(), via_cells.rows());
}

#[test]
fn test_diff_after_scroll_is_consistent() {
    let mut live = Term::new(10, 3);
    let mut replay = Term::new(10, 3);
    let mut previous: Option<Snapshot> = None;

    for i in 0..8 {
        live.process(format!("row {}\r\n", i).as_bytes());
        let current = snapshot_of(&live);
        let patch = current.diff(previous.as_ref());
        replay.process(&patch);
        assert_eq!(live.rows(), replay.rows(), "after row {}", i);
        previous = Some(current);
    }
}
