//! Win32 console implementation

use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Console::{
    GetConsoleMode, GetConsoleScreenBufferInfo, GetNumberOfConsoleInputEvents, GetStdHandle,
    ReadConsoleInputW, ReadConsoleOutputW, SetConsoleMode, CHAR_INFO, CONSOLE_MODE,
    CONSOLE_SCREEN_BUFFER_INFO, COORD, ENABLE_VIRTUAL_TERMINAL_PROCESSING, INPUT_RECORD,
    SMALL_RECT, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};

use super::{attr, KeyPress};
use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::snapshot::{monotonic_seconds, Snapshot};

const KEY_EVENT_TYPE: u16 = 1;

/// Raw console handles plus the output mode to restore on drop.
///
/// Handles are stored as plain integers so the session can move into the
/// sampler thread; console pseudo-handles are process-wide.
pub(crate) struct WinConsole {
    output: usize,
    input: usize,
    original_mode: CONSOLE_MODE,
}

impl WinConsole {
    pub(crate) fn acquire() -> Result<Self> {
        let output = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) }
            .map_err(|_| Error::ConsoleUnavailable)?;
        let input =
            unsafe { GetStdHandle(STD_INPUT_HANDLE) }.map_err(|_| Error::ConsoleUnavailable)?;
        if output.is_invalid() || input.is_invalid() {
            return Err(Error::ConsoleUnavailable);
        }

        let mut mode = CONSOLE_MODE(0);
        unsafe { GetConsoleMode(output, &mut mode) }.map_err(|_| Error::ConsoleUnavailable)?;
        if !mode.contains(ENABLE_VIRTUAL_TERMINAL_PROCESSING) {
            // Best-effort and idempotent; an already-enabled console stays as is.
            let _ = unsafe { SetConsoleMode(output, mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING) };
        }

        Ok(Self {
            output: output.0 as usize,
            input: input.0 as usize,
            original_mode: mode,
        })
    }

    fn output_handle(&self) -> HANDLE {
        HANDLE(self.output as *mut core::ffi::c_void)
    }

    fn input_handle(&self) -> HANDLE {
        HANDLE(self.input as *mut core::ffi::c_void)
    }

    fn screen_info(&self) -> Result<CONSOLE_SCREEN_BUFFER_INFO> {
        let mut info = CONSOLE_SCREEN_BUFFER_INFO::default();
        unsafe { GetConsoleScreenBufferInfo(self.output_handle(), &mut info) }
            .map_err(|_| Error::ConsoleUnavailable)?;
        Ok(info)
    }

    pub(crate) fn window_size(&self) -> Result<(u16, u16)> {
        let info = self.screen_info()?;
        Ok(rect_size(&info.srWindow))
    }

    pub(crate) fn capture(&self) -> Result<Snapshot> {
        // A resize between the measurement and the cell read would hand back
        // a torn image; verify the window afterwards and retry once.
        for _ in 0..2 {
            let pre = self.screen_info()?;
            let (cols, rows) = rect_size(&pre.srWindow);
            if cols == 0 || rows == 0 {
                return Err(Error::ConsoleUnavailable);
            }

            let mut buf = vec![CHAR_INFO::default(); cols as usize * rows as usize];
            let mut region = pre.srWindow;
            unsafe {
                ReadConsoleOutputW(
                    self.output_handle(),
                    buf.as_mut_ptr(),
                    COORD {
                        X: cols as i16,
                        Y: rows as i16,
                    },
                    COORD { X: 0, Y: 0 },
                    &mut region,
                )
            }
            .map_err(|_| Error::ConsoleUnavailable)?;

            let post = self.screen_info()?;
            if rect_size(&post.srWindow) != (cols, rows) {
                continue;
            }

            let cells: Vec<Cell> = buf
                .iter()
                .map(|ci| {
                    let raw = unsafe { ci.Char.UnicodeChar } as u32;
                    let c = match char::from_u32(raw) {
                        Some(c) if raw >= 0x20 => c,
                        _ => ' ',
                    };
                    attr::cell_from_attr_word(c, ci.Attributes)
                })
                .collect();

            let win = post.srWindow;
            let cursor_x = (post.dwCursorPosition.X - win.Left)
                .clamp(0, cols as i16 - 1) as u16;
            let cursor_y = (post.dwCursorPosition.Y - win.Top)
                .clamp(0, rows as i16 - 1) as u16;

            return Ok(Snapshot::new(
                cols,
                rows,
                cursor_x,
                cursor_y,
                cells,
                monotonic_seconds(),
            ));
        }
        Err(Error::ConsoleUnavailable)
    }

    pub(crate) fn poll_key(&self) -> Result<Option<KeyPress>> {
        loop {
            let mut pending = 0u32;
            unsafe { GetNumberOfConsoleInputEvents(self.input_handle(), &mut pending) }
                .map_err(|_| Error::ConsoleUnavailable)?;
            if pending == 0 {
                return Ok(None);
            }

            let mut records = [INPUT_RECORD::default(); 1];
            let mut read = 0u32;
            unsafe { ReadConsoleInputW(self.input_handle(), &mut records, &mut read) }
                .map_err(|_| Error::ConsoleUnavailable)?;
            if read == 0 {
                return Ok(None);
            }

            let record = &records[0];
            if record.EventType != KEY_EVENT_TYPE {
                continue;
            }
            let key = unsafe { &record.Event.KeyEvent };
            if !key.bKeyDown.as_bool() {
                continue;
            }
            let raw = unsafe { key.uChar.UnicodeChar } as u32;
            if let Some(c) = char::from_u32(raw) {
                if c != '\0' {
                    return Ok(Some(KeyPress { c }));
                }
            }
        }
    }
}

impl Drop for WinConsole {
    fn drop(&mut self) {
        let _ = unsafe { SetConsoleMode(self.output_handle(), self.original_mode) };
    }
}

fn rect_size(rect: &SMALL_RECT) -> (u16, u16) {
    let cols = (rect.Right - rect.Left + 1).max(0) as u16;
    let rows = (rect.Bottom - rect.Top + 1).max(0) as u16;
    (cols, rows)
}
