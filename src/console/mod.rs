//! Host console access
//!
//! [`ConsoleSession`] is a scoped handle to the process console: acquiring it
//! opens the output handle and switches it into virtual-terminal mode, and
//! dropping it restores the original mode best-effort. All reads go through
//! the session; nothing in this crate touches a process-global handle.

pub mod attr;

#[cfg(windows)]
mod windows;

use crate::error::Result;
use crate::snapshot::Snapshot;

/// A key press observed on the console input handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The translated Unicode character, NUL for pure modifier events.
    pub c: char,
}

/// Scoped access to the host console's screen buffer and input handle.
pub struct ConsoleSession {
    #[cfg(windows)]
    inner: windows::WinConsole,
}

impl ConsoleSession {
    /// Open the console handles and enable virtual-terminal output
    /// processing. Enabling is idempotent; an already-enabled console is not
    /// an error. Fails with `ConsoleUnavailable` when the process has no
    /// console, and with `UnsupportedPlatform` off Windows.
    pub fn acquire() -> Result<Self> {
        #[cfg(windows)]
        {
            Ok(Self {
                inner: windows::WinConsole::acquire()?,
            })
        }
        #[cfg(not(windows))]
        {
            Err(crate::error::Error::UnsupportedPlatform)
        }
    }

    /// Current visible window of the screen buffer, in character cells.
    pub fn window_size(&self) -> Result<(u16, u16)> {
        #[cfg(windows)]
        {
            self.inner.window_size()
        }
        #[cfg(not(windows))]
        {
            Err(crate::error::Error::ConsoleUnavailable)
        }
    }

    /// Read every visible cell, its attributes and the cursor as one logical
    /// sample. A capture racing a window resize is discarded and retried
    /// once; a second mismatch reports `ConsoleUnavailable` and the caller
    /// tries again on its next tick.
    pub fn capture(&self) -> Result<Snapshot> {
        #[cfg(windows)]
        {
            self.inner.capture()
        }
        #[cfg(not(windows))]
        {
            Err(crate::error::Error::ConsoleUnavailable)
        }
    }

    /// Non-blocking poll of the console input queue. Returns the next
    /// key-down character, if any, without waiting.
    pub fn poll_key(&self) -> Result<Option<KeyPress>> {
        #[cfg(windows)]
        {
            self.inner.poll_key()
        }
        #[cfg(not(windows))]
        {
            Err(crate::error::Error::ConsoleUnavailable)
        }
    }
}
