//! Recording writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::asciicast::{Event, Header};
use crate::error::{Error, Result};

/// Streaming writer for a recording: header first, then one event per line.
///
/// The writer moves from open to closed exactly once; any write after
/// [`Writer::close`] fails. Events are flushed per line so a crash loses at
/// most the line being written.
pub struct Writer<W: Write> {
    out: W,
    closed: bool,
    event_count: u64,
    last_time: f64,
}

impl Writer<BufWriter<File>> {
    /// Create `path` (truncating) and write the header line.
    pub fn create(path: impl AsRef<Path>, header: &Header) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write> Writer<W> {
    /// Wrap a sink and write the header line.
    pub fn new(mut out: W, header: &Header) -> Result<Self> {
        out.write_all(header.to_json_line().as_bytes())?;
        out.write_all(b"\n")?;
        Ok(Self {
            out,
            closed: false,
            event_count: 0,
            last_time: 0.0,
        })
    }

    /// Append one event line.
    pub fn write_event(&mut self, event: &Event) -> Result<()> {
        if self.closed {
            return Err(Error::Io(std::io::Error::other("writer is closed")));
        }
        self.out.write_all(event.to_json_line().as_bytes())?;
        self.out.write_all(b"\n")?;
        self.event_count += 1;
        self.last_time = event.time;
        Ok(())
    }

    /// Number of events written so far.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Time of the most recently written event.
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    /// Flush and mark closed. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.out.flush()?;
            self.closed = true;
        }
        Ok(())
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
