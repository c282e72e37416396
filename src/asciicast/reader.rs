//! Recording reader

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::asciicast::{Event, EventData, Header};
use crate::error::{Error, Result};

/// Streaming reader: parses the header at construction, then iterates events
/// one line at a time. Lines that are not well-formed events are skipped,
/// which keeps the reader forward compatible with comment and extension
/// lines. Nothing beyond the current line is buffered.
pub struct Reader<R: BufRead> {
    header: Header,
    lines: Lines<R>,
}

impl Reader<BufReader<File>> {
    /// Open a recording file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> Reader<R> {
    /// Consume the first non-empty line as the header and validate it.
    pub fn new(input: R) -> Result<Self> {
        let mut lines = input.lines();
        let header = loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    break Header::parse(&line)?;
                }
                None => return Err(Error::Format("empty recording".to_string())),
            }
        };
        Ok(Self { header, lines })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Iterate the remaining events.
    pub fn events(self) -> Events<R> {
        Events { lines: self.lines }
    }

    /// Single pass over the recording computing its summary. The duration is
    /// the header's when present, otherwise the last event's time.
    pub fn info(self) -> Result<CastInfo> {
        let header = self.header.clone();
        let mut event_count = 0u64;
        let mut marker_count = 0u64;
        let mut last_time = 0.0f64;
        for event in self.events() {
            let event = event?;
            event_count += 1;
            if matches!(event.data, EventData::Marker(_)) {
                marker_count += 1;
            }
            last_time = event.time;
        }
        let duration = header.duration.unwrap_or(last_time);
        Ok(CastInfo {
            header,
            event_count,
            marker_count,
            duration,
        })
    }
}

/// Iterator over the events of a recording.
///
/// Yields `Err` only for I/O failures; unparseable lines are skipped.
pub struct Events<R: BufRead> {
    lines: Lines<R>,
}

impl<R: BufRead> Iterator for Events<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    if let Some(event) = Event::parse(&line) {
                        return Some(Ok(event));
                    }
                }
                Err(err) => return Some(Err(Error::Io(err))),
            }
        }
    }
}

/// Summary of a recording, computed in one pass.
#[derive(Debug, Clone)]
pub struct CastInfo {
    pub header: Header,
    pub event_count: u64,
    pub marker_count: u64,
    pub duration: f64,
}
