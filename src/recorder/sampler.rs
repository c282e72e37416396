//! Background sampling loop

use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::asciicast::{Event, Writer};
use crate::console::ConsoleSession;
use crate::error::{Error, Result};
use crate::recorder::Shared;
use crate::snapshot::Snapshot;

/// Owns the console, the writer and the diff state. Runs on its own thread;
/// the foreground communicates only through [`Shared`].
pub(crate) struct Sampler {
    console: ConsoleSession,
    writer: Writer<BufWriter<File>>,
    shared: Arc<Shared>,
    interval: Duration,
    idle_cap: Option<f64>,
    started: Instant,
    last_snapshot: Option<Snapshot>,
    last_event_time: f64,
    console_warned: bool,
}

impl Sampler {
    pub(crate) fn new(
        console: ConsoleSession,
        writer: Writer<BufWriter<File>>,
        shared: Arc<Shared>,
        interval: Duration,
        idle_cap: Option<f64>,
    ) -> Self {
        Self {
            console,
            writer,
            shared,
            interval,
            idle_cap,
            started: Instant::now(),
            last_snapshot: None,
            last_event_time: 0.0,
            console_warned: false,
        }
    }

    pub(crate) fn run(mut self) -> Result<()> {
        loop {
            if self.shared.stop.load(Ordering::Acquire) {
                break;
            }
            let tick_started = Instant::now();

            let result = self.tick();
            if let Err(err) = result {
                // Output file errors are fatal; close what we can and surface.
                let _ = self.writer.close();
                return Err(err);
            }

            let elapsed = tick_started.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.writer.close()
    }

    /// One sampling tick: drain a pending marker, then (unless paused) take
    /// a snapshot, emit a resize on dimension change, and append the delta.
    fn tick(&mut self) -> Result<()> {
        if let Some(label) = self.take_marker() {
            let time = self.capped_now();
            self.writer.write_event(&Event::marker(time, label))?;
            self.last_event_time = time;
        }

        if self.shared.paused.load(Ordering::Acquire) {
            return Ok(());
        }

        let snapshot = match self.console.capture() {
            Ok(snapshot) => snapshot,
            Err(Error::ConsoleUnavailable) => {
                if !self.console_warned {
                    warn!("console read failed; will keep retrying");
                    self.console_warned = true;
                }
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        if let Some(prev) = &self.last_snapshot {
            if prev.size() != snapshot.size() {
                let time = self.capped_now();
                let (width, height) = snapshot.size();
                self.writer
                    .write_event(&Event::resize(time, width, height))?;
                self.last_event_time = time;
            }
        }

        let patch = snapshot.diff(self.last_snapshot.as_ref());
        if !patch.is_empty() {
            let time = self.capped_now();
            let data = String::from_utf8_lossy(&patch).into_owned();
            self.writer.write_event(&Event::output(time, data))?;
            self.last_event_time = time;
        }

        self.last_snapshot = Some(snapshot);
        Ok(())
    }

    fn take_marker(&mut self) -> Option<String> {
        match self.shared.marker.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        }
    }

    /// The current offset with the idle cap applied: a gap larger than the
    /// cap is recorded as exactly the cap. Never moves time backwards.
    fn capped_now(&self) -> f64 {
        let now = self.started.elapsed().as_secs_f64();
        match self.idle_cap {
            Some(cap) if cap > 0.0 && now - self.last_event_time > cap => {
                self.last_event_time + cap
            }
            _ => now.max(self.last_event_time),
        }
    }
}
