//! Capture engine
//!
//! Records the live console into an asciicast file. A background sampler
//! thread polls the screen buffer at a fixed cadence and appends delta
//! events; the foreground thread talks to it exclusively through two atomic
//! flags and a pending-marker slot, so no lock is ever held across I/O.

mod sampler;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::asciicast::{Header, Writer};
use crate::console::ConsoleSession;
use crate::error::{Error, Result};
use sampler::Sampler;

/// Smallest allowed sampling interval.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(33);

/// How long past the child's exit the sampler keeps running in command mode,
/// in sample intervals, so trailing output still lands in the recording.
const DRAIN_INTERVALS: u32 = 3;

/// How long `stop` waits for the sampler before abandoning it.
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// End-of-recording keystroke in interactive mode (Ctrl+D).
const KEY_END: char = '\x04';
/// Marker keystroke in interactive mode (Ctrl+\).
const KEY_MARKER: char = '\x1c';
/// Pause-toggle keystroke in interactive mode (Ctrl+P).
const KEY_PAUSE: char = '\x10';

/// Capture engine configuration.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub title: Option<String>,
    pub command: Option<String>,
    /// Largest inter-event gap preserved in the recording. Zero or negative
    /// disables capping.
    pub idle_cap: Option<f64>,
    /// Sampling cadence; floored to [`MIN_SAMPLE_INTERVAL`].
    pub sample_interval: Duration,
    /// Environment variables captured into the header.
    pub env_keys: Vec<String>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            title: None,
            command: None,
            idle_cap: None,
            sample_interval: MIN_SAMPLE_INTERVAL,
            env_keys: vec!["SHELL".to_string(), "TERM".to_string()],
        }
    }
}

/// Capture engine state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

/// Rendezvous between the foreground thread and the sampler.
pub(crate) struct Shared {
    pub(crate) stop: AtomicBool,
    pub(crate) paused: AtomicBool,
    pub(crate) marker: Mutex<Option<String>>,
}

/// Records one console session into one output file.
pub struct Recorder {
    config: RecorderConfig,
    state: RecorderState,
    shared: Arc<Shared>,
    sampler: Option<JoinHandle<Result<()>>>,
    marker_seq: u32,
}

impl Recorder {
    /// Create an engine. Fails with `UnsupportedPlatform` when no Windows
    /// console can ever be available.
    pub fn new(mut config: RecorderConfig) -> Result<Self> {
        if !cfg!(windows) {
            return Err(Error::UnsupportedPlatform);
        }
        if config.sample_interval < MIN_SAMPLE_INTERVAL {
            config.sample_interval = MIN_SAMPLE_INTERVAL;
        }
        Ok(Self {
            config,
            state: RecorderState::Idle,
            shared: Arc::new(Shared {
                stop: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                marker: Mutex::new(None),
            }),
            sampler: None,
            marker_seq: 0,
        })
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Open the output file, write the header and launch the sampler.
    pub fn start(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.state != RecorderState::Idle {
            return Err(Error::Usage("recorder already started".to_string()));
        }

        let console = ConsoleSession::acquire()?;
        let (width, height) = console.window_size()?;

        let mut env = BTreeMap::new();
        for key in &self.config.env_keys {
            if let Ok(value) = std::env::var(key) {
                env.insert(key.clone(), value);
            }
        }

        let header = Header {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs()),
            idle_time_limit: self.config.idle_cap.filter(|&cap| cap > 0.0),
            command: self.config.command.clone(),
            title: self.config.title.clone(),
            env: if env.is_empty() { None } else { Some(env) },
            ..Header::new(width, height)
        };

        let writer = Writer::create(path, &header)?;
        let sampler = Sampler::new(
            console,
            writer,
            Arc::clone(&self.shared),
            self.config.sample_interval,
            self.config.idle_cap,
        );
        self.sampler = Some(std::thread::spawn(move || sampler.run()));
        self.state = RecorderState::Recording;
        debug!(width, height, "recording started");
        Ok(())
    }

    /// Skip sampling until resumed. The cadence keeps running.
    pub fn pause(&mut self) {
        if self.state == RecorderState::Recording {
            self.shared.paused.store(true, Ordering::Release);
            self.state = RecorderState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == RecorderState::Paused {
            self.shared.paused.store(false, Ordering::Release);
            self.state = RecorderState::Recording;
        }
    }

    /// Queue a marker; the sampler emits it on its next tick.
    pub fn mark(&mut self, label: impl Into<String>) -> Result<()> {
        match self.state {
            RecorderState::Recording | RecorderState::Paused => {
                let mut slot = self
                    .shared
                    .marker
                    .lock()
                    .map_err(|_| Error::Usage("marker slot poisoned".to_string()))?;
                *slot = Some(label.into());
                Ok(())
            }
            _ => Err(Error::Usage(
                "markers require an active recording".to_string(),
            )),
        }
    }

    /// Signal the sampler, wait for its final tick and close out.
    pub fn stop(&mut self) -> Result<()> {
        if matches!(self.state, RecorderState::Idle | RecorderState::Stopped) {
            self.state = RecorderState::Stopped;
            return Ok(());
        }
        self.shared.stop.store(true, Ordering::Release);
        self.state = RecorderState::Stopped;

        let Some(handle) = self.sampler.take() else {
            return Ok(());
        };

        let deadline = Instant::now() + JOIN_TIMEOUT;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("sampler did not stop in time; abandoning it");
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(Error::Io(std::io::Error::other("sampler thread panicked"))),
        }
    }

    /// Interactive mode: sample until the end-of-recording keystroke.
    ///
    /// The foreground thread polls the console input queue on a 50 ms tick
    /// (a deliberate non-blocking choice): Ctrl+D stops, Ctrl+\ queues a
    /// marker, Ctrl+P toggles pause.
    pub fn record_interactive(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.start(path)?;
        let input = ConsoleSession::acquire()?;
        loop {
            match input.poll_key() {
                Ok(Some(key)) => match key.c {
                    KEY_END => break,
                    KEY_MARKER => {
                        self.marker_seq += 1;
                        let label = format!("marker {}", self.marker_seq);
                        self.mark(label)?;
                    }
                    KEY_PAUSE => {
                        if self.state == RecorderState::Paused {
                            self.resume();
                        } else {
                            self.pause();
                        }
                    }
                    _ => {}
                },
                Ok(None) => std::thread::sleep(Duration::from_millis(50)),
                Err(Error::ConsoleUnavailable) => {
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(err) => {
                    let _ = self.stop();
                    return Err(err);
                }
            }
        }
        self.stop()
    }

    /// Command mode: sample while a child process runs, then drain trailing
    /// output for a few intervals before stopping. The child is always
    /// waited for, never killed.
    pub fn record_command(&mut self, path: impl AsRef<Path>, command: &str) -> Result<()> {
        self.start(path)?;

        let spawned = shell_command(command).spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                let _ = self.stop();
                return Err(Error::Io(err));
            }
        };

        let status = child.wait();
        std::thread::sleep(self.config.sample_interval * DRAIN_INTERVALS);
        let stop_result = self.stop();

        match status {
            Ok(status) => debug!(code = status.code(), "command exited"),
            Err(err) => {
                warn!(error = %err, "failed to wait for command");
            }
        }
        stop_result
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn shell_command(command: &str) -> std::process::Command {
    #[cfg(windows)]
    {
        let mut cmd = std::process::Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = std::process::Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RecorderConfig::default();
        assert_eq!(config.sample_interval, MIN_SAMPLE_INTERVAL);
        assert_eq!(config.env_keys, vec!["SHELL", "TERM"]);
        assert!(config.idle_cap.is_none());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_construction_requires_windows() {
        let result = Recorder::new(RecorderConfig::default());
        assert!(matches!(result, Err(Error::UnsupportedPlatform)));
    }

    #[cfg(windows)]
    #[test]
    fn test_interval_floor_applied() {
        let recorder = Recorder::new(RecorderConfig {
            sample_interval: Duration::from_millis(1),
            ..RecorderConfig::default()
        })
        .unwrap();
        assert_eq!(recorder.config.sample_interval, MIN_SAMPLE_INTERVAL);
    }
}
