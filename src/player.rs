//! Playback clock
//!
//! Replays a recording to a writer (normally stdout) with inter-event
//! sleeps scaled by the speed factor. Sleeps are chopped into 50 ms quanta
//! so pause and stop requests from another thread take effect promptly.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::asciicast::{EventData, Reader};
use crate::error::Result;

/// Granularity of interruptible sleeps.
const SLEEP_QUANTUM: Duration = Duration::from_millis(50);

/// Playback configuration.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Time scale. `f64::INFINITY` disables sleeping entirely.
    pub speed: f64,
    /// Largest inter-event gap honored, in recording seconds.
    pub idle_cap: Option<f64>,
    /// Pause automatically when a marker event is reached.
    pub pause_on_markers: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            idle_cap: None,
            pause_on_markers: false,
        }
    }
}

/// Playback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Paused,
    Stopped,
}

/// Event-paced replayer.
pub struct Player {
    config: PlayerConfig,
    state: PlayerState,
    stop: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            state: PlayerState::Idle,
            stop: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Flag another thread can set to stop playback.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Flag another thread can toggle to pause and resume playback.
    pub fn pause_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.paused)
    }

    /// Replay the recording, writing Output payloads to `out`.
    pub fn play<R: BufRead, W: Write>(&mut self, reader: Reader<R>, mut out: W) -> Result<()> {
        self.state = PlayerState::Playing;
        let mut last_time = 0.0f64;

        for event in reader.events() {
            let event = event?;
            if self.stopped() {
                break;
            }

            let mut gap = (event.time - last_time).max(0.0);
            if let Some(cap) = self.config.idle_cap {
                if cap > 0.0 {
                    gap = gap.min(cap);
                }
            }
            if self.config.speed.is_finite() && self.config.speed > 0.0 {
                self.sleep_interruptible(gap / self.config.speed);
            }
            if self.stopped() {
                break;
            }
            last_time = event.time;

            match &event.data {
                EventData::Output(data) => {
                    out.write_all(data.as_bytes())?;
                    out.flush()?;
                }
                EventData::Marker(_) if self.config.pause_on_markers => {
                    self.paused.store(true, Ordering::Release);
                    self.wait_while_paused();
                }
                _ => {}
            }
        }

        self.state = PlayerState::Stopped;
        Ok(())
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn sleep_interruptible(&mut self, seconds: f64) {
        // Bound the wait so a pathological timestamp cannot overflow Duration.
        let mut remaining = Duration::from_secs_f64(seconds.clamp(0.0, 1e9));
        while !remaining.is_zero() {
            if self.stopped() {
                return;
            }
            self.wait_while_paused();
            let quantum = remaining.min(SLEEP_QUANTUM);
            std::thread::sleep(quantum);
            remaining -= quantum;
        }
    }

    fn wait_while_paused(&mut self) {
        while self.paused.load(Ordering::Acquire) && !self.stopped() {
            self.state = PlayerState::Paused;
            std::thread::sleep(SLEEP_QUANTUM);
        }
        if self.state == PlayerState::Paused {
            self.state = PlayerState::Playing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;
    use std::io::Cursor;
    use std::time::Instant;

    fn reader(text: &str) -> Reader<BufReader<Cursor<Vec<u8>>>> {
        Reader::new(BufReader::new(Cursor::new(text.as_bytes().to_vec()))).unwrap()
    }

    const CAST: &str = concat!(
        "{\"version\":2,\"width\":80,\"height\":24}\n",
        "[0.0,\"o\",\"a\"]\n",
        "[0.02,\"i\",\"ignored\"]\n",
        "[0.04,\"o\",\"b\"]\n",
        "[0.05,\"m\",\"mark\"]\n",
        "[0.06,\"o\",\"c\"]\n",
    );

    #[test]
    fn test_outputs_only_output_payloads() {
        let mut out = Vec::new();
        let mut player = Player::new(PlayerConfig {
            speed: f64::INFINITY,
            ..PlayerConfig::default()
        });
        player.play(reader(CAST), &mut out).unwrap();
        assert_eq!(out, b"abc");
        assert_eq!(player.state(), PlayerState::Stopped);
    }

    #[test]
    fn test_infinite_speed_skips_sleeping() {
        let text = concat!(
            "{\"version\":2,\"width\":80,\"height\":24}\n",
            "[0.0,\"o\",\"x\"]\n",
            "[30.0,\"o\",\"y\"]\n",
        );
        let mut out = Vec::new();
        let mut player = Player::new(PlayerConfig {
            speed: f64::INFINITY,
            ..PlayerConfig::default()
        });
        let begin = Instant::now();
        player.play(reader(text), &mut out).unwrap();
        assert!(begin.elapsed() < Duration::from_secs(1));
        assert_eq!(out, b"xy");
    }

    #[test]
    fn test_idle_cap_bounds_sleeps() {
        let text = concat!(
            "{\"version\":2,\"width\":80,\"height\":24}\n",
            "[0.0,\"o\",\"x\"]\n",
            "[60.0,\"o\",\"y\"]\n",
        );
        let mut out = Vec::new();
        let mut player = Player::new(PlayerConfig {
            speed: 1.0,
            idle_cap: Some(0.05),
            pause_on_markers: false,
        });
        let begin = Instant::now();
        player.play(reader(text), &mut out).unwrap();
        assert!(begin.elapsed() < Duration::from_secs(2));
        assert_eq!(out, b"xy");
    }

    #[test]
    fn test_stop_flag_interrupts() {
        let text = concat!(
            "{\"version\":2,\"width\":80,\"height\":24}\n",
            "[0.0,\"o\",\"x\"]\n",
            "[3600.0,\"o\",\"never\"]\n",
        );
        let mut player = Player::new(PlayerConfig::default());
        let stop = player.stop_handle();
        let begin = Instant::now();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(120));
            stop.store(true, Ordering::Release);
        });
        let mut out = Vec::new();
        player.play(reader(text), &mut out).unwrap();
        assert!(begin.elapsed() < Duration::from_secs(10));
        assert_eq!(out, b"x");
        assert_eq!(player.state(), PlayerState::Stopped);
    }
}
