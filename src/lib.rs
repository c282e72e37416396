//! Record Windows console sessions and turn them into shareable artifacts
//!
//! wincast samples the visible console screen buffer on a background thread,
//! turns consecutive samples into minimal ANSI patches and writes them as an
//! asciicast v2 recording. The same crate replays those recordings through a
//! built-in terminal emulator and renders them out again.
//!
//! ## Recording
//! - Direct screen-buffer sampling (no pseudo terminal required)
//! - Delta compression: only changed cells are written per tick
//! - Idle-time capping, pause/resume, named markers, resize tracking
//! - Interactive shell sessions or a single launched command
//!
//! ## Playback and export
//! - Paced terminal playback with speed factor and idle clamping
//! - Asciicast transforms: speed change, trimming, concatenation
//! - Still frames as SVG (full size or thumbnail) and standalone HTML
//! - Animated GIF, MP4 and WebM through an ffmpeg subprocess
//! - Nine built-in color themes
//!
//! The recording file format is asciicast v2: a JSON header line followed by
//! one `[time, code, data]` event array per line.

pub mod asciicast;
pub mod cell;
pub mod color;
pub mod console;
pub mod error;
pub mod export;
pub mod player;
pub mod recorder;
pub mod render;
pub mod snapshot;
pub mod term;
pub mod theme;

pub use asciicast::{CastInfo, Event, EventData, Header, Reader, Writer};
pub use cell::{Cell, CellFlags};
pub use color::Color;
pub use error::{Error, Result};
pub use export::{export, ExportFormat, ExportOptions, FrameTime};
pub use player::{Player, PlayerConfig, PlayerState};
pub use recorder::{Recorder, RecorderConfig, RecorderState};
pub use snapshot::Snapshot;
pub use term::Term;
pub use theme::{Rgb, Theme, THEMES};
