//! Export pipeline
//!
//! Every transform reads a source recording and writes a brand new file;
//! sources are never mutated, and a failing transform removes its partial
//! output before surfacing the error. The output format is a tagged variant
//! dispatched in one place.

mod html;
mod transform;
mod video;

pub use transform::concat;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::theme::Theme;

/// Supported export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Cast,
    Txt,
    Json,
    Html,
    Svg,
    Gif,
    Mp4,
    Webm,
}

impl ExportFormat {
    /// Parse a format name as given on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cast" => Some(Self::Cast),
            "txt" | "text" => Some(Self::Txt),
            "json" => Some(Self::Json),
            "html" => Some(Self::Html),
            "svg" => Some(Self::Svg),
            "gif" => Some(Self::Gif),
            "mp4" => Some(Self::Mp4),
            "webm" => Some(Self::Webm),
            _ => None,
        }
    }

    /// Infer the format from an output path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Cast => "cast",
            Self::Txt => "txt",
            Self::Json => "json",
            Self::Html => "html",
            Self::Svg => "svg",
            Self::Gif => "gif",
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }
}

/// The point in the timeline a still frame is rendered from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameTime {
    First,
    Middle,
    Last,
    At(f64),
}

impl FrameTime {
    /// Parse `first`, `middle`, `last` or a number of seconds.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "first" => Some(Self::First),
            "middle" => Some(Self::Middle),
            "last" => Some(Self::Last),
            _ => text.parse::<f64>().ok().filter(|s| *s >= 0.0).map(Self::At),
        }
    }

    pub(crate) fn resolve(&self, duration: f64) -> f64 {
        match self {
            Self::First => 0.0,
            Self::Middle => duration / 2.0,
            Self::Last => duration,
            Self::At(seconds) => *seconds,
        }
    }
}

/// Options shared by all export transforms.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Explicit format; inferred from the output extension when `None`.
    pub format: Option<ExportFormat>,
    /// Output path; derived from the source when `None`.
    pub output: Option<PathBuf>,
    /// Replacement title for the exported artifact.
    pub title: Option<String>,
    /// Frames per second for video formats.
    pub fps: u32,
    /// Theme name for rendered formats.
    pub theme: String,
    /// Size multiplier for still frames.
    pub scale: f64,
    /// Timeline position for still frames.
    pub at: FrameTime,
    /// Time scale for the cast transform.
    pub speed: f64,
    /// Idle cap re-applied by the cast transform.
    pub idle_cap: Option<f64>,
    /// Keep only events in `[start, end]`, rebasing times to `start`.
    pub trim: Option<(f64, f64)>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: None,
            output: None,
            title: None,
            fps: 30,
            theme: "asciinema".to_string(),
            scale: 1.0,
            at: FrameTime::Last,
            speed: 1.0,
            idle_cap: None,
            trim: None,
        }
    }
}

/// Run one export and return the path written.
pub fn export(source: &Path, opts: &ExportOptions) -> Result<PathBuf> {
    let format = opts
        .format
        .or_else(|| opts.output.as_deref().and_then(ExportFormat::from_path))
        .ok_or_else(|| {
            Error::Export(
                "cannot determine output format; pass a format or a known extension".to_string(),
            )
        })?;
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| source.with_extension(format.extension()));
    let theme = Theme::named(&opts.theme);

    let result = match format {
        ExportFormat::Cast => transform::export_cast(source, &output, opts),
        ExportFormat::Txt => transform::export_txt(source, &output),
        ExportFormat::Json => transform::export_json(source, &output),
        ExportFormat::Html => html::export_html(source, &output, theme, opts.title.as_deref()),
        ExportFormat::Svg => transform::export_svg(source, &output, theme, opts),
        ExportFormat::Gif | ExportFormat::Mp4 | ExportFormat::Webm => {
            video::export_video(source, &output, format, opts, theme)
        }
    };

    match result {
        Ok(()) => Ok(output),
        Err(err) => {
            // Never leave a partial artifact behind.
            let _ = std::fs::remove_file(&output);
            Err(err)
        }
    }
}
