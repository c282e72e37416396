//! Error types for recording and export operations

use std::fmt;

/// Errors that can occur while recording, reading or exporting a cast
#[derive(Debug)]
pub enum Error {
    /// The process has no console, or the console handle cannot be opened
    ConsoleUnavailable,

    /// Malformed recording header or unsupported format version
    Format(String),

    /// IO error
    Io(std::io::Error),

    /// Export failure: unsupported format, missing muxer, muxer exit status
    Export(String),

    /// Live capture requested on a platform without a Windows console
    UnsupportedPlatform,

    /// An operation invoked in a state that does not allow it
    Usage(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConsoleUnavailable => write!(f, "console unavailable"),
            Error::Format(msg) => write!(f, "invalid recording: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Export(msg) => write!(f, "export failed: {}", msg),
            Error::UnsupportedPlatform => {
                write!(f, "recording requires a Windows console")
            }
            Error::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Format(err.to_string())
    }
}

/// Result type for recording and export operations
pub type Result<T> = std::result::Result<T, Error>;
