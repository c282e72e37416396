//! Recording header

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::asciicast::FORMAT_VERSION;
use crate::error::{Error, Result};

/// The header object on the first line of a recording.
///
/// `version`, `width` and `height` are required; everything else is optional
/// and omitted from the serialized form when absent. The `theme` value is
/// forwarded verbatim so foreign players' theme objects survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub version: u32,
    pub width: u16,
    pub height: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_time_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<serde_json::Value>,
}

impl Header {
    /// A minimal version-2 header for the given terminal size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            version: FORMAT_VERSION,
            width,
            height,
            timestamp: None,
            duration: None,
            idle_time_limit: None,
            command: None,
            title: None,
            env: None,
            theme: None,
        }
    }

    /// Parse and validate a header line.
    pub fn parse(line: &str) -> Result<Self> {
        let header: Header = serde_json::from_str(line)?;
        header.validate()?;
        Ok(header)
    }

    fn validate(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(Error::Format(format!(
                "unsupported version {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::Format(format!(
                "invalid terminal size {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Serialize as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_header_round_trip() {
        let header = Header::new(120, 30);
        let line = header.to_json_line();
        assert!(line.contains("\"version\":2"));
        assert!(line.contains("\"width\":120"));
        let parsed = Header::parse(&line).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_optional_fields_omitted_when_absent() {
        let line = Header::new(80, 24).to_json_line();
        assert!(!line.contains("title"));
        assert!(!line.contains("env"));
        assert!(!line.contains("duration"));
    }

    #[test]
    fn test_full_header_round_trip() {
        let mut env = BTreeMap::new();
        env.insert("SHELL".to_string(), "powershell".to_string());
        env.insert("TERM".to_string(), "xterm-256color".to_string());
        let header = Header {
            timestamp: Some(1_700_000_000),
            duration: Some(12.5),
            idle_time_limit: Some(2.0),
            command: Some("cmd /c dir".to_string()),
            title: Some("demo".to_string()),
            env: Some(env),
            theme: Some(serde_json::json!({"fg": "#ffffff"})),
            ..Header::new(80, 24)
        };
        let parsed = Header::parse(&header.to_json_line()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_rejects_wrong_version() {
        let line = r#"{"version":1,"width":80,"height":24}"#;
        assert!(Header::parse(line).is_err());
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let line = r#"{"version":2,"width":0,"height":24}"#;
        assert!(Header::parse(line).is_err());
    }

    #[test]
    fn test_unknown_keys_tolerated() {
        let line = r#"{"version":2,"width":80,"height":24,"future_field":true}"#;
        let header = Header::parse(line).unwrap();
        assert_eq!(header.width, 80);
    }
}
