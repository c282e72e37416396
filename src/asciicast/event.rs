//! Timestamped events

use serde_json::{json, Value};

/// The payload of a recorded event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// Bytes written to the terminal display
    Output(String),
    /// Bytes read from the user
    Input(String),
    /// The terminal window changed size
    Resize(u16, u16),
    /// A named bookmark in the timeline
    Marker(String),
}

impl EventData {
    /// The single-letter wire code.
    pub fn code(&self) -> &'static str {
        match self {
            EventData::Output(_) => "o",
            EventData::Input(_) => "i",
            EventData::Resize(_, _) => "r",
            EventData::Marker(_) => "m",
        }
    }
}

/// One event line: seconds since the recording started plus a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub time: f64,
    pub data: EventData,
}

impl Event {
    pub fn output(time: f64, data: impl Into<String>) -> Self {
        Self {
            time,
            data: EventData::Output(data.into()),
        }
    }

    pub fn input(time: f64, data: impl Into<String>) -> Self {
        Self {
            time,
            data: EventData::Input(data.into()),
        }
    }

    pub fn resize(time: f64, width: u16, height: u16) -> Self {
        Self {
            time,
            data: EventData::Resize(width, height),
        }
    }

    pub fn marker(time: f64, label: impl Into<String>) -> Self {
        Self {
            time,
            data: EventData::Marker(label.into()),
        }
    }

    /// Serialize as a `[time, code, data]` JSON line (no trailing newline).
    pub fn to_json_line(&self) -> String {
        let value = match &self.data {
            EventData::Output(s) => json!([self.time, "o", s]),
            EventData::Input(s) => json!([self.time, "i", s]),
            EventData::Resize(w, h) => json!([self.time, "r", format!("{}x{}", w, h)]),
            EventData::Marker(s) => json!([self.time, "m", s]),
        };
        value.to_string()
    }

    /// Parse one event line. Returns `None` for anything that is not a
    /// well-formed event array; callers skip such lines.
    pub fn parse(line: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(line).ok()?;
        let arr = value.as_array()?;
        if arr.len() < 3 {
            return None;
        }
        let time = arr[0].as_f64()?;
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        let code = arr[1].as_str()?;
        let data = arr[2].as_str()?;

        let data = match code {
            "o" => EventData::Output(data.to_string()),
            "i" => EventData::Input(data.to_string()),
            "m" => EventData::Marker(data.to_string()),
            "r" => {
                let (w, h) = data.split_once('x')?;
                let w: u16 = w.parse().ok()?;
                let h: u16 = h.parse().ok()?;
                if w == 0 || h == 0 {
                    return None;
                }
                EventData::Resize(w, h)
            }
            _ => return None,
        };
        Some(Self { time, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_round_trip() {
        let event = Event::output(1.25, "hi\r\n");
        let line = event.to_json_line();
        assert_eq!(line, "[1.25,\"o\",\"hi\\r\\n\"]");
        assert_eq!(Event::parse(&line).unwrap(), event);
    }

    #[test]
    fn test_resize_round_trip() {
        let event = Event::resize(3.0, 132, 43);
        let line = event.to_json_line();
        assert!(line.contains("\"132x43\""));
        assert_eq!(Event::parse(&line).unwrap(), event);
    }

    #[test]
    fn test_marker_and_input_round_trip() {
        for event in [Event::marker(0.5, "checkpoint"), Event::input(0.1, "ls\r")] {
            assert_eq!(Event::parse(&event.to_json_line()).unwrap(), event);
        }
    }

    #[test]
    fn test_malformed_lines_rejected() {
        for line in [
            "",
            "not json",
            "{}",
            "[1.0]",
            "[-1.0,\"o\",\"x\"]",
            "[1.0,\"z\",\"x\"]",
            "[1.0,\"r\",\"80\"]",
            "[1.0,\"r\",\"0x24\"]",
            "[1.0,\"r\",\"80x\"]",
            "[\"a\",\"o\",\"x\"]",
        ] {
            assert!(Event::parse(line).is_none(), "accepted: {:?}", line);
        }
    }

    #[test]
    fn test_extra_array_elements_tolerated() {
        let event = Event::parse("[2.0,\"o\",\"data\",\"future\"]").unwrap();
        assert_eq!(event, Event::output(2.0, "data"));
    }
}
