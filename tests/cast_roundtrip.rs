//! Recording file round trips

use std::collections::BTreeMap;

use proptest::prelude::*;

use wincast::{Event, EventData, Header, Reader, Writer};

fn read_back(bytes: &[u8]) -> (Header, Vec<Event>) {
    let reader = Reader::new(std::io::BufReader::new(std::io::Cursor::new(bytes.to_vec()))).unwrap();
    let header = reader.header().clone();
    let events = reader.events().map(|e| e.unwrap()).collect();
    (header, events)
}

#[test]
fn test_three_event_recording_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.cast");

    let mut writer = Writer::create(&path, &Header::new(120, 30)).unwrap();
    writer.write_event(&Event::output(0.0, "hi\r\n")).unwrap();
    writer.write_event(&Event::output(0.5, "world\r\n")).unwrap();
    writer.write_event(&Event::marker(1.0, "done")).unwrap();
    writer.close().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);

    let header: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(header["version"], 2);
    assert_eq!(header["width"], 120);
    assert_eq!(header["height"], 30);

    let kinds: Vec<serde_json::Value> = lines[1..]
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(kinds[0][1], "o");
    assert_eq!(kinds[1][1], "o");
    assert_eq!(kinds[2][1], "m");
    assert_eq!(kinds[0][0], 0.0);
    assert_eq!(kinds[1][0], 0.5);
    assert_eq!(kinds[2][0], 1.0);

    let reader = Reader::open(&path).unwrap();
    let events: Vec<Event> = reader.events().map(|e| e.unwrap()).collect();
    assert_eq!(events[0], Event::output(0.0, "hi\r\n"));
    assert_eq!(events[2], Event::marker(1.0, "done"));
}

#[test]
fn test_full_header_survives_file_round_trip() {
    let mut env = BTreeMap::new();
    env.insert("SHELL".to_string(), "pwsh".to_string());
    let header = Header {
        timestamp: Some(1_722_000_000),
        duration: Some(3.25),
        idle_time_limit: Some(2.0),
        command: Some("dir".to_string()),
        title: Some("listing".to_string()),
        env: Some(env),
        theme: Some(serde_json::json!({"bg": "#000000"})),
        ..Header::new(80, 24)
    };

    let mut buf = Vec::new();
    Writer::new(&mut buf, &header).unwrap();
    let (parsed, events) = read_back(&buf);
    assert_eq!(parsed, header);
    assert!(events.is_empty());
}

fn arb_event_data() -> impl Strategy<Value = EventData> {
    prop_oneof![
        ".*".prop_map(EventData::Output),
        ".*".prop_map(EventData::Input),
        ".*".prop_map(EventData::Marker),
        (1u16..=500, 1u16..=500).prop_map(|(w, h)| EventData::Resize(w, h)),
    ]
}

proptest! {
    #[test]
    fn prop_event_line_round_trips(
        time in 0.0f64..1e9,
        data in arb_event_data(),
    ) {
        let event = Event { time, data };
        let parsed = Event::parse(&event.to_json_line()).unwrap();
        prop_assert_eq!(parsed, event);
    }

    #[test]
    fn prop_header_round_trips(
        width in 1u16..=500,
        height in 1u16..=500,
        timestamp in proptest::option::of(0u64..=2_000_000_000),
        duration in proptest::option::of(0.0f64..1e6),
        title in proptest::option::of(".*"),
        command in proptest::option::of(".*"),
    ) {
        let header = Header {
            timestamp,
            duration,
            title,
            command,
            ..Header::new(width, height)
        };
        let parsed = Header::parse(&header.to_json_line()).unwrap();
        prop_assert_eq!(parsed, header);
    }

    #[test]
    fn prop_writer_reader_preserve_event_order(
        times in proptest::collection::vec(0.0f64..1e6, 1..20),
    ) {
        let mut sorted = times.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let mut buf = Vec::new();
        {
            let mut writer = Writer::new(&mut buf, &Header::new(80, 24)).unwrap();
            for (i, &t) in sorted.iter().enumerate() {
                writer.write_event(&Event::output(t, format!("chunk {}", i))).unwrap();
            }
            writer.close().unwrap();
        }

        let (_, events) = read_back(&buf);
        prop_assert_eq!(events.len(), sorted.len());
        for pair in events.windows(2) {
            prop_assert!(pair[1].time >= pair[0].time);
        }
    }
}
