//! File-to-file transforms: cast, concatenation, text, JSON and SVG

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::asciicast::{Event, EventData, Header, Reader, Writer};
use crate::error::{Error, Result};
use crate::export::ExportOptions;
use crate::render::{frame_size, render_svg, render_thumbnail};
use crate::term::Term;
use crate::theme::Theme;

/// Replay a recording's display events into an emulator up to and including
/// `target` seconds. Returns the emulator and the source header.
pub(crate) fn emulate_to(source: &Path, target: f64) -> Result<(Term, Header)> {
    let reader = Reader::open(source)?;
    let header = reader.header().clone();
    let mut term = Term::new(header.width, header.height);
    for event in reader.events() {
        let event = event?;
        if event.time > target {
            break;
        }
        apply_event(&mut term, &event);
    }
    Ok((term, header))
}

pub(crate) fn apply_event(term: &mut Term, event: &Event) {
    match &event.data {
        EventData::Output(data) => term.process(data.as_bytes()),
        EventData::Resize(width, height) => term.resize(*width, *height),
        EventData::Input(_) | EventData::Marker(_) => {}
    }
}

/// Re-emit a recording with a time scale, an optional trim window and a
/// fresh idle cap. Width, height, timestamp, command and env pass through
/// untouched; the title may be replaced; the duration is rescaled.
pub(crate) fn export_cast(source: &Path, output: &Path, opts: &ExportOptions) -> Result<()> {
    let speed = opts.speed;
    if !speed.is_finite() || speed <= 0.0 {
        return Err(Error::Export(format!("invalid speed factor {}", speed)));
    }
    let (trim_start, trim_end) = opts.trim.unwrap_or((0.0, f64::INFINITY));
    if trim_start < 0.0 || trim_end < trim_start {
        return Err(Error::Export("invalid trim window".to_string()));
    }
    let cap = opts.idle_cap.filter(|&cap| cap > 0.0);

    let reader = Reader::open(source)?;
    let mut header = reader.header().clone();
    if let Some(title) = &opts.title {
        header.title = Some(title.clone());
    }
    if cap.is_some() {
        header.idle_time_limit = cap;
    }
    header.duration = header
        .duration
        .map(|d| ((d.min(trim_end) - trim_start).max(0.0)) / speed);

    let mut writer = Writer::create(output, &header)?;
    let mut last_src: Option<f64> = None;
    let mut elapsed = 0.0f64;

    for event in reader.events() {
        let event = event?;
        if event.time < trim_start || event.time > trim_end {
            continue;
        }
        elapsed = match cap {
            // Without a cap the source timescale passes through exactly.
            None => event.time - trim_start,
            Some(cap) => {
                let gap = event.time - last_src.unwrap_or(trim_start);
                elapsed + gap.max(0.0).min(cap)
            }
        };
        last_src = Some(event.time);
        writer.write_event(&Event {
            time: elapsed / speed,
            data: event.data,
        })?;
    }
    writer.close()
}

/// Append recordings end-to-end with a fixed gap between them. Each join is
/// announced by a marker named after the incoming file, placed mid-gap. The
/// output grid is the maximum of the sources' grids.
pub fn concat(sources: &[PathBuf], output: &Path, gap: f64) -> Result<()> {
    if sources.is_empty() {
        return Err(Error::Export("nothing to concatenate".to_string()));
    }
    let gap = gap.max(0.0);

    let mut width = 0u16;
    let mut height = 0u16;
    for source in sources {
        let reader = Reader::open(source)?;
        width = width.max(reader.header().width);
        height = height.max(reader.header().height);
    }

    let first = Reader::open(&sources[0])?.header().clone();
    let header = Header {
        timestamp: first.timestamp,
        title: first.title,
        env: first.env,
        ..Header::new(width, height)
    };

    let result = (|| -> Result<()> {
        let mut writer = Writer::create(output, &header)?;
        let mut offset = 0.0f64;
        let mut end = 0.0f64;

        for (i, source) in sources.iter().enumerate() {
            if i > 0 {
                offset = end + gap;
                let label = source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let marker_time = (offset - gap / 2.0).max(end);
                writer.write_event(&Event::marker(marker_time, label))?;
            }
            for event in Reader::open(source)?.events() {
                let event = event?;
                let time = offset + event.time;
                writer.write_event(&Event {
                    time,
                    data: event.data,
                })?;
                end = time;
            }
        }
        writer.close()
    })();

    if let Err(err) = result {
        let _ = std::fs::remove_file(output);
        return Err(err);
    }
    Ok(())
}

/// Dump the final visible screen as plain text.
pub(crate) fn export_txt(source: &Path, output: &Path) -> Result<()> {
    let (term, _) = emulate_to(source, f64::INFINITY)?;
    let mut rows = term.text_rows();
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    let mut text = rows.join("\n");
    text.push('\n');
    std::fs::write(output, text)?;
    Ok(())
}

/// Restructure the recording into one JSON document for tooling.
pub(crate) fn export_json(source: &Path, output: &Path) -> Result<()> {
    let reader = Reader::open(source)?;
    let header = reader.header().clone();
    let mut events = Vec::new();
    for event in reader.events() {
        let event = event?;
        let data = match &event.data {
            EventData::Output(s) | EventData::Input(s) | EventData::Marker(s) => s.clone(),
            EventData::Resize(w, h) => format!("{}x{}", w, h),
        };
        events.push(json!([event.time, event.data.code(), data]));
    }
    let doc = json!({ "header": header, "events": events });
    std::fs::write(output, doc.to_string())?;
    Ok(())
}

/// Render one still frame as SVG, scaled by the options' factor.
pub(crate) fn export_svg(
    source: &Path,
    output: &Path,
    theme: &Theme,
    opts: &ExportOptions,
) -> Result<()> {
    let duration = Reader::open(source)?.info()?.duration;
    let target = opts.at.resolve(duration);
    let (term, header) = emulate_to(source, target)?;
    let title = opts.title.clone().or(header.title);

    let svg = if (opts.scale - 1.0).abs() < f64::EPSILON {
        render_svg(term.rows(), title.as_deref(), theme)
    } else {
        let (cols, rows) = term.size();
        let (w, h) = frame_size(cols, rows);
        render_thumbnail(
            term.rows(),
            title.as_deref(),
            theme,
            (w as f64 * opts.scale).round().max(1.0) as u32,
            (h as f64 * opts.scale).round().max(1.0) as u32,
        )
    };
    std::fs::write(output, svg)?;
    Ok(())
}
