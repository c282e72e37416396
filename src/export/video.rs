//! Video export through an external muxer
//!
//! Frames are rendered to PPM files in a temporary directory at a fixed
//! rate, then handed to ffmpeg (or whatever `FFMPEG_PATH` points at) to mux
//! into the target container. Muxer failures surface their stderr verbatim.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::asciicast::Reader;
use crate::error::{Error, Result};
use crate::export::transform::apply_event;
use crate::export::{ExportFormat, ExportOptions};
use crate::render::render_frame;
use crate::term::Term;
use crate::theme::Theme;

/// Environment variable overriding the muxer executable.
const MUXER_ENV: &str = "FFMPEG_PATH";

pub(crate) fn export_video(
    source: &Path,
    output: &Path,
    format: ExportFormat,
    opts: &ExportOptions,
    theme: &Theme,
) -> Result<()> {
    let fps = opts.fps.max(1);
    let duration = Reader::open(source)?.info()?.duration.max(0.0);
    let frame_count = (duration * f64::from(fps)).ceil() as u64 + 1;

    let reader = Reader::open(source)?;
    let header = reader.header().clone();
    let title = opts.title.clone().or(header.title.clone());
    let mut term = Term::new(header.width, header.height);
    let mut events = reader.events().peekable();

    let dir = tempfile::tempdir()?;
    let mut previous: Option<(u64, PathBuf)> = None;

    for n in 0..frame_count {
        let t = n as f64 / f64::from(fps);

        while let Some(peeked) = events.peek() {
            let due = match peeked {
                Ok(event) => event.time <= t,
                Err(_) => true,
            };
            if !due {
                break;
            }
            match events.next() {
                Some(Ok(event)) => apply_event(&mut term, &event),
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }

        let frame = render_frame(term.rows(), Some(term.cursor()), title.as_deref(), theme);
        let path = dir.path().join(format!("frame_{:06}.ppm", n));

        let mut hasher = DefaultHasher::new();
        frame.pixels.hash(&mut hasher);
        let digest = hasher.finish();

        match &previous {
            // Unchanged frame: reference the previous file instead of
            // re-encoding it.
            Some((prev_digest, prev_path)) if *prev_digest == digest => {
                if std::fs::hard_link(prev_path, &path).is_err() {
                    std::fs::copy(prev_path, &path)?;
                }
            }
            _ => {
                std::fs::write(&path, frame.to_ppm())?;
            }
        }
        previous = Some((digest, path));
    }

    let muxer = std::env::var(MUXER_ENV).unwrap_or_else(|_| "ffmpeg".to_string());
    let pattern = dir.path().join("frame_%06d.ppm");
    debug!(%muxer, frames = frame_count, fps, "invoking muxer");

    match format {
        ExportFormat::Gif => {
            // Two-pass palette optimization: generate, then apply.
            let palette = dir.path().join("palette.png");
            let mut pass1 = frame_input(&muxer, fps, &pattern);
            pass1.arg("-vf").arg("palettegen=stats_mode=diff").arg(&palette);
            run_muxer(&mut pass1)?;

            let mut pass2 = frame_input(&muxer, fps, &pattern);
            pass2
                .arg("-i")
                .arg(&palette)
                .arg("-lavfi")
                .arg("paletteuse=dither=sierra2_4a")
                .arg(output);
            run_muxer(&mut pass2)
        }
        ExportFormat::Mp4 => {
            let mut cmd = frame_input(&muxer, fps, &pattern);
            cmd.arg("-c:v")
                .arg("libx264")
                .arg("-pix_fmt")
                .arg("yuv420p")
                .arg("-movflags")
                .arg("+faststart")
                .arg(output);
            run_muxer(&mut cmd)
        }
        ExportFormat::Webm => {
            let mut cmd = frame_input(&muxer, fps, &pattern);
            cmd.arg("-c:v")
                .arg("libvpx-vp9")
                .arg("-pix_fmt")
                .arg("yuv420p")
                .arg("-b:v")
                .arg("0")
                .arg("-crf")
                .arg("32")
                .arg(output);
            run_muxer(&mut cmd)
        }
        _ => Err(Error::Export(format!("{:?} is not a video format", format))),
    }
}

fn frame_input(muxer: &str, fps: u32, pattern: &Path) -> Command {
    let mut cmd = Command::new(muxer);
    cmd.arg("-y")
        .arg("-framerate")
        .arg(fps.to_string())
        .arg("-i")
        .arg(pattern);
    cmd
}

fn run_muxer(cmd: &mut Command) -> Result<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let output = cmd.output().map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::Export(format!(
                "muxer '{}' not found; install ffmpeg or set {}",
                program, MUXER_ENV
            ))
        } else {
            Error::Io(err)
        }
    })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::Export(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}
