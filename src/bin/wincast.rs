//! wincast command line interface

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use anyhow::{anyhow, bail};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wincast::export::{ExportFormat, ExportOptions, FrameTime};
use wincast::{Player, PlayerConfig, Reader, Recorder, RecorderConfig};

#[derive(Parser)]
#[command(
    name = "wincast",
    version,
    about = "Record Windows console sessions and export them as asciicast, images or video"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the console to an asciicast file
    Rec {
        /// Recording title stored in the header
        #[arg(long)]
        title: Option<String>,
        /// Record this command instead of an interactive session
        #[arg(long)]
        command: Option<String>,
        /// Cap recorded idle time at this many seconds
        #[arg(long = "idle-time-limit")]
        idle_time_limit: Option<f64>,
        /// Overwrite the output file if it exists
        #[arg(long)]
        overwrite: bool,
        path: PathBuf,
    },
    /// Replay a recording in the terminal
    Play {
        /// Playback speed factor
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        /// Cap replayed idle time at this many seconds
        #[arg(long = "idle-time-limit")]
        idle_time_limit: Option<f64>,
        /// Pause at marker events until Enter is pressed
        #[arg(long)]
        pause_on_markers: bool,
        path: PathBuf,
    },
    /// Dump a recording's output instantly
    Cat { path: PathBuf },
    /// Print a recording's metadata
    Info { path: PathBuf },
    /// Print version information
    Version,
    /// Convert a recording to another format
    Export {
        /// Output format (cast, txt, json, html, svg, gif, mp4, webm)
        #[arg(long)]
        format: Option<String>,
        /// Output path; defaults to the source with a new extension
        #[arg(long)]
        output: Option<PathBuf>,
        /// Replacement title for the exported artifact
        #[arg(long)]
        title: Option<String>,
        /// Frames per second for video formats
        #[arg(long, default_value_t = 30)]
        fps: u32,
        /// Color theme for rendered formats
        #[arg(long, default_value = "asciinema")]
        theme: String,
        /// Size multiplier for still frames
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        /// Timeline position for still frames: first, middle, last or seconds
        #[arg(long)]
        at: Option<String>,
        /// Time scale for cast output
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        /// Idle cap re-applied to cast output
        #[arg(long = "idle-time-limit")]
        idle_time_limit: Option<f64>,
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let debug = std::env::var("DEBUG").is_ok_and(|v| !v.is_empty());
    init_tracing(debug);

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            print!("{}", err);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let message = single_line(&err.to_string());
            let message = message.strip_prefix("error: ").unwrap_or(&message);
            eprintln!("wincast: error: {}", message);
            println!("{}", Cli::command().render_usage());
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("wincast: error: {}", single_line(&format!("{:#}", err)));
            if debug {
                eprintln!("{:?}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("wincast=debug")
    } else {
        EnvFilter::new("wincast=warn")
    };
    if debug && std::env::var("RUST_BACKTRACE").is_err() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Errors must stay one line on stderr unless diagnostics are on.
fn single_line(text: &str) -> String {
    text.lines().next().unwrap_or("unknown error").to_string()
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Rec {
            title,
            command,
            idle_time_limit,
            overwrite,
            path,
        } => {
            if path.exists() && !overwrite {
                bail!(
                    "{} already exists (pass --overwrite to replace it)",
                    path.display()
                );
            }
            let config = RecorderConfig {
                title,
                command: command.clone(),
                idle_cap: idle_time_limit,
                ..RecorderConfig::default()
            };
            let mut recorder = Recorder::new(config)?;
            match command {
                Some(cmd) => {
                    eprintln!("recording {} while running: {}", path.display(), cmd);
                    recorder.record_command(&path, &cmd)?;
                }
                None => {
                    eprintln!(
                        "recording {} (Ctrl+D ends, Ctrl+\\ marks, Ctrl+P pauses)",
                        path.display()
                    );
                    recorder.record_interactive(&path)?;
                }
            }
            eprintln!("recording saved to {}", path.display());
            Ok(())
        }

        Commands::Play {
            speed,
            idle_time_limit,
            pause_on_markers,
            path,
        } => {
            if !(speed > 0.0) {
                bail!("speed must be positive");
            }
            let reader = Reader::open(&path)?;
            let mut player = Player::new(PlayerConfig {
                speed,
                idle_cap: idle_time_limit,
                pause_on_markers,
            });
            if pause_on_markers {
                resume_on_enter(player.pause_handle());
            }
            let stdout = std::io::stdout();
            player.play(reader, stdout.lock())?;
            Ok(())
        }

        Commands::Cat { path } => {
            let reader = Reader::open(&path)?;
            let mut player = Player::new(PlayerConfig {
                speed: f64::INFINITY,
                ..PlayerConfig::default()
            });
            let stdout = std::io::stdout();
            player.play(reader, stdout.lock())?;
            Ok(())
        }

        Commands::Info { path } => {
            let info = Reader::open(&path)?.info()?;
            let header = &info.header;
            let mut out = std::io::stdout().lock();
            writeln!(out, "version:    {}", header.version)?;
            writeln!(out, "size:       {}x{}", header.width, header.height)?;
            writeln!(out, "duration:   {:.2}s", info.duration)?;
            writeln!(out, "events:     {}", info.event_count)?;
            writeln!(out, "markers:    {}", info.marker_count)?;
            if let Some(title) = &header.title {
                writeln!(out, "title:      {}", title)?;
            }
            if let Some(command) = &header.command {
                writeln!(out, "command:    {}", command)?;
            }
            if let Some(timestamp) = header.timestamp {
                writeln!(out, "timestamp:  {}", timestamp)?;
            }
            if let Some(limit) = header.idle_time_limit {
                writeln!(out, "idle limit: {}s", limit)?;
            }
            if let Some(env) = &header.env {
                let pairs: Vec<String> =
                    env.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                writeln!(out, "env:        {}", pairs.join(" "))?;
            }
            Ok(())
        }

        Commands::Version => {
            println!("wincast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        Commands::Export {
            format,
            output,
            title,
            fps,
            theme,
            scale,
            at,
            speed,
            idle_time_limit,
            path,
        } => {
            let format = match format {
                Some(name) => Some(
                    ExportFormat::from_name(&name)
                        .ok_or_else(|| anyhow!("unknown format '{}'", name))?,
                ),
                None => None,
            };
            let at = match at {
                Some(text) => {
                    FrameTime::parse(&text).ok_or_else(|| anyhow!("invalid time '{}'", text))?
                }
                None => FrameTime::Last,
            };
            let opts = ExportOptions {
                format,
                output,
                title,
                fps,
                theme,
                scale,
                at,
                speed,
                idle_cap: idle_time_limit,
                ..ExportOptions::default()
            };
            let written = wincast::export(&path, &opts)?;
            println!("{}", written.display());
            Ok(())
        }
    }
}

/// Pressing Enter clears the pause flag set by a marker.
fn resume_on_enter(paused: std::sync::Arc<std::sync::atomic::AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            if std::io::BufRead::read_line(&mut stdin.lock(), &mut line).is_err() {
                return;
            }
            paused.store(false, Ordering::Release);
        }
    });
}
