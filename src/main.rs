use std::io;

use anyhow::{bail, Result};
use clap::Parser;

use crt::cancel::CancellationToken;
use crt::clock::DEFAULT_FPS;
use crt::display::Display;
use crt::player::{run_playback, PlayerOptions};
use crt::source::{ensure_ffmpeg, SourceId, VideoSource};

#[derive(Debug, Parser)]
#[command(name = "crt")]
#[command(version = version())]
#[command(about = "Plays a video file or a live camera as true-color text in your terminal")]
struct Cli {
    /// Video file path or camera device index
    source: String,

    /// Restart from the first frame whenever the video ends
    #[arg(short = 'l', long = "loop")]
    loop_playback: bool,

    /// Override the playback frame rate
    #[arg(long, value_name = "RATE")]
    fps: Option<f64>,

    /// Print per-frame diagnostics to stderr
    #[arg(long)]
    debug: bool,
}

fn version() -> &'static str {
    match option_env!("CRT_GIT_HASH") {
        Some(hash) => Box::leak(format!("{} ({hash})", env!("CARGO_PKG_VERSION")).into_boxed_str()),
        None => env!("CARGO_PKG_VERSION"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(fps) = cli.fps {
        if !fps.is_finite() || fps <= 0.0 {
            bail!("--fps must be a positive number");
        }
    }
    let source_id = SourceId::resolve(&cli.source)?;

    ensure_ffmpeg()?;

    let cancel = CancellationToken::new();
    cancel.install_interrupt_handler()?;

    let mut source = VideoSource::open(&source_id)?;
    let fps = match cli.fps.or_else(|| source.reported_fps()) {
        Some(fps) => fps,
        None => {
            eprintln!(
                "[crt] {} did not report a frame rate; assuming {DEFAULT_FPS} fps",
                source_id.display_label()
            );
            DEFAULT_FPS
        }
    };

    let options = PlayerOptions {
        loop_playback: cli.loop_playback,
        debug: cli.debug,
    };
    let stdout = io::stdout();
    let mut display = Display::new(stdout.lock());
    let summary = run_playback(&mut source, &mut display, fps, &options, &cancel)?;

    if summary.frames_behind > 0 {
        eprintln!(
            "[crt] fell behind the frame rate on {} of {} frames",
            summary.frames_behind, summary.frames_shown
        );
    }
    Ok(())
}
