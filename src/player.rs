use std::io::Write;
use std::thread;
use std::time::Instant;

use anyhow::Result;

use crate::cancel::CancellationToken;
use crate::clock::PlaybackClock;
use crate::display::Display;
use crate::encode::CellEncoder;
use crate::scale;
use crate::source::FrameSource;
use crate::terminal::TerminalGrid;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerOptions {
    pub loop_playback: bool,
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub frames_shown: u64,
    pub frames_behind: u64,
    pub interrupted: bool,
}

/// One iteration: next frame, fit, encode, show, then sleep out the
/// clock's remaining wait. The cancellation poll sits at the top, so a
/// frame in flight is always displayed whole before the loop exits.
pub fn run_playback<S, W>(
    source: &mut S,
    display: &mut Display<W>,
    fps: f64,
    options: &PlayerOptions,
    cancel: &CancellationToken,
) -> Result<PlaybackSummary>
where
    S: FrameSource,
    W: Write,
{
    let mut clock = PlaybackClock::start(fps, Instant::now());
    let mut encoder = CellEncoder::new();
    let mut frames_shown = 0u64;
    let mut frames_behind = 0u64;
    let mut rewound = false;

    let interrupted = loop {
        if cancel.is_cancelled() {
            break true;
        }

        let Some(frame) = source.next_frame() else {
            // A rewind that yields nothing means the stream has no frames;
            // stop instead of spinning on it.
            if options.loop_playback && !rewound {
                source.rewind()?;
                rewound = true;
                continue;
            }
            break false;
        };
        rewound = false;

        let grid = TerminalGrid::detect();
        let frame = scale::fit(frame, &grid);
        let encoded = encoder.encode(&frame);
        display.show(&encoded)?;
        frames_shown += 1;
        if options.debug {
            eprintln!(
                "[crt] frame {frames_shown} ({}x{})",
                encoded.pixel_width, encoded.pixel_height
            );
        }

        match clock.tick(Instant::now()) {
            Some(wait) => thread::sleep(wait),
            None => {
                frames_behind += 1;
                if options.debug {
                    eprintln!("[crt] can't keep up with the source frame rate");
                }
            }
        }
    };

    display.finish()?;
    Ok(PlaybackSummary {
        frames_shown,
        frames_behind,
        interrupted,
    })
}
