use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::{ffmpeg_is_installed, FfmpegCommand};
use ffmpeg_sidecar::download::auto_download;
use ffmpeg_sidecar::event::FfmpegEvent;
use ffmpeg_sidecar::iter::FfmpegIterator;
use image::RgbImage;

/// Raw RGB24 pixels of one decoded frame, row-major.
pub type Frame = RgbImage;

/// Resolved once at startup; never re-inferred downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceId {
    FilePath(PathBuf),
    DeviceIndex(u32),
}

impl SourceId {
    pub fn resolve(raw: &str) -> Result<Self> {
        let value = raw.trim();
        if let Ok(index) = value.parse::<u32>() {
            return Ok(Self::DeviceIndex(index));
        }
        let path = Path::new(value);
        if path.is_file() {
            return Ok(Self::FilePath(path.to_path_buf()));
        }
        bail!("'{value}' is neither a camera index nor an existing video file")
    }

    pub fn display_label(&self) -> String {
        match self {
            Self::FilePath(path) => path.display().to_string(),
            Self::DeviceIndex(index) => format!("camera {index}"),
        }
    }
}

/// The seam between the playback loop and whatever produces frames.
pub trait FrameSource {
    /// Next frame in decode order, or `None` once the stream is exhausted.
    /// A frame that fails to decode counts as exhaustion, not an error.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Repositions the source at its first frame.
    fn rewind(&mut self) -> Result<()>;
}

/// Sequential decoder backed by an ffmpeg child process. Rewinding
/// restarts the process; the pipe cannot seek.
pub struct VideoSource {
    id: SourceId,
    child: FfmpegChild,
    events: FfmpegIterator,
    reported_fps: Option<f64>,
    pending: Option<Frame>,
}

impl VideoSource {
    pub fn open(id: &SourceId) -> Result<Self> {
        let (child, events) = spawn_decoder(id)?;
        let mut source = Self {
            id: id.clone(),
            child,
            events,
            reported_fps: None,
            pending: None,
        };
        // Pull up to the first frame so the stream metadata (fps) is in
        // hand before playback starts.
        source.pending = source.pull_frame();
        Ok(source)
    }

    /// Frame rate parsed from the input stream metadata, if the container
    /// reported a usable one.
    pub fn reported_fps(&self) -> Option<f64> {
        self.reported_fps
    }

    fn pull_frame(&mut self) -> Option<Frame> {
        for event in self.events.by_ref() {
            match event {
                FfmpegEvent::ParsedInputStream(stream) => {
                    if self.reported_fps.is_none() {
                        if let Some(video) = stream.video_data() {
                            if video.fps.is_finite() && video.fps > 0.0 {
                                self.reported_fps = Some(f64::from(video.fps));
                            }
                        }
                    }
                }
                FfmpegEvent::OutputFrame(frame) => {
                    return RgbImage::from_raw(frame.width, frame.height, frame.data);
                }
                FfmpegEvent::Error(_) => return None,
                _ => {}
            }
        }
        None
    }

    fn shutdown(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl FrameSource for VideoSource {
    fn next_frame(&mut self) -> Option<Frame> {
        self.pending.take().or_else(|| self.pull_frame())
    }

    fn rewind(&mut self) -> Result<()> {
        self.shutdown();
        let (child, events) = spawn_decoder(&self.id)?;
        self.child = child;
        self.events = events;
        self.pending = None;
        Ok(())
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Downloads a private ffmpeg binary when none is on PATH.
pub fn ensure_ffmpeg() -> Result<()> {
    if ffmpeg_is_installed() {
        return Ok(());
    }
    eprintln!("[crt] ffmpeg not found; downloading a local copy");
    auto_download().context("failed to download the ffmpeg binary")
}

fn spawn_decoder(id: &SourceId) -> Result<(FfmpegChild, FfmpegIterator)> {
    let mut command = FfmpegCommand::new();
    match id {
        SourceId::FilePath(path) => {
            // -re: decode no faster than the file plays.
            command.arg("-re").input(path.to_string_lossy());
        }
        SourceId::DeviceIndex(index) => {
            configure_camera(&mut command, *index)?;
        }
    }
    let mut child = command.rawvideo().spawn().with_context(|| {
        format!(
            "failed to start the ffmpeg decoder for {}",
            id.display_label()
        )
    })?;
    let events = child
        .iter()
        .context("failed to attach to the ffmpeg decoder output")?;
    Ok((child, events))
}

#[cfg(target_os = "linux")]
fn configure_camera(command: &mut FfmpegCommand, index: u32) -> Result<()> {
    command.format("v4l2").input(format!("/dev/video{index}"));
    Ok(())
}

#[cfg(target_os = "macos")]
fn configure_camera(command: &mut FfmpegCommand, index: u32) -> Result<()> {
    command.format("avfoundation").input(index.to_string());
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn configure_camera(_command: &mut FfmpegCommand, index: u32) -> Result<()> {
    bail!("camera index {index}: live capture is only supported on Linux and macOS")
}
