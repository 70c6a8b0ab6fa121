use std::io::Write;

use anyhow::Result;

use crate::encode::EncodedFrame;

/// Writes encoded frames to the terminal in place. After the first frame
/// the cursor is moved back up and left by the prior frame's extent so the
/// next frame overwrites the same region instead of scrolling.
pub struct Display<W: Write> {
    out: W,
    prior_extent: Option<(u32, u32)>,
}

impl<W: Write> Display<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            prior_extent: None,
        }
    }

    pub fn show(&mut self, frame: &EncodedFrame<'_>) -> Result<()> {
        if let Some((prior_width, prior_height)) = self.prior_extent {
            let rows_up = ((prior_height + 1) / 2).saturating_sub(1);
            if rows_up > 0 {
                write!(self.out, "\x1b[{rows_up}A")?;
            }
            if prior_width > 0 {
                write!(self.out, "\x1b[{prior_width}D")?;
            }
        }
        self.out.write_all(frame.text.as_bytes())?;
        self.out.flush()?;
        self.prior_extent = Some((frame.pixel_width, frame.pixel_height));
        Ok(())
    }

    /// Leaves the cursor on a fresh line below the last frame. Called once
    /// on every way out of playback.
    pub fn finish(&mut self) -> Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
