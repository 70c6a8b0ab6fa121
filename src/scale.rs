use image::imageops;

use crate::source::Frame;
use crate::terminal::TerminalGrid;

/// Fits a frame into the terminal's pixel grid, preserving aspect ratio.
/// Frames already strictly inside the grid pass through untouched; nothing
/// is ever upscaled. Downsampling is area-averaged so video does not
/// shimmer the way nearest-neighbor sampling would.
pub fn fit(frame: Frame, grid: &TerminalGrid) -> Frame {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return frame;
    }
    let max_width = grid.pixel_width();
    let max_height = grid.pixel_height();
    if width < max_width && height < max_height {
        return frame;
    }

    let factor = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );
    let target_width = ((f64::from(width) * factor).round() as u32).max(1);
    let target_height = ((f64::from(height) * factor).round() as u32).max(1);
    if (target_width, target_height) == (width, height) {
        return frame;
    }

    imageops::thumbnail(&frame, target_width, target_height)
}
