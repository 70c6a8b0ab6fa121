use image::Rgb;

use crate::source::Frame;

/// Upper-half block: foreground paints the upper pixel of the cell,
/// background the lower one.
pub const PIXEL_GLYPH: char = '\u{2580}';
pub const COLOR_RESET: &str = "\x1b[0m";

const FOREGROUND_PREFIX: &str = "\x1b[38;2;";
const BACKGROUND_PREFIX: &str = "\x1b[48;2;";

// Worst-case cell: two 19-byte color escapes plus the 3-byte glyph.
const CELL_CAPACITY_HINT: usize = 41;

/// One frame rendered to escape-sequence text. `text` borrows the encoder's
/// buffer and holds no trailing newline; the pixel extent is kept for
/// cursor repositioning.
#[derive(Debug, Clone, Copy)]
pub struct EncodedFrame<'a> {
    pub text: &'a str,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl EncodedFrame<'_> {
    /// Number of text rows the frame occupies on screen.
    pub fn text_rows(&self) -> u32 {
        (self.pixel_height + 1) / 2
    }
}

/// Packs two vertically adjacent pixels into each character cell. The
/// output is built into one growable buffer reused across frames; nothing
/// allocates per cell.
pub struct CellEncoder {
    buffer: String,
}

impl CellEncoder {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn encode(&mut self, frame: &Frame) -> EncodedFrame<'_> {
        let (width, height) = frame.dimensions();
        self.buffer.clear();
        let cells = width as usize * ((height as usize + 1) / 2);
        self.buffer.reserve(cells * CELL_CAPACITY_HINT);

        for upper_row in (0..height).step_by(2) {
            if upper_row > 0 {
                self.buffer.push('\n');
            }
            let lower_row = (upper_row + 1 < height).then_some(upper_row + 1);
            for x in 0..width {
                push_color(&mut self.buffer, FOREGROUND_PREFIX, frame.get_pixel(x, upper_row));
                if let Some(lower_row) = lower_row {
                    push_color(&mut self.buffer, BACKGROUND_PREFIX, frame.get_pixel(x, lower_row));
                }
                self.buffer.push(PIXEL_GLYPH);
            }
            self.buffer.push_str(COLOR_RESET);
        }

        EncodedFrame {
            text: &self.buffer,
            pixel_width: width,
            pixel_height: height,
        }
    }
}

fn push_color(buffer: &mut String, prefix: &str, rgb: &Rgb<u8>) {
    buffer.push_str(prefix);
    push_component(buffer, rgb[0]);
    buffer.push(';');
    push_component(buffer, rgb[1]);
    buffer.push(';');
    push_component(buffer, rgb[2]);
    buffer.push('m');
}

fn push_component(buffer: &mut String, value: u8) {
    if value >= 100 {
        buffer.push((b'0' + value / 100) as char);
    }
    if value >= 10 {
        buffer.push((b'0' + (value / 10) % 10) as char);
    }
    buffer.push((b'0' + value % 10) as char);
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::{CellEncoder, EncodedFrame, COLOR_RESET};

    fn single_pair(upper: [u8; 3], lower: [u8; 3]) -> RgbImage {
        let mut frame = RgbImage::new(1, 2);
        frame.put_pixel(0, 0, Rgb(upper));
        frame.put_pixel(0, 1, Rgb(lower));
        frame
    }

    /// Pulls the `R;G;B` payload back out of a `\x1b[38;2;…m`-style escape.
    fn parse_color(text: &str, prefix: &str) -> [u8; 3] {
        let start = text.find(prefix).expect("escape prefix present") + prefix.len();
        let end = start + text[start..].find('m').expect("escape terminator present");
        let components = text[start..end]
            .split(';')
            .map(|value| value.parse::<u8>().expect("8-bit component"))
            .collect::<Vec<_>>();
        [components[0], components[1], components[2]]
    }

    #[test]
    fn cell_layout_is_fg_bg_glyph_reset() {
        let mut encoder = CellEncoder::new();
        let frame = single_pair([10, 20, 30], [40, 50, 60]);
        let encoded = encoder.encode(&frame);
        assert_eq!(
            encoded.text,
            "\x1b[38;2;10;20;30m\x1b[48;2;40;50;60m\u{2580}\x1b[0m"
        );
        assert_eq!(encoded.pixel_width, 1);
        assert_eq!(encoded.pixel_height, 2);
    }

    #[test]
    fn every_component_value_round_trips_exactly() {
        let mut encoder = CellEncoder::new();
        for value in 0..=255u8 {
            for channel in 0..3 {
                let mut upper = [value, 128, 7];
                upper.rotate_left(channel);
                let mut lower = [1, value, 254];
                lower.rotate_left(channel);
                let frame = single_pair(upper, lower);
                let encoded = encoder.encode(&frame);
                assert_eq!(parse_color(encoded.text, "\x1b[38;2;"), upper);
                assert_eq!(parse_color(encoded.text, "\x1b[48;2;"), lower);
            }
        }
    }

    #[test]
    fn odd_height_final_row_has_no_background() {
        let mut encoder = CellEncoder::new();
        let frame = RgbImage::from_pixel(2, 3, Rgb([9, 9, 9]));
        let encoded = encoder.encode(&frame);
        let rows = encoded.text.split('\n').collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("\x1b[48;2;"));
        assert!(!rows[1].contains("\x1b[48;2;"));
        assert!(rows[1].contains("\x1b[38;2;"));
    }

    #[test]
    fn rows_end_with_reset_and_join_without_trailing_newline() {
        let mut encoder = CellEncoder::new();
        let frame = RgbImage::from_pixel(3, 4, Rgb([0, 0, 0]));
        let encoded = encoder.encode(&frame);
        assert_eq!(encoded.text.matches('\n').count(), 1);
        assert!(!encoded.text.ends_with('\n'));
        for row in encoded.text.split('\n') {
            assert!(row.ends_with(COLOR_RESET));
            assert_eq!(row.matches('\u{2580}').count(), 3);
        }
    }

    #[test]
    fn buffer_reuse_yields_identical_output() {
        let mut encoder = CellEncoder::new();
        let frame = RgbImage::from_pixel(4, 4, Rgb([200, 100, 50]));
        let first = encoder.encode(&frame).text.to_owned();
        let larger = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        encoder.encode(&larger);
        let again = encoder.encode(&frame);
        assert_eq!(again.text, first);
    }

    #[test]
    fn text_rows_matches_printed_rows() {
        for (pixel_height, expected) in [(1, 1), (2, 1), (3, 2), (4, 2), (7, 4), (46, 23)] {
            let encoded = EncodedFrame {
                text: "",
                pixel_width: 1,
                pixel_height,
            };
            assert_eq!(encoded.text_rows(), expected, "height {pixel_height}");
        }
    }
}
