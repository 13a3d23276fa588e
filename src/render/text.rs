//! Bitmap text for annotation labels.

use font8x8::{BASIC_FONTS, UnicodeFonts};

use crate::color_utils::Bgr;

use super::frame::Frame;

/// Glyph cell size of the embedded font, in font pixels.
const GLYPH_SIZE: u32 = 8;

/// Ratio between the text scale and the stroke thickness.
const THICKNESS_PER_SCALE: f32 = 3.33;

/// The embedded 8x8 font at a given text scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelFont {
    scale: f32,
}

impl LabelFont {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }

    /// Stroke thickness, `max(1, round(scale * 3.33))`.
    pub fn thickness(&self) -> u32 {
        ((self.scale * THICKNESS_PER_SCALE).round() as u32).max(1)
    }

    /// Size of one font pixel on screen.
    pub fn pixel_size(&self) -> u32 {
        ((self.scale * 2.0).round() as u32).max(1)
    }

    /// Width and height of `text` when drawn.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        let cell = GLYPH_SIZE * self.pixel_size();
        (text.chars().count() as u32 * cell, cell)
    }

    /// Draw `text` with its top-left corner at `(x, y)`, clipped to the frame.
    pub fn draw(&self, frame: &mut Frame, text: &str, x: i64, y: i64, color: Bgr) {
        let px = i64::from(self.pixel_size());
        let bold = i64::from((self.thickness() - 1) / 4);
        let cell = i64::from(GLYPH_SIZE) * px;

        for (i, ch) in text.chars().enumerate() {
            let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
                continue;
            };
            let origin_x = x + i as i64 * cell;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if (bits >> col) & 1 == 0 {
                        continue;
                    }
                    let gx = origin_x + i64::from(col) * px;
                    let gy = y + row as i64 * px;
                    frame.fill_rect(
                        gx - bold,
                        gy - bold,
                        gx + px - 1 + bold,
                        gy + px - 1 + bold,
                        color,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thickness_follows_scale() {
        assert_eq!(LabelFont::new(0.1).thickness(), 1);
        assert_eq!(LabelFont::new(1.5).thickness(), 5);
        assert_eq!(LabelFont::new(5.0).thickness(), 17);
    }

    #[test]
    fn test_measure_is_deterministic() {
        let font = LabelFont::new(1.5);
        assert_eq!(font.pixel_size(), 3);
        assert_eq!(font.measure("3 cat"), (5 * 24, 24));
        assert_eq!(font.measure(""), (0, 24));
    }

    #[test]
    fn test_draw_stays_inside_measured_box() {
        let font = LabelFont::new(0.5);
        let (w, h) = font.measure("AB");
        let mut frame = Frame::filled(w + 4, h + 4, [0, 0, 0]);
        font.draw(&mut frame, "AB", 2, 2, [255, 255, 255]);

        let mut lit = 0;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if frame.pixel(x, y) == [255, 255, 255] {
                    lit += 1;
                    assert!(x >= 2 && x < w + 2 && y >= 2 && y < h + 2);
                }
            }
        }
        assert!(lit > 0);
    }
}
