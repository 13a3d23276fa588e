//! BGR display buffer.

use std::path::Path;

use image::{ImageResult, Rgb, RgbImage};

use crate::color_utils::Bgr;

/// An 8-bit, 3-channel image whose pixels are stored blue, green, red.
///
/// Wraps an `image` buffer; the `Rgb` pixel type only fixes the channel
/// count, the bytes are in BGR order. This is the buffer the editor hands
/// to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(RgbImage);

impl Frame {
    /// A frame filled with one color.
    pub fn filled(width: u32, height: u32, color: Bgr) -> Self {
        Self(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    /// Convert an RGB image, swapping the channel order.
    pub fn from_rgb(image: &RgbImage) -> Self {
        Self(swap_channels(image))
    }

    /// Convert back to an RGB image (for encoding to disk).
    pub fn to_rgb(&self) -> RgbImage {
        swap_channels(&self.0)
    }

    /// Encode as PNG (or any format inferred from the extension).
    pub fn save(&self, path: &Path) -> ImageResult<()> {
        self.to_rgb().save(path)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// `(height, width)`, the shape a matching mask must have.
    pub fn shape(&self) -> (usize, usize) {
        (self.height() as usize, self.width() as usize)
    }

    /// Raw BGR bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Bgr {
        self.0.get_pixel(x, y).0
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Bgr) {
        self.0.put_pixel(x, y, Rgb(color));
    }

    /// Write a pixel given signed coordinates; out-of-frame writes are dropped.
    pub fn put_pixel_clipped(&mut self, x: i64, y: i64, color: Bgr) {
        if x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height()) {
            self.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Write the pixel at a row-major index.
    pub(crate) fn put_index(&mut self, index: usize, color: Bgr) {
        let i = index * 3;
        let raw: &mut [u8] = &mut self.0;
        raw[i..i + 3].copy_from_slice(&color);
    }

    /// Fill the inclusive rectangle `[x0, x1] × [y0, y1]`, clipped to the frame.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Bgr) {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(i64::from(self.width()) - 1);
        let y1 = y1.min(i64::from(self.height()) - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn swap_channels(image: &RgbImage) -> RgbImage {
    let mut swapped = image.clone();
    for Rgb([a, _, c]) in swapped.pixels_mut() {
        std::mem::swap(a, c);
    }
    swapped
}
