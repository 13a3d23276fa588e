//! Color utility functions shared across the application.
//!
//! Colors handed to the compositor are BGR triples, matching the channel
//! order of the display buffer.

/// A color in blue, green, red channel order.
pub type Bgr = [u8; 3];

pub const RED: Bgr = [0, 0, 255];
pub const GREEN: Bgr = [0, 255, 0];
pub const BLACK: Bgr = [0, 0, 0];
pub const WHITE: Bgr = [255, 255, 255];

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Stable display color for a category ID.
///
/// Hues are spread with the golden angle so neighbouring IDs stay distinct.
pub fn category_color(id: u32) -> Bgr {
    let hue = (id as f32 * 137.5) % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
    [to_byte(b), to_byte(g), to_byte(r)]
}

/// Mean of the three channels, used for picking readable label text.
pub fn channel_mean(color: Bgr) -> f32 {
    (f32::from(color[0]) + f32::from(color[1]) + f32::from(color[2])) / 3.0
}

fn to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
