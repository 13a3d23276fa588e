//! Viewport pan/zoom state and screen-to-image mapping.
//!
//! The compositor always works in image pixels. A front end shows the
//! display buffer scaled by [`ViewTransform::zoom`] with the image origin at
//! `(pan_x, pan_y)` in screen space, and maps clicks back through
//! [`ViewTransform::to_image`].

/// Zoom factor of one wheel notch.
pub const ZOOM_STEP: f32 = 1.25;
pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 50.0;

/// Screen placement of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    /// Screen position of the image's top-left corner
    pub pan_x: f32,
    pub pan_y: f32,
}

impl ViewTransform {
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Zoom 1, image at the screen origin.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Image coordinates under a screen point, truncated to whole pixels.
    ///
    /// Points outside the image are returned as is; the predictor decides
    /// what to make of them.
    pub fn to_image(&self, screen_x: f32, screen_y: f32) -> [i32; 2] {
        let x = (screen_x - self.pan_x) / self.zoom;
        let y = (screen_y - self.pan_y) / self.zoom;
        [x as i32, y as i32]
    }

    /// Zoom to `new_zoom` keeping the image point under the cursor fixed.
    pub fn zoom_to_cursor(&self, new_zoom: f32, cursor_x: f32, cursor_y: f32) -> ViewTransform {
        let new_zoom = new_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let img_x = (cursor_x - self.pan_x) / self.zoom;
        let img_y = (cursor_y - self.pan_y) / self.zoom;

        ViewTransform {
            zoom: new_zoom,
            pan_x: cursor_x - img_x * new_zoom,
            pan_y: cursor_y - img_y * new_zoom,
        }
    }

    /// Apply `notches` wheel steps at the cursor; positive zooms in.
    pub fn scroll(&self, notches: f32, cursor_x: f32, cursor_y: f32) -> ViewTransform {
        self.zoom_to_cursor(self.zoom * ZOOM_STEP.powf(notches), cursor_x, cursor_y)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}
