//! Display parameters of the compositor.

/// Transparency change per step.
pub const TRANSPARENCY_STEP: f32 = 0.05;
/// Text scale change per step.
pub const TEXT_SCALE_STEP: f32 = 0.1;
/// Smallest text scale.
pub const MIN_TEXT_SCALE: f32 = 0.5;
/// Largest text scale.
pub const MAX_TEXT_SCALE: f32 = 5.0;

/// How annotations and predictions are drawn.
///
/// Fields are only changed through the stepping methods, which keep every
/// value inside its range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayStyle {
    transparency: f32,
    box_width: u32,
    text_scale: f32,
    contour_mode: bool,
    show_labels: bool,
    contour_thickness: u32,
}

impl Default for DisplayStyle {
    fn default() -> Self {
        Self {
            transparency: 0.3,
            box_width: 2,
            text_scale: 1.5,
            contour_mode: false,
            show_labels: true,
            contour_thickness: 2,
        }
    }
}

/// Add `delta`, snap to hundredths and clamp.
fn step(value: f32, delta: f32, min: f32, max: f32) -> f32 {
    (((value + delta) * 100.0).round() / 100.0).clamp(min, max)
}

impl DisplayStyle {
    /// Build a style, clamping out-of-range values.
    pub fn new(
        transparency: f32,
        box_width: u32,
        text_scale: f32,
        contour_mode: bool,
        show_labels: bool,
        contour_thickness: u32,
    ) -> Self {
        Self {
            transparency: step(transparency, 0.0, 0.0, 1.0),
            box_width: box_width.max(1),
            text_scale: step(text_scale, 0.0, MIN_TEXT_SCALE, MAX_TEXT_SCALE),
            contour_mode,
            show_labels,
            contour_thickness: contour_thickness.max(1),
        }
    }

    /// Weight of the underlying image when blending a mask, in `[0, 1]`.
    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    pub fn box_width(&self) -> u32 {
        self.box_width
    }

    pub fn text_scale(&self) -> f32 {
        self.text_scale
    }

    pub fn contour_mode(&self) -> bool {
        self.contour_mode
    }

    pub fn show_labels(&self) -> bool {
        self.show_labels
    }

    pub fn contour_thickness(&self) -> u32 {
        self.contour_thickness
    }

    pub fn increase_transparency(&mut self) {
        self.transparency = step(self.transparency, TRANSPARENCY_STEP, 0.0, 1.0);
    }

    pub fn decrease_transparency(&mut self) {
        self.transparency = step(self.transparency, -TRANSPARENCY_STEP, 0.0, 1.0);
    }

    pub fn increase_text_size(&mut self) {
        self.text_scale = step(self.text_scale, TEXT_SCALE_STEP, MIN_TEXT_SCALE, MAX_TEXT_SCALE);
    }

    pub fn decrease_text_size(&mut self) {
        self.text_scale = step(self.text_scale, -TEXT_SCALE_STEP, MIN_TEXT_SCALE, MAX_TEXT_SCALE);
    }

    /// Switch between filled masks and outlines.
    pub fn toggle_contour_mode(&mut self) {
        self.contour_mode = !self.contour_mode;
    }

    /// Show or hide label text. Boxes are drawn either way.
    pub fn toggle_labels(&mut self) {
        self.show_labels = !self.show_labels;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparency_saturates_at_one() {
        let mut style = DisplayStyle::default();
        for _ in 0..20 {
            style.increase_transparency();
        }
        assert_eq!(style.transparency(), 1.0);
        for _ in 0..5 {
            style.increase_transparency();
        }
        assert_eq!(style.transparency(), 1.0);
    }

    #[test]
    fn test_transparency_saturates_at_zero() {
        let mut style = DisplayStyle::default();
        for _ in 0..10 {
            style.decrease_transparency();
        }
        assert_eq!(style.transparency(), 0.0);
        style.increase_transparency();
        assert_eq!(style.transparency(), 0.05);
    }

    #[test]
    fn test_text_scale_saturates() {
        let mut style = DisplayStyle::default();
        for _ in 0..40 {
            style.decrease_text_size();
        }
        assert_eq!(style.text_scale(), 0.5);
        for _ in 0..5 {
            style.decrease_text_size();
        }
        assert_eq!(style.text_scale(), 0.5);

        for _ in 0..60 {
            style.increase_text_size();
        }
        assert_eq!(style.text_scale(), MAX_TEXT_SCALE);
    }

    #[test]
    fn test_new_clamps() {
        let style = DisplayStyle::new(1.7, 0, 9.0, true, false, 0);
        assert_eq!(style.transparency(), 1.0);
        assert_eq!(style.box_width(), 1);
        assert_eq!(style.text_scale(), MAX_TEXT_SCALE);
        assert_eq!(style.contour_thickness(), 1);
        assert!(style.contour_mode());
        assert!(!style.show_labels());
    }

    #[test]
    fn test_toggles_flip() {
        let mut style = DisplayStyle::default();
        style.toggle_contour_mode();
        style.toggle_labels();
        assert!(style.contour_mode());
        assert!(!style.show_labels());
        style.toggle_labels();
        assert!(style.show_labels());
    }
}
