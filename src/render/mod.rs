//! Compositing of masks, boxes, labels and click markers onto a frame.
//!
//! The [`Renderer`] owns the [`DisplayStyle`] and draws in place on a BGR
//! [`Frame`]. Drawing never fails: shapes are clipped to the frame and masks
//! of a different size only touch the region they share with it.

mod contour;
mod frame;
mod raster;
mod style;
mod text;

pub use contour::{Contour, compress_runs, outer_contours};
pub use frame::Frame;
pub use raster::{polygons_to_mask, segmentation_to_mask};
pub use style::{
    DisplayStyle, MAX_TEXT_SCALE, MIN_TEXT_SCALE, TEXT_SCALE_STEP, TRANSPARENCY_STEP,
};
pub use text::LabelFont;

use crate::color_utils::{BLACK, Bgr, GREEN, RED, WHITE, channel_mean};
use crate::model::{Annotation, Category, ClickLabel, Mask};

/// Default radius of click markers in pixels.
pub const DEFAULT_POINT_RADIUS: u32 = 5;

/// Marker colors for foreground and background clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointColors {
    foreground: Bgr,
    background: Bgr,
}

impl PointColors {
    pub fn new(foreground: Bgr, background: Bgr) -> Self {
        Self {
            foreground,
            background,
        }
    }

    pub fn color(&self, label: ClickLabel) -> Bgr {
        match label {
            ClickLabel::Foreground => self.foreground,
            ClickLabel::Background => self.background,
        }
    }
}

impl Default for PointColors {
    /// Green foreground, red background.
    fn default() -> Self {
        Self::new(GREEN, RED)
    }
}

/// Text color for a label drawn on `background`: black on light, white on dark.
pub fn label_text_color(background: Bgr) -> Bgr {
    if channel_mean(background) > 127.0 {
        BLACK
    } else {
        WHITE
    }
}

/// `"{id} {category name}"`, falling back to the category id when the
/// category is unknown.
pub fn label_text(annotation: &Annotation, categories: &[Category]) -> String {
    match categories.iter().find(|c| c.id == annotation.category_id) {
        Some(category) => format!("{} {}", annotation.id, category.name),
        None => format!("{} {}", annotation.id, annotation.category_id),
    }
}

/// Draws annotation layers with the current [`DisplayStyle`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    style: DisplayStyle,
}

impl Renderer {
    pub fn new(style: DisplayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &DisplayStyle {
        &self.style
    }

    pub fn increase_transparency(&mut self) {
        self.style.increase_transparency();
    }

    pub fn decrease_transparency(&mut self) {
        self.style.decrease_transparency();
    }

    pub fn increase_text_size(&mut self) {
        self.style.increase_text_size();
    }

    pub fn decrease_text_size(&mut self) {
        self.style.decrease_text_size();
    }

    pub fn toggle_contour_mode(&mut self) {
        self.style.toggle_contour_mode();
    }

    pub fn toggle_labels(&mut self) {
        self.style.toggle_labels();
    }

    /// Blend `color` into the masked pixels.
    ///
    /// Each masked channel becomes `round(t * image + (1 - t) * color)` where
    /// `t` is the style transparency; unmasked pixels are left as they are.
    pub fn overlay_mask(&self, frame: &mut Frame, mask: &Mask, color: Bgr) {
        warn_on_size_mismatch(frame, mask);
        let t = self.style.transparency();
        let (height, width) = frame.shape();

        for ((row, col), _) in mask.indexed_iter().filter(|(_, v)| **v) {
            if row >= height || col >= width {
                continue;
            }
            let (x, y) = (col as u32, row as u32);
            let base = frame.pixel(x, y);
            let blended: Bgr = std::array::from_fn(|c| {
                (t * f32::from(base[c]) + (1.0 - t) * f32::from(color[c]))
                    .round()
                    .clamp(0.0, 255.0) as u8
            });
            frame.put_pixel(x, y, blended);
        }
    }

    /// Outline every region of `mask` with `contour_thickness` pixels of `color`.
    pub fn draw_contour(&self, frame: &mut Frame, mask: &Mask, color: Bgr) {
        warn_on_size_mismatch(frame, mask);
        let thickness = self.style.contour_thickness() as f32;

        for contour in outer_contours(mask) {
            if let [(x, y)] = contour[..] {
                if let Some(dot) = raster::disk(x as i32, y as i32, thickness / 2.0) {
                    raster::fill_path(frame, &dot, color);
                }
                continue;
            }
            let points: Vec<(f32, f32)> = compress_runs(&contour)
                .iter()
                .map(|&(x, y)| (x as f32 + 0.5, y as f32 + 0.5))
                .collect();
            if let Some(path) = raster::polyline(&points, true) {
                raster::stroke_path(frame, &path, thickness, color);
            }
        }
    }

    /// Draw the bounding box of `annotation` and, when labels are shown, its
    /// `"{id} {category}"` tag on a filled background at the box's top edge.
    pub fn draw_box(
        &self,
        frame: &mut Frame,
        categories: &[Category],
        annotation: &Annotation,
        color: Bgr,
    ) {
        let (x, y, w, h) = annotation.bbox.to_pixels();
        if let Some(outline) = raster::rect_outline(x, y, w, h) {
            raster::stroke_path(frame, &outline, self.style.box_width() as f32, color);
        }

        if !self.style.show_labels() {
            return;
        }
        let text = label_text(annotation, categories);
        let font = LabelFont::new(self.style.text_scale());
        let (tw, th) = font.measure(&text);
        let (x, y) = (i64::from(x), i64::from(y));
        frame.fill_rect(x, y + 1, x + i64::from(tw) + 1, y + i64::from(th), color);
        font.draw(frame, &text, x + 1, y + 1, label_text_color(color));
    }

    /// Draw each annotation with its color: box and label first, then the
    /// segmentation as an outline or a translucent fill depending on the
    /// contour mode.
    pub fn draw_annotations(
        &self,
        frame: &mut Frame,
        categories: &[Category],
        annotations: &[Annotation],
        colors: &[Bgr],
    ) {
        if annotations.len() != colors.len() {
            log::warn!(
                "{} annotations but {} colors, drawing the first {}",
                annotations.len(),
                colors.len(),
                annotations.len().min(colors.len())
            );
        }
        let (height, width) = frame.shape();

        for (annotation, &color) in annotations.iter().zip(colors) {
            self.draw_box(frame, categories, annotation, color);
            let mask = segmentation_to_mask(&annotation.segmentation, height, width);
            if self.style.contour_mode() {
                self.draw_contour(frame, &mask, color);
            } else {
                self.overlay_mask(frame, &mask, color);
            }
        }
    }

    /// Draw a filled disk of `radius` at every click, colored by its label.
    pub fn draw_points(
        &self,
        frame: &mut Frame,
        points: &[[i32; 2]],
        labels: &[ClickLabel],
        colors: &PointColors,
        radius: u32,
    ) {
        for (point, &label) in points.iter().zip(labels) {
            if let Some(path) = raster::disk(point[0], point[1], radius as f32) {
                raster::fill_path(frame, &path, colors.color(label));
            }
        }
    }
}

fn warn_on_size_mismatch(frame: &Frame, mask: &Mask) {
    if mask.dim() != frame.shape() {
        log::warn!(
            "mask is {:?} but the frame is {:?}, drawing the overlap only",
            mask.dim(),
            frame.shape()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Segmentation, empty_mask};

    fn style_with_transparency(t: f32) -> DisplayStyle {
        DisplayStyle::new(t, 2, 1.5, false, true, 2)
    }

    fn square_mask() -> Mask {
        let mut mask = empty_mask(6, 6);
        for row in 1..4 {
            for col in 2..5 {
                mask[[row, col]] = true;
            }
        }
        mask
    }

    #[test]
    fn test_overlay_opaque_image_passes_through() {
        let renderer = Renderer::new(style_with_transparency(1.0));
        let mut frame = Frame::filled(6, 6, [10, 20, 30]);
        let original = frame.clone();
        renderer.overlay_mask(&mut frame, &square_mask(), RED);
        assert_eq!(frame, original);
    }

    #[test]
    fn test_overlay_zero_transparency_paints_color() {
        let renderer = Renderer::new(style_with_transparency(0.0));
        let mut frame = Frame::filled(6, 6, [10, 20, 30]);
        renderer.overlay_mask(&mut frame, &square_mask(), RED);
        assert_eq!(frame.pixel(2, 1), RED);
        assert_eq!(frame.pixel(4, 3), RED);
        assert_eq!(frame.pixel(0, 0), [10, 20, 30]);
        assert_eq!(frame.pixel(5, 5), [10, 20, 30]);
    }

    #[test]
    fn test_overlay_empty_mask_is_noop() {
        let renderer = Renderer::default();
        let mut frame = Frame::filled(6, 6, [10, 20, 30]);
        let original = frame.clone();
        renderer.overlay_mask(&mut frame, &empty_mask(6, 6), GREEN);
        assert_eq!(frame, original);
    }

    #[test]
    fn test_overlay_blends_and_rounds() {
        let renderer = Renderer::new(style_with_transparency(0.5));
        let mut frame = Frame::filled(6, 6, [100, 0, 255]);
        renderer.overlay_mask(&mut frame, &square_mask(), [0, 101, 255]);
        // 0.5 * 0 + 0.5 * 101 = 50.5 rounds away from zero
        assert_eq!(frame.pixel(3, 2), [50, 51, 255]);
    }

    #[test]
    fn test_overlay_mismatched_mask_draws_overlap() {
        let renderer = Renderer::new(style_with_transparency(0.0));
        let mut frame = Frame::filled(3, 3, [0, 0, 0]);
        let mask = Mask::from_elem((5, 5), true);
        renderer.overlay_mask(&mut frame, &mask, WHITE);
        assert!(frame.as_bytes().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_label_text_color_contrast() {
        assert_eq!(label_text_color([200, 200, 200]), BLACK);
        assert_eq!(label_text_color([10, 10, 10]), WHITE);
        assert_eq!(label_text_color([127, 127, 127]), WHITE);
        assert_eq!(label_text_color([255, 255, 0]), BLACK);
        assert_eq!(label_text_color([255, 255, 255]), BLACK);
        assert_eq!(label_text_color([0, 0, 0]), WHITE);
    }

    #[test]
    fn test_label_text_uses_category_name() {
        let categories = vec![Category::new(1, "cat"), Category::new(2, "dog")];
        let annotation = Annotation::new(
            7,
            1,
            2,
            BBox::new(0.0, 0.0, 4.0, 4.0),
            Segmentation::default(),
        );
        assert_eq!(label_text(&annotation, &categories), "7 dog");
    }

    #[test]
    fn test_draw_box_without_labels_leaves_interior() {
        let style = DisplayStyle::new(0.3, 1, 1.5, false, false, 2);
        let renderer = Renderer::new(style);
        let mut frame = Frame::filled(20, 20, [0, 0, 0]);
        let annotation = Annotation::new(
            1,
            1,
            1,
            BBox::new(2.0, 2.0, 10.0, 10.0),
            Segmentation::default(),
        );
        renderer.draw_box(&mut frame, &[], &annotation, WHITE);
        assert_eq!(frame.pixel(2, 7), WHITE);
        assert_eq!(frame.pixel(12, 7), WHITE);
        assert_eq!(frame.pixel(7, 7), [0, 0, 0]);
    }

    #[test]
    fn test_draw_box_label_background() {
        let renderer = Renderer::default();
        let mut frame = Frame::filled(100, 60, [0, 0, 0]);
        let annotation = Annotation::new(
            3,
            1,
            1,
            BBox::new(5.0, 5.0, 80.0, 40.0),
            Segmentation::default(),
        );
        let categories = vec![Category::new(1, "a")];
        renderer.draw_box(&mut frame, &categories, &annotation, WHITE);
        // "3 a": the space glyph leaves the label background visible
        let font = LabelFont::new(renderer.style().text_scale());
        let (cell, _) = font.measure(" ");
        let x = 6 + cell + cell / 2;
        assert_eq!(frame.pixel(x, 8 + cell / 2), WHITE);
    }

    #[test]
    fn test_draw_points_uses_label_colors() {
        let renderer = Renderer::default();
        let mut frame = Frame::filled(30, 30, [0, 0, 0]);
        renderer.draw_points(
            &mut frame,
            &[[5, 5], [20, 20]],
            &[ClickLabel::Foreground, ClickLabel::Background],
            &PointColors::default(),
            DEFAULT_POINT_RADIUS,
        );
        assert_eq!(frame.pixel(5, 5), GREEN);
        assert_eq!(frame.pixel(20, 20), RED);
        assert_eq!(frame.pixel(12, 12), [0, 0, 0]);
    }

    #[test]
    fn test_draw_contour_outlines_without_filling() {
        let style = DisplayStyle::new(0.3, 2, 1.5, true, true, 1);
        let renderer = Renderer::new(style);
        let mut mask = empty_mask(20, 20);
        for row in 4..16 {
            for col in 4..16 {
                mask[[row, col]] = true;
            }
        }
        let mut frame = Frame::filled(20, 20, [0, 0, 0]);
        renderer.draw_contour(&mut frame, &mask, RED);
        assert_eq!(frame.pixel(4, 10), RED);
        assert_eq!(frame.pixel(10, 15), RED);
        assert_eq!(frame.pixel(10, 10), [0, 0, 0]);
        assert_eq!(frame.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_draw_annotations_fills_polygon() {
        let renderer = Renderer::new(style_with_transparency(0.0));
        let mut frame = Frame::filled(40, 40, [0, 0, 0]);
        let segmentation = Segmentation::polygons(vec![vec![
            10.0, 10.0, 30.0, 10.0, 30.0, 30.0, 10.0, 30.0,
        ]]);
        let annotation = Annotation::new(
            1,
            1,
            1,
            BBox::new(10.0, 10.0, 20.0, 20.0),
            segmentation,
        );
        renderer.draw_annotations(&mut frame, &[], &[annotation], &[[1, 2, 3]]);
        assert_eq!(frame.pixel(20, 25), [1, 2, 3]);
        assert_eq!(frame.pixel(35, 35), [0, 0, 0]);
    }
}
