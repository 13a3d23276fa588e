//! Display composition for the editor.

use crate::color_utils::{Bgr, RED};
use crate::model::{Annotation, Category, ClickLabel, Mask};
use crate::render::{Frame, PointColors, Renderer};

/// Color of the mask predicted for the object in progress.
pub const PREDICTION_COLOR: Bgr = RED;

/// Everything drawn on top of the base image, bottom layer first.
#[derive(Debug, Clone, Copy)]
pub struct Layers<'a> {
    pub base: &'a Frame,
    pub categories: &'a [Category],
    /// Stored annotations and their colors; `None` hides them
    pub annotations: Option<(&'a [Annotation], &'a [Bgr])>,
    pub points: &'a [[i32; 2]],
    pub labels: &'a [ClickLabel],
    pub prediction: Option<&'a Mask>,
    pub point_colors: PointColors,
    pub point_radius: u32,
}

/// Draw `layers` onto a copy of the base image.
///
/// Order: base, stored annotations, click markers, predicted mask. The
/// predicted mask is always blended, even in contour mode. Calling this
/// twice with the same input gives the same frame.
pub fn compose(renderer: &Renderer, layers: &Layers<'_>) -> Frame {
    let mut frame = layers.base.clone();

    if let Some((annotations, colors)) = layers.annotations {
        renderer.draw_annotations(&mut frame, layers.categories, annotations, colors);
    }
    renderer.draw_points(
        &mut frame,
        layers.points,
        layers.labels,
        &layers.point_colors,
        layers.point_radius,
    );
    if let Some(mask) = layers.prediction {
        renderer.overlay_mask(&mut frame, mask, PREDICTION_COLOR);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Segmentation, empty_mask};
    use crate::render::DisplayStyle;

    fn base() -> Frame {
        Frame::filled(40, 30, [50, 50, 50])
    }

    fn layers<'a>(
        base: &'a Frame,
        annotations: Option<(&'a [Annotation], &'a [Bgr])>,
        prediction: Option<&'a Mask>,
    ) -> Layers<'a> {
        Layers {
            base,
            categories: &[],
            annotations,
            points: &[[5, 5]],
            labels: &[ClickLabel::Foreground],
            prediction,
            point_colors: PointColors::default(),
            point_radius: 2,
        }
    }

    #[test]
    fn test_compose_is_idempotent() {
        let renderer = Renderer::default();
        let base = base();
        let mut mask = empty_mask(30, 40);
        mask[[20, 20]] = true;
        let view = layers(&base, None, Some(&mask));
        assert_eq!(compose(&renderer, &view), compose(&renderer, &view));
    }

    #[test]
    fn test_prediction_drawn_over_points() {
        let renderer = Renderer::new(DisplayStyle::new(0.0, 2, 1.5, true, true, 2));
        let base = base();
        let mut mask = empty_mask(30, 40);
        mask[[5, 5]] = true;
        let frame = compose(&renderer, &layers(&base, None, Some(&mask)));
        assert_eq!(frame.pixel(5, 5), PREDICTION_COLOR);
        assert_eq!(frame.pixel(6, 5), PointColors::default().color(ClickLabel::Foreground));
    }

    #[test]
    fn test_hidden_annotations_not_drawn() {
        let renderer = Renderer::new(DisplayStyle::new(0.0, 2, 1.5, false, false, 2));
        let base = base();
        let annotation = Annotation::new(
            1,
            1,
            0,
            BBox::new(20.0, 10.0, 10.0, 10.0),
            Segmentation::polygons(vec![vec![20.0, 10.0, 30.0, 10.0, 30.0, 20.0, 20.0, 20.0]]),
        );
        let annotations = [annotation];
        let colors: [Bgr; 1] = [[0, 200, 0]];

        let shown = compose(
            &renderer,
            &layers(&base, Some((&annotations[..], &colors[..])), None),
        );
        let hidden = compose(&renderer, &layers(&base, None, None));
        assert_eq!(shown.pixel(25, 15), [0, 200, 0]);
        assert_eq!(hidden.pixel(25, 15), [50, 50, 50]);
    }
}
