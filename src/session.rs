//! Click accumulation for the object currently being segmented.
//!
//! An [`InputSession`] is owned by the editor, one per image in progress.
//! Clicks are kept in insertion order and replayed to the predictor on every
//! call together with the refinement state of the previous call.

use crate::model::{Click, ClickLabel, Mask};
use crate::predictor::RefinementState;

/// Accumulated prompts and the latest prediction for one object.
#[derive(Debug, Clone, Default)]
pub struct InputSession {
    clicks: Vec<Click>,
    refinement: Option<RefinementState>,
    mask: Option<Mask>,
}

impl InputSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear clicks, refinement state and mask.
    pub fn reset(&mut self) {
        self.clicks.clear();
        self.refinement = None;
        self.mask = None;
    }

    /// Append a click. Coordinates are not checked against the image.
    pub fn add_click(&mut self, point: [i32; 2], label: ClickLabel) {
        self.clicks.push(Click::new(point[0], point[1], label));
    }

    /// Replace the current mask with the latest prediction.
    pub fn set_mask(&mut self, mask: Mask) {
        self.mask = Some(mask);
    }

    /// Replace the refinement state with the latest prediction's.
    pub fn set_refinement_state(&mut self, state: RefinementState) {
        self.refinement = Some(state);
    }

    pub fn clicks(&self) -> &[Click] {
        &self.clicks
    }

    /// Click positions in insertion order.
    pub fn points(&self) -> Vec<[i32; 2]> {
        self.clicks.iter().map(Click::point).collect()
    }

    /// Click labels in insertion order, parallel to [`Self::points`].
    pub fn labels(&self) -> Vec<ClickLabel> {
        self.clicks.iter().map(|c| c.label).collect()
    }

    pub fn len(&self) -> usize {
        self.clicks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty()
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    pub fn refinement_state(&self) -> Option<&RefinementState> {
        self.refinement.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::empty_mask;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn test_clicks_keep_order_and_labels() {
        let mut session = InputSession::new();
        let clicks = [
            ([5, 5], ClickLabel::Foreground),
            ([1, 9], ClickLabel::Background),
            ([5, 5], ClickLabel::Foreground),
            ([-4, 300], ClickLabel::Background),
        ];
        for (point, label) in clicks {
            session.add_click(point, label);
        }

        assert_eq!(session.len(), 4);
        assert_eq!(session.points().len(), session.labels().len());
        for (i, (point, label)) in clicks.iter().enumerate() {
            assert_eq!(session.points()[i], *point);
            assert_eq!(session.labels()[i], *label);
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = InputSession::new();
        session.add_click([1, 2], ClickLabel::Foreground);
        session.set_mask(empty_mask(3, 3));
        session.set_refinement_state(RefinementState(ArrayD::zeros(IxDyn(&[2]))));

        session.reset();
        assert!(session.is_empty());
        assert!(session.mask().is_none());
        assert!(session.refinement_state().is_none());

        session.reset();
        assert!(session.is_empty());
    }
}
