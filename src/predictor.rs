//! Mask predictor boundary.
//!
//! The segmentation model itself lives outside this crate. The editor talks
//! to it through [`MaskPredictor`], passing the image, its precomputed
//! embedding and every click recorded so far, in order.

use image::RgbImage;
use ndarray::ArrayD;
use thiserror::Error;

use crate::model::{Click, Mask};

/// Precomputed image features supplied by the dataset store.
pub type Embedding = ArrayD<f32>;

/// Opaque state returned by the predictor and handed back on the next call
/// (low-resolution logits for SAM-style decoders).
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementState(pub ArrayD<f32>);

/// Result of one predictor call.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Candidate masks, best first. The editor always takes index 0.
    pub masks: Vec<Mask>,
    pub state: RefinementState,
}

impl Prediction {
    pub fn new(masks: Vec<Mask>, state: RefinementState) -> Self {
        Self { masks, state }
    }

    /// Split into the authoritative mask and the refinement state.
    pub fn into_best(self) -> Result<(Mask, RefinementState), PredictorError> {
        let state = self.state;
        self.masks
            .into_iter()
            .next()
            .map(|mask| (mask, state))
            .ok_or(PredictorError::NoCandidates)
    }
}

/// Errors reported by a mask predictor.
#[derive(Error, Debug)]
pub enum PredictorError {
    /// Model inference failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Prompt could not be turned into model input
    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    /// The model produced no mask
    #[error("Predictor returned no mask candidates")]
    NoCandidates,

    /// Candidate mask size differs from the image
    #[error("Mask is {got:?} but the image is {expected:?} (height, width)")]
    MaskSize {
        /// Image size
        expected: (usize, usize),
        /// Mask size
        got: (usize, usize),
    },

    /// Backend-specific failure
    #[error(transparent)]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PredictorError {
    /// Create an inference error with a message.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }
}

/// A click-prompted segmentation model.
///
/// Implementations block until inference completes. `clicks` holds the full
/// click history for the current object, oldest first; `prior` is the state
/// returned by the previous call for the same object, if any.
pub trait MaskPredictor {
    fn predict(
        &mut self,
        image: &RgbImage,
        embedding: &Embedding,
        clicks: &[Click],
        prior: Option<&RefinementState>,
    ) -> Result<Prediction, PredictorError>;
}

impl<P: MaskPredictor + ?Sized> MaskPredictor for Box<P> {
    fn predict(
        &mut self,
        image: &RgbImage,
        embedding: &Embedding,
        clicks: &[Click],
        prior: Option<&RefinementState>,
    ) -> Result<Prediction, PredictorError> {
        (**self).predict(image, embedding, clicks, prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::empty_mask;
    use ndarray::IxDyn;

    fn state() -> RefinementState {
        RefinementState(ArrayD::zeros(IxDyn(&[1, 4])))
    }

    #[test]
    fn test_into_best_takes_first_candidate() {
        let mut first = empty_mask(2, 2);
        first[[0, 0]] = true;
        let prediction = Prediction::new(vec![first.clone(), empty_mask(2, 2)], state());
        let (mask, _) = prediction.into_best().unwrap();
        assert_eq!(mask, first);
    }

    #[test]
    fn test_into_best_without_candidates() {
        let prediction = Prediction::new(Vec::new(), state());
        assert!(matches!(
            prediction.into_best(),
            Err(PredictorError::NoCandidates)
        ));
    }
}
