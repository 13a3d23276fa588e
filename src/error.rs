//! Errors surfaced by the annotation editor.

use thiserror::Error;

use crate::predictor::PredictorError;
use crate::store::StoreError;

/// Errors that can occur while editing annotations.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The editor cannot start with the given setup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No category with the requested name
    #[error("Category not found: {name}")]
    NotFound {
        /// The requested category name
        name: String,
    },

    /// Mask prediction failed; the click was not recorded
    #[error("Predictor error: {0}")]
    Predictor(#[from] PredictorError),

    /// Dataset access failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Nothing has been predicted yet, so there is no mask to save
    #[error("No predicted mask to save")]
    EmptySession,
}

impl EditorError {
    /// Create a configuration error with a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a category not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}
