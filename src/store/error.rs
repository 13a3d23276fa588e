//! Error types for dataset store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a dataset.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image could not be decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Embedding file could not be read
    #[error("NumPy error: {0}")]
    Npy(#[from] ndarray_npy::ReadNpyError),

    /// Malformed dataset content
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Description of the problem
        message: String,
    },

    /// Expected file is missing
    #[error("File not found: {path:?}")]
    NotFound {
        /// Path where the file was expected
        path: PathBuf,
    },

    /// Image index outside the dataset
    #[error("Image index {index} out of range for {len} images")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of images
        len: usize,
    },

    /// Category index outside the category list
    #[error("Category index {index} out of range for {len} categories")]
    CategoryOutOfRange {
        /// Requested index
        index: usize,
        /// Number of categories
        len: usize,
    },
}

impl StoreError {
    /// Create an invalid data error with a message.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a not found error for a path.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }
}
