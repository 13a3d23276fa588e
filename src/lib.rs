//! SALT - Segment Anything Labelling Tool
//!
//! Interactive click-to-segment annotation engine. Clicks are accumulated per
//! object, a [`MaskPredictor`] refines the mask after every click, and the
//! [`Renderer`] composites masks, boxes, labels and click markers for display.
//! Accepted masks are committed to a [`DatasetStore`]; [`CocoDatasetStore`]
//! keeps them in a COCO JSON file.

pub mod color_utils;
pub mod config;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod model;
pub mod predictor;
pub mod render;
pub mod session;
pub mod store;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, EditorConfig};
pub use dispatch::{Command, Controller, Flow, ImageSink, InputEvent, KeyBindings};
pub use editor::{AnnotationEditor, EditorState, Phase, open_dataset};
pub use error::EditorError;
pub use model::{Annotation, Category, Click, ClickLabel, Mask};
pub use predictor::{MaskPredictor, Prediction, PredictorError, RefinementState};
pub use render::{DisplayStyle, Frame, Renderer};
pub use session::InputSession;
pub use store::{CocoDatasetStore, DatasetStore, ImageData, StoreError};
