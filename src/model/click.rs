//! Click prompts collected from the user.

use serde::{Deserialize, Serialize};

/// Whether a click marks the object or the area around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClickLabel {
    /// Point outside the object (label 0).
    Background,
    /// Point on the object (label 1).
    Foreground,
}

impl ClickLabel {
    /// Numeric label as the predictor expects it.
    pub fn value(self) -> u8 {
        match self {
            ClickLabel::Background => 0,
            ClickLabel::Foreground => 1,
        }
    }

    /// Parse a numeric label. Only 0 and 1 are valid.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(ClickLabel::Background),
            1 => Some(ClickLabel::Foreground),
            _ => None,
        }
    }
}

/// A labeled click in image pixel coordinates.
///
/// Coordinates are not validated against the image: clicks outside the
/// image are forwarded to the predictor unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Click {
    pub x: i32,
    pub y: i32,
    pub label: ClickLabel,
}

impl Click {
    pub fn new(x: i32, y: i32, label: ClickLabel) -> Self {
        Self { x, y, label }
    }

    pub fn foreground(x: i32, y: i32) -> Self {
        Self::new(x, y, ClickLabel::Foreground)
    }

    pub fn background(x: i32, y: i32) -> Self {
        Self::new(x, y, ClickLabel::Background)
    }

    /// The click position as `[x, y]`.
    pub fn point(&self) -> [i32; 2] {
        [self.x, self.y]
    }
}
