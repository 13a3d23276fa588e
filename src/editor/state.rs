//! Pure editor state and its transitions.
//!
//! [`EditorState`] holds the indices and flags the editor navigates by. It
//! never touches images, the predictor or the store: the editor performs the
//! side effects and then asks [`EditorState::transition`] for the next state.

/// Where the current object is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No clicks on the current image
    #[default]
    Idle,
    /// At least one click accepted, a predicted mask is shown
    Accumulating,
    /// The predicted mask was saved; more clicks keep refining it
    Committed,
}

/// Things that happened to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// A click was predicted successfully and recorded
    ClickAccepted,
    /// The current mask was committed to the store
    Saved,
    /// Clicks and mask were discarded
    Reset,
    /// Annotation overlays were shown or hidden
    AnnotationsToggled,
    /// The display style changed
    StyleChanged,
    NextImage,
    PrevImage,
    NextCategory,
    PrevCategory,
    /// A category was picked by position
    CategorySelected(usize),
}

/// Navigation indices and display flags of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorState {
    pub image_index: usize,
    pub num_images: usize,
    pub category_index: usize,
    pub num_categories: usize,
    pub phase: Phase,
    pub show_annotations: bool,
}

impl EditorState {
    /// First image, first category, annotations visible.
    pub fn new(num_images: usize, num_categories: usize) -> Self {
        Self {
            image_index: 0,
            num_images,
            category_index: 0,
            num_categories,
            phase: Phase::Idle,
            show_annotations: true,
        }
    }

    /// The state after `event`.
    ///
    /// Image and category moves wrap around. Anything that clears the
    /// current object returns to [`Phase::Idle`].
    pub fn transition(&self, event: EditorEvent) -> EditorState {
        let mut next = *self;
        match event {
            EditorEvent::ClickAccepted => next.phase = Phase::Accumulating,
            EditorEvent::Saved => next.phase = Phase::Committed,
            EditorEvent::Reset | EditorEvent::StyleChanged => next.phase = Phase::Idle,
            EditorEvent::AnnotationsToggled => {
                next.show_annotations = !self.show_annotations;
                next.phase = Phase::Idle;
            }
            EditorEvent::NextImage => {
                next.image_index = wrap_add(self.image_index, 1, self.num_images);
                next.phase = Phase::Idle;
            }
            EditorEvent::PrevImage => {
                next.image_index = wrap_sub(self.image_index, 1, self.num_images);
                next.phase = Phase::Idle;
            }
            EditorEvent::NextCategory => {
                next.category_index = wrap_add(self.category_index, 1, self.num_categories);
            }
            EditorEvent::PrevCategory => {
                next.category_index = wrap_sub(self.category_index, 1, self.num_categories);
            }
            EditorEvent::CategorySelected(index) => {
                if index < self.num_categories {
                    next.category_index = index;
                }
            }
        }
        next
    }

    /// `"{index + 1}/{num_images}"`.
    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.image_index + 1, self.num_images)
    }
}

fn wrap_add(index: usize, step: usize, len: usize) -> usize {
    if len == 0 { index } else { (index + step) % len }
}

fn wrap_sub(index: usize, step: usize, len: usize) -> usize {
    if len == 0 {
        index
    } else {
        (index + len - step % len) % len
    }
}
