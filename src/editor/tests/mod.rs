//! Editor flow tests against the in-memory predictor and store.


use super::AnnotationEditor;
use crate::render::DisplayStyle;
use crate::testing::{FakePredictor, MemoryStore};

type TestEditor = AnnotationEditor<FakePredictor, MemoryStore>;

/// Opaque overlays and no label text, so pixels can be compared exactly.
fn flat_style() -> DisplayStyle {
    DisplayStyle::new(0.0, 2, 1.5, false, false, 2)
}

fn editor_with(predictor: FakePredictor, store: MemoryStore) -> TestEditor {
    AnnotationEditor::new(predictor, store, flat_style()).unwrap()
}

fn editor(num_images: usize, categories: &[&str]) -> TestEditor {
    editor_with(FakePredictor::default(), MemoryStore::new(num_images, categories))
}
