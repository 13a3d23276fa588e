//! Interactive annotation editor.
//!
//! [`AnnotationEditor`] ties the click session, the mask predictor, the
//! dataset store and the compositor together. Every operation runs to
//! completion on the caller's thread and leaves [`AnnotationEditor::display`]
//! showing the result.
//!
//! ```rust,ignore
//! let store = open_dataset(&config)?;
//! let mut editor = AnnotationEditor::with_config(predictor, store, &config)?;
//! editor.add_click([120, 80], ClickLabel::Foreground)?;
//! editor.save_annotation()?;
//! editor.reset();
//! ```

mod state;
mod view;

#[cfg(test)]
mod tests;

pub use state::{EditorEvent, EditorState, Phase};
pub use view::{Layers, PREDICTION_COLOR, compose};

use crate::color_utils::Bgr;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::model::{Annotation, AnnotationId, Category, Click, ClickLabel};
use crate::predictor::{MaskPredictor, PredictorError};
use crate::render::{DEFAULT_POINT_RADIUS, DisplayStyle, Frame, PointColors, Renderer};
use crate::session::InputSession;
use crate::store::{CocoDatasetStore, DatasetStore, ImageData};

/// Open the COCO dataset named by `config`.
///
/// Fails with [`EditorError::Configuration`] when the config lists no
/// categories and the annotation file does not exist yet.
pub fn open_dataset(config: &EditorConfig) -> Result<CocoDatasetStore, EditorError> {
    let annotations_path = config
        .annotations_path
        .clone()
        .unwrap_or_else(|| config.dataset_path.join(crate::store::ANNOTATIONS_FILE));
    if config.categories.is_none() && !annotations_path.exists() {
        return Err(EditorError::configuration(format!(
            "categories must be given when {:?} does not exist",
            annotations_path
        )));
    }
    let store = CocoDatasetStore::open(
        &config.dataset_path,
        Some(&annotations_path),
        config.categories.as_deref(),
    )?;
    Ok(store)
}

/// Click-to-segment editor over a dataset.
pub struct AnnotationEditor<P, S> {
    predictor: P,
    store: S,
    state: EditorState,
    session: InputSession,
    renderer: Renderer,
    image: ImageData,
    annotations: Vec<Annotation>,
    annotation_colors: Vec<Bgr>,
    point_colors: PointColors,
    point_radius: u32,
    display: Frame,
}

impl<P: MaskPredictor, S: DatasetStore> AnnotationEditor<P, S> {
    /// Start on the first image with the first category selected.
    pub fn new(predictor: P, store: S, style: DisplayStyle) -> Result<Self, EditorError> {
        Self::with_options(predictor, store, style, DEFAULT_POINT_RADIUS)
    }

    /// Start with the style and marker size from `config`.
    pub fn with_config(predictor: P, store: S, config: &EditorConfig) -> Result<Self, EditorError> {
        Self::with_options(predictor, store, config.style.to_style(), config.point_radius)
    }

    fn with_options(
        predictor: P,
        store: S,
        style: DisplayStyle,
        point_radius: u32,
    ) -> Result<Self, EditorError> {
        if store.num_images() == 0 {
            return Err(EditorError::configuration("dataset has no images"));
        }
        if store.categories().is_empty() {
            return Err(EditorError::configuration("dataset has no categories"));
        }

        let state = EditorState::new(store.num_images(), store.categories().len());
        let image = store.image_data(0)?;
        let (annotations, annotation_colors) = store.annotations_for(0)?;
        log::info!(
            "Editor ready: {} images, {} categories",
            state.num_images,
            state.num_categories
        );

        let mut editor = Self {
            predictor,
            store,
            state,
            session: InputSession::new(),
            renderer: Renderer::new(style),
            display: image.bgr.clone(),
            image,
            annotations,
            annotation_colors,
            point_colors: PointColors::default(),
            point_radius,
        };
        editor.redraw();
        Ok(editor)
    }

    /// The composited display buffer.
    pub fn display(&self) -> &Frame {
        &self.display
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn session(&self) -> &InputSession {
        &self.session
    }

    pub fn style(&self) -> &DisplayStyle {
        self.renderer.style()
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn image(&self) -> &ImageData {
        &self.image
    }

    pub fn categories(&self) -> &[Category] {
        self.store.categories()
    }

    /// The category new objects are saved under.
    pub fn selected_category(&self) -> &Category {
        &self.store.categories()[self.state.category_index]
    }

    /// Annotations of the current image as last read from the store.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// `"{index + 1}/{num_images}"` for the current image.
    pub fn progress_label(&self) -> String {
        self.state.progress_label()
    }

    /// Add a click and refine the mask.
    ///
    /// The predictor sees every earlier click plus this one, in order, and
    /// the refinement state of the previous call. Its first candidate
    /// becomes the current mask. If prediction fails the click is dropped
    /// and the session is left as it was.
    pub fn add_click(&mut self, point: [i32; 2], label: ClickLabel) -> Result<(), EditorError> {
        let mut clicks = self.session.clicks().to_vec();
        clicks.push(Click::new(point[0], point[1], label));

        let prediction = self.predictor.predict(
            &self.image.rgb,
            &self.image.embedding,
            &clicks,
            self.session.refinement_state(),
        )?;
        let (mask, refinement) = prediction.into_best()?;
        let expected = self.image.bgr.shape();
        if mask.dim() != expected {
            return Err(PredictorError::MaskSize {
                expected,
                got: mask.dim(),
            }
            .into());
        }

        self.session.add_click(point, label);
        self.session.set_mask(mask);
        self.session.set_refinement_state(refinement);
        self.apply(EditorEvent::ClickAccepted);
        self.redraw();
        Ok(())
    }

    /// Commit the current mask under the selected category.
    ///
    /// The session is kept; call [`Self::reset`] to start the next object.
    pub fn save_annotation(&mut self) -> Result<AnnotationId, EditorError> {
        let mask = self.session.mask().ok_or(EditorError::EmptySession)?;
        let id = self
            .store
            .add_annotation(self.state.image_index, self.state.category_index, mask)?;
        log::info!(
            "Saved annotation {} as '{}' on image {}",
            id,
            self.selected_category().name,
            self.progress_label()
        );
        self.reload_annotations()?;
        self.apply(EditorEvent::Saved);
        self.redraw();
        Ok(id)
    }

    /// Ask the store to delete annotations of the current image.
    pub fn delete_annotations(&mut self) -> Result<Option<AnnotationId>, EditorError> {
        let removed = self.store.delete_annotations(self.state.image_index)?;
        if let Some(id) = removed {
            log::info!("Deleted annotation {}", id);
        }
        self.reload_annotations()?;
        self.redraw();
        Ok(removed)
    }

    /// Drop clicks and mask and show the plain image (with annotations if
    /// visible).
    pub fn reset(&mut self) {
        self.session.reset();
        self.apply(EditorEvent::Reset);
        self.redraw();
    }

    /// Show or hide stored annotations, then reset.
    pub fn toggle_annotation_visibility(&mut self) {
        self.apply(EditorEvent::AnnotationsToggled);
        self.reset();
    }

    pub fn navigate_next(&mut self) -> Result<(), EditorError> {
        self.navigate(EditorEvent::NextImage)
    }

    pub fn navigate_prev(&mut self) -> Result<(), EditorError> {
        self.navigate(EditorEvent::PrevImage)
    }

    pub fn select_next_category(&mut self) {
        self.apply(EditorEvent::NextCategory);
    }

    pub fn select_prev_category(&mut self) {
        self.apply(EditorEvent::PrevCategory);
    }

    /// Select the category called `name`.
    pub fn select_category_by_name(&mut self, name: &str) -> Result<(), EditorError> {
        let index = self
            .store
            .categories()
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| EditorError::not_found(name))?;
        self.apply(EditorEvent::CategorySelected(index));
        Ok(())
    }

    pub fn increase_transparency(&mut self) {
        self.renderer.increase_transparency();
        self.style_changed();
    }

    pub fn decrease_transparency(&mut self) {
        self.renderer.decrease_transparency();
        self.style_changed();
    }

    pub fn increase_text_size(&mut self) {
        self.renderer.increase_text_size();
        self.style_changed();
    }

    pub fn decrease_text_size(&mut self) {
        self.renderer.decrease_text_size();
        self.style_changed();
    }

    pub fn toggle_contour_mode(&mut self) {
        self.renderer.toggle_contour_mode();
        self.style_changed();
    }

    pub fn toggle_labels(&mut self) {
        self.renderer.toggle_labels();
        self.style_changed();
    }

    /// Write the store's pending changes.
    pub fn persist(&mut self) -> Result<(), EditorError> {
        self.store.persist()?;
        Ok(())
    }

    fn navigate(&mut self, event: EditorEvent) -> Result<(), EditorError> {
        let next = self.state.transition(event);
        let image = self.store.image_data(next.image_index)?;
        let (annotations, colors) = self.store.annotations_for(next.image_index)?;

        self.image = image;
        self.annotations = annotations;
        self.annotation_colors = colors;
        self.session.reset();
        log::debug!("{:?}: image {}", event, next.progress_label());
        self.state = next;
        self.redraw();
        Ok(())
    }

    fn style_changed(&mut self) {
        log::debug!("Display style: {:?}", self.renderer.style());
        self.session.reset();
        self.apply(EditorEvent::StyleChanged);
        self.redraw();
    }

    fn apply(&mut self, event: EditorEvent) {
        let next = self.state.transition(event);
        if next.phase != self.state.phase {
            log::debug!("{:?}: {:?} -> {:?}", event, self.state.phase, next.phase);
        }
        self.state = next;
    }

    fn reload_annotations(&mut self) -> Result<(), EditorError> {
        let (annotations, colors) = self.store.annotations_for(self.state.image_index)?;
        self.annotations = annotations;
        self.annotation_colors = colors;
        Ok(())
    }

    fn redraw(&mut self) {
        let points = self.session.points();
        let labels = self.session.labels();
        let layers = Layers {
            base: &self.image.bgr,
            categories: self.store.categories(),
            annotations: self
                .state
                .show_annotations
                .then_some((&self.annotations[..], &self.annotation_colors[..])),
            points: &points,
            labels: &labels,
            prediction: self.session.mask(),
            point_colors: self.point_colors,
            point_radius: self.point_radius,
        };
        self.display = compose(&self.renderer, &layers);
    }
}
