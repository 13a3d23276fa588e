//! In-memory predictor and store used by the editor and dispatch tests.

use image::{Rgb, RgbImage};
use ndarray::{ArrayD, IxDyn};

use crate::color_utils::{Bgr, category_color};
use crate::model::{
    Annotation, AnnotationId, Category, Click, ClickLabel, Mask, Rle, Segmentation,
    categories_from_names, empty_mask, mask_area, mask_bbox,
};
use crate::predictor::{Embedding, MaskPredictor, Prediction, PredictorError, RefinementState};
use crate::render::Frame;
use crate::store::{DatasetStore, ImageData, StoreError};

pub const WIDTH: u32 = 32;
pub const HEIGHT: u32 = 24;

/// Records every call and predicts a 5x5 block around each foreground click,
/// minus the block around each background click.
#[derive(Debug, Default)]
pub struct FakePredictor {
    pub calls: Vec<Vec<Click>>,
    pub priors: Vec<Option<RefinementState>>,
    /// Fail the call with this number (1-based) with an inference error
    pub fail_at: Option<usize>,
    /// Return no candidates
    pub empty: bool,
}

impl FakePredictor {
    /// Fails its `n`-th call.
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Self::default()
        }
    }
}

impl MaskPredictor for FakePredictor {
    fn predict(
        &mut self,
        image: &RgbImage,
        _embedding: &Embedding,
        clicks: &[Click],
        prior: Option<&RefinementState>,
    ) -> Result<Prediction, PredictorError> {
        self.calls.push(clicks.to_vec());
        self.priors.push(prior.cloned());
        if self.fail_at == Some(self.calls.len()) {
            return Err(PredictorError::inference("model crashed"));
        }
        if self.empty {
            return Ok(Prediction::new(Vec::new(), state(clicks.len())));
        }

        let (width, height) = image.dimensions();
        let mut mask = empty_mask(height as usize, width as usize);
        for click in clicks {
            let value = click.label == ClickLabel::Foreground;
            for y in click.y - 2..=click.y + 2 {
                for x in click.x - 2..=click.x + 2 {
                    if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                        mask[[y as usize, x as usize]] = value;
                    }
                }
            }
        }
        Ok(Prediction::new(
            vec![mask, empty_mask(height as usize, width as usize)],
            state(clicks.len()),
        ))
    }
}

/// Refinement state tagged with the number of clicks that produced it.
pub fn state(clicks: usize) -> RefinementState {
    RefinementState(ArrayD::from_elem(IxDyn(&[1]), clicks as f32))
}

/// Dataset of solid-color images kept in memory.
#[derive(Debug)]
pub struct MemoryStore {
    pub images: Vec<ImageData>,
    pub categories: Vec<Category>,
    pub annotations: Vec<Vec<Annotation>>,
    pub persist_count: usize,
    /// Image indices whose data cannot be loaded
    pub broken: Vec<usize>,
    /// Make every `persist` fail
    pub fail_persist: bool,
    next_id: AnnotationId,
}

impl MemoryStore {
    pub fn new(num_images: usize, categories: &[&str]) -> Self {
        let images = (0..num_images)
            .map(|i| {
                let shade = (i * 40 % 256) as u8;
                let rgb = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([shade, 100, 200]));
                let bgr = Frame::from_rgb(&rgb);
                ImageData {
                    rgb,
                    bgr,
                    embedding: ArrayD::zeros(IxDyn(&[1, 2, 2])),
                }
            })
            .collect();
        Self {
            images,
            categories: categories_from_names(categories),
            annotations: vec![Vec::new(); num_images],
            persist_count: 0,
            broken: Vec::new(),
            fail_persist: false,
            next_id: 1,
        }
    }

    fn check(&self, index: usize) -> Result<(), StoreError> {
        if index < self.images.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.images.len(),
            })
        }
    }
}

impl DatasetStore for MemoryStore {
    fn num_images(&self) -> usize {
        self.images.len()
    }

    fn image_data(&self, index: usize) -> Result<ImageData, StoreError> {
        self.check(index)?;
        if self.broken.contains(&index) {
            return Err(StoreError::not_found(format!("image_{index}.png")));
        }
        Ok(self.images[index].clone())
    }

    fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn annotations_for(&self, index: usize) -> Result<(Vec<Annotation>, Vec<Bgr>), StoreError> {
        self.check(index)?;
        let annotations = self.annotations[index].clone();
        let colors = annotations
            .iter()
            .map(|a| category_color(a.category_id))
            .collect();
        Ok((annotations, colors))
    }

    fn add_annotation(
        &mut self,
        index: usize,
        category_index: usize,
        mask: &Mask,
    ) -> Result<AnnotationId, StoreError> {
        self.check(index)?;
        let category = self
            .categories
            .get(category_index)
            .ok_or(StoreError::CategoryOutOfRange {
                index: category_index,
                len: self.categories.len(),
            })?;
        let bbox = mask_bbox(mask).ok_or_else(|| StoreError::invalid_data("mask is empty"))?;
        let id = self.next_id;
        self.next_id += 1;
        self.annotations[index].push(
            Annotation::new(
                id,
                index as u64,
                category.id,
                bbox,
                Segmentation::Rle(Rle::encode(mask)),
            )
            .with_area(mask_area(mask) as f64),
        );
        Ok(id)
    }

    fn delete_annotations(&mut self, index: usize) -> Result<Option<AnnotationId>, StoreError> {
        self.check(index)?;
        Ok(self.annotations[index].pop().map(|a| a.id))
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        if self.fail_persist {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.persist_count += 1;
        Ok(())
    }
}
