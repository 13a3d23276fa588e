//! Dataset access: images, embeddings, categories and annotations.
//!
//! The editor only talks to a dataset through [`DatasetStore`]. The crate
//! ships [`CocoDatasetStore`], which reads a dataset folder and keeps its
//! annotations in a COCO JSON file.

mod coco;
mod error;
mod loader;

pub use coco::{ANNOTATIONS_FILE, CocoDatasetStore, EMBEDDINGS_DIR, IMAGES_DIR};
pub use error::StoreError;
pub use loader::{
    IMAGE_EXTENSIONS, decode_embedding, is_image_file, list_images, load_embedding, load_rgb,
};

use image::RgbImage;

use crate::color_utils::Bgr;
use crate::model::{Annotation, AnnotationId, Category, Mask};
use crate::predictor::Embedding;
use crate::render::Frame;

/// Everything the editor needs to work on one image.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Pixels handed to the predictor
    pub rgb: RgbImage,
    /// Same pixels in display channel order
    pub bgr: Frame,
    /// Precomputed features for the predictor
    pub embedding: Embedding,
}

/// Source of images and sink of committed annotations.
///
/// Indices are positions in the dataset's image list, `0..num_images()`.
/// Changes are held until [`persist`](Self::persist) is called.
pub trait DatasetStore {
    fn num_images(&self) -> usize;

    fn image_data(&self, index: usize) -> Result<ImageData, StoreError>;

    /// Categories in selection order.
    fn categories(&self) -> &[Category];

    /// Annotations on an image with one drawing color per annotation.
    fn annotations_for(&self, index: usize) -> Result<(Vec<Annotation>, Vec<Bgr>), StoreError>;

    /// Commit `mask` on image `index` as an object of the category at
    /// `category_index`, returning the new annotation id.
    fn add_annotation(
        &mut self,
        index: usize,
        category_index: usize,
        mask: &Mask,
    ) -> Result<AnnotationId, StoreError>;

    /// Remove the most recently added annotation of image `index`, if any.
    fn delete_annotations(&mut self, index: usize) -> Result<Option<AnnotationId>, StoreError>;

    /// Write pending changes to durable storage.
    fn persist(&mut self) -> Result<(), StoreError>;
}
