//! COCO JSON backed dataset store.
//!
//! A dataset folder holds the images to annotate and one precomputed
//! embedding per image:
//!
//! ```text
//! dataset/
//!   images/        photo_001.jpg, photo_002.png, ...
//!   embeddings/    photo_001.npy, photo_002.npy, ...
//!   annotations.json
//! ```
//!
//! Annotations are kept in memory and only written by [`DatasetStore::persist`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::StoreError;
use super::loader::{list_images, load_embedding, load_rgb};
use super::{DatasetStore, ImageData};
use crate::color_utils::{Bgr, category_color};
use crate::model::{
    Annotation, AnnotationId, Category, MIN_POLYGON_VERTICES, Mask, Rle, Segmentation,
    categories_from_names, mask_area, mask_bbox,
};
use crate::render::{Frame, compress_runs, outer_contours};

/// Folder with the images, relative to the dataset root.
pub const IMAGES_DIR: &str = "images";
/// Folder with the `.npy` embeddings, relative to the dataset root.
pub const EMBEDDINGS_DIR: &str = "embeddings";
/// Default annotation file name inside the dataset root.
pub const ANNOTATIONS_FILE: &str = "annotations.json";

/// Dataset store reading images from disk and keeping COCO annotations.
#[derive(Debug)]
pub struct CocoDatasetStore {
    dataset_path: PathBuf,
    annotations_path: PathBuf,
    image_paths: Vec<PathBuf>,
    /// COCO image id for each entry of `image_paths`
    image_ids: Vec<u64>,
    categories: Vec<Category>,
    coco: CocoDataset,
    next_annotation_id: AnnotationId,
}

impl CocoDatasetStore {
    /// Open a dataset folder.
    ///
    /// When the annotation file exists its categories and annotations are
    /// loaded; otherwise a fresh dataset is started from `category_names`.
    /// `annotations_path` defaults to `annotations.json` in the dataset root.
    pub fn open(
        dataset_path: &Path,
        annotations_path: Option<&Path>,
        category_names: Option<&[String]>,
    ) -> Result<Self, StoreError> {
        let annotations_path = annotations_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dataset_path.join(ANNOTATIONS_FILE));
        let image_paths = list_images(&dataset_path.join(IMAGES_DIR))?;

        let mut coco = if annotations_path.exists() {
            log::info!("Loading annotations from {:?}", annotations_path);
            let json = std::fs::read_to_string(&annotations_path)?;
            serde_json::from_str::<CocoDataset>(&json)?
        } else {
            let names = category_names.ok_or_else(|| {
                StoreError::invalid_data(format!(
                    "no categories given and {:?} does not exist",
                    annotations_path
                ))
            })?;
            CocoDataset::with_categories(names)
        };

        if coco.categories.is_empty() {
            return Err(StoreError::invalid_data("dataset defines no categories"));
        }
        if let Some(names) = category_names {
            let known: Vec<&str> = coco.categories.iter().map(|c| c.name.as_str()).collect();
            if names.iter().any(|n| !known.contains(&n.as_str())) {
                log::warn!(
                    "Ignoring category list {:?}, the annotation file defines {:?}",
                    names,
                    known
                );
            }
        }

        coco.annotations.retain(|a| match a.segmentation.to_rle() {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Skipping annotation {}: {}", a.id, e);
                false
            }
        });

        let image_ids = register_images(&mut coco, dataset_path, &image_paths);
        let categories = coco
            .categories
            .iter()
            .map(|c| Category::new(c.id, &c.name))
            .collect();
        let next_annotation_id = coco.annotations.iter().map(|a| a.id).max().unwrap_or(0) + 1;

        let orphaned = coco
            .annotations
            .iter()
            .filter(|a| !image_ids.contains(&a.image_id))
            .count();
        if orphaned > 0 {
            log::warn!("{} annotations refer to images not in the dataset", orphaned);
        }

        log::info!(
            "Opened dataset {:?}: {} images, {} categories, {} annotations",
            dataset_path,
            image_paths.len(),
            coco.categories.len(),
            coco.annotations.len()
        );

        Ok(Self {
            dataset_path: dataset_path.to_path_buf(),
            annotations_path,
            image_paths,
            image_ids,
            categories,
            coco,
            next_annotation_id,
        })
    }

    /// Path of the image at `index`.
    pub fn image_path(&self, index: usize) -> Result<&Path, StoreError> {
        self.check_index(index)?;
        Ok(&self.image_paths[index])
    }

    /// Where the annotations are written on [`DatasetStore::persist`].
    pub fn annotations_path(&self) -> &Path {
        &self.annotations_path
    }

    /// All annotations of the dataset, in insertion order.
    pub fn all_annotations(&self) -> &[Annotation] {
        &self.coco.annotations
    }

    fn embedding_path(&self, index: usize) -> PathBuf {
        let stem = self.image_paths[index]
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.dataset_path
            .join(EMBEDDINGS_DIR)
            .join(format!("{stem}.npy"))
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.image_paths.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.image_paths.len(),
            })
        }
    }

    fn category_color(&self, category_id: u32) -> Bgr {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.color)
            .unwrap_or_else(|| category_color(category_id))
    }
}

impl DatasetStore for CocoDatasetStore {
    fn num_images(&self) -> usize {
        self.image_paths.len()
    }

    fn image_data(&self, index: usize) -> Result<ImageData, StoreError> {
        self.check_index(index)?;
        let rgb = load_rgb(&self.image_paths[index])?;
        let embedding = load_embedding(&self.embedding_path(index))?;
        let bgr = Frame::from_rgb(&rgb);
        Ok(ImageData {
            rgb,
            bgr,
            embedding,
        })
    }

    fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn annotations_for(&self, index: usize) -> Result<(Vec<Annotation>, Vec<Bgr>), StoreError> {
        self.check_index(index)?;
        let image_id = self.image_ids[index];
        let annotations: Vec<Annotation> = self
            .coco
            .annotations
            .iter()
            .filter(|a| a.image_id == image_id)
            .cloned()
            .collect();
        let colors = annotations
            .iter()
            .map(|a| self.category_color(a.category_id))
            .collect();
        Ok((annotations, colors))
    }

    fn add_annotation(
        &mut self,
        index: usize,
        category_index: usize,
        mask: &Mask,
    ) -> Result<AnnotationId, StoreError> {
        self.check_index(index)?;
        let category = self
            .categories
            .get(category_index)
            .ok_or(StoreError::CategoryOutOfRange {
                index: category_index,
                len: self.categories.len(),
            })?;
        let bbox = mask_bbox(mask).ok_or_else(|| StoreError::invalid_data("mask is empty"))?;

        let id = self.next_annotation_id;
        let annotation = Annotation::new(
            id,
            self.image_ids[index],
            category.id,
            bbox,
            mask_to_segmentation(mask),
        )
        .with_area(mask_area(mask) as f64);

        log::debug!(
            "Added annotation {} ({}) on image {}",
            id,
            category.name,
            index
        );
        self.coco.annotations.push(annotation);
        self.next_annotation_id += 1;
        Ok(id)
    }

    fn delete_annotations(&mut self, index: usize) -> Result<Option<AnnotationId>, StoreError> {
        self.check_index(index)?;
        let image_id = self.image_ids[index];
        let Some(position) = self
            .coco
            .annotations
            .iter()
            .rposition(|a| a.image_id == image_id)
        else {
            log::debug!("No annotations to delete on image {}", index);
            return Ok(None);
        };
        let removed = self.coco.annotations.remove(position);
        log::debug!("Deleted annotation {} on image {}", removed.id, index);
        Ok(Some(removed.id))
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.annotations_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.coco)?;
        std::fs::write(&self.annotations_path, json)?;
        log::info!(
            "Saved {} annotations to {:?}",
            self.coco.annotations.len(),
            self.annotations_path
        );
        Ok(())
    }
}

/// Outline polygons of every region, or an RLE when some region has fewer
/// than three boundary vertices (specks and one-pixel lines).
fn mask_to_segmentation(mask: &Mask) -> Segmentation {
    let outlines: Vec<_> = outer_contours(mask)
        .iter()
        .map(|contour| compress_runs(contour))
        .collect();
    if outlines.is_empty() || outlines.iter().any(|c| c.len() < MIN_POLYGON_VERTICES) {
        return Segmentation::Rle(Rle::encode(mask));
    }

    Segmentation::Polygons(
        outlines
            .iter()
            .map(|contour| {
                contour
                    .iter()
                    .flat_map(|&(x, y)| [x as f64, y as f64])
                    .collect()
            })
            .collect(),
    )
}

/// Make sure every listed image has a COCO image record and return the
/// record ids in listing order.
fn register_images(
    coco: &mut CocoDataset,
    dataset_path: &Path,
    image_paths: &[PathBuf],
) -> Vec<u64> {
    let by_name: HashMap<String, u64> = coco
        .images
        .iter()
        .map(|img| (img.file_name.clone(), img.id))
        .collect();
    let mut next_id = coco.images.iter().map(|img| img.id).max().unwrap_or(0) + 1;

    image_paths
        .iter()
        .map(|path| {
            let file_name = relative_name(dataset_path, path);
            if let Some(&id) = by_name.get(&file_name) {
                return id;
            }
            let (width, height) = image::image_dimensions(path).unwrap_or_else(|e| {
                log::warn!("Could not read dimensions of {:?}: {}", path, e);
                (0, 0)
            });
            let id = next_id;
            next_id += 1;
            coco.images.push(CocoImage {
                id,
                file_name,
                width,
                height,
            });
            id
        })
        .collect()
}

/// Path of an image relative to the dataset root, with `/` separators.
fn relative_name(dataset_path: &Path, path: &Path) -> String {
    path.strip_prefix(dataset_path)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

// COCO file structures

#[derive(Debug, Default, Serialize, Deserialize)]
struct CocoDataset {
    #[serde(default)]
    info: CocoInfo,
    #[serde(default)]
    images: Vec<CocoImage>,
    #[serde(default)]
    annotations: Vec<Annotation>,
    #[serde(default)]
    categories: Vec<CocoCategory>,
}

impl CocoDataset {
    fn with_categories(names: &[String]) -> Self {
        Self {
            info: CocoInfo {
                description: "SALT annotations".to_string(),
                ..CocoInfo::default()
            },
            categories: categories_from_names(names)
                .into_iter()
                .map(|c| CocoCategory {
                    id: c.id,
                    name: c.name,
                    supercategory: "none".to_string(),
                })
                .collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CocoInfo {
    #[serde(default)]
    description: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CocoImage {
    id: u64,
    file_name: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CocoCategory {
    id: u32,
    name: String,
    #[serde(default = "default_supercategory")]
    supercategory: String,
}

fn default_supercategory() -> String {
    "none".to_string()
}
