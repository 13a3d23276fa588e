//! Annotation records as kept by the dataset store.

use serde::{Deserialize, Serialize};

use super::mask::{BBox, Rle, RleError};

/// Unique identifier for an annotation.
pub type AnnotationId = u64;

/// Minimum number of vertices required for a valid polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Compressed COCO run-length encoding, `counts` kept as the encoded string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedRle {
    pub size: [u32; 2],
    pub counts: String,
}

/// Segmentation geometry of an annotation.
///
/// Mirrors the three shapes the `segmentation` field takes in COCO files:
/// a list of flat `[x1, y1, x2, y2, ...]` polygons, an uncompressed RLE, or
/// a compressed RLE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segmentation {
    Polygons(Vec<Vec<f64>>),
    Rle(Rle),
    CompressedRle(CompressedRle),
}

impl Segmentation {
    /// Polygons with fewer than three vertices are dropped.
    pub fn polygons(polygons: Vec<Vec<f64>>) -> Self {
        Segmentation::Polygons(
            polygons
                .into_iter()
                .filter(|p| p.len() >= MIN_POLYGON_VERTICES * 2)
                .collect(),
        )
    }

    /// Run-length form, `None` for polygons.
    ///
    /// Fails on malformed compressed counts and on sizes too large to decode.
    pub fn to_rle(&self) -> Result<Option<Rle>, RleError> {
        match self {
            Segmentation::Polygons(_) => Ok(None),
            Segmentation::Rle(rle) => {
                rle.validate()?;
                Ok(Some(rle.clone()))
            }
            Segmentation::CompressedRle(c) => Rle::from_compressed(c.size, &c.counts).map(Some),
        }
    }
}

impl Default for Segmentation {
    fn default() -> Self {
        Segmentation::Polygons(Vec::new())
    }
}

/// A labeled object on one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub image_id: u64,
    pub category_id: u32,
    pub bbox: BBox,
    #[serde(default)]
    pub segmentation: Segmentation,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub iscrowd: u8,
}

impl Annotation {
    pub fn new(
        id: AnnotationId,
        image_id: u64,
        category_id: u32,
        bbox: BBox,
        segmentation: Segmentation,
    ) -> Self {
        Self {
            id,
            image_id,
            category_id,
            bbox,
            segmentation,
            area: bbox.width * bbox.height,
            iscrowd: 0,
        }
    }

    /// Set the pixel area (defaults to the bbox area).
    pub fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }
}
