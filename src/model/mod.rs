//! Data models shared by the session engine, the compositor and the store.

mod annotation;
mod category;
mod click;
mod mask;

pub use annotation::{
    Annotation, AnnotationId, CompressedRle, MIN_POLYGON_VERTICES, Segmentation,
};
pub use category::{Category, categories_from_names};
pub use click::{Click, ClickLabel};
pub use mask::{BBox, MAX_RLE_PIXELS, Mask, Rle, RleError, empty_mask, mask_area, mask_bbox};
