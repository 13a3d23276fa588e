//! Image and embedding file loading.
//!
//! Images are decoded with the `image` crate into 8-bit RGB. Embeddings are
//! NumPy `.npy` arrays of `f32`, or `f64` narrowed to `f32`.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use image::RgbImage;
use ndarray::ArrayD;
use ndarray_npy::ReadNpyExt;

use super::error::StoreError;
use crate::predictor::Embedding;

/// File extensions recognised as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// NumPy magic bytes: \x93NUMPY
const NPY_MAGIC: &[u8] = &[0x93, b'N', b'U', b'M', b'P', b'Y'];

/// Whether `path` has one of the [`IMAGE_EXTENSIONS`], case-insensitively.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::not_found(dir));
    }
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    images.sort();
    log::debug!("Found {} images in {:?}", images.len(), dir);
    Ok(images)
}

/// Decode an image file to 8-bit RGB.
pub fn load_rgb(path: &Path) -> Result<RgbImage, StoreError> {
    if !path.exists() {
        return Err(StoreError::not_found(path));
    }
    let image = image::open(path)?.to_rgb8();
    log::debug!(
        "Loaded image {:?} ({}x{})",
        path,
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Read an embedding `.npy` file.
pub fn load_embedding(path: &Path) -> Result<Embedding, StoreError> {
    if !path.exists() {
        return Err(StoreError::not_found(path));
    }
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    decode_embedding(&bytes)
}

/// Decode `.npy` bytes holding an `f32` or `f64` array.
pub fn decode_embedding(bytes: &[u8]) -> Result<Embedding, StoreError> {
    if !bytes.starts_with(NPY_MAGIC) {
        return Err(StoreError::invalid_data("embedding is not a NumPy array"));
    }

    let mut cursor = Cursor::new(bytes);
    match ArrayD::<f32>::read_npy(&mut cursor) {
        Ok(array) => Ok(array),
        Err(f32_err) => {
            cursor.set_position(0);
            match ArrayD::<f64>::read_npy(&mut cursor) {
                Ok(array) => Ok(array.mapv(|v| v as f32)),
                Err(_) => Err(f32_err.into()),
            }
        }
    }
}
