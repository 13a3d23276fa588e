//! Binary segmentation masks and their COCO run-length encoding.
//!
//! Masks are `height × width` boolean rasters indexed `[[row, col]]`.
//! Run-length encoding follows COCO: counts alternate background and
//! foreground runs, start with background, and walk the raster in
//! column-major order.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest raster an RLE may describe, in pixels.
pub const MAX_RLE_PIXELS: u64 = 1 << 28;

/// Seven 5-bit groups cover every `u32` count.
const MAX_GROUP_SHIFT: u32 = 30;

/// A binary segmentation raster, `true` = foreground.
pub type Mask = Array2<bool>;

/// Axis-aligned box in pixel units, `(x, y, width, height)`.
///
/// Serialized as the `[x, y, w, h]` array used in annotation files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Integer pixel rectangle, truncating like the annotation file readers do.
    pub fn to_pixels(&self) -> (i32, i32, i32, i32) {
        (
            self.x as i32,
            self.y as i32,
            self.width as i32,
            self.height as i32,
        )
    }

    /// `[x, y, w, h]` as stored in COCO files.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

impl From<[f64; 4]> for BBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        b.to_array()
    }
}

/// Errors from reading run-length encoded masks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RleError {
    /// Byte outside the 48..=111 range of compressed counts
    #[error("invalid byte {byte:#04x} at {position} in compressed counts")]
    InvalidByte { byte: u8, position: usize },

    /// Counts string ends inside a count
    #[error("compressed counts end inside the count starting at {position}")]
    Truncated { position: usize },

    /// Count does not fit a run length
    #[error("count starting at {position} is out of range")]
    CountOverflow { position: usize },

    /// Raster too large to decode
    #[error("RLE size {height}x{width} exceeds the pixel limit")]
    TooLarge { height: u32, width: u32 },
}

fn check_size(size: [u32; 2]) -> Result<(), RleError> {
    if u64::from(size[0]) * u64::from(size[1]) > MAX_RLE_PIXELS {
        return Err(RleError::TooLarge {
            height: size[0],
            width: size[1],
        });
    }
    Ok(())
}

/// Uncompressed COCO run-length encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rle {
    /// `[height, width]`
    pub size: [u32; 2],
    pub counts: Vec<u32>,
}

impl Rle {
    /// Encode a mask (column-major walk).
    pub fn encode(mask: &Mask) -> Self {
        let (height, width) = mask.dim();
        let mut counts = Vec::new();
        let mut current = false;
        let mut run = 0u32;

        for col in 0..width {
            for row in 0..height {
                let value = mask[[row, col]];
                if value != current {
                    counts.push(run);
                    run = 0;
                    current = value;
                }
                run += 1;
            }
        }
        counts.push(run);

        Self {
            size: [height as u32, width as u32],
            counts,
        }
    }

    /// Decode into a mask of the encoded size.
    ///
    /// Runs that overflow the raster are truncated.
    pub fn decode(&self) -> Mask {
        let height = self.size[0] as usize;
        let width = self.size[1] as usize;
        let total = height * width;
        let mut mask = Mask::from_elem((height, width), false);

        let mut index = 0usize;
        let mut value = false;
        for &count in &self.counts {
            let end = (index + count as usize).min(total);
            if value {
                for i in index..end {
                    mask[[i % height, i / height]] = true;
                }
            }
            index = end;
            value = !value;
        }
        mask
    }

    /// Decode the compressed string form of `counts` used by COCO tooling.
    ///
    /// Each count is a little-endian sequence of 5-bit groups offset by 48;
    /// from the third count on, values are stored as deltas to the count two
    /// positions earlier.
    pub fn from_compressed(size: [u32; 2], counts: &str) -> Result<Self, RleError> {
        check_size(size)?;
        let bytes = counts.as_bytes();
        let mut decoded: Vec<i64> = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            let start = i;
            let mut x: i64 = 0;
            let mut shift = 0u32;
            loop {
                let byte = *bytes.get(i).ok_or(RleError::Truncated { position: start })?;
                if !(48..=111).contains(&byte) {
                    return Err(RleError::InvalidByte { byte, position: i });
                }
                if shift > MAX_GROUP_SHIFT {
                    return Err(RleError::CountOverflow { position: start });
                }
                let c = i64::from(byte - 48);
                i += 1;
                x |= (c & 0x1f) << shift;
                shift += 5;
                if c & 0x20 == 0 {
                    if c & 0x10 != 0 {
                        x |= -1i64 << shift;
                    }
                    break;
                }
            }
            if decoded.len() > 2 {
                x = x
                    .checked_add(decoded[decoded.len() - 2])
                    .ok_or(RleError::CountOverflow { position: start })?;
            }
            decoded.push(x);
        }

        let counts = decoded
            .into_iter()
            .map(u32::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RleError::CountOverflow { position: bytes.len() })?;
        Ok(Self { size, counts })
    }

    /// Reject sizes too large to decode.
    pub fn validate(&self) -> Result<(), RleError> {
        check_size(self.size)
    }

    /// Number of foreground pixels (sum of the odd runs).
    pub fn area(&self) -> u64 {
        self.counts
            .iter()
            .skip(1)
            .step_by(2)
            .map(|&c| u64::from(c))
            .sum()
    }
}

/// A mask of the given size with no foreground.
pub fn empty_mask(height: usize, width: usize) -> Mask {
    Mask::from_elem((height, width), false)
}

/// Number of foreground pixels.
pub fn mask_area(mask: &Mask) -> u64 {
    mask.iter().filter(|&&v| v).count() as u64
}

/// Tight bounding box around the foreground, `None` for an empty mask.
pub fn mask_bbox(mask: &Mask) -> Option<BBox> {
    let mut min_x = usize::MAX;
    let mut min_y = usize::MAX;
    let mut max_x = 0usize;
    let mut max_y = 0usize;
    let mut any = false;

    for ((row, col), &value) in mask.indexed_iter() {
        if value {
            any = true;
            min_x = min_x.min(col);
            min_y = min_y.min(row);
            max_x = max_x.max(col);
            max_y = max_y.max(row);
        }
    }

    any.then(|| {
        BBox::new(
            min_x as f64,
            min_y as f64,
            (max_x - min_x + 1) as f64,
            (max_y - min_y + 1) as f64,
        )
    })
}
