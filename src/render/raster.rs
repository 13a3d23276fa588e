//! Path rasterization onto frames and masks.
//!
//! Shapes are built as `tiny_skia` paths and filled into an aliased
//! coverage mask the size of the target, which is then painted with a flat
//! color. Coordinates are in pixel units with pixel centers at `+0.5`.

use tiny_skia::{FillRule, LineCap, LineJoin, Path, PathBuilder, Stroke, Transform};

use crate::color_utils::Bgr;
use crate::model::{Mask, MIN_POLYGON_VERTICES, Rle, Segmentation, empty_mask};

use super::frame::Frame;

/// Fill `path` with `color`.
pub(crate) fn fill_path(frame: &mut Frame, path: &Path, color: Bgr) {
    let Some(mut coverage) = tiny_skia::Mask::new(frame.width(), frame.height()) else {
        return;
    };
    coverage.fill_path(path, FillRule::Winding, false, Transform::identity());
    for (index, _) in coverage.data().iter().enumerate().filter(|(_, c)| **c > 0) {
        frame.put_index(index, color);
    }
}

/// Stroke `path` with `width` pixels of `color`.
pub(crate) fn stroke_path(frame: &mut Frame, path: &Path, width: f32, color: Bgr) {
    let stroke = Stroke {
        width: width.max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Miter,
        ..Stroke::default()
    };
    match path.stroke(&stroke, 1.0) {
        Some(outline) => fill_path(frame, &outline, color),
        None => log::trace!("stroke produced no outline"),
    }
}

/// Path through `points`, optionally closed back to the first point.
pub(crate) fn polyline(points: &[(f32, f32)], close: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for p in rest {
        pb.line_to(p.0, p.1);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

/// Rectangle outline through the centers of the corner pixels.
pub(crate) fn rect_outline(x: i32, y: i32, w: i32, h: i32) -> Option<Path> {
    let (x0, y0) = (x as f32 + 0.5, y as f32 + 0.5);
    let (x1, y1) = (x0 + w as f32, y0 + h as f32);
    polyline(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)], true)
}

/// Disk centered on pixel `(x, y)`.
pub(crate) fn disk(x: i32, y: i32, radius: f32) -> Option<Path> {
    PathBuilder::from_circle(x as f32 + 0.5, y as f32 + 0.5, radius.max(0.5))
}

/// Rasterize flat `[x1, y1, x2, y2, ...]` polygons into a mask.
///
/// Vertices are pixel indices. Each polygon covers its interior plus the
/// pixels its edges pass through, and the results are combined by union.
/// Polygons with fewer than three vertices contribute nothing.
pub fn polygons_to_mask(polygons: &[Vec<f64>], height: usize, width: usize) -> Mask {
    let mut mask = empty_mask(height, width);
    let Some(mut coverage) = tiny_skia::Mask::new(width as u32, height as u32) else {
        return mask;
    };
    let edge = Stroke {
        width: 1.0,
        ..Stroke::default()
    };

    for flat in polygons {
        if flat.len() < MIN_POLYGON_VERTICES * 2 {
            continue;
        }
        let points: Vec<(f32, f32)> = flat
            .chunks_exact(2)
            .map(|xy| (xy[0] as f32 + 0.5, xy[1] as f32 + 0.5))
            .collect();
        let Some(path) = polyline(&points, true) else {
            continue;
        };
        coverage.fill_path(&path, FillRule::Winding, false, Transform::identity());
        if let Some(outline) = path.stroke(&edge, 1.0) {
            coverage.fill_path(&outline, FillRule::Winding, false, Transform::identity());
        }
    }

    for (index, _) in coverage.data().iter().enumerate().filter(|(_, c)| **c > 0) {
        mask[[index / width, index % width]] = true;
    }
    mask
}

/// Decode any segmentation into a mask of the given size.
///
/// RLE masks of a different size are copied over their overlapping region.
pub fn segmentation_to_mask(segmentation: &Segmentation, height: usize, width: usize) -> Mask {
    match segmentation {
        Segmentation::Polygons(polygons) => polygons_to_mask(polygons, height, width),
        other => match other.to_rle() {
            Ok(Some(rle)) => fit_rle(&rle, height, width),
            Ok(None) => empty_mask(height, width),
            Err(e) => {
                log::warn!("Skipping unreadable segmentation: {}", e);
                empty_mask(height, width)
            }
        },
    }
}

fn fit_rle(rle: &Rle, height: usize, width: usize) -> Mask {
    let decoded = rle.decode();
    if decoded.dim() == (height, width) {
        return decoded;
    }
    log::warn!(
        "RLE size {:?} does not match image {}x{}, cropping",
        rle.size,
        width,
        height
    );
    let mut mask = empty_mask(height, width);
    for ((row, col), &value) in decoded.indexed_iter() {
        if value && row < height && col < width {
            mask[[row, col]] = true;
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompressedRle, mask_area};

    #[test]
    fn test_square_polygon_fills_interior() {
        let square = vec![vec![2.0, 2.0, 8.0, 2.0, 8.0, 8.0, 2.0, 8.0]];
        let mask = polygons_to_mask(&square, 10, 12);
        assert_eq!(mask.dim(), (10, 12));
        assert!(mask[[5, 5]]);
        assert!(mask[[3, 7]]);
        assert!(mask[[2, 2]]);
        assert!(mask[[8, 8]]);
        assert!(!mask[[0, 0]]);
        assert!(!mask[[5, 10]]);
        assert!(!mask[[9, 5]]);
    }

    #[test]
    fn test_polygon_union() {
        let polygons = vec![
            vec![0.0, 0.0, 4.0, 0.0, 4.0, 4.0, 0.0, 4.0],
            vec![6.0, 6.0, 10.0, 6.0, 10.0, 10.0, 6.0, 10.0],
        ];
        let mask = polygons_to_mask(&polygons, 10, 10);
        assert!(mask[[1, 1]]);
        assert!(mask[[8, 8]]);
        assert!(!mask[[5, 5]]);
    }

    #[test]
    fn test_degenerate_polygon_is_empty() {
        let mask = polygons_to_mask(&[vec![1.0, 1.0, 5.0, 5.0]], 8, 8);
        assert_eq!(mask_area(&mask), 0);
    }

    #[test]
    fn test_rle_segmentation_decodes() {
        let mut source = empty_mask(4, 5);
        source[[2, 3]] = true;
        let seg = Segmentation::Rle(Rle::encode(&source));
        assert_eq!(segmentation_to_mask(&seg, 4, 5), source);
    }

    #[test]
    fn test_malformed_rle_segmentation_is_empty() {
        let seg = Segmentation::CompressedRle(CompressedRle {
            size: [4, 4],
            counts: "oooooooooooooo0".to_string(),
        });
        assert_eq!(segmentation_to_mask(&seg, 4, 4), empty_mask(4, 4));

        let oversized = Segmentation::Rle(Rle {
            size: [u32::MAX, u32::MAX],
            counts: vec![0, 1],
        });
        assert_eq!(segmentation_to_mask(&oversized, 4, 4), empty_mask(4, 4));
    }

    #[test]
    fn test_fill_path_paints_disk() {
        let mut frame = Frame::filled(11, 11, [0, 0, 0]);
        let path = disk(5, 5, 3.0).unwrap();
        fill_path(&mut frame, &path, [1, 2, 3]);
        assert_eq!(frame.pixel(5, 5), [1, 2, 3]);
        assert_eq!(frame.pixel(0, 0), [0, 0, 0]);
        assert_eq!(frame.pixel(10, 10), [0, 0, 0]);
    }
}
