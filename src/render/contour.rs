//! Outer boundary extraction for binary masks.
//!
//! Boundaries come from `imageproc`'s border following. Only outermost
//! borders are kept: holes and regions lying inside holes are not
//! outlined. Every contour starts at its top-left-most pixel and runs
//! clockwise on screen (y grows downward).

use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};

use crate::model::Mask;

/// A traced boundary as `(x, y)` pixel coordinates.
pub type Contour = Vec<(usize, usize)>;

/// Outer boundary of every 8-connected region of `mask` that is not
/// enclosed by another region.
///
/// Regions are reported in raster order of their first pixel. A region of
/// one pixel yields a one-point contour.
pub fn outer_contours(mask: &Mask) -> Vec<Contour> {
    let (height, width) = mask.dim();
    let image = GrayImage::from_fn(width as u32, height as u32, |x, y| {
        Luma([if mask[[y as usize, x as usize]] { 255 } else { 0 }])
    });

    find_contours::<usize>(&image)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| normalize(c.points.iter().map(|p| (p.x, p.y)).collect()))
        .collect()
}

/// Drop vertices that lie on a straight run between their neighbors.
pub fn compress_runs(contour: &[(usize, usize)]) -> Contour {
    if contour.len() < 3 {
        return contour.to_vec();
    }
    let n = contour.len();
    let step = |a: (usize, usize), b: (usize, usize)| {
        (b.0 as i64 - a.0 as i64, b.1 as i64 - a.1 as i64)
    };
    (0..n)
        .filter(|&i| {
            let prev = contour[(i + n - 1) % n];
            let here = contour[i];
            let next = contour[(i + 1) % n];
            step(prev, here) != step(here, next)
        })
        .map(|i| contour[i])
        .collect()
}

/// Start at the top-left-most point and run clockwise on screen.
fn normalize(mut contour: Contour) -> Contour {
    let Some(start) = (0..contour.len()).min_by_key(|&i| (contour[i].1, contour[i].0)) else {
        return contour;
    };
    contour.rotate_left(start);
    if signed_area2(&contour) < 0 {
        contour[1..].reverse();
    }
    contour
}

/// Twice the shoelace area; positive for clockwise order with y down.
fn signed_area2(contour: &[(usize, usize)]) -> i64 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let (x0, y0) = contour[i];
            let (x1, y1) = contour[(i + 1) % n];
            x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::empty_mask;

    fn mask_from(rows: &[&str]) -> Mask {
        let mut mask = empty_mask(rows.len(), rows[0].len());
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                mask[[y, x]] = c == '#';
            }
        }
        mask
    }

    #[test]
    fn test_single_pixel() {
        let mask = mask_from(&["...", ".#.", "..."]);
        assert_eq!(outer_contours(&mask), vec![vec![(1, 1)]]);
    }

    #[test]
    fn test_square_boundary_clockwise() {
        let mask = mask_from(&["....", ".##.", ".##.", "...."]);
        let contours = outer_contours(&mask);
        assert_eq!(contours, vec![vec![(1, 1), (2, 1), (2, 2), (1, 2)]]);
    }

    #[test]
    fn test_boundary_skips_interior() {
        let mask = mask_from(&["#####", "#####", "#####"]);
        let contour = &outer_contours(&mask)[0];
        assert_eq!(contour.len(), 12);
        assert!(!contour.contains(&(2, 1)));
        assert_eq!(
            compress_runs(contour),
            vec![(0, 0), (4, 0), (4, 2), (0, 2)]
        );
    }

    #[test]
    fn test_diagonal_pixels_form_one_region() {
        let mask = mask_from(&["#..", ".#.", "..#"]);
        let contours = outer_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0][0], (0, 0));
        assert!(contours[0].contains(&(2, 2)));
    }

    #[test]
    fn test_separate_regions() {
        let mask = mask_from(&["##...", "##...", "....#"]);
        let contours = outer_contours(&mask);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[1], vec![(4, 2)]);
    }

    #[test]
    fn test_island_inside_hole_is_not_outlined() {
        let mask = mask_from(&[
            "#######",
            "#.....#",
            "#.###.#",
            "#.###.#",
            "#.....#",
            "#######",
        ]);
        let contours = outer_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(
            compress_runs(&contours[0]),
            vec![(0, 0), (6, 0), (6, 5), (0, 5)]
        );
    }

    #[test]
    fn test_counter_clockwise_input_is_reversed() {
        let contour = normalize(vec![(2, 2), (2, 1), (1, 1), (1, 2)]);
        assert_eq!(contour, vec![(1, 1), (2, 1), (2, 2), (1, 2)]);
    }

    #[test]
    fn test_empty_mask_has_no_contours() {
        assert!(outer_contours(&empty_mask(4, 4)).is_empty());
    }
}
