//! Fill seed selection for a glyph outline.

use image::GrayImage;
use imageproc::point::Point;

use crate::geometry::PixelRect;
use crate::raster::sample;

/// Contour point closest to the bottom-left corner of `rect`, scored as
/// `x + (rect.bottom - y)`. The first minimum wins.
pub(crate) fn find_seed(points: &[Point<i32>], rect: &PixelRect) -> Option<Point<i32>> {
    let bottom = rect.bottom();
    points
        .iter()
        .min_by_key(|p| p.x + (bottom - p.y))
        .copied()
}

/// Step the seed diagonally up-right off the stroke, at most `max_steps` times,
/// while the mask under it is at least `threshold`.
///
/// Returns `None` as soon as the seed is outside `mask`.
pub(crate) fn nudge_seed(
    mask: &GrayImage,
    seed: Point<i32>,
    threshold: u8,
    max_steps: u32,
) -> Option<Point<i32>> {
    let mut p = seed;
    for _ in 0..max_steps {
        let v = sample(mask, p.x, p.y)?;
        if v < threshold {
            return Some(p);
        }
        p = Point::new(p.x + 1, p.y - 1);
    }
    sample(mask, p.x, p.y).map(|_| p)
}
