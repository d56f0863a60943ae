//! Binary raster operations: polygon masks, square dilation, seeded fill.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

/// Rasterize a filled polygon (value 255, boundary included) into a zero
/// image of `width x height`, after shifting every vertex by `offset`.
pub fn fill_polygon(width: u32, height: u32, polygon: &[Point<i32>], offset: [i32; 2]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let mut poly: Vec<Point<i32>> = polygon
        .iter()
        .map(|p| Point::new(p.x + offset[0], p.y + offset[1]))
        .collect();
    poly.dedup();
    // The drawing routine expects an open ring.
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() >= 3 {
        draw_polygon_mut(&mut mask, &poly, Luma([255]));
    }
    mask
}

/// Dilate with a `(2r+1) x (2r+1)` square structuring element.
pub fn dilate_square(img: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return img.clone();
    }
    imageproc::morphology::dilate(img, Norm::LInf, radius)
}

/// `a -= b`, saturating at zero.
pub fn subtract_in_place(a: &mut GrayImage, b: &GrayImage) {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    for (pa, pb) in a.pixels_mut().zip(b.pixels()) {
        pa[0] = pa[0].saturating_sub(pb[0]);
    }
}

/// Bounds-checked pixel read with signed coordinates.
#[inline]
pub fn sample(img: &GrayImage, x: i32, y: i32) -> Option<u8> {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return None;
    }
    Some(img.get_pixel(x as u32, y as u32)[0])
}

/// Inclusive intensity window accepted by [`flood_fill_fixed_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRange {
    /// Allowed amount below the seed value.
    pub lo_diff: u8,
    /// Allowed amount above the seed value.
    pub up_diff: u8,
}

/// 4-connected flood fill comparing every pixel against the *seed* value.
///
/// Pixels whose value lies in `[seed - lo_diff, seed + up_diff]` and that are
/// reachable from the seed are overwritten with `new_value`. Returns the
/// number of pixels filled (0 when the seed is outside the image).
pub fn flood_fill_fixed_range(
    img: &mut GrayImage,
    seed: (u32, u32),
    range: FillRange,
    new_value: u8,
) -> usize {
    let (w, h) = img.dimensions();
    let (sx, sy) = seed;
    if sx >= w || sy >= h {
        return 0;
    }

    let seed_value = img.get_pixel(sx, sy)[0];
    let lo = seed_value.saturating_sub(range.lo_diff);
    let hi = seed_value.saturating_add(range.up_diff);
    let accept = |v: u8| v >= lo && v <= hi;

    let stride = w as usize;
    let mut visited = vec![false; stride * h as usize];
    let mut stack = vec![(sx, sy)];
    visited[sy as usize * stride + sx as usize] = true;
    let mut filled = 0usize;

    while let Some((x, y)) = stack.pop() {
        img.put_pixel(x, y, Luma([new_value]));
        filled += 1;

        let mut push = |nx: u32, ny: u32, img: &GrayImage| {
            let idx = ny as usize * stride + nx as usize;
            if !visited[idx] && accept(img.get_pixel(nx, ny)[0]) {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        };
        if x > 0 {
            push(x - 1, y, img);
        }
        if x + 1 < w {
            push(x + 1, y, img);
        }
        if y > 0 {
            push(x, y - 1, img);
        }
        if y + 1 < h {
            push(x, y + 1, img);
        }
    }
    filled
}
