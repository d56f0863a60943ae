//! Synthetic rasters for unit tests.

use image::{GrayImage, Luma};

use crate::candidate::SignCandidate;
use crate::geometry::RectifyTransform;

/// Fill `[x, x+w) x [y, y+h)` with `value`, clipped to the image.
pub(crate) fn draw_filled_rect(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, value: u8) {
    let (iw, ih) = img.dimensions();
    for yy in y..(y + h).min(ih) {
        for xx in x..(x + w).min(iw) {
            img.put_pixel(xx, yy, Luma([value]));
        }
    }
}

/// Rectangular ring: the filled rect minus an inset of `stroke` pixels.
pub(crate) fn draw_ring_rect(
    img: &mut GrayImage,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    stroke: u32,
    value: u8,
) {
    draw_filled_rect(img, x, y, w, stroke, value);
    draw_filled_rect(img, x, y + h - stroke, w, stroke, value);
    draw_filled_rect(img, x, y, stroke, h, value);
    draw_filled_rect(img, x + w - stroke, y, stroke, h, value);
}

/// 1-px 4-neighbour outline of the nonzero pixels, as an edge detector would
/// leave it.
pub(crate) fn outline(blobs: &GrayImage) -> GrayImage {
    let (w, h) = blobs.dimensions();
    let on = |x: i64, y: i64| {
        x >= 0 && y >= 0 && x < w as i64 && y < h as i64 && blobs.get_pixel(x as u32, y as u32)[0] > 0
    };
    let mut out = GrayImage::new(w, h);
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            if on(x, y) && !(on(x - 1, y) && on(x + 1, y) && on(x, y - 1) && on(x, y + 1)) {
                out.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
    }
    out
}

/// Regular polygon approximating a circle.
pub(crate) fn circle_polygon(center: [f64; 2], radius: f64, n: usize) -> Vec<[i32; 2]> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            [
                (center[0] + radius * t.cos()).round() as i32,
                (center[1] + radius * t.sin()).round() as i32,
            ]
        })
        .collect()
}

/// Draw the closed polyline through `points` with value 255.
pub(crate) fn draw_closed_polyline(img: &mut GrayImage, points: &[[i32; 2]]) {
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        imageproc::drawing::draw_line_segment_mut(
            img,
            (a[0] as f32, a[1] as f32),
            (b[0] as f32, b[1] as f32),
            Luma([255]),
        );
    }
}

/// Filled glyph blobs of a round sign reading "130", centered at (120, 120)
/// with radius 100: a thin bar, a solid block and a thick rectangular ring.
pub(crate) fn speed_sign_blobs(width: u32, height: u32) -> GrayImage {
    let mut blobs = GrayImage::new(width, height);
    draw_filled_rect(&mut blobs, 60, 80, 10, 80, 255);
    draw_filled_rect(&mut blobs, 85, 80, 50, 80, 255);
    draw_ring_rect(&mut blobs, 145, 80, 50, 80, 12, 255);
    blobs
}

/// Edge map (sign rim plus glyph outlines) and the matching candidate.
pub(crate) fn speed_sign_edges(width: u32, height: u32) -> (GrayImage, SignCandidate) {
    let polygon = circle_polygon([120.0, 120.0], 100.0, 64);
    let mut edges = outline(&speed_sign_blobs(width, height));
    draw_closed_polyline(&mut edges, &polygon);
    let candidate = SignCandidate::new(&polygon).expect("non-empty polygon");
    (edges, candidate)
}

/// Like [`speed_sign_edges`], with the glyphs rotated by `angle_deg`
/// (counter-clockwise on screen) about the sign center before outlining.
pub(crate) fn tilted_speed_sign_edges(
    width: u32,
    height: u32,
    angle_deg: f64,
) -> (GrayImage, SignCandidate) {
    let polygon = circle_polygon([120.0, 120.0], 100.0, 64);
    let blobs = RectifyTransform::rotation_about([120.0, 120.0], angle_deg)
        .warp_gray(&speed_sign_blobs(width, height));
    let mut edges = outline(&blobs);
    draw_closed_polyline(&mut edges, &polygon);
    let candidate = SignCandidate::new(&polygon).expect("non-empty polygon");
    (edges, candidate)
}

/// Outline of a rectangular board, as a 1-px loop.
pub(crate) fn draw_board_outline(edges: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
    let mut blob = GrayImage::new(edges.width(), edges.height());
    draw_filled_rect(&mut blob, x, y, w, h, 255);
    let loop_px = outline(&blob);
    for (dst, src) in edges.pixels_mut().zip(loop_px.pixels()) {
        dst[0] = dst[0].max(src[0]);
    }
}

/// Keep every other edge pixel in a checkerboard pattern, breaking all
/// outlines into isolated dots that a 3x3 dilation joins again.
pub(crate) fn dotted(edges: &GrayImage) -> GrayImage {
    let mut out = edges.clone();
    for (x, y, p) in out.enumerate_pixels_mut() {
        if (x + y) % 2 == 1 {
            p[0] = 0;
        }
    }
    out
}
