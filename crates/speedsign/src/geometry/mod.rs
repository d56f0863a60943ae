//! Planar geometry primitives shared by the digit and board stages.
//!
//! Implements:
//! - Integer pixel rectangles with frame clamping and cropping.
//! - Minimum-area rotated rectangles (rotating calipers over the convex hull).
//! - Polygon area and Douglas-Peucker simplification.
//! - The rotation-about-center affine used for digit rectification.

mod polygon;
mod rotated_rect;
mod transform;

pub use polygon::{approximate_polygon, polygon_area};
pub use rotated_rect::min_area_rect;
pub use transform::RectifyTransform;

use image::{GenericImageView, GrayImage, Pixel, RgbImage};
use imageproc::point::Point;

/// Axis-aligned integer rectangle in pixel coordinates.
///
/// `x`/`y` may be negative while a rectangle is being derived; use
/// [`PixelRect::clamp_to`] before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle containing every point (inclusive pixel extent).
    ///
    /// Returns an empty rectangle at the origin when `points` is empty.
    pub fn bounding(points: &[Point<i32>]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Self::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection with the `[0, w) x [0, h)` frame.
    ///
    /// The result is empty (zero width/height) when there is no overlap.
    pub fn clamp_to(&self, w: u32, h: u32) -> Self {
        let x0 = self.x.clamp(0, w as i32);
        let y0 = self.y.clamp(0, h as i32);
        let x1 = self.right().clamp(0, w as i32);
        let y1 = self.bottom().clamp(0, h as i32);
        Self::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    /// Copy the (frame-clamped) region out of a grayscale raster.
    pub fn crop_gray(&self, img: &GrayImage) -> GrayImage {
        crop(img, self)
    }

    /// Copy the (frame-clamped) region out of an RGB raster.
    pub fn crop_rgb(&self, img: &RgbImage) -> RgbImage {
        crop(img, self)
    }
}

type Raster<P> = image::ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;

fn crop<P>(img: &Raster<P>, rect: &PixelRect) -> Raster<P>
where
    P: Pixel + 'static,
{
    let (w, h) = img.dimensions();
    let r = rect.clamp_to(w, h);
    if r.is_empty() {
        return image::ImageBuffer::new(0, 0);
    }
    img.view(r.x as u32, r.y as u32, r.width as u32, r.height as u32)
        .to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_rect_is_inclusive() {
        let pts = [Point::new(3, 4), Point::new(10, 4), Point::new(7, 20)];
        let r = PixelRect::bounding(&pts);
        assert_eq!(r, PixelRect::new(3, 4, 8, 17));
        assert_eq!(r.right(), 11);
        assert_eq!(r.bottom(), 21);
    }

    #[test]
    fn bounding_of_nothing_is_empty() {
        assert!(PixelRect::bounding(&[]).is_empty());
    }

    #[test]
    fn clamp_trims_to_frame() {
        let r = PixelRect::new(-5, 90, 20, 30).clamp_to(100, 100);
        assert_eq!(r, PixelRect::new(0, 90, 15, 10));
        let outside = PixelRect::new(200, 200, 10, 10).clamp_to(100, 100);
        assert!(outside.is_empty());
        assert_eq!(outside.area(), 0);
    }

    #[test]
    fn crop_gray_uses_clamped_rect() {
        let mut img = GrayImage::new(8, 8);
        img.put_pixel(6, 6, image::Luma([200]));
        let c = PixelRect::new(5, 5, 10, 10).crop_gray(&img);
        assert_eq!(c.dimensions(), (3, 3));
        assert_eq!(c.get_pixel(1, 1)[0], 200);
    }
}
