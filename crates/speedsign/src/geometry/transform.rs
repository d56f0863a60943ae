//! Rotation-about-center affine used to bring tilted digits upright.

use image::{GrayImage, Luma, RgbImage};
use imageproc::geometric_transformations::{warp, warp_with, Interpolation, Projection};
use imageproc::point::Point;
use nalgebra::{Matrix3, Vector3};

/// Affine `[R | t]` rotating the plane about `center` by `angle_deg`.
///
/// Follows the `getRotationMatrix2D` convention: a positive angle rotates
/// counter-clockwise as seen on screen (y axis pointing down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectifyTransform {
    matrix: Matrix3<f64>,
    angle_deg: f64,
    center: [f64; 2],
}

impl Default for RectifyTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RectifyTransform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            angle_deg: 0.0,
            center: [0.0, 0.0],
        }
    }

    pub fn rotation_about(center: [f64; 2], angle_deg: f64) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let [cx, cy] = center;
        #[rustfmt::skip]
        let matrix = Matrix3::new(
             cos, sin, (1.0 - cos) * cx - sin * cy,
            -sin, cos, sin * cx + (1.0 - cos) * cy,
             0.0, 0.0, 1.0,
        );
        Self {
            matrix,
            angle_deg,
            center,
        }
    }

    #[inline]
    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    #[inline]
    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.angle_deg == 0.0
    }

    /// Top two rows in row-major order (`[a, b, tx, c, d, ty]`).
    pub fn affine_rows(&self) -> [f64; 6] {
        let m = &self.matrix;
        [m[(0, 0)], m[(0, 1)], m[(0, 2)], m[(1, 0)], m[(1, 1)], m[(1, 2)]]
    }

    pub fn apply(&self, x: f64, y: f64) -> [f64; 2] {
        let v = self.matrix * Vector3::new(x, y, 1.0);
        [v.x, v.y]
    }

    /// Map integer points and round back to the pixel grid.
    pub fn apply_points(&self, points: &[Point<i32>]) -> Vec<Point<i32>> {
        if self.is_identity() {
            return points.to_vec();
        }
        points
            .iter()
            .map(|p| {
                let [x, y] = self.apply(p.x as f64, p.y as f64);
                Point::new(x.round() as i32, y.round() as i32)
            })
            .collect()
    }

    fn projection(&self) -> Option<Projection> {
        let m = self.matrix.map(|v| v as f32);
        Projection::from_matrix([
            m[(0, 0)],
            m[(0, 1)],
            m[(0, 2)],
            m[(1, 0)],
            m[(1, 1)],
            m[(1, 2)],
            0.0,
            0.0,
            1.0,
        ])
    }

    /// Warp a mask (bilinear, zero outside the source).
    pub fn warp_gray(&self, img: &GrayImage) -> GrayImage {
        if self.is_identity() {
            return img.clone();
        }
        match self.projection() {
            Some(p) => warp(img, &p, Interpolation::Bilinear, Luma([0])),
            None => img.clone(),
        }
    }

    /// Warp a color image (bilinear, edge pixels replicated outside the source).
    pub fn warp_rgb_replicate(&self, img: &RgbImage) -> RgbImage {
        let (w, h) = img.dimensions();
        if self.is_identity() || w < 2 || h < 2 {
            return img.clone();
        }
        let Some(inv) = self.matrix.try_inverse() else {
            return img.clone();
        };
        let inv = inv.map(|v| v as f32);
        // Bilinear sampling needs the right/bottom neighbour inside the image.
        let (max_x, max_y) = ((w - 1) as f32 - 1e-3, (h - 1) as f32 - 1e-3);
        warp_with(
            img,
            move |x, y| {
                let sx = inv[(0, 0)] * x + inv[(0, 1)] * y + inv[(0, 2)];
                let sy = inv[(1, 0)] * x + inv[(1, 1)] * y + inv[(1, 2)];
                (sx.clamp(0.0, max_x), sy.clamp(0.0, max_y))
            },
            Interpolation::Bilinear,
            image::Rgb([0, 0, 0]),
        )
    }
}
