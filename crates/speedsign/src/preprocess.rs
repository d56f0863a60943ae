//! Frame preparation ahead of sign reading: size limiting, optional contrast
//! equalization and the edge map both stages work on.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};

/// Frame-level preprocessing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Frames whose larger side exceeds this are scaled down to it.
    pub max_dimension: u32,
    /// Equalize the luma histogram before edge detection.
    pub equalize_luma: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1000,
            equalize_luma: false,
        }
    }
}

/// Canny thresholds for the default edge provider.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EdgeDetectorConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for EdgeDetectorConfig {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
        }
    }
}

/// Scale `frame` down so its larger side is at most `max_dim`.
///
/// Returns the (possibly unchanged) frame and the applied scale factor.
pub fn limit_frame_size(frame: &RgbImage, max_dim: u32) -> (RgbImage, f64) {
    let (w, h) = frame.dimensions();
    let largest = w.max(h);
    if max_dim == 0 || largest <= max_dim {
        return (frame.clone(), 1.0);
    }
    let scale = max_dim as f64 / largest as f64;
    let shrink = |side: u32| ((side as u64 * max_dim as u64 / largest as u64) as u32).max(1);
    let (nw, nh) = (shrink(w), shrink(h));
    tracing::debug!(from = ?(w, h), to = ?(nw, nh), "frame resized");
    (imageops::resize(frame, nw, nh, FilterType::Triangle), scale)
}

/// Histogram-equalize the luma channel (YCrCb) and leave chroma untouched.
pub fn equalize_luma(frame: &RgbImage) -> RgbImage {
    let (w, h) = frame.dimensions();
    let mut luma = GrayImage::new(w, h);
    let mut chroma = Vec::with_capacity((w * h) as usize);
    for (x, y, p) in frame.enumerate_pixels() {
        let [r, g, b] = p.0.map(f32::from);
        let yv = 0.299 * r + 0.587 * g + 0.114 * b;
        chroma.push(((r - yv) * 0.713, (b - yv) * 0.564));
        luma.put_pixel(x, y, Luma([yv.round().clamp(0.0, 255.0) as u8]));
    }

    let luma = imageproc::contrast::equalize_histogram(&luma);
    let to_u8 = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    RgbImage::from_fn(w, h, |x, y| {
        let yv = luma.get_pixel(x, y)[0] as f32;
        let (cr, cb) = chroma[(y * w + x) as usize];
        Rgb([
            to_u8(yv + 1.403 * cr),
            to_u8(yv - 0.714 * cr - 0.344 * cb),
            to_u8(yv + 1.773 * cb),
        ])
    })
}

/// Binary edge map (255 = edge) of a grayscale frame.
pub fn edge_map(gray: &GrayImage, cfg: &EdgeDetectorConfig) -> GrayImage {
    imageproc::edges::canny(gray, cfg.low_threshold, cfg.high_threshold)
}

/// Frame ready for sign reading.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    pub rgb: RgbImage,
    pub gray: GrayImage,
    /// Factor applied to the input frame's coordinates.
    pub scale: f64,
}

/// Resize and optionally equalize `frame`, then derive its grayscale version.
pub fn prepare_frame(frame: &RgbImage, cfg: &PreprocessConfig) -> PreparedFrame {
    let (rgb, scale) = limit_frame_size(frame, cfg.max_dimension);
    let rgb = if cfg.equalize_luma {
        equalize_luma(&rgb)
    } else {
        rgb
    };
    let gray = imageops::grayscale(&rgb);
    PreparedFrame { rgb, gray, scale }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::draw_filled_rect;
    use approx::assert_relative_eq;

    #[test]
    fn large_frames_are_limited() {
        let (out, scale) = limit_frame_size(&RgbImage::new(2000, 1000), 1000);
        assert_eq!(out.dimensions(), (1000, 500));
        assert_relative_eq!(scale, 0.5);

        let (out, _) = limit_frame_size(&RgbImage::new(300, 1500), 1000);
        assert_eq!(out.dimensions(), (200, 1000));
    }

    #[test]
    fn square_frames_are_limited_too() {
        let (out, scale) = limit_frame_size(&RgbImage::new(1200, 1200), 1000);
        assert_eq!(out.dimensions(), (1000, 1000));
        assert_relative_eq!(scale, 1000.0 / 1200.0);
    }

    #[test]
    fn small_frames_pass_through() {
        let frame = RgbImage::from_pixel(640, 480, Rgb([1, 2, 3]));
        let (out, scale) = limit_frame_size(&frame, 1000);
        assert_eq!(out, frame);
        assert_relative_eq!(scale, 1.0);
    }

    #[test]
    fn equalization_stretches_luma_and_keeps_gray_gray() {
        let mut frame = RgbImage::from_pixel(20, 20, Rgb([100, 100, 100]));
        for y in 0..20 {
            for x in 10..20 {
                frame.put_pixel(x, y, Rgb([120, 120, 120]));
            }
        }
        let out = equalize_luma(&frame);
        let dark = out.get_pixel(0, 0).0;
        let bright = out.get_pixel(19, 19).0;
        assert!(bright[0] > 200, "{:?}", bright);
        assert!(dark[0] < bright[0]);
        for px in [dark, bright] {
            assert!(px[0].abs_diff(px[1]) <= 1 && px[1].abs_diff(px[2]) <= 1, "{:?}", px);
        }
    }

    #[test]
    fn canny_finds_block_boundary() {
        let mut gray = GrayImage::new(40, 40);
        draw_filled_rect(&mut gray, 10, 10, 20, 20, 255);
        let edges = edge_map(&gray, &EdgeDetectorConfig::default());
        assert!(edges.pixels().any(|p| p[0] == 255));
        assert_eq!(edges.get_pixel(20, 20)[0], 0);
        assert_eq!(edges.get_pixel(2, 2)[0], 0);
    }

    #[test]
    fn prepare_reports_scale() {
        let cfg = PreprocessConfig {
            max_dimension: 100,
            equalize_luma: true,
        };
        let prepared = prepare_frame(&RgbImage::new(400, 200), &cfg);
        assert_eq!(prepared.rgb.dimensions(), (100, 50));
        assert_eq!(prepared.gray.dimensions(), (100, 50));
        assert_relative_eq!(prepared.scale, 0.25);
    }
}
