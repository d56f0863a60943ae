//! Digit segmentation and recognition inside a round speed sign.
//!
//! The sign interior is cut out of the edge map, the glyph outlines are traced,
//! the mask is rotated upright using the first plausible glyph, and each glyph
//! is filled from a seed near its bottom-left corner before classification.
//! Two edge strengths are prepared up front; [`DigitRecognizer::recognize`]
//! runs one pass over either of them without touching the other.

mod classifier;
mod config;
mod seed;
mod validate;

pub use classifier::{
    Activation, DigitClassifier, GlyphPattern, LayerSpec, MlpClassifier, MlpSpec,
};
pub use config::DigitConfig;
pub use validate::{validate_digits, Implausibility, RecognitionError, SpeedReading};

use image::GrayImage;
use imageproc::point::Point;

use crate::candidate::SignCandidate;
use crate::contours::Retrieval;
use crate::edge_variant::{EdgeVariant, VariantKind};
use crate::geometry::{min_area_rect, PixelRect, RectifyTransform};
use crate::raster::{self, FillRange};
use seed::{find_seed, nudge_seed};

/// Classified glyph value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitValue {
    /// Label returned by the classifier.
    Digit(u8),
    /// Narrow glyph read as 1 without consulting the classifier.
    CandidateOne,
}

impl DigitValue {
    #[inline]
    pub fn digit(self) -> u8 {
        match self {
            Self::Digit(d) => d,
            Self::CandidateOne => 1,
        }
    }
}

/// One accepted glyph, in rectified sign-crop coordinates.
#[derive(Debug, Clone)]
pub struct DigitRegion {
    pub rect: PixelRect,
    pub value: DigitValue,
    /// Filled glyph mask cropped to `rect`.
    pub mask: GrayImage,
}

/// Why a single glyph outline was dropped. Never fails the pass on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphReject {
    TooSmall,
    TooLarge,
    SeedOutOfBounds,
    RejectedLabel,
}

impl GlyphReject {
    pub const fn code(self) -> &'static str {
        match self {
            Self::TooSmall => "too_small",
            Self::TooLarge => "too_large",
            Self::SeedOutOfBounds => "seed_out_of_bounds",
            Self::RejectedLabel => "rejected_label",
        }
    }
}

impl std::fmt::Display for GlyphReject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of one successful recognition pass.
#[derive(Debug, Clone)]
pub struct DigitRecognition {
    /// Edge strength the pass ran on.
    pub kind: VariantKind,
    pub reading: SpeedReading,
    /// Accepted glyphs, left to right.
    pub regions: Vec<DigitRegion>,
    /// Rotation applied to the sign crop (crop coordinates).
    pub transform: RectifyTransform,
    /// Sign crop in frame coordinates.
    pub sign_rect: PixelRect,
}

/// Prepared digit masks for one sign candidate.
#[derive(Debug, Clone)]
pub struct DigitRecognizer {
    sign_rect: PixelRect,
    sign_size: (i32, i32),
    conservative: EdgeVariant,
    dilated: EdgeVariant,
    config: DigitConfig,
}

impl DigitRecognizer {
    /// Cut the sign interior out of `edges` and trace both edge strengths.
    pub fn new(candidate: &SignCandidate, edges: &GrayImage, config: &DigitConfig) -> Self {
        let bounds = candidate.bounds();
        let sign_rect = bounds.clamp_to(edges.width(), edges.height());

        let mask = if sign_rect.is_empty() {
            GrayImage::new(0, 0)
        } else {
            let (w, h) = (sign_rect.width as u32, sign_rect.height as u32);
            let mut outside =
                raster::fill_polygon(w, h, candidate.polygon(), [-sign_rect.x, -sign_rect.y]);
            image::imageops::invert(&mut outside);
            let outside = raster::dilate_square(&outside, config.outside_dilate_radius);
            let mut mask = sign_rect.crop_gray(edges);
            raster::subtract_in_place(&mut mask, &outside);
            mask
        };
        let dilated = if mask.width() == 0 || mask.height() == 0 {
            mask.clone()
        } else {
            raster::dilate_square(&mask, config.dilated_variant_radius)
        };

        Self {
            sign_rect,
            sign_size: (bounds.width, bounds.height),
            conservative: EdgeVariant::new(VariantKind::Conservative, mask, Retrieval::Tree),
            dilated: EdgeVariant::new(VariantKind::Dilated, dilated, Retrieval::Tree),
            config: config.clone(),
        }
    }

    #[inline]
    pub fn sign_rect(&self) -> PixelRect {
        self.sign_rect
    }

    pub fn variant(&self, kind: VariantKind) -> &EdgeVariant {
        match kind {
            VariantKind::Conservative => &self.conservative,
            VariantKind::Dilated => &self.dilated,
        }
    }

    /// Run one recognition pass on the chosen edge strength.
    pub fn recognize(
        &self,
        kind: VariantKind,
        classifier: &dyn DigitClassifier,
    ) -> Result<DigitRecognition, RecognitionError> {
        let variant = self.variant(kind);
        let contours = variant.contours();

        let Some(reference) = contours
            .outermost()
            .find(|c| self.check_size(&PixelRect::bounding(&c.points)).is_ok())
        else {
            tracing::debug!(%kind, contours = contours.len(), "no glyph-sized contour");
            return Err(RecognitionError::NoDigitsFound);
        };

        let transform = rectification(&reference.points, self.config.max_rectify_angle_deg);
        let rectified = transform.warp_gray(variant.mask());

        let mut regions = Vec::new();
        for (idx, contour) in contours.outermost().enumerate() {
            match self.segment_glyph(&contour.points, &rectified, &transform, classifier) {
                Ok(region) => regions.push(region),
                Err(reject @ (GlyphReject::TooSmall | GlyphReject::TooLarge)) => {
                    tracing::trace!(%kind, idx, reason = reject.code(), "contour skipped");
                }
                Err(reject) => {
                    tracing::debug!(%kind, idx, reason = reject.code(), "glyph rejected");
                }
            }
        }
        regions.sort_by_key(|r| r.rect.x);

        let digits: Vec<u8> = regions.iter().map(|r| r.value.digit()).collect();
        tracing::debug!(%kind, ?digits, angle = transform.angle_deg(), "digit pass");
        let reading = validate_digits(&digits, self.config.max_plausible_speed)?;

        Ok(DigitRecognition {
            kind,
            reading,
            regions,
            transform,
            sign_rect: self.sign_rect,
        })
    }

    fn check_size(&self, rect: &PixelRect) -> Result<(), GlyphReject> {
        let cfg = &self.config;
        let (sign_w, sign_h) = self.sign_size;
        let min_height = cfg
            .min_glyph_height_px
            .max((sign_h as f64 * cfg.min_glyph_height_frac) as i32);
        if rect.height < min_height {
            return Err(GlyphReject::TooSmall);
        }
        let max_area = (sign_w as i64 * sign_h as i64) as f64 * cfg.max_glyph_area_frac;
        if rect.area() > max_area as i64 {
            return Err(GlyphReject::TooLarge);
        }
        Ok(())
    }

    fn segment_glyph(
        &self,
        points: &[Point<i32>],
        rectified: &GrayImage,
        transform: &RectifyTransform,
        classifier: &dyn DigitClassifier,
    ) -> Result<DigitRegion, GlyphReject> {
        let cfg = &self.config;
        let points = transform.apply_points(points);
        let rect = PixelRect::bounding(&points);
        self.check_size(&rect)?;

        let seed = find_seed(&points, &rect).ok_or(GlyphReject::TooSmall)?;
        let seed = nudge_seed(
            rectified,
            seed,
            cfg.seed_intensity_threshold,
            cfg.seed_max_steps,
        )
        .ok_or(GlyphReject::SeedOutOfBounds)?;

        let mut filled = rectified.clone();
        raster::flood_fill_fixed_range(
            &mut filled,
            (seed.x as u32, seed.y as u32),
            FillRange {
                lo_diff: cfg.flood_lo_diff,
                up_diff: cfg.flood_up_diff,
            },
            255,
        );

        let rect = rect.clamp_to(filled.width(), filled.height());
        if rect.is_empty() {
            return Err(GlyphReject::TooSmall);
        }
        let mask = rect.crop_gray(&filled);

        let value = if rect.width as f64 <= cfg.thin_glyph_ratio * rect.height as f64 {
            DigitValue::CandidateOne
        } else {
            let pattern =
                GlyphPattern::from_mask(&mask, classifier.input_size(), cfg.binarize_threshold);
            let label = classifier.classify(&pattern);
            if label > 9 {
                return Err(GlyphReject::RejectedLabel);
            }
            DigitValue::Digit(label)
        };

        Ok(DigitRegion { rect, value, mask })
    }
}

/// Rotation that levels the minimum-area rectangle of `reference`.
///
/// Angles beyond `max_angle_deg` in magnitude (including the `-90` reported for
/// axis-aligned outlines) leave the mask as is.
fn rectification(reference: &[Point<i32>], max_angle_deg: f64) -> RectifyTransform {
    let rr = min_area_rect(reference);
    let angle = if rr.angle_deg.abs() > max_angle_deg {
        0.0
    } else {
        rr.angle_deg
    };
    RectifyTransform::rotation_about(rr.center, angle)
}
