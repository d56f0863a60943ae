//! Supplementary board localization below a speed sign.
//!
//! The search area is a band under the sign, widened on both sides. Rectangular
//! outlines found there push the bottom of the returned crop down; the crop
//! always starts a little above the sign so the sign and its board stay
//! together.

use image::{GrayImage, RgbImage};

use crate::candidate::SignCandidate;
use crate::contours::{Contour, Retrieval};
use crate::edge_variant::{EdgeVariant, VariantKind};
use crate::geometry::{approximate_polygon, min_area_rect, polygon_area, PixelRect, RectifyTransform};
use crate::raster;

/// Tuning for board localization.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// The search area starts `sign_width / left_shift_divisor` left of the sign.
    pub left_shift_divisor: i32,
    /// The search area is wider than the sign by this fraction of its width.
    pub widen_frac: f64,
    /// Search height as a multiple of the sign height.
    pub height_factor: f64,
    /// Radius of the square used to build the dilated variant (1 -> 3x3).
    pub dilate_radius: u8,
    /// Douglas-Peucker tolerance for quadrilateral detection (px).
    pub approx_epsilon: f64,
    /// Maximum `|rect_area / contour_area - 1|` for a quadrilateral to count.
    pub max_area_ratio_deviation: f64,
    /// Margin around the result as a fraction of the sign height.
    pub margin_frac: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            left_shift_divisor: 3,
            widen_frac: 0.67,
            height_factor: 3.14,
            dilate_radius: 1,
            approx_epsilon: 10.0,
            max_area_ratio_deviation: 0.3,
            margin_frac: 0.2,
        }
    }
}

/// Band under the sign where a board may appear, clamped to the frame.
pub fn board_search_rect(sign: PixelRect, frame_w: u32, frame_h: u32, cfg: &BoardConfig) -> PixelRect {
    let (fw, fh) = (frame_w as i32, frame_h as i32);

    let mut x = sign.x - sign.width.checked_div(cfg.left_shift_divisor).unwrap_or(0);
    let mut width = sign.width + (cfg.widen_frac * sign.width as f64) as i32;
    if x < 0 {
        x = 0;
    }
    if x + width > fw {
        width = fw - x;
    }

    let mut y = sign.y + sign.height;
    let mut height = (sign.height as f64 * cfg.height_factor) as i32;
    if y > fh {
        y = fh;
    }
    if y + height > fh {
        height = fh - y;
    }

    PixelRect::new(x, y, width.max(0), height.max(0))
}

/// Crop holding the sign and the board found under it.
#[derive(Debug, Clone)]
pub struct BoardRegion {
    pub kind: VariantKind,
    /// Frame rectangle of `image`.
    pub rect: PixelRect,
    pub image: RgbImage,
    /// Number of rectangular outlines that contributed.
    pub quads: usize,
    /// Rotation already applied to `image`. Identity out of [`BoardLocator::locate`];
    /// the reading pipeline sets it to the digit rectification.
    pub transform: RectifyTransform,
}

impl BoardRegion {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.rect.height
    }
}

/// Prepared search area for one sign candidate.
#[derive(Debug, Clone)]
pub struct BoardLocator {
    search: PixelRect,
    sign_height: i32,
    conservative: EdgeVariant,
    dilated: EdgeVariant,
    config: BoardConfig,
}

impl BoardLocator {
    pub fn new(candidate: &SignCandidate, edges: &GrayImage, config: &BoardConfig) -> Self {
        let sign = candidate.bounds();
        let search = board_search_rect(sign, edges.width(), edges.height(), config);
        let crop = search.crop_gray(edges);
        let dilated = if crop.width() == 0 || crop.height() == 0 {
            crop.clone()
        } else {
            raster::dilate_square(&crop, config.dilate_radius)
        };
        tracing::trace!(?search, "board search area");

        Self {
            search,
            sign_height: sign.height,
            conservative: EdgeVariant::new(VariantKind::Conservative, crop, Retrieval::TwoLevel),
            dilated: EdgeVariant::new(VariantKind::Dilated, dilated, Retrieval::TwoLevel),
            config: config.clone(),
        }
    }

    #[inline]
    pub fn search_rect(&self) -> PixelRect {
        self.search
    }

    pub fn variant(&self, kind: VariantKind) -> &EdgeVariant {
        match kind {
            VariantKind::Conservative => &self.conservative,
            VariantKind::Dilated => &self.dilated,
        }
    }

    /// Locate the board on one edge strength and crop it out of `frame`.
    ///
    /// The conservative pass looks at outer borders, the dilated pass at holes
    /// (thickened strokes turn a board outline into a ring).
    pub fn locate(&self, kind: VariantKind, frame: &RgbImage) -> BoardRegion {
        let variant = self.variant(kind);
        let scan: Box<dyn Iterator<Item = &Contour> + '_> = match kind {
            VariantKind::Conservative => Box::new(variant.contours().outermost()),
            VariantKind::Dilated => Box::new(variant.contours().inner()),
        };

        let mut max_y = 0;
        let mut quads = 0;
        for contour in scan {
            if let Some(bottom) = self.quad_bottom(contour) {
                max_y = max_y.max(bottom);
                quads += 1;
            }
        }

        let h = self.sign_height;
        let extra = (h as f64 * self.config.margin_frac) as i32;
        let rect = PixelRect::new(
            self.search.x,
            self.search.y - (h + extra),
            self.search.width,
            max_y + h + 3 * extra,
        )
        .clamp_to(frame.width(), frame.height());

        tracing::debug!(%kind, quads, max_y, ?rect, "board pass");
        BoardRegion {
            kind,
            rect,
            image: rect.crop_rgb(frame),
            quads,
            transform: RectifyTransform::identity(),
        }
    }

    /// Lowest vertex of `contour` if it is a convincing quadrilateral.
    fn quad_bottom(&self, contour: &Contour) -> Option<i32> {
        let poly = approximate_polygon(&contour.points, self.config.approx_epsilon);
        if poly.len() != 4 {
            return None;
        }
        let area = polygon_area(&contour.points);
        if area <= 0.0 {
            return None;
        }
        let rect_area = min_area_rect(&contour.points).area();
        if (rect_area / area - 1.0).abs() > self.config.max_area_ratio_deviation {
            tracing::trace!(area, rect_area, "quadrilateral not rectangular enough");
            return None;
        }
        poly.iter().map(|p| p.y).max()
    }
}
