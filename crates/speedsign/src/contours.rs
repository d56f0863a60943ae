//! Closed contours with a parent hierarchy, extracted from binary rasters.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

/// How much of the nesting structure to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieval {
    /// Full nesting: every border points at the border that directly encloses it.
    Tree,
    /// Outer borders are all top level; holes point at their outer border.
    TwoLevel,
}

/// One traced border.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
    /// Index of the enclosing contour in the same set, `None` for top level.
    pub parent: Option<usize>,
    pub is_hole: bool,
}

impl Contour {
    #[inline]
    pub fn is_outermost(&self) -> bool {
        self.parent.is_none()
    }
}

/// Contours of one raster, in tracing order.
#[derive(Debug, Clone, Default)]
pub struct ContourSet {
    contours: Vec<Contour>,
}

impl ContourSet {
    /// Trace every border of the nonzero pixels in `mask`.
    pub fn extract(mask: &GrayImage, retrieval: Retrieval) -> Self {
        if mask.width() == 0 || mask.height() == 0 {
            return Self::default();
        }
        let contours = find_contours::<i32>(mask)
            .into_iter()
            .map(|c| {
                let is_hole = c.border_type == BorderType::Hole;
                let parent = match retrieval {
                    Retrieval::Tree => c.parent,
                    Retrieval::TwoLevel if is_hole => c.parent,
                    Retrieval::TwoLevel => None,
                };
                Contour {
                    points: c.points,
                    parent,
                    is_hole,
                }
            })
            .collect();
        Self { contours }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }

    /// Contours without a parent.
    pub fn outermost(&self) -> impl Iterator<Item = &Contour> + '_ {
        self.contours.iter().filter(|c| c.is_outermost())
    }

    /// Contours nested inside another one.
    pub fn inner(&self) -> impl Iterator<Item = &Contour> + '_ {
        self.contours.iter().filter(|c| !c.is_outermost())
    }

    /// Reverse tracing order, remapping parent indices.
    #[cfg(test)]
    pub(crate) fn reversed(&self) -> Self {
        let n = self.contours.len();
        let contours = self
            .contours
            .iter()
            .rev()
            .map(|c| Contour {
                points: c.points.clone(),
                parent: c.parent.map(|p| n - 1 - p),
                is_hole: c.is_hole,
            })
            .collect();
        Self { contours }
    }
}
