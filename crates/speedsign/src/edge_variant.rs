//! The two edge strengths each stage may run on.

use image::GrayImage;

use crate::contours::{ContourSet, Retrieval};

/// Which edge strength a pass runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// Edge map as computed.
    Conservative,
    /// Edge map thickened by a 3x3 square; closes small gaps in strokes.
    Dilated,
}

impl VariantKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Dilated => "dilated",
        }
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A binary raster together with its traced contours. Immutable once built.
#[derive(Debug, Clone)]
pub struct EdgeVariant {
    kind: VariantKind,
    mask: GrayImage,
    contours: ContourSet,
}

impl EdgeVariant {
    pub fn new(kind: VariantKind, mask: GrayImage, retrieval: Retrieval) -> Self {
        let contours = ContourSet::extract(&mask, retrieval);
        Self {
            kind,
            mask,
            contours,
        }
    }

    #[inline]
    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    #[inline]
    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    #[inline]
    pub fn contours(&self) -> &ContourSet {
        &self.contours
    }

    #[cfg(test)]
    pub(crate) fn with_contours(mut self, contours: ContourSet) -> Self {
        self.contours = contours;
        self
    }
}
