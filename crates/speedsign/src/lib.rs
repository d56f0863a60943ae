//! speedsign: reading circular speed-limit signs from video frames.
//!
//! Given a frame and the outline of a detected round sign, the crate reads the
//! posted speed and crops the supplementary board that may hang below the
//! sign. The stages are:
//!
//! 1. **Preprocess** - frame size limiting, optional luma equalization,
//!    Canny edge map.
//! 2. **Digits** - cut the sign interior out of the edge map, trace glyph
//!    outlines, rotate them upright, fill each glyph from a seed and classify
//!    it, then validate the digit sequence as a speed value.
//! 3. **Board** - look for rectangular outlines in a band under the sign and
//!    crop the frame down to the sign plus board.
//!
//! Both stages prepare a conservative and a dilated edge variant. Digits fall
//! back to the dilated edges when the conservative pass reads nothing; the
//! board keeps whichever variant gives the taller crop.
//!
//! # Public API
//! - [`Reader`] as primary entry point
//! - [`ReaderConfig`] for tuning
//! - [`DigitClassifier`] and [`SignProposer`] as the seams to trained models
//!   and upstream sign detection

mod api;
mod board;
mod candidate;
mod config;
mod contours;
mod digits;
mod edge_variant;
mod error;
mod geometry;
mod pipeline;
mod preprocess;
mod raster;
#[cfg(test)]
mod test_utils;

pub use api::Reader;
pub use board::{board_search_rect, BoardConfig, BoardLocator, BoardRegion};
pub use candidate::{SignCandidate, SignProposer};
pub use config::ReaderConfig;
pub use contours::{Contour, ContourSet, Retrieval};
pub use digits::{
    validate_digits, Activation, DigitClassifier, DigitConfig, DigitRecognition, DigitRecognizer,
    DigitRegion, DigitValue, GlyphPattern, GlyphReject, Implausibility, LayerSpec, MlpClassifier,
    MlpSpec, RecognitionError, SpeedReading,
};
pub use edge_variant::{EdgeVariant, VariantKind};
pub use error::ReadError;
pub use geometry::{PixelRect, RectifyTransform};
pub use pipeline::{
    read_frame, read_frame_with_edges, read_frame_with_proposer, read_sign, FrameReading,
    SignReading,
};
pub use preprocess::{
    edge_map, equalize_luma, limit_frame_size, prepare_frame, EdgeDetectorConfig, PreparedFrame,
    PreprocessConfig,
};

/// One accepted glyph in a [`SignReport`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DigitReport {
    /// Glyph box in rectified sign-crop coordinates.
    pub rect: PixelRect,
    pub value: DigitValue,
}

/// Serializable summary of one read sign (no image payloads).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SignReport {
    /// Sign crop in frame coordinates.
    pub sign_rect: PixelRect,
    pub speed: u32,
    pub digits: Vec<u8>,
    pub plausible: bool,
    pub implausible: Vec<Implausibility>,
    /// Edge variant the digits were read from.
    pub digit_variant: VariantKind,
    /// Rotation applied to level the digits (degrees, 0 when none).
    pub rectify_angle_deg: f64,
    pub glyphs: Vec<DigitReport>,
    /// Sign-plus-board crop in frame coordinates.
    pub board_rect: PixelRect,
    pub board_variant: VariantKind,
    /// Rectangular outlines that extended the board crop.
    pub board_quads: usize,
}

/// Serializable summary of one frame.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FrameReport {
    /// Size of the frame the coordinates refer to.
    pub frame_size: [u32; 2],
    /// Factor from input-frame to report coordinates.
    pub scale: f64,
    pub signs: Vec<SignReport>,
}
