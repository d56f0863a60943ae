//! Per-sign orchestration.
//!
//! Wires the stages together: digits on the conservative edges with a single
//! retry on the dilated edges, then both board passes with the taller crop
//! kept, then the digit rectification applied to that crop.

use image::{GrayImage, RgbImage};

use crate::board::{BoardLocator, BoardRegion};
use crate::candidate::{SignCandidate, SignProposer};
use crate::config::ReaderConfig;
use crate::digits::{DigitClassifier, DigitRecognition, DigitRecognizer};
use crate::edge_variant::VariantKind;
use crate::preprocess::{edge_map, prepare_frame};
use crate::{DigitReport, FrameReport, SignReport};

/// Everything read from one sign candidate.
#[derive(Debug, Clone)]
pub struct SignReading {
    pub candidate: SignCandidate,
    pub digits: DigitRecognition,
    /// Board crop, already rotated with the digit rectification.
    pub board: BoardRegion,
}

impl SignReading {
    #[inline]
    pub fn speed(&self) -> u32 {
        self.digits.reading.speed
    }

    pub fn report(&self) -> SignReport {
        let d = &self.digits;
        SignReport {
            sign_rect: d.sign_rect,
            speed: d.reading.speed,
            digits: d.reading.digits.clone(),
            plausible: d.reading.is_plausible(),
            implausible: d.reading.implausible.clone(),
            digit_variant: d.kind,
            rectify_angle_deg: d.transform.angle_deg(),
            glyphs: d
                .regions
                .iter()
                .map(|r| DigitReport {
                    rect: r.rect,
                    value: r.value,
                })
                .collect(),
            board_rect: self.board.rect,
            board_variant: self.board.kind,
            board_quads: self.board.quads,
        }
    }
}

/// All signs read from one frame.
#[derive(Debug, Clone)]
pub struct FrameReading {
    /// Size of the frame the coordinates refer to.
    pub frame_size: [u32; 2],
    /// Factor from input-frame to reading coordinates.
    pub scale: f64,
    pub signs: Vec<SignReading>,
}

impl FrameReading {
    pub fn report(&self) -> FrameReport {
        FrameReport {
            frame_size: self.frame_size,
            scale: self.scale,
            signs: self.signs.iter().map(SignReading::report).collect(),
        }
    }
}

/// Read one candidate. `None` when neither edge strength yields digits.
pub fn read_sign(
    frame: &RgbImage,
    edges: &GrayImage,
    candidate: &SignCandidate,
    classifier: &dyn DigitClassifier,
    config: &ReaderConfig,
) -> Option<SignReading> {
    let recognizer = DigitRecognizer::new(candidate, edges, &config.digits);
    let digits = match recognizer.recognize(VariantKind::Conservative, classifier) {
        Ok(d) => d,
        Err(e) => {
            tracing::debug!(error = %e, "conservative digit pass failed, retrying dilated");
            match recognizer.recognize(VariantKind::Dilated, classifier) {
                Ok(d) => d,
                Err(e) => {
                    tracing::debug!(error = %e, sign = ?candidate.bounds(), "no speed read");
                    return None;
                }
            }
        }
    };

    let locator = BoardLocator::new(candidate, edges, &config.board);
    let conservative = locator.locate(VariantKind::Conservative, frame);
    let dilated = locator.locate(VariantKind::Dilated, frame);
    let mut board = if conservative.height() >= dilated.height() {
        conservative
    } else {
        dilated
    };

    if !digits.transform.is_identity() && !board.is_empty() {
        board.image = digits.transform.warp_rgb_replicate(&board.image);
        board.transform = digits.transform;
    }

    tracing::debug!(
        speed = digits.reading.speed,
        digits_from = %digits.kind,
        board_from = %board.kind,
        "sign read"
    );
    Some(SignReading {
        candidate: candidate.clone(),
        digits,
        board,
    })
}

/// Read every candidate against a precomputed edge map (no preprocessing).
pub fn read_frame_with_edges(
    frame: &RgbImage,
    edges: &GrayImage,
    candidates: &[SignCandidate],
    classifier: &dyn DigitClassifier,
    config: &ReaderConfig,
) -> FrameReading {
    let signs: Vec<SignReading> = candidates
        .iter()
        .filter_map(|c| read_sign(frame, edges, c, classifier, config))
        .collect();
    tracing::info!("{} of {} sign candidates read", signs.len(), candidates.len());
    FrameReading {
        frame_size: [frame.width(), frame.height()],
        scale: 1.0,
        signs,
    }
}

/// Preprocess `frame`, compute its edge map and read every candidate.
///
/// Candidates are given in input-frame coordinates and rescaled along with
/// the frame.
pub fn read_frame(
    frame: &RgbImage,
    candidates: &[SignCandidate],
    classifier: &dyn DigitClassifier,
    config: &ReaderConfig,
) -> FrameReading {
    let prepared = prepare_frame(frame, &config.preprocess);
    let edges = edge_map(&prepared.gray, &config.edges);
    let scaled: Vec<SignCandidate> = candidates.iter().map(|c| c.scaled(prepared.scale)).collect();
    let mut reading = read_frame_with_edges(&prepared.rgb, &edges, &scaled, classifier, config);
    reading.scale = prepared.scale;
    reading
}

/// Preprocess `frame` and read whatever `proposer` finds on its edge map.
pub fn read_frame_with_proposer(
    frame: &RgbImage,
    proposer: &dyn SignProposer,
    classifier: &dyn DigitClassifier,
    config: &ReaderConfig,
) -> FrameReading {
    let prepared = prepare_frame(frame, &config.preprocess);
    let edges = edge_map(&prepared.gray, &config.edges);
    let candidates = proposer.propose(&edges);
    tracing::debug!("{} sign candidates proposed", candidates.len());
    let mut reading = read_frame_with_edges(&prepared.rgb, &edges, &candidates, classifier, config);
    reading.scale = prepared.scale;
    reading
}
