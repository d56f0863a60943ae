//! High-level reading API.
//!
//! [`Reader`] is the primary entry point. It owns a [`ReaderConfig`] and a
//! digit classifier and reads speed signs from frames, given sign candidates
//! or a [`SignProposer`] that finds them.

use image::{GrayImage, RgbImage};
use std::path::Path;

use crate::candidate::{SignCandidate, SignProposer};
use crate::config::ReaderConfig;
use crate::digits::{DigitClassifier, MlpClassifier};
use crate::error::ReadError;
use crate::pipeline::{self, FrameReading, SignReading};

/// Primary reading interface.
///
/// Create once, read many frames.
///
/// # Examples
///
/// ```no_run
/// use speedsign::{Reader, SignCandidate};
/// use std::path::Path;
///
/// let reader = Reader::from_files(None, Path::new("digits_mlp.json")).unwrap();
/// let frame = image::open("frame.jpg").unwrap().to_rgb8();
/// let sign = SignCandidate::new(&[[410, 120], [470, 120], [470, 180], [410, 180]]).unwrap();
/// let reading = reader.read_frame(&frame, &[sign]);
/// for s in &reading.signs {
///     println!("speed limit {}", s.speed());
/// }
/// ```
pub struct Reader {
    config: ReaderConfig,
    classifier: Box<dyn DigitClassifier>,
}

impl Reader {
    /// Reader with default configuration.
    pub fn new(classifier: impl DigitClassifier + 'static) -> Self {
        Self::with_config(ReaderConfig::default(), classifier)
    }

    /// Create with full config control.
    pub fn with_config(config: ReaderConfig, classifier: impl DigitClassifier + 'static) -> Self {
        Self {
            config,
            classifier: Box::new(classifier),
        }
    }

    /// Load an MLP classifier and, optionally, a JSON configuration.
    pub fn from_files(config: Option<&Path>, classifier: &Path) -> Result<Self, ReadError> {
        let config = match config {
            Some(path) => ReaderConfig::from_json_file(path)?,
            None => ReaderConfig::default(),
        };
        Ok(Self::with_config(config, MlpClassifier::from_json_file(classifier)?))
    }

    /// Access the current configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut ReaderConfig {
        &mut self.config
    }

    /// Preprocess the frame, detect edges and read each candidate.
    pub fn read_frame(&self, frame: &RgbImage, candidates: &[SignCandidate]) -> FrameReading {
        pipeline::read_frame(frame, candidates, self.classifier.as_ref(), &self.config)
    }

    /// Read candidates against a caller-supplied edge map, without preprocessing.
    pub fn read_frame_with_edges(
        &self,
        frame: &RgbImage,
        edges: &GrayImage,
        candidates: &[SignCandidate],
    ) -> FrameReading {
        pipeline::read_frame_with_edges(frame, edges, candidates, self.classifier.as_ref(), &self.config)
    }

    /// Preprocess the frame and read what `proposer` outlines on its edge map.
    pub fn read_frame_with_proposer(
        &self,
        frame: &RgbImage,
        proposer: &dyn SignProposer,
    ) -> FrameReading {
        pipeline::read_frame_with_proposer(frame, proposer, self.classifier.as_ref(), &self.config)
    }

    /// Read a single candidate.
    pub fn read_sign(
        &self,
        frame: &RgbImage,
        edges: &GrayImage,
        candidate: &SignCandidate,
    ) -> Option<SignReading> {
        pipeline::read_sign(frame, edges, candidate, self.classifier.as_ref(), &self.config)
    }
}
