//! Top-level reader configuration.

use std::path::Path;

use crate::board::BoardConfig;
use crate::digits::DigitConfig;
use crate::error::{load_json, ReadError};
use crate::preprocess::{EdgeDetectorConfig, PreprocessConfig};

/// Every tunable of the reader. Missing JSON fields take their defaults.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub digits: DigitConfig,
    pub board: BoardConfig,
    pub edges: EdgeDetectorConfig,
    pub preprocess: PreprocessConfig,
}

impl ReaderConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ReadError> {
        load_json(path)
    }
}
