//! Errors surfaced at the library edge (file loading, candidate construction).

use std::path::PathBuf;

/// Failure to load configuration, classifier weights or candidates.
#[derive(Debug)]
pub enum ReadError {
    /// Underlying file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File contents are not valid JSON for the expected type.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Classifier weights are structurally inconsistent.
    InvalidClassifier(String),
    /// A sign candidate was built from an empty polygon.
    EmptyCandidate,
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {}", path.display(), source),
            Self::Json { path, source } => {
                write!(f, "invalid JSON in {}: {}", path.display(), source)
            }
            Self::InvalidClassifier(msg) => write!(f, "invalid classifier: {}", msg),
            Self::EmptyCandidate => write!(f, "sign candidate polygon is empty"),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Read and deserialize a JSON file.
pub(crate) fn load_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T, ReadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ReadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
