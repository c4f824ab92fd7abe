//! Error types for texture compression.

use std::path::PathBuf;
use thiserror::Error;

use bakeline_scene::CodedError;

/// Result type for texture compression.
pub type CompressResult<T> = Result<T, CompressError>;

/// Errors that stop a compression run.
///
/// A single image that fails to encode is not an error; it is recorded in
/// the run report and the run continues.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The directory could not be listed.
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A linking document could not be read or written.
    #[error("Failed to rewrite {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No encoder executable was found.
    #[error("Texture encoder not found. Pass --encoder, set BAKELINE_ENCODER or put kram on PATH")]
    EncoderNotFound,

    /// The encoder process could not be started.
    #[error("Failed to spawn encoder {path}: {source}")]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodedError for CompressError {
    fn code(&self) -> &'static str {
        match self {
            CompressError::ReadDir { .. } => "COMPRESS_001",
            CompressError::Document { .. } => "COMPRESS_002",
            CompressError::EncoderNotFound => "COMPRESS_003",
            CompressError::SpawnFailed { .. } => "COMPRESS_004",
        }
    }

    fn category(&self) -> &'static str {
        "compress"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_not_found_mentions_sources() {
        let err = CompressError::EncoderNotFound;
        assert!(err.to_string().contains("BAKELINE_ENCODER"));
        assert_eq!(err.code(), "COMPRESS_003");
    }
}
