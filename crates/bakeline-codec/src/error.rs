//! Error types for the attribute codec.

use std::path::PathBuf;
use thiserror::Error;

use bakeline_scene::{CodedError, SceneError};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while exporting or importing a color channel.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Failed to read or write the blob file.
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blob is not a valid compressed block.
    #[error("Failed to decompress color blob: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),

    /// Decompressed length is not a whole number of RGB triples.
    #[error("Color blob holds {len} bytes, which is not a multiple of 12")]
    Truncated { len: usize },

    /// The blob and the target channel disagree on element count.
    #[error("Attribute '{attribute}' has {expected} elements but the blob holds {found}")]
    CountMismatch {
        attribute: String,
        expected: usize,
        found: usize,
    },

    /// Scene lookup failure.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl CodedError for CodecError {
    fn code(&self) -> &'static str {
        match self {
            CodecError::Io { .. } => "CODEC_001",
            CodecError::Decompress(_) => "CODEC_002",
            CodecError::Truncated { .. } => "CODEC_003",
            CodecError::CountMismatch { .. } => "CODEC_004",
            CodecError::Scene(e) => e.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            CodecError::Scene(e) => e.category(),
            _ => "codec",
        }
    }
}
