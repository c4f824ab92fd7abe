//! Error types for the bake pipeline and its backends.

use bakeline_scene::{CodedError, SceneError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failures reported by a [`SceneBackend`](crate::backend::SceneBackend).
///
/// These are never retried; the pipeline aborts the current object's chain.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A modifier could not be applied.
    #[error("Failed to apply modifier '{modifier}' on '{object}': {message}")]
    ModifierFailed {
        object: String,
        modifier: String,
        message: String,
    },

    /// A boolean modifier references an object that does not exist.
    #[error("Modifier '{modifier}' on '{object}' references missing object '{operand}'")]
    MissingOperand {
        object: String,
        modifier: String,
        operand: String,
    },

    /// An operation that works on the selection found no mesh objects.
    #[error("No mesh objects selected for {operation}")]
    NothingSelected { operation: &'static str },

    /// The scene has neither lights nor world ambient.
    #[error("Cannot bake lighting for '{object}': scene has no lights and no world ambient")]
    NoLighting { object: String },

    /// An image bake was requested on a mesh without a UV layer.
    #[error("Cannot bake '{object}' to an image: mesh has no UV layer")]
    MissingUvs { object: String },

    /// No active image node to bake into.
    #[error("Material '{material}' on '{object}' has no active image texture node to bake into")]
    NoImageTarget { object: String, material: String },

    /// No render color attribute to bake into.
    #[error("Mesh of '{object}' has no render color attribute to bake into")]
    NoVertexColorTarget { object: String },

    /// Scene lookup failed inside the backend.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl BackendError {
    /// Creates a new modifier failed error.
    pub fn modifier_failed(
        object: impl Into<String>,
        modifier: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ModifierFailed {
            object: object.into(),
            modifier: modifier.into(),
            message: message.into(),
        }
    }
}

impl CodedError for BackendError {
    fn code(&self) -> &'static str {
        match self {
            BackendError::ModifierFailed { .. } => "BACKEND_001",
            BackendError::MissingOperand { .. } => "BACKEND_002",
            BackendError::NothingSelected { .. } => "BACKEND_003",
            BackendError::NoLighting { .. } => "BACKEND_004",
            BackendError::MissingUvs { .. } => "BACKEND_005",
            BackendError::NoImageTarget { .. } => "BACKEND_006",
            BackendError::NoVertexColorTarget { .. } => "BACKEND_007",
            BackendError::Scene(e) => e.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            BackendError::Scene(e) => e.category(),
            _ => "backend",
        }
    }
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Scene precondition or lookup failure.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// A backend operation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Failed to read a config file.
    #[error("Failed to read pipeline config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the config schema.
    #[error("Failed to parse pipeline config: {0}")]
    ConfigParse(#[source] serde_json::Error),

    /// A config value is out of range.
    #[error("Invalid pipeline config: {message}")]
    InvalidConfig { message: String },

    /// Ensuring a usable material did not leave one in slot 0.
    #[error("Object '{object}' still has no usable material after material creation")]
    MaterialInvariant { object: String },

    /// Failed to create or write a baked image file.
    #[error("Failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed.
    #[error("Failed to encode PNG {path}: {source}")]
    PngEncode {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },
}

impl PipelineError {
    /// Creates a new invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// True for failures caused by bad input rather than by processing.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PipelineError::ConfigRead { .. }
                | PipelineError::ConfigParse(_)
                | PipelineError::InvalidConfig { .. }
                | PipelineError::Scene(SceneError::NotSaved)
                | PipelineError::Scene(SceneError::Io { .. })
                | PipelineError::Scene(SceneError::Parse(_))
        )
    }
}

impl CodedError for PipelineError {
    fn code(&self) -> &'static str {
        match self {
            PipelineError::Scene(e) => e.code(),
            PipelineError::Backend(e) => e.code(),
            PipelineError::ConfigRead { .. } => "PIPELINE_001",
            PipelineError::ConfigParse(_) => "PIPELINE_002",
            PipelineError::InvalidConfig { .. } => "PIPELINE_003",
            PipelineError::MaterialInvariant { .. } => "PIPELINE_004",
            PipelineError::ImageWrite { .. } => "PIPELINE_005",
            PipelineError::PngEncode { .. } => "PIPELINE_006",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            PipelineError::Scene(e) => e.category(),
            PipelineError::Backend(e) => e.category(),
            _ => "pipeline",
        }
    }
}
