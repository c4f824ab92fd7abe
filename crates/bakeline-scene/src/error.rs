//! Error types for scene loading and manipulation.

use std::path::PathBuf;
use thiserror::Error;

use crate::ids::{GroupId, ImageId, MaterialId, MeshId, ObjectId};

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// An error that carries a stable diagnostic code.
///
/// Every error enum in the workspace implements this so the CLI can print
/// `[CODE] message` regardless of which crate failed.
pub trait CodedError: std::error::Error {
    /// Returns the stable error code (e.g. `SCENE_001`).
    fn code(&self) -> &'static str;

    /// Returns the error category (e.g. `scene`).
    fn category(&self) -> &'static str;
}

/// Errors that can occur while loading, validating or editing a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Failed to read or write a scene document.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scene document is not valid JSON for the scene schema.
    #[error("Failed to parse scene document: {0}")]
    Parse(#[source] serde_json::Error),

    /// Scene could not be serialized.
    #[error("Failed to serialize scene: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The scene has no on-disk location, so outputs have nowhere to go.
    #[error("Scene document is not saved: no base directory to write bake outputs into")]
    NotSaved,

    #[error("Unknown object {0}")]
    UnknownObject(ObjectId),

    #[error("Unknown mesh {0}")]
    UnknownMesh(MeshId),

    #[error("Unknown material {0}")]
    UnknownMaterial(MaterialId),

    #[error("Unknown image {0}")]
    UnknownImage(ImageId),

    #[error("Unknown group {0}")]
    UnknownGroup(GroupId),

    /// A mesh-kind object without mesh data.
    #[error("Object '{object}' has no mesh data")]
    NoMeshData { object: String },

    /// Mesh topology or attribute layout is inconsistent.
    #[error("Invalid mesh '{mesh}': {message}")]
    InvalidMesh { mesh: String, message: String },

    /// Mesh has no attribute with the requested name.
    #[error("Mesh '{mesh}' has no attribute named '{attribute}'")]
    UnknownAttribute { mesh: String, attribute: String },

    /// Image dimensions must be non-zero.
    #[error("Invalid image size {width}x{height} for '{name}'")]
    InvalidImageSize {
        name: String,
        width: u32,
        height: u32,
    },

    /// Group hierarchy must be a tree.
    #[error("Group '{group}' is part of a cycle or has more than one parent")]
    GroupCycle { group: String },
}

impl SceneError {
    /// Creates a new invalid mesh error.
    pub fn invalid_mesh(mesh: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            mesh: mesh.into(),
            message: message.into(),
        }
    }
}

impl CodedError for SceneError {
    fn code(&self) -> &'static str {
        match self {
            SceneError::Io { .. } => "SCENE_001",
            SceneError::Parse(_) => "SCENE_002",
            SceneError::Serialize(_) => "SCENE_003",
            SceneError::NotSaved => "SCENE_004",
            SceneError::UnknownObject(_) => "SCENE_005",
            SceneError::UnknownMesh(_) => "SCENE_006",
            SceneError::UnknownMaterial(_) => "SCENE_007",
            SceneError::UnknownImage(_) => "SCENE_008",
            SceneError::UnknownGroup(_) => "SCENE_009",
            SceneError::NoMeshData { .. } => "SCENE_010",
            SceneError::InvalidMesh { .. } => "SCENE_011",
            SceneError::UnknownAttribute { .. } => "SCENE_012",
            SceneError::InvalidImageSize { .. } => "SCENE_013",
            SceneError::GroupCycle { .. } => "SCENE_014",
        }
    }

    fn category(&self) -> &'static str {
        "scene"
    }
}
