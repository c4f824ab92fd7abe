//! Export and import of an object's color channel.

use std::path::{Path, PathBuf};

use bakeline_scene::{ObjectId, Scene, SceneError};

use crate::blob::{decode_rgb, encode_rgb};
use crate::error::{CodecError, CodecResult};

/// Blob file name used when no path is given.
pub const DEFAULT_BLOB_NAME: &str = "bytes";

/// Default blob location: beside the scene document.
pub fn default_blob_path(scene: &Scene) -> CodecResult<PathBuf> {
    Ok(scene.base_dir()?.join(DEFAULT_BLOB_NAME))
}

fn missing_attribute(mesh: &str, attribute: &str) -> CodecError {
    CodecError::Scene(SceneError::UnknownAttribute {
        mesh: mesh.to_string(),
        attribute: attribute.to_string(),
    })
}

/// Writes the RGB values of `attribute` on `object`'s mesh to `path`.
/// Returns the number of elements written.
pub fn export_channel(
    scene: &Scene,
    object: ObjectId,
    attribute: &str,
    path: &Path,
) -> CodecResult<usize> {
    let mesh = scene.mesh(scene.object_mesh(object)?)?;
    let attr = mesh
        .attribute(attribute)
        .ok_or_else(|| missing_attribute(&mesh.name, attribute))?;

    let blob = encode_rgb(&attr.values);
    std::fs::write(path, &blob).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        "exported {} elements of '{}' to {} ({} bytes)",
        attr.len(),
        attribute,
        path.display(),
        blob.len()
    );
    Ok(attr.len())
}

/// Reads a blob from `path` into `attribute` on `object`'s mesh.
///
/// The channel must already exist with the same element count. RGB is
/// replaced and alpha is set to 1.0 for every element.
pub fn import_channel(
    scene: &mut Scene,
    object: ObjectId,
    attribute: &str,
    path: &Path,
) -> CodecResult<usize> {
    let blob = std::fs::read(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let values = decode_rgb(&blob)?;

    let mesh = scene.mesh_mut(scene.object_mesh(object)?)?;
    let mesh_name = mesh.name.clone();
    let attr = mesh
        .attribute_mut(attribute)
        .ok_or_else(|| missing_attribute(&mesh_name, attribute))?;
    if attr.len() != values.len() {
        return Err(CodecError::CountMismatch {
            attribute: attribute.to_string(),
            expected: attr.len(),
            found: values.len(),
        });
    }
    for (index, [r, g, b]) in values.iter().copied().enumerate() {
        attr.set(index, [r, g, b, 1.0]);
    }
    tracing::info!("imported {} elements into '{}'", values.len(), attribute);
    Ok(values.len())
}
