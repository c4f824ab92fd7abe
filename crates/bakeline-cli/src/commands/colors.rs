//! Vertex color export and import commands.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bakeline_codec::{default_blob_path, export_channel, import_channel};
use bakeline_scene::{ObjectId, Scene};

fn find_object(scene: &Scene, name: &str) -> Result<ObjectId> {
    scene
        .find_object(name)
        .ok_or_else(|| anyhow::anyhow!("no object named '{}' in scene", name))
}

fn blob_path(scene: &Scene, file: Option<&str>) -> Result<PathBuf> {
    match file {
        Some(file) => Ok(PathBuf::from(file)),
        None => default_blob_path(scene).context("Cannot place the color blob"),
    }
}

/// Run the export-colors command
pub fn export(
    scene_path: &str,
    object: &str,
    attribute: &str,
    file: Option<&str>,
) -> Result<ExitCode> {
    let scene = Scene::load(Path::new(scene_path))
        .with_context(|| format!("Failed to load scene: {}", scene_path))?;
    let id = find_object(&scene, object)?;
    let path = blob_path(&scene, file)?;

    let count = export_channel(&scene, id, attribute, &path)
        .with_context(|| format!("Failed to export '{}' of '{}'", attribute, object))?;
    println!(
        "{} {} elements of {}.{} -> {}",
        "Exported".green().bold(),
        count,
        object,
        attribute,
        path.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Run the import-colors command. The scene document is saved in place.
pub fn import(
    scene_path: &str,
    object: &str,
    attribute: &str,
    file: Option<&str>,
) -> Result<ExitCode> {
    let mut scene = Scene::load(Path::new(scene_path))
        .with_context(|| format!("Failed to load scene: {}", scene_path))?;
    let id = find_object(&scene, object)?;
    let path = blob_path(&scene, file)?;

    let count = import_channel(&mut scene, id, attribute, &path)
        .with_context(|| format!("Failed to import into '{}' of '{}'", attribute, object))?;
    scene
        .save(Path::new(scene_path))
        .with_context(|| format!("Failed to save scene: {}", scene_path))?;
    println!(
        "{} {} elements into {}.{} from {}",
        "Imported".green().bold(),
        count,
        object,
        attribute,
        path.display()
    );
    Ok(ExitCode::SUCCESS)
}
