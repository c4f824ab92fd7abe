//! Test fixture utilities for building saved scene documents.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use bakeline_scene::{Face, GroupId, Light, Mesh, Object, ObjectId, Scene, Transform};

/// Unit cube: 8 corners, 6 outward-facing quads.
pub fn cube_mesh(name: &str) -> Mesh {
    let positions = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let faces = vec![
        Face::new([0, 3, 2, 1]),
        Face::new([4, 5, 6, 7]),
        Face::new([0, 1, 5, 4]),
        Face::new([1, 2, 6, 5]),
        Face::new([2, 3, 7, 6]),
        Face::new([3, 0, 4, 7]),
    ];
    Mesh::from_polygons(name, positions, faces)
}

/// A scene document saved inside a temporary directory.
pub struct SceneFixture {
    pub dir: TempDir,
    pub scene: Scene,
}

impl SceneFixture {
    /// Create an empty scene lit by a single overhead sun.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut scene = Scene::new().with_file_path(dir.path().join("level.json"));
        scene.lights.push(Light::new("Sun", [0.0, 0.0, -1.0]));
        Self { dir, scene }
    }

    /// Get the directory holding the scene document.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the scene document.
    pub fn scene_path(&self) -> PathBuf {
        self.dir.path().join("level.json")
    }

    /// Add a root group.
    pub fn group(&mut self, name: &str) -> GroupId {
        self.scene.add_group(name)
    }

    /// Add a cube object to `group`, offset along X by `offset`.
    pub fn add_cube(&mut self, group: GroupId, name: &str, offset: f32) -> ObjectId {
        let mesh = self.scene.add_mesh(cube_mesh(&format!("{}_mesh", name)));
        let id = self.scene.add_object(
            Object::mesh(name, mesh).with_transform(Transform::at([offset, 0.0, 0.0])),
        );
        self.scene
            .link_object(group, id)
            .expect("Failed to link object");
        id
    }

    /// Write the scene document to disk.
    pub fn save(&self) -> PathBuf {
        let path = self.scene_path();
        self.scene.save(&path).expect("Failed to save scene");
        path
    }
}

impl Default for SceneFixture {
    fn default() -> Self {
        Self::new()
    }
}
