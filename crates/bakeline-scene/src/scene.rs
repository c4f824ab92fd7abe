//! The scene document: arenas of objects, meshes, materials, images and groups.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{SceneError, SceneResult};
use crate::ids::{GroupId, ImageId, MaterialId, MeshId, ObjectId};
use crate::image::ImageBuffer;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::object::Object;

/// A named container of objects and child groups.
///
/// The name carries all processing policy for the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGroup {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<ObjectId>,
    #[serde(default)]
    pub children: Vec<GroupId>,
}

impl SceneGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// A directional light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    /// Direction the light travels in world space.
    pub direction: [f32; 3],
    #[serde(default = "white")]
    pub color: [f32; 3],
    #[serde(default = "unit")]
    pub strength: f32,
}

impl Light {
    /// A white light of unit strength.
    pub fn new(name: impl Into<String>, direction: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            direction,
            color: white(),
            strength: unit(),
        }
    }
}

fn white() -> [f32; 3] {
    [1.0; 3]
}

fn unit() -> f32 {
    1.0
}

/// A loaded scene document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// On-disk location of the document; set by [`Scene::load`].
    #[serde(skip)]
    file_path: Option<PathBuf>,
    #[serde(default)]
    pub groups: Vec<SceneGroup>,
    /// Removed objects leave a `null` slot so ids stay stable.
    #[serde(default)]
    pub objects: Vec<Option<Object>>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub images: Vec<ImageBuffer>,
    #[serde(default)]
    pub lights: Vec<Light>,
    /// Uniform ambient light from the world background.
    #[serde(default)]
    pub world_color: [f32; 3],
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a scene document.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let scene: Scene = serde_json::from_str(json).map_err(SceneError::Parse)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string_pretty(self).map_err(SceneError::Serialize)
    }

    /// Loads a scene document and remembers its location.
    pub fn load(path: &Path) -> SceneResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut scene = Self::from_json(&json)?;
        scene.file_path = Some(path.to_path_buf());
        Ok(scene)
    }

    /// Writes the scene document to `path`.
    pub fn save(&self, path: &Path) -> SceneResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.set_file_path(path);
        self
    }

    /// Directory of the scene document; outputs are written beside it.
    ///
    /// A bare file name lives in the current directory. Only a scene with no
    /// file path is unsaved.
    pub fn base_dir(&self) -> SceneResult<PathBuf> {
        let path = self.file_path.as_deref().ok_or(SceneError::NotSaved)?;
        match path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => Ok(PathBuf::from(".")),
            Some(dir) => Ok(dir.to_path_buf()),
            None => Err(SceneError::NotSaved),
        }
    }

    /// Checks ids, mesh layouts and that groups form a forest.
    pub fn validate(&self) -> SceneResult<()> {
        for mesh in &self.meshes {
            mesh.validate()?;
        }
        for object in self.objects.iter().flatten() {
            if let Some(mesh) = object.mesh {
                self.mesh(mesh)?;
            }
            for material in object.materials() {
                self.material(material)?;
            }
        }
        for material in &self.materials {
            for (_, image) in material.node_tree.image_nodes() {
                self.image(image)?;
            }
        }
        let mut has_parent = HashSet::new();
        for group in &self.groups {
            for &object in &group.objects {
                self.object(object)?;
            }
            for &child in &group.children {
                let child_group = self.group(child)?;
                if !has_parent.insert(child) {
                    return Err(SceneError::GroupCycle {
                        group: child_group.name.clone(),
                    });
                }
            }
        }
        // A forest has at least one root in every connected component; a group
        // unreachable from any root sits on a cycle.
        let mut reachable = HashSet::new();
        for root in self.root_groups() {
            reachable.insert(root);
            reachable.extend(self.descendants(root));
        }
        if let Some((_, group)) = self
            .groups
            .iter()
            .enumerate()
            .find(|(i, _)| !reachable.contains(&GroupId::from_index(*i)))
        {
            return Err(SceneError::GroupCycle {
                group: group.name.clone(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId::from_index(self.meshes.len() - 1)
    }

    pub fn add_object(&mut self, object: Object) -> ObjectId {
        self.objects.push(Some(object));
        ObjectId::from_index(self.objects.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId::from_index(self.materials.len() - 1)
    }

    pub fn add_image(&mut self, image: ImageBuffer) -> ImageId {
        self.images.push(image);
        ImageId::from_index(self.images.len() - 1)
    }

    pub fn add_group(&mut self, name: impl Into<String>) -> GroupId {
        self.groups.push(SceneGroup::new(name));
        GroupId::from_index(self.groups.len() - 1)
    }

    /// Links an object into a group.
    pub fn link_object(&mut self, group: GroupId, object: ObjectId) -> SceneResult<()> {
        self.object(object)?;
        self.group_mut(group)?.objects.push(object);
        Ok(())
    }

    /// Nests `child` under `parent`.
    pub fn link_group(&mut self, parent: GroupId, child: GroupId) -> SceneResult<()> {
        self.group(child)?;
        self.group_mut(parent)?.children.push(child);
        Ok(())
    }

    pub fn object(&self, id: ObjectId) -> SceneResult<&Object> {
        self.objects
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(SceneError::UnknownObject(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> SceneResult<&mut Object> {
        self.objects
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(SceneError::UnknownObject(id))
    }

    /// Live objects with their ids.
    pub fn iter_objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.as_ref().map(|o| (ObjectId::from_index(i), o)))
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.iter_objects()
            .find(|(_, o)| o.name == name)
            .map(|(id, _)| id)
    }

    pub fn mesh(&self, id: MeshId) -> SceneResult<&Mesh> {
        self.meshes.get(id.index()).ok_or(SceneError::UnknownMesh(id))
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> SceneResult<&mut Mesh> {
        self.meshes
            .get_mut(id.index())
            .ok_or(SceneError::UnknownMesh(id))
    }

    pub fn material(&self, id: MaterialId) -> SceneResult<&Material> {
        self.materials
            .get(id.index())
            .ok_or(SceneError::UnknownMaterial(id))
    }

    pub fn material_mut(&mut self, id: MaterialId) -> SceneResult<&mut Material> {
        self.materials
            .get_mut(id.index())
            .ok_or(SceneError::UnknownMaterial(id))
    }

    pub fn image(&self, id: ImageId) -> SceneResult<&ImageBuffer> {
        self.images.get(id.index()).ok_or(SceneError::UnknownImage(id))
    }

    pub fn image_mut(&mut self, id: ImageId) -> SceneResult<&mut ImageBuffer> {
        self.images
            .get_mut(id.index())
            .ok_or(SceneError::UnknownImage(id))
    }

    pub fn group(&self, id: GroupId) -> SceneResult<&SceneGroup> {
        self.groups.get(id.index()).ok_or(SceneError::UnknownGroup(id))
    }

    pub fn group_mut(&mut self, id: GroupId) -> SceneResult<&mut SceneGroup> {
        self.groups
            .get_mut(id.index())
            .ok_or(SceneError::UnknownGroup(id))
    }

    /// Mesh data of a mesh object.
    pub fn object_mesh(&self, id: ObjectId) -> SceneResult<MeshId> {
        let object = self.object(id)?;
        object.mesh.ok_or_else(|| SceneError::NoMeshData {
            object: object.name.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Shared data
    // ------------------------------------------------------------------

    /// Number of live objects using a mesh.
    pub fn mesh_users(&self, mesh: MeshId) -> usize {
        self.iter_objects()
            .filter(|(_, o)| o.mesh == Some(mesh))
            .count()
    }

    /// Gives `object` exclusive mesh data, copying it if other objects share it.
    ///
    /// Returns the (possibly new) mesh id and whether a copy was made.
    pub fn make_single_user(&mut self, object: ObjectId) -> SceneResult<(MeshId, bool)> {
        let mesh = self.object_mesh(object)?;
        if self.mesh_users(mesh) <= 1 {
            return Ok((mesh, false));
        }
        let mut copy = self.mesh(mesh)?.clone();
        copy.name = self.unique_mesh_name(&copy.name);
        let copy_id = self.add_mesh(copy);
        self.object_mut(object)?.mesh = Some(copy_id);
        Ok((copy_id, true))
    }

    /// Duplicates a material under a fresh `Name.001`-style name.
    pub fn copy_material(&mut self, id: MaterialId) -> SceneResult<MaterialId> {
        let mut copy = self.material(id)?.clone();
        copy.name = self.unique_material_name(&copy.name);
        Ok(self.add_material(copy))
    }

    /// Drops each of `candidates` that no object slot references. Surviving
    /// materials are renumbered and every slot is remapped. Returns the names
    /// of the dropped materials.
    pub fn purge_materials(&mut self, candidates: &[MaterialId]) -> Vec<String> {
        let used: HashSet<MaterialId> = self
            .objects
            .iter()
            .flatten()
            .flat_map(|o| o.materials())
            .collect();
        let doomed: HashSet<MaterialId> = candidates
            .iter()
            .copied()
            .filter(|id| id.index() < self.materials.len() && !used.contains(id))
            .collect();
        if doomed.is_empty() {
            return Vec::new();
        }

        let mut remap = Vec::with_capacity(self.materials.len());
        let mut kept = Vec::with_capacity(self.materials.len() - doomed.len());
        let mut removed = Vec::with_capacity(doomed.len());
        for (i, material) in std::mem::take(&mut self.materials).into_iter().enumerate() {
            if doomed.contains(&MaterialId::from_index(i)) {
                remap.push(None);
                removed.push(material.name);
            } else {
                remap.push(Some(MaterialId::from_index(kept.len())));
                kept.push(material);
            }
        }
        self.materials = kept;

        for object in self.objects.iter_mut().flatten() {
            for slot in object.material_slots.iter_mut().flatten() {
                *slot = slot.and_then(|id| remap.get(id.index()).copied().flatten());
            }
        }
        removed
    }

    fn unique_mesh_name(&self, base: &str) -> String {
        unique_name(base, |candidate| self.meshes.iter().any(|m| m.name == candidate))
    }

    pub fn unique_material_name(&self, base: &str) -> String {
        unique_name(base, |candidate| {
            self.materials.iter().any(|m| m.name == candidate)
        })
    }

    /// `name` itself when no material uses it yet, otherwise a numbered variant.
    pub fn fresh_material_name(&self, name: &str) -> String {
        if self.materials.iter().any(|m| m.name == name) {
            self.unique_material_name(name)
        } else {
            name.to_string()
        }
    }

    // ------------------------------------------------------------------
    // Topology edits
    // ------------------------------------------------------------------

    /// Unlinks an object from every group and frees its slot.
    pub fn remove_object(&mut self, id: ObjectId) -> SceneResult<Object> {
        let slot = self
            .objects
            .get_mut(id.index())
            .ok_or(SceneError::UnknownObject(id))?;
        let object = slot.take().ok_or(SceneError::UnknownObject(id))?;
        for group in &mut self.groups {
            group.objects.retain(|&o| o != id);
        }
        Ok(object)
    }

    /// Appends `source`'s geometry and materials onto `target`'s mesh, in
    /// `target`'s object space. `source` is left untouched.
    pub fn append_object_geometry(&mut self, target: ObjectId, source: ObjectId) -> SceneResult<()> {
        let (target_mesh, _) = self.make_single_user(target)?;
        let source_object = self.object(source)?.clone();
        let source_mesh = self.mesh(self.object_mesh(source)?)?.clone();
        let target_transform = self.object(target)?.transform;

        // Source slots are merged into the target slot list, reusing slots
        // that already hold the same material.
        let target_object = self.object_mut(target)?;
        let slots = target_object.material_slots.get_or_insert_with(Vec::new);
        let mut remap = Vec::new();
        for slot in source_object.material_slots.iter().flatten() {
            let index = match slots.iter().position(|s| s == slot && slot.is_some()) {
                Some(i) => i,
                None => {
                    slots.push(*slot);
                    slots.len() - 1
                }
            };
            remap.push(index as u32);
        }

        let source_transform = source_object.transform;
        self.mesh_mut(target_mesh)?.append(
            &source_mesh,
            |p| target_transform.to_local(source_transform.to_world(p)),
            &remap,
            false,
        );
        Ok(())
    }

    /// Joins `others` into `active`, removing them from the scene.
    pub fn join_objects(&mut self, active: ObjectId, others: &[ObjectId]) -> SceneResult<()> {
        for &other in others {
            if other == active {
                continue;
            }
            self.append_object_geometry(active, other)?;
            self.remove_object(other)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Hierarchy traversal
    // ------------------------------------------------------------------

    /// Groups that are not a child of any other group, in document order.
    pub fn root_groups(&self) -> Vec<GroupId> {
        let children: HashSet<GroupId> = self
            .groups
            .iter()
            .flat_map(|g| g.children.iter().copied())
            .collect();
        (0..self.groups.len())
            .map(GroupId::from_index)
            .filter(|id| !children.contains(id))
            .collect()
    }

    /// All groups below `group`, depth-first pre-order, excluding `group`.
    pub fn descendants(&self, group: GroupId) -> Vec<GroupId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(group);
        self.collect_descendants(group, &mut out, &mut visited);
        out
    }

    fn collect_descendants(
        &self,
        group: GroupId,
        out: &mut Vec<GroupId>,
        visited: &mut HashSet<GroupId>,
    ) {
        let Some(g) = self.groups.get(group.index()) else {
            return;
        };
        for &child in &g.children {
            if visited.insert(child) {
                out.push(child);
                self.collect_descendants(child, out, visited);
            }
        }
    }

    /// Visible mesh objects linked directly into `group`.
    pub fn mesh_members(&self, group: GroupId) -> SceneResult<Vec<ObjectId>> {
        let g = self.group(group)?;
        Ok(g
            .objects
            .iter()
            .copied()
            .filter(|&id| self.object(id).map(Object::is_renderable_mesh).unwrap_or(false))
            .collect())
    }

    /// Visible mesh objects of `group` and every group below it, without duplicates.
    pub fn mesh_members_recursive(&self, group: GroupId) -> SceneResult<Vec<ObjectId>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for g in std::iter::once(group).chain(self.descendants(group)) {
            for id in self.mesh_members(g)? {
                if seen.insert(id) {
                    out.push(id);
                }
            }
        }
        Ok(out)
    }
}

fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    // Strip an existing numeric suffix so copies of copies stay `Name.00N`.
    let stem = match base.rsplit_once('.') {
        Some((stem, suffix)) if suffix.len() == 3 && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            stem
        }
        _ => base,
    };
    (1..)
        .map(|n| format!("{}.{:03}", stem, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
