//! Material bake-target manager.

use bakeline_scene::{ColorSpace, ImageId, Material, NodeKind, ObjectId, Scene};

use crate::error::{PipelineError, PipelineResult};
use crate::report::{PipelineEvent, PipelineReport};

/// Name given to materials created for objects without one.
pub const DEFAULT_MATERIAL_NAME: &str = "Material";

/// Guarantees a node-enabled material in slot 0.
///
/// A missing slot list, an empty slot list and an empty first slot all end up
/// with a fresh material in slot 0; an existing first material just gets its
/// nodes enabled.
pub fn ensure_material(
    scene: &mut Scene,
    report: &mut PipelineReport,
    object: ObjectId,
) -> PipelineResult<()> {
    let existing = scene.object(object)?.first_material();
    match existing {
        Some(material) => scene.material_mut(material)?.enable_nodes(),
        None => {
            let name = scene.fresh_material_name(DEFAULT_MATERIAL_NAME);
            let material = scene.add_material(Material::with_default_surface(name.clone()));
            let ob = scene.object_mut(object)?;
            match ob.material_slots.as_mut() {
                Some(slots) if !slots.is_empty() => slots[0] = Some(material),
                Some(slots) => slots.push(Some(material)),
                None => ob.material_slots = Some(vec![Some(material)]),
            }
            tracing::debug!("created material '{}' for '{}'", name, ob.name);
            report.push(PipelineEvent::MaterialCreated {
                object: ob.name.clone(),
                material: name,
            });
        }
    }

    let ob = scene.object(object)?;
    let usable = ob
        .first_material()
        .and_then(|m| scene.material(m).ok())
        .is_some_and(|m| m.use_nodes);
    if !usable {
        return Err(PipelineError::MaterialInvariant {
            object: ob.name.clone(),
        });
    }
    Ok(())
}

/// Points every material of `object` at `image` through an image node called
/// `node_name`, made the active node.
///
/// Each material is copied first, so objects that shared a material bake
/// into their own images.
pub fn bind_bake_node(
    scene: &mut Scene,
    report: &mut PipelineReport,
    object: ObjectId,
    node_name: &str,
    image: ImageId,
) -> PipelineResult<()> {
    ensure_material(scene, report, object)?;

    let slots = scene.object(object)?.material_slots.clone().unwrap_or_default();
    for (index, slot) in slots.iter().enumerate() {
        let Some(material) = slot else {
            continue;
        };
        let copy = scene.copy_material(*material)?;
        if let Some(slots) = scene.object_mut(object)?.material_slots.as_mut() {
            slots[index] = Some(copy);
        }

        let material = scene.material_mut(copy)?;
        material.enable_nodes();
        let graph = &mut material.node_tree;
        let node = graph.get_or_insert_with(node_name, || NodeKind::ImageTexture { image: None });
        node.select = true;
        node.kind = NodeKind::ImageTexture { image: Some(image) };
        graph.set_active(node_name);
    }
    scene.image_mut(image)?.colorspace = ColorSpace::Srgb;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakeline_scene::{Face, ImageBuffer, Mesh, Object};
    use pretty_assertions::assert_eq;

    fn object_with_slots(scene: &mut Scene, slots: Option<Vec<Option<bakeline_scene::MaterialId>>>) -> ObjectId {
        let mesh = scene.add_mesh(Mesh::from_polygons(
            "Tri",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![Face::new([0, 1, 2])],
        ));
        let mut object = Object::mesh("Tri", mesh);
        object.material_slots = slots;
        scene.add_object(object)
    }

    fn assert_usable(scene: &Scene, object: ObjectId) {
        let ob = scene.object(object).unwrap();
        let material = ob.first_material().expect("slot 0 filled");
        assert!(scene.material(material).unwrap().use_nodes);
    }

    #[test]
    fn test_ensure_material_empty_states() {
        let mut scene = Scene::new();
        let none = object_with_slots(&mut scene, None);
        let empty = object_with_slots(&mut scene, Some(vec![]));
        let null_first = object_with_slots(&mut scene, Some(vec![None]));

        let mut report = PipelineReport::new();
        for id in [none, empty, null_first] {
            ensure_material(&mut scene, &mut report, id).unwrap();
            assert_usable(&scene, id);
            assert_eq!(
                scene.object(id).unwrap().material_slots.as_ref().unwrap().len(),
                1
            );
        }
        let names: Vec<_> = scene.materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Material", "Material.001", "Material.002"]);
        assert_eq!(report.events.len(), 3);
    }

    #[test]
    fn test_ensure_material_enables_nodes_on_existing() {
        let mut scene = Scene::new();
        let material = scene.add_material(Material::new("Paint"));
        let ob = object_with_slots(&mut scene, Some(vec![Some(material)]));
        let mut report = PipelineReport::new();
        ensure_material(&mut scene, &mut report, ob).unwrap();
        assert_usable(&scene, ob);
        assert_eq!(scene.object(ob).unwrap().first_material(), Some(material));
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_bind_bake_node_isolates_shared_materials() {
        let mut scene = Scene::new();
        let shared = scene.add_material(Material::with_default_surface("Shared"));
        let a = object_with_slots(&mut scene, Some(vec![Some(shared), None]));
        let b = object_with_slots(&mut scene, Some(vec![Some(shared)]));
        let image = scene.add_image(ImageBuffer::new("Tri_COMBINED_bake.png", 4, 4, true).unwrap());

        let mut report = PipelineReport::new();
        bind_bake_node(&mut scene, &mut report, a, "Tri_COMBINED_bake.png", image).unwrap();

        let a_material = scene.object(a).unwrap().first_material().unwrap();
        assert_ne!(a_material, shared);
        assert_eq!(scene.object(b).unwrap().first_material(), Some(shared));
        assert_eq!(scene.object(a).unwrap().material_slots.as_ref().unwrap()[1], None);

        let graph = &scene.material(a_material).unwrap().node_tree;
        let active = graph.active_node().unwrap();
        assert_eq!(active.name, "Tri_COMBINED_bake.png");
        assert_eq!(active.kind, NodeKind::ImageTexture { image: Some(image) });
        assert!(scene.material(shared).unwrap().node_tree.node("Tri_COMBINED_bake.png").is_none());
        assert_eq!(scene.image(image).unwrap().colorspace, ColorSpace::Srgb);
    }
}
