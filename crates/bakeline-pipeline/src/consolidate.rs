//! Post-bake consolidator.
//!
//! Collapses an object's materials into one copy named after the object and
//! rewires its surface to an emission shader fed by the baked result.

use bakeline_scene::material::{socket, OUTPUT_NODE};
use bakeline_scene::{MaterialId, NodeKind, ObjectId, Scene};

use crate::error::{PipelineError, PipelineResult};

/// Emission node inserted by consolidation.
pub const EMISSION_NODE: &str = "BAKE_EMISSION_OUTPUT";

/// Attribute node reading the baked vertex colors.
pub const ATTRIBUTE_NODE: &str = "BAKE_ATTRIBUTE";

/// Color attribute vertex bakes write into.
pub const BAKE_ATTRIBUTE: &str = "Bake";

/// What drives the emission shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionSource<'a> {
    /// Color output of the named image texture node.
    Image { node: &'a str },
    /// The `Bake` vertex color attribute.
    VertexColor,
}

/// Replaces all slots with a single copy of the slot 0 material, named after
/// the object. Every face is moved to that slot.
///
/// Materials the object held that no other object uses are dropped, so
/// consolidating again leaves exactly one material behind.
pub fn consolidate_materials(scene: &mut Scene, object: ObjectId) -> PipelineResult<MaterialId> {
    let ob = scene.object(object)?;
    let name = ob.name.clone();
    let previous: Vec<MaterialId> = ob.materials().collect();
    let first = ob
        .first_material()
        .ok_or_else(|| PipelineError::MaterialInvariant {
            object: name.clone(),
        })?;

    let mut material = scene.material(first)?.clone();
    material.name.clear();
    let copy = scene.add_material(material);

    scene.object_mut(object)?.material_slots = Some(vec![Some(copy)]);
    let mesh = scene.object_mesh(object)?;
    for face in &mut scene.mesh_mut(mesh)?.faces {
        face.material_index = 0;
    }

    let dropped = scene.purge_materials(&previous);
    if !dropped.is_empty() {
        tracing::debug!("'{}' dropped unused materials {:?}", name, dropped);
    }
    let copy = scene
        .object(object)?
        .first_material()
        .ok_or_else(|| PipelineError::MaterialInvariant {
            object: name.clone(),
        })?;
    let fresh = scene.fresh_material_name(&name);
    scene.material_mut(copy)?.name = fresh;
    Ok(copy)
}

/// Routes `source` through the emission node into the material output.
pub fn shader_emit(
    scene: &mut Scene,
    material: MaterialId,
    source: EmissionSource<'_>,
) -> PipelineResult<()> {
    let material = scene.material_mut(material)?;
    material.enable_nodes();
    let graph = &mut material.node_tree;

    let color_node = match source {
        EmissionSource::Image { node } => node,
        EmissionSource::VertexColor => {
            graph.get_or_insert_with(ATTRIBUTE_NODE, || NodeKind::Attribute {
                attribute_name: BAKE_ATTRIBUTE.to_string(),
            });
            ATTRIBUTE_NODE
        }
    };
    graph.get_or_insert_with(EMISSION_NODE, NodeKind::emission);
    graph.get_or_insert_with(OUTPUT_NODE, || NodeKind::Output);
    graph.connect(color_node, socket::COLOR, EMISSION_NODE, socket::COLOR);
    graph.connect(EMISSION_NODE, socket::EMISSION, OUTPUT_NODE, socket::SURFACE);
    Ok(())
}

/// Consolidates and installs the emission shader. Returns the new material.
pub fn consolidate(
    scene: &mut Scene,
    object: ObjectId,
    source: EmissionSource<'_>,
) -> PipelineResult<MaterialId> {
    let material = consolidate_materials(scene, object)?;
    shader_emit(scene, material, source)?;
    Ok(material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakeline_scene::{Face, Material, Mesh, Object};
    use pretty_assertions::assert_eq;

    fn two_material_object(scene: &mut Scene) -> ObjectId {
        let a = scene.add_material(Material::with_default_surface("Wood"));
        let b = scene.add_material(Material::with_default_surface("Metal"));
        let mesh = scene.add_mesh(Mesh::from_polygons(
            "Crate",
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![Face::new([0, 1, 2]), Face::new([0, 2, 3]).with_material(1)],
        ));
        scene.add_object(Object::mesh("Crate", mesh).with_materials(vec![Some(a), Some(b)]))
    }

    #[test]
    fn test_consolidate_is_idempotent() {
        let mut scene = Scene::new();
        let ob = two_material_object(&mut scene);

        let first = consolidate(&mut scene, ob, EmissionSource::VertexColor).unwrap();
        assert_eq!(scene.object(ob).unwrap().material_slots, Some(vec![Some(first)]));
        assert_eq!(scene.material(first).unwrap().name, "Crate");
        assert_eq!(scene.materials.len(), 1);

        let second = consolidate(&mut scene, ob, EmissionSource::VertexColor).unwrap();
        assert_eq!(scene.object(ob).unwrap().material_slots, Some(vec![Some(second)]));
        assert_eq!(scene.material(second).unwrap().name, "Crate");
        assert_eq!(scene.materials.len(), 1);

        let mesh = scene.mesh(scene.object_mesh(ob).unwrap()).unwrap();
        assert!(mesh.faces.iter().all(|f| f.material_index == 0));

        // Re-running keeps exactly one attribute and one emission node.
        let graph = &scene.material(second).unwrap().node_tree;
        assert_eq!(
            graph.nodes.iter().filter(|n| n.name == EMISSION_NODE).count(),
            1
        );
        assert_eq!(graph.surface_node().unwrap().name, EMISSION_NODE);
        assert_eq!(
            graph.input_source(EMISSION_NODE, socket::COLOR).unwrap().name,
            ATTRIBUTE_NODE
        );
    }

    #[test]
    fn test_consolidate_keeps_materials_other_objects_use() {
        let mut scene = Scene::new();
        let ob = two_material_object(&mut scene);
        let slots = scene.object(ob).unwrap().material_slots.clone().unwrap();
        let mesh = scene.add_mesh(Mesh::new("Barrel"));
        let barrel = scene.add_object(Object::mesh("Barrel", mesh).with_materials(vec![slots[1]]));

        let copy = consolidate_materials(&mut scene, ob).unwrap();

        let names: Vec<_> = scene.materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Metal", "Crate"]);
        let metal = scene.object(barrel).unwrap().first_material().unwrap();
        assert_eq!(scene.material(metal).unwrap().name, "Metal");
        assert_eq!(scene.object(ob).unwrap().first_material(), Some(copy));
    }

    #[test]
    fn test_consolidated_name_avoids_live_materials() {
        let mut scene = Scene::new();
        let ob = two_material_object(&mut scene);
        let taken = scene.add_material(Material::with_default_surface("Crate"));
        let mesh = scene.add_mesh(Mesh::new("Other"));
        scene.add_object(Object::mesh("Other", mesh).with_materials(vec![Some(taken)]));

        let copy = consolidate_materials(&mut scene, ob).unwrap();
        assert_eq!(scene.material(copy).unwrap().name, "Crate.001");
    }

    #[test]
    fn test_image_emission_source() {
        let mut scene = Scene::new();
        let ob = two_material_object(&mut scene);
        let material = scene.object(ob).unwrap().first_material().unwrap();
        scene
            .material_mut(material)
            .unwrap()
            .node_tree
            .get_or_insert_with("Crate_COMBINED_bake.png", || NodeKind::ImageTexture { image: None });

        let copy = consolidate(
            &mut scene,
            ob,
            EmissionSource::Image {
                node: "Crate_COMBINED_bake.png",
            },
        )
        .unwrap();
        let graph = &scene.material(copy).unwrap().node_tree;
        assert_eq!(
            graph.input_source(EMISSION_NODE, socket::COLOR).unwrap().name,
            "Crate_COMBINED_bake.png"
        );
        // The original principled node is left in place but disconnected.
        assert!(graph.node(bakeline_scene::material::PRINCIPLED_NODE).is_some());
        assert_eq!(graph.surface_node().unwrap().name, EMISSION_NODE);
    }

    #[test]
    fn test_consolidate_without_material_fails() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(Mesh::new("Empty"));
        let ob = scene.add_object(Object::mesh("Bare", mesh));
        assert!(matches!(
            consolidate_materials(&mut scene, ob),
            Err(PipelineError::MaterialInvariant { .. })
        ));
    }
}
