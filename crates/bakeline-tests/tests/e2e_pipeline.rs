//! End-to-end pipeline tests.
//!
//! Each test builds a saved scene, runs the whole pipeline on the reference
//! backend and checks the resulting scene and run report.

use pretty_assertions::assert_eq;
use std::path::Path;

use bakeline_pipeline::backend::{BackendCall, BakeTarget, RenderSettings};
use bakeline_pipeline::consolidate::{BAKE_ATTRIBUTE, EMISSION_NODE};
use bakeline_pipeline::{
    run, BakeDomain, EdgeSplitMode, PassKind, PipelineConfig, PipelineError, PipelineEvent,
    ReferenceBackend, FORCED_UNWRAP,
};
use bakeline_scene::{AttributeDomain, NodeKind, Scene, SceneError};
use bakeline_tests::fixtures::SceneFixture;

fn config() -> PipelineConfig {
    PipelineConfig::default()
        .preview_mode(false)
        .resolution_multiplier(0.125)
}

#[test]
fn vertex_only_group_bakes_one_channel() {
    let mut fx = SceneFixture::new();
    let group = fx.group("PROPS_VERT");
    let ob = fx.add_cube(group, "Crate", 0.0);

    let mut backend = ReferenceBackend::new();
    let report = run(
        &mut fx.scene,
        &mut backend,
        config().edge_split(EdgeSplitMode::Never),
    )
    .unwrap();

    // Nothing to apply, nothing to unwrap.
    assert!(!report
        .events
        .iter()
        .any(|e| matches!(e, PipelineEvent::Normalized { .. })));
    assert!(backend.unwrap_calls().is_empty());
    assert_eq!(
        report.bakes().collect::<Vec<_>>(),
        vec![("Crate", PassKind::Combined, BakeDomain::Vert)]
    );

    let mesh = fx
        .scene
        .mesh(fx.scene.object_mesh(ob).unwrap())
        .unwrap();
    let attr = mesh.attribute(BAKE_ATTRIBUTE).unwrap();
    assert_eq!(attr.domain, AttributeDomain::Corner);
    assert_eq!(attr.len(), mesh.corner_count());
    assert!(attr.values.iter().all(|c| c[3] == 1.0));
    assert_eq!(
        mesh.render_color_attribute().map(|a| a.name.as_str()),
        Some(BAKE_ATTRIBUTE)
    );
}

#[test]
fn vertex_bake_splits_edges_by_default() {
    let mut fx = SceneFixture::new();
    let group = fx.group("PROPS_VERT");
    let ob = fx.add_cube(group, "Crate", 0.0);

    run(&mut fx.scene, &mut ReferenceBackend::new(), config()).unwrap();

    let object = fx.scene.object(ob).unwrap();
    assert!(object.modifiers.is_empty());
    let mesh = fx.scene.mesh(object.mesh.unwrap()).unwrap();
    // Every cube edge is sharp, so each face gets its own corners.
    assert_eq!(mesh.vertex_count(), 24);
}

#[test]
fn joined_group_is_unwrapped_and_texture_baked() {
    let mut fx = SceneFixture::new();
    let group = fx.group("PROPS_JOIN_UNWRAP_TEX_512");
    let first = fx.add_cube(group, "Crate", 0.0);
    fx.add_cube(group, "Barrel", 2.0);
    fx.add_cube(group, "Box", 4.0);

    let mut backend = ReferenceBackend::new();
    let report = run(&mut fx.scene, &mut backend, config()).unwrap();

    assert_eq!(fx.scene.mesh_members(group).unwrap(), vec![first]);
    let unwraps = backend.unwrap_calls();
    assert_eq!(unwraps.len(), 2);
    assert!(unwraps
        .iter()
        .all(|(objects, params)| *objects == [first] && *params == FORCED_UNWRAP));

    let bakes: Vec<_> = report
        .events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Baked {
                domain, resolution, ..
            } => Some((*domain, *resolution)),
            _ => None,
        })
        .collect();
    assert_eq!(bakes, vec![(BakeDomain::Tex, Some(128))]);

    let image_path = fx.path().join("Crate_COMBINED_bake.png");
    assert!(image_path.exists());

    let object = fx.scene.object(first).unwrap();
    let slots = object.material_slots.clone().unwrap();
    assert_eq!(slots.len(), 1);
    let graph = &fx.scene.material(slots[0].unwrap()).unwrap().node_tree;
    assert_eq!(graph.surface_node().unwrap().name, EMISSION_NODE);
    let source = graph.input_source(EMISSION_NODE, "Color").unwrap();
    assert!(matches!(source.kind, NodeKind::ImageTexture { image: Some(_) }));
}

#[test]
fn props_are_processed_before_arch() {
    let mut fx = SceneFixture::new();
    let arch = fx.group("ARCH_VERT");
    fx.add_cube(arch, "Wall", 0.0);
    let props = fx.group("PROPS_VERT");
    fx.add_cube(props, "Crate", 3.0);
    let ignored = fx.group("DECOR_VERT");
    fx.add_cube(ignored, "Plant", 6.0);

    let report = run(&mut fx.scene, &mut ReferenceBackend::new(), config()).unwrap();

    assert_eq!(
        report.groups().collect::<Vec<_>>(),
        vec!["PROPS_VERT", "ARCH_VERT"]
    );
    let baked: Vec<_> = report.bakes().map(|(o, _, _)| o).collect();
    assert_eq!(baked, vec!["Crate", "Wall"]);
}

#[test]
fn preview_mode_installs_vertex_emission_on_props() {
    let mut fx = SceneFixture::new();
    let props = fx.group("PROPS_VERT");
    let crate_ob = fx.add_cube(props, "Crate", 0.0);
    let arch = fx.group("ARCH_VERT");
    let wall = fx.add_cube(arch, "Wall", 3.0);

    let report = run(
        &mut fx.scene,
        &mut ReferenceBackend::new(),
        config().preview_mode(true),
    )
    .unwrap();

    let previews: Vec<_> = report
        .events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::PreviewInstalled { object, .. } => Some(object.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(previews, vec!["Crate"]);

    let surface_of = |scene: &Scene, id| {
        let material = scene.object(id).unwrap().first_material().unwrap();
        scene
            .material(material)
            .unwrap()
            .node_tree
            .surface_node()
            .unwrap()
            .name
            .clone()
    };
    assert_eq!(surface_of(&fx.scene, crate_ob), EMISSION_NODE);
    assert_ne!(surface_of(&fx.scene, wall), EMISSION_NODE);
}

#[test]
fn unsaved_scene_is_rejected() {
    let mut scene = Scene::new();
    let group = scene.add_group("PROPS_VERT");
    let mesh = scene.add_mesh(bakeline_tests::fixtures::cube_mesh("Crate"));
    let ob = scene.add_object(bakeline_scene::Object::mesh("Crate", mesh));
    scene.link_object(group, ob).unwrap();

    let err = run(&mut scene, &mut ReferenceBackend::new(), config()).unwrap_err();
    assert!(matches!(err, PipelineError::Scene(SceneError::NotSaved)));
    assert!(err.is_input_error());
}

#[test]
fn baked_scene_survives_save_and_load() {
    let mut fx = SceneFixture::new();
    let group = fx.group("PROPS_UNWRAP_VERT_TEX_256");
    fx.add_cube(group, "Crate", 0.0);
    fx.add_cube(group, "Barrel", 2.0);

    run(&mut fx.scene, &mut ReferenceBackend::new(), config()).unwrap();
    let path = fx.save();

    let loaded = Scene::load(&path).unwrap();
    assert_eq!(loaded.objects, fx.scene.objects);
    assert_eq!(loaded.materials, fx.scene.materials);
}

#[test]
fn vertex_and_texture_group_bakes_vertex_first_with_domain_settings() {
    let mut fx = SceneFixture::new();
    let group = fx.group("PROPS_UNWRAP_VERT_TEX");
    let ob = fx.add_cube(group, "Crate", 0.0);

    let mut backend = ReferenceBackend::new();
    let report = run(&mut fx.scene, &mut backend, config()).unwrap();

    assert_eq!(
        report.bakes().collect::<Vec<_>>(),
        vec![
            ("Crate", PassKind::Combined, BakeDomain::Vert),
            ("Crate", PassKind::Combined, BakeDomain::Tex),
        ]
    );
    let calls: Vec<_> = backend
        .bake_calls()
        .into_iter()
        .filter_map(|call| match call {
            BackendCall::Bake {
                objects,
                target,
                settings,
                ..
            } => Some((objects.clone(), *target, *settings)),
            _ => None,
        })
        .collect();
    assert_eq!(
        calls,
        vec![
            (
                vec![ob],
                BakeTarget::VertexColors,
                RenderSettings {
                    samples: 4096,
                    denoise: false,
                },
            ),
            (
                vec![ob],
                BakeTarget::ImageTextures,
                RenderSettings {
                    samples: 512,
                    denoise: true,
                },
            ),
        ]
    );
}

#[test]
fn scene_loaded_by_relative_path_bakes_beside_itself() {
    let mut fx = SceneFixture::new();
    let group = fx.group("PROPS_UNWRAP_TEX_256");
    fx.add_cube(group, "Crate", 0.0);
    fx.save();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(fx.path()).unwrap();
    let result = Scene::load(Path::new("level.json")).map(|mut scene| {
        let outcome = run(&mut scene, &mut ReferenceBackend::new(), config());
        (scene, outcome)
    });
    std::env::set_current_dir(previous).unwrap();

    let (scene, outcome) = result.unwrap();
    assert_eq!(scene.base_dir().unwrap(), Path::new("."));
    outcome.unwrap();
    assert!(fx.path().join("Crate_COMBINED_bake.png").exists());
}

#[test]
fn unwrap_group_projects_every_pass_with_tight_margin() {
    let mut fx = SceneFixture::new();
    let group = fx.group("ARCH_UNWRAP");
    let wall = fx.add_cube(group, "Wall", 0.0);
    let door = fx.add_cube(group, "Door", 2.0);

    let mut backend = ReferenceBackend::new();
    run(&mut fx.scene, &mut backend, config()).unwrap();

    let unwraps = backend.unwrap_calls();
    let targets: Vec<_> = unwraps.iter().map(|(objects, _)| objects.to_vec()).collect();
    assert_eq!(
        targets,
        vec![vec![wall, door], vec![wall], vec![wall, door], vec![wall]]
    );
    assert!(unwraps.iter().all(|(_, params)| *params == FORCED_UNWRAP));
}

#[test]
fn repeated_consolidation_leaves_one_material_per_object() {
    let mut fx = SceneFixture::new();
    let group = fx.group("PROPS_UNWRAP_VERT_TEX_256");
    let crate_ob = fx.add_cube(group, "Crate", 0.0);
    let barrel = fx.add_cube(group, "Barrel", 2.0);

    // Texture consolidation, then the preview consolidates again.
    run(
        &mut fx.scene,
        &mut ReferenceBackend::new(),
        config().preview_mode(true),
    )
    .unwrap();

    let names: Vec<_> = fx.scene.materials.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Crate"));
    assert!(names.contains(&"Barrel"));
    for ob in [crate_ob, barrel] {
        let slots = fx.scene.object(ob).unwrap().material_slots.clone().unwrap();
        assert_eq!(slots.len(), 1);
    }

    let loaded = Scene::load(&fx.save()).unwrap();
    assert_eq!(loaded.materials.len(), 2);
}

#[test]
fn render_settings_follow_config_not_group_name() {
    let mut fx = SceneFixture::new();
    let group = fx.group("PROPS_UNWRAP_VERT_TEX_1024");
    fx.add_cube(group, "Crate", 0.0);

    let mut backend = ReferenceBackend::new();
    run(&mut fx.scene, &mut backend, config().samples(16, 32)).unwrap();

    let settings: Vec<_> = backend
        .bake_calls()
        .into_iter()
        .filter_map(|call| match call {
            BackendCall::Bake { settings, .. } => Some(settings.samples),
            _ => None,
        })
        .collect();
    assert_eq!(settings, vec![32, 16]);
}
