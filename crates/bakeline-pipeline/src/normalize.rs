//! Mesh normalizer: applies modifier stacks and freezes scale into geometry.

use bakeline_scene::{ObjectId, Scene};

use crate::backend::SceneBackend;
use crate::context::PipelineContext;
use crate::error::PipelineResult;
use crate::report::{PipelineEvent, PipelineReport};

/// Applies every modifier enabled for both editing and rendering, in stack
/// order, then bakes the object's scale into its vertices.
///
/// Shared mesh data is detached into a private copy first. Disabled modifiers
/// stay on the stack. A second call is a no-op.
///
/// When a modifier fails, it and every modifier after it are put back on the
/// stack and the error is returned; modifiers already applied stay applied.
pub fn normalize_object<B: SceneBackend + ?Sized>(
    scene: &mut Scene,
    backend: &mut B,
    ctx: &mut PipelineContext,
    report: &mut PipelineReport,
    object: ObjectId,
) -> PipelineResult<()> {
    ctx.select_only(object);
    let (mesh, detached_mesh) = scene.make_single_user(object)?;

    let stack = std::mem::take(&mut scene.object_mut(object)?.modifiers);
    let mut kept = Vec::new();
    let mut applied = Vec::new();
    let mut pending = stack.into_iter();
    while let Some(modifier) = pending.next() {
        if !modifier.is_applicable() {
            kept.push(modifier);
            continue;
        }
        if let Err(e) = backend.apply_modifier(scene, object, &modifier) {
            kept.push(modifier);
            kept.extend(pending);
            scene.object_mut(object)?.modifiers = kept;
            return Err(e.into());
        }
        applied.push(modifier.name);
    }
    scene.object_mut(object)?.modifiers = kept;

    let transform = scene.object(object)?.transform;
    let scale_applied = !transform.has_unit_scale();
    if scale_applied {
        scene.mesh_mut(mesh)?.scale(transform.scale);
        scene.object_mut(object)?.transform.scale = [1.0; 3];
    }

    let name = scene.object(object)?.name.clone();
    if !applied.is_empty() || scale_applied || detached_mesh {
        tracing::debug!(
            "normalized '{}': {} modifiers applied, scale applied: {}",
            name,
            applied.len(),
            scale_applied
        );
        report.push(PipelineEvent::Normalized {
            object: name,
            modifiers_applied: applied,
            scale_applied,
            detached_mesh,
        });
    }
    ctx.deselect_all();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ReferenceBackend;
    use crate::error::{BackendError, PipelineError};
    use bakeline_scene::{Axis, Face, Mesh, Modifier, ModifierKind, Object, Transform};
    use pretty_assertions::assert_eq;

    fn quad() -> Mesh {
        Mesh::from_polygons(
            "Quad",
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![Face::new([0, 1, 2, 3])],
        )
    }

    fn run(scene: &mut Scene, object: ObjectId) -> PipelineResult<PipelineReport> {
        let mut report = PipelineReport::new();
        normalize_object(
            scene,
            &mut ReferenceBackend::new(),
            &mut PipelineContext::new(),
            &mut report,
            object,
        )?;
        Ok(report)
    }

    #[test]
    fn test_applies_enabled_modifiers_and_scale() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(quad());
        let mut disabled = Modifier::new("EditOnly", ModifierKind::Mirror { axis: Axis::Y });
        disabled.show_render = false;
        let ob = scene.add_object(
            Object::mesh("Quad", mesh)
                .with_transform(Transform::at([5.0, 0.0, 0.0]).with_scale([2.0, 3.0, 1.0]))
                .with_modifier(Modifier::new("Mirror", ModifierKind::Mirror { axis: Axis::X }))
                .with_modifier(disabled.clone()),
        );

        let report = run(&mut scene, ob).unwrap();

        let object = scene.object(ob).unwrap();
        assert_eq!(object.modifiers, vec![disabled]);
        assert_eq!(object.transform.scale, [1.0; 3]);
        assert_eq!(object.transform.location, [5.0, 0.0, 0.0]);
        let mesh = scene.mesh(object.mesh.unwrap()).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.positions[2], [2.0, 3.0, 0.0]);
        assert_eq!(
            report.events,
            vec![PipelineEvent::Normalized {
                object: "Quad".into(),
                modifiers_applied: vec!["Mirror".into()],
                scale_applied: true,
                detached_mesh: false,
            }]
        );
    }

    #[test]
    fn test_second_call_is_noop() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(quad());
        let ob = scene.add_object(
            Object::mesh("Quad", mesh)
                .with_transform(Transform::default().with_scale([2.0; 3]))
                .with_modifier(Modifier::new("Mirror", ModifierKind::Mirror { axis: Axis::X })),
        );
        run(&mut scene, ob).unwrap();
        let before = scene.clone();

        let report = run(&mut scene, ob).unwrap();
        assert!(report.events.is_empty());
        assert_eq!(scene, before);
    }

    #[test]
    fn test_shared_mesh_is_detached() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(quad());
        let a = scene.add_object(
            Object::mesh("A", mesh).with_transform(Transform::default().with_scale([2.0; 3])),
        );
        let b = scene.add_object(Object::mesh("B", mesh));

        run(&mut scene, a).unwrap();

        assert_ne!(scene.object(a).unwrap().mesh, Some(mesh));
        assert_eq!(scene.object(b).unwrap().mesh, Some(mesh));
        assert_eq!(scene.mesh(mesh).unwrap().positions[2], [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_failure_restores_remaining_stack() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(quad());
        let boolean = Modifier::new(
            "Boolean",
            ModifierKind::Boolean {
                operand: Some("Missing".into()),
            },
        );
        let edge_split = Modifier::new("EdgeSplit", ModifierKind::EdgeSplit { split_angle: 0.5 });
        let ob = scene.add_object(
            Object::mesh("Quad", mesh)
                .with_modifier(Modifier::new("Mirror", ModifierKind::Mirror { axis: Axis::X }))
                .with_modifier(boolean.clone())
                .with_modifier(edge_split.clone()),
        );

        let err = run(&mut scene, ob).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Backend(BackendError::MissingOperand { .. })
        ));
        let object = scene.object(ob).unwrap();
        assert_eq!(object.modifiers, vec![boolean, edge_split]);
        // The mirror ran before the failure and is not rolled back.
        assert_eq!(scene.mesh(object.mesh.unwrap()).unwrap().face_count(), 2);
    }
}
