//! Topology merger and unwrapper.

use bakeline_scene::{GroupId, ObjectId, Scene};

use crate::backend::{SceneBackend, UnwrapParams, FORCED_UNWRAP};
use crate::context::PipelineContext;
use crate::error::PipelineResult;
use crate::policy::BakePolicy;
use crate::report::{PipelineEvent, PipelineReport};

/// Joins `members` into the first one. Returns the surviving objects.
pub fn merge_members(
    scene: &mut Scene,
    ctx: &mut PipelineContext,
    report: &mut PipelineReport,
    members: &[ObjectId],
) -> PipelineResult<Vec<ObjectId>> {
    let [first, rest @ ..] = members else {
        return Ok(Vec::new());
    };
    if rest.is_empty() {
        return Ok(vec![*first]);
    }

    ctx.select_group(members);
    let removed = rest
        .iter()
        .map(|&id| scene.object(id).map(|o| o.name.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    scene.join_objects(*first, rest)?;
    for &id in rest {
        ctx.forget(id);
    }
    ctx.deselect_all();

    let into = scene.object(*first)?.name.clone();
    tracing::info!("joined {} objects into '{}'", removed.len(), into);
    report.push(PipelineEvent::Merged { into, removed });
    Ok(vec![*first])
}

/// Projects UVs for `members`.
///
/// Several members are first projected together so they share one texel
/// scale; the first member is then re-projected on its own. Both passes use
/// the tight [`FORCED_UNWRAP`] margin.
pub fn unwrap_members<B: SceneBackend + ?Sized>(
    scene: &mut Scene,
    backend: &mut B,
    ctx: &mut PipelineContext,
    report: &mut PipelineReport,
    members: &[ObjectId],
) -> PipelineResult<()> {
    let Some(&first) = members.first() else {
        return Ok(());
    };
    if members.len() > 1 {
        ctx.select_group(members);
        project(scene, backend, ctx, report, FORCED_UNWRAP)?;
    }
    ctx.select_only(first);
    project(scene, backend, ctx, report, FORCED_UNWRAP)?;
    ctx.deselect_all();
    Ok(())
}

fn project<B: SceneBackend + ?Sized>(
    scene: &mut Scene,
    backend: &mut B,
    ctx: &PipelineContext,
    report: &mut PipelineReport,
    params: UnwrapParams,
) -> PipelineResult<()> {
    backend.smart_project(scene, ctx, params)?;
    let objects = ctx
        .selection()
        .iter()
        .map(|&id| scene.object(id).map(|o| o.name.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!("unwrapped {:?} (margin {})", objects, params.island_margin);
    report.push(PipelineEvent::Unwrapped { objects, params });
    Ok(())
}

/// Runs the group's merge and unwrap steps on its direct mesh members.
///
/// Merge always runs first, so a joined group is unwrapped as one object.
pub fn layout_group<B: SceneBackend + ?Sized>(
    scene: &mut Scene,
    backend: &mut B,
    ctx: &mut PipelineContext,
    report: &mut PipelineReport,
    group: GroupId,
    policy: &BakePolicy,
) -> PipelineResult<()> {
    if policy.join {
        let members = scene.mesh_members(group)?;
        merge_members(scene, ctx, report, &members)?;
    }
    if policy.unwrap {
        let members = scene.mesh_members(group)?;
        unwrap_members(scene, backend, ctx, report, &members)?;
    }
    Ok(())
}
