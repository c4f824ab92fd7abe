//! Per-object bake passes for the two bake domains.

use std::path::Path;

use bakeline_scene::{ColorDataType, ImageBuffer, Modifier, ModifierKind, ObjectId, Scene};

use crate::backend::{BakeTarget, SceneBackend};
use crate::bake::{bake, PassKind};
use crate::config::{EdgeSplitMode, PipelineConfig};
use crate::consolidate::{consolidate, EmissionSource, BAKE_ATTRIBUTE};
use crate::context::PipelineContext;
use crate::error::PipelineResult;
use crate::image_io::{median_filter, write_png, PngConfig};
use crate::materials::bind_bake_node;
use crate::normalize::normalize_object;
use crate::policy::{BakeDomain, BakePolicy};
use crate::report::{PipelineEvent, PipelineReport};

/// Name of the edge split modifier added before vertex bakes.
pub const EDGE_SPLIT_MODIFIER: &str = "BakeEdgeSplit";

/// File (and image node) name of a texture bake.
pub fn bake_file_name(object: &str, pass: PassKind) -> String {
    format!("{}_{}_bake.png", object, pass.as_str())
}

/// Bakes combined lighting into the object's `Bake` color attribute.
pub fn vertex_pass<B: SceneBackend + ?Sized>(
    scene: &mut Scene,
    backend: &mut B,
    ctx: &mut PipelineContext,
    report: &mut PipelineReport,
    config: &PipelineConfig,
    object: ObjectId,
) -> PipelineResult<()> {
    let mesh_id = scene.object_mesh(object)?;
    let mesh = scene.mesh_mut(mesh_id)?;
    let index =
        mesh.ensure_color_attribute(BAKE_ATTRIBUTE, ColorDataType::ByteColor, config.vertex_color_domain);
    mesh.render_color_index = Some(index);

    let split_angle = match (config.edge_split, mesh.auto_smooth_angle) {
        (EdgeSplitMode::Never, _) | (EdgeSplitMode::AutoSmooth, None) => None,
        (_, Some(angle)) => Some(angle),
        (EdgeSplitMode::Always, None) => Some(config.default_split_angle_deg.to_radians()),
    };
    if let Some(split_angle) = split_angle {
        scene.object_mut(object)?.modifiers.push(Modifier::new(
            EDGE_SPLIT_MODIFIER,
            ModifierKind::EdgeSplit { split_angle },
        ));
    }
    normalize_object(scene, backend, ctx, report, object)?;

    let settings = config.render_settings(BakeDomain::Vert);
    ctx.select_only(object);
    bake(scene, backend, ctx, PassKind::Combined, BakeTarget::VertexColors, settings)?;
    ctx.deselect_all();

    // Normalization may have detached the mesh.
    let mesh = scene.mesh_mut(scene.object_mesh(object)?)?;
    if let Some(index) = mesh.attribute_index(BAKE_ATTRIBUTE) {
        if mesh.color_attributes[index].domain != config.vertex_color_convert_to {
            mesh.convert_attribute_domain(index, config.vertex_color_convert_to);
        }
    }

    let name = scene.object(object)?.name.clone();
    tracing::info!("baked vertex colors for '{}'", name);
    report.push(PipelineEvent::Baked {
        object: name,
        pass: PassKind::Combined,
        domain: BakeDomain::Vert,
        resolution: None,
        samples: settings.samples,
        denoise: settings.denoise,
    });
    Ok(())
}

/// Bakes the configured pass into a new image, saves it beside the scene and
/// consolidates the object onto an emission material showing it.
#[allow(clippy::too_many_arguments)]
pub fn texture_pass<B: SceneBackend + ?Sized>(
    scene: &mut Scene,
    backend: &mut B,
    ctx: &mut PipelineContext,
    report: &mut PipelineReport,
    config: &PipelineConfig,
    base_dir: &Path,
    policy: &BakePolicy,
    object: ObjectId,
) -> PipelineResult<()> {
    let pass = config.texture_pass;
    let resolution = policy.resolution(config.resolution_multiplier);
    let name = scene.object(object)?.name.clone();
    let file_name = bake_file_name(&name, pass);

    let image = scene.add_image(ImageBuffer::new(&file_name, resolution, resolution, true)?);
    bind_bake_node(scene, report, object, &file_name, image)?;

    let settings = config.render_settings(BakeDomain::Tex);
    ctx.select_only(object);
    bake(scene, backend, ctx, pass, BakeTarget::ImageTextures, settings)?;
    ctx.deselect_all();
    tracing::info!("baked {} for '{}' at {}px", pass.as_str(), name, resolution);
    report.push(PipelineEvent::Baked {
        object: name.clone(),
        pass,
        domain: BakeDomain::Tex,
        resolution: Some(resolution),
        samples: settings.samples,
        denoise: settings.denoise,
    });

    let path = base_dir.join(&file_name);
    let buffer = scene.image_mut(image)?;
    if config.median_filter {
        median_filter(buffer);
    }
    write_png(buffer, &path, &PngConfig::default())?;
    buffer.mark_saved(&path);
    tracing::debug!("saved {}", path.display());
    report.push(PipelineEvent::ImageSaved {
        object: name.clone(),
        path,
    });

    let material = consolidate(scene, object, EmissionSource::Image { node: &file_name })?;
    report.push(PipelineEvent::Consolidated {
        object: name,
        material: scene.material(material)?.name.clone(),
    });
    Ok(())
}
