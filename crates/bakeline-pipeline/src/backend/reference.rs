//! Deterministic in-process backend.
//!
//! Modifiers are evaluated on the scene's own mesh data, UVs come from a
//! per-polygon planar projection packed into one shared atlas, and bakes use
//! flat Lambert shading. Every call is recorded so callers can inspect what
//! the pipeline asked for.

use bakeline_scene::{
    ImageId, MaterialId, Mesh, Modifier, ModifierKind, NodeKind, Object, ObjectId, Rgba, Scene,
};

use super::shading::{CornerAttributes, Lighting, SamplePoint, SurfaceShader};
use super::{
    BakeOutcome, BakeOutput, BakeRequest, BakeTarget, RenderSettings, SceneBackend, UnwrapParams,
};
use crate::bake::{BakeType, PassKind};
use crate::context::PipelineContext;
use crate::error::{BackendError, BackendResult};

/// A recorded backend invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    ApplyModifier {
        object: ObjectId,
        modifier: String,
    },
    SmartProject {
        objects: Vec<ObjectId>,
        params: UnwrapParams,
    },
    Bake {
        objects: Vec<ObjectId>,
        pass: PassKind,
        target: BakeTarget,
        settings: RenderSettings,
    },
}

#[derive(Debug, Default)]
pub struct ReferenceBackend {
    calls: Vec<BackendCall>,
}

impl ReferenceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// The `smart_project` calls made so far.
    pub fn unwrap_calls(&self) -> Vec<(&[ObjectId], UnwrapParams)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SmartProject { objects, params } => Some((objects.as_slice(), *params)),
                _ => None,
            })
            .collect()
    }

    /// The `bake` calls made so far.
    pub fn bake_calls(&self) -> Vec<&BackendCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::Bake { .. }))
            .collect()
    }
}

fn selected_meshes(scene: &Scene, ctx: &PipelineContext) -> Vec<ObjectId> {
    ctx.selection()
        .iter()
        .copied()
        .filter(|&id| scene.object(id).map(Object::is_renderable_mesh).unwrap_or(false))
        .collect()
}

impl SceneBackend for ReferenceBackend {
    fn apply_modifier(
        &mut self,
        scene: &mut Scene,
        object: ObjectId,
        modifier: &Modifier,
    ) -> BackendResult<()> {
        self.calls.push(BackendCall::ApplyModifier {
            object,
            modifier: modifier.name.clone(),
        });
        let object_name = scene.object(object)?.name.clone();
        let mesh = scene.object_mesh(object)?;

        match &modifier.kind {
            ModifierKind::Mirror { axis } => scene.mesh_mut(mesh)?.mirror(*axis),
            ModifierKind::EdgeSplit { split_angle } => {
                if !split_angle.is_finite() || *split_angle < 0.0 {
                    return Err(BackendError::modifier_failed(
                        object_name,
                        &modifier.name,
                        format!("invalid split angle {}", split_angle),
                    ));
                }
                scene.mesh_mut(mesh)?.split_sharp_edges(*split_angle);
            }
            ModifierKind::Boolean { operand } => {
                let Some(operand) = operand else {
                    return Err(BackendError::modifier_failed(
                        object_name,
                        &modifier.name,
                        "no operand object set",
                    ));
                };
                let operand_id = scene.find_object(operand).ok_or_else(|| {
                    BackendError::MissingOperand {
                        object: object_name.clone(),
                        modifier: modifier.name.clone(),
                        operand: operand.clone(),
                    }
                })?;
                if operand_id == object {
                    return Err(BackendError::modifier_failed(
                        object_name,
                        &modifier.name,
                        "operand is the object itself",
                    ));
                }
                scene.append_object_geometry(object, operand_id)?;
            }
        }
        tracing::debug!(
            "applied {} modifier '{}' on '{}'",
            modifier.kind.type_name(),
            modifier.name,
            object_name
        );
        Ok(())
    }

    fn smart_project(
        &mut self,
        scene: &mut Scene,
        ctx: &PipelineContext,
        params: UnwrapParams,
    ) -> BackendResult<()> {
        let objects = selected_meshes(scene, ctx);
        if objects.is_empty() {
            return Err(BackendError::NothingSelected {
                operation: "smart_project",
            });
        }
        self.calls.push(BackendCall::SmartProject {
            objects: objects.clone(),
            params,
        });

        let mut islands = Vec::new();
        for (slot, &id) in objects.iter().enumerate() {
            let scale = scene.object(id)?.transform.scale.map(f32::abs);
            let mesh = scene.mesh(scene.object_mesh(id)?)?;
            for (face, first_corner) in mesh.corner_offsets().into_iter().enumerate() {
                islands.push(Island::project(mesh, slot, face, first_corner, scale));
            }
        }

        let sizes: Vec<[f32; 2]> = islands.iter().map(|i| i.size).collect();
        let (positions, scale) = pack(&sizes, params.island_margin);

        let mut layers: Vec<Vec<[f32; 2]>> = Vec::with_capacity(objects.len());
        for &id in &objects {
            let mesh = scene.mesh(scene.object_mesh(id)?)?;
            layers.push(vec![[0.0, 0.0]; mesh.corner_count()]);
        }
        for (island, offset) in islands.iter().zip(&positions) {
            let layer = &mut layers[island.object];
            for (k, p) in island.points.iter().enumerate() {
                layer[island.first_corner + k] =
                    [(offset[0] + p[0]) * scale, (offset[1] + p[1]) * scale];
            }
        }
        for (&id, layer) in objects.iter().zip(layers) {
            let mesh = scene.object_mesh(id)?;
            scene.mesh_mut(mesh)?.uv = Some(layer);
        }
        tracing::debug!(
            "projected {} islands over {} objects (margin {})",
            islands.len(),
            objects.len(),
            params.island_margin
        );
        Ok(())
    }

    fn bake(
        &mut self,
        scene: &mut Scene,
        ctx: &PipelineContext,
        request: &BakeRequest,
    ) -> BackendResult<BakeOutcome> {
        let objects = selected_meshes(scene, ctx);
        let Some(&first) = objects.first() else {
            return Err(BackendError::NothingSelected { operation: "bake" });
        };
        self.calls.push(BackendCall::Bake {
            objects: objects.clone(),
            pass: request.pass,
            target: request.target,
            settings: request.settings,
        });

        let lighting = Lighting::from_scene(scene);
        if request.bake_type == BakeType::Combined && lighting.is_dark() {
            return Err(BackendError::NoLighting {
                object: scene.object(first)?.name.clone(),
            });
        }

        match request.target {
            BakeTarget::ImageTextures => bake_images(scene, &objects, request, &lighting),
            BakeTarget::VertexColors => bake_vertex_colors(scene, &objects, request, &lighting),
        }
    }
}

/// One polygon laid flat on its dominant plane.
struct Island {
    object: usize,
    first_corner: usize,
    points: Vec<[f32; 2]>,
    size: [f32; 2],
}

impl Island {
    fn project(mesh: &Mesh, object: usize, face: usize, first_corner: usize, scale: [f32; 3]) -> Self {
        let n = mesh.face_normal(face).map(f32::abs);
        let (u, v) = if n[2] >= n[0] && n[2] >= n[1] {
            (0, 1)
        } else if n[1] >= n[0] {
            (0, 2)
        } else {
            (1, 2)
        };
        let mut points: Vec<[f32; 2]> = mesh.faces[face]
            .vertices
            .iter()
            .map(|&vi| {
                let p = mesh.positions[vi as usize];
                [p[u] * scale[u], p[v] * scale[v]]
            })
            .collect();
        let min = points
            .iter()
            .fold([f32::INFINITY; 2], |m, p| [m[0].min(p[0]), m[1].min(p[1])]);
        let mut size = [0.0f32; 2];
        for p in &mut points {
            p[0] -= min[0];
            p[1] -= min[1];
            size[0] = size[0].max(p[0]);
            size[1] = size[1].max(p[1]);
        }
        Self {
            object,
            first_corner,
            points,
            size,
        }
    }
}

/// Shelf-packs rectangles, tallest first, into a square.
///
/// Returns each rectangle's origin and the factor mapping the packed extent
/// into the unit square. `margin` is the gap between rectangles (and around
/// the border) as a fraction of the final size.
fn pack(sizes: &[[f32; 2]], margin: f32) -> (Vec<[f32; 2]>, f32) {
    let area: f32 = sizes.iter().map(|s| s[0] * s[1]).sum();
    let widest = sizes.iter().fold(0.0f32, |m, s| m.max(s[0]).max(s[1]));
    let side = area.sqrt().max(widest).max(f32::EPSILON);
    let gap = margin.max(0.0) * side;
    let padded: f32 = sizes.iter().map(|s| (s[0] + gap) * (s[1] + gap)).sum();
    let row_limit = padded.sqrt().max(widest + gap);

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| sizes[b][1].total_cmp(&sizes[a][1]));

    let mut positions = vec![[0.0f32; 2]; sizes.len()];
    let (mut x, mut y, mut row_height) = (gap, gap, 0.0f32);
    let mut extent = [f32::EPSILON; 2];
    for i in order {
        let [w, h] = sizes[i];
        if x > gap && x + w > row_limit {
            y += row_height + gap;
            x = gap;
            row_height = 0.0;
        }
        positions[i] = [x, y];
        x += w + gap;
        row_height = row_height.max(h);
        extent[0] = extent[0].max(x);
        extent[1] = extent[1].max(y + h + gap);
    }
    (positions, 1.0 / extent[0].max(extent[1]))
}

fn rotate(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    let r = [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ];
    let len = (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt();
    if len <= f32::EPSILON {
        [0.0; 3]
    } else {
        r.map(|c| c / len)
    }
}

/// Compiled shader per material slot; `None` for empty slots.
fn slot_shaders(scene: &Scene, slots: &[Option<MaterialId>]) -> BackendResult<Vec<Option<SurfaceShader>>> {
    slots
        .iter()
        .map(|slot| match slot {
            Some(id) => Ok(Some(SurfaceShader::compile(Some(scene.material(*id)?)))),
            None => Ok(None),
        })
        .collect()
}

/// Faces past the last slot use the last slot.
fn slot_for(face_material: u32, slots: usize) -> Option<usize> {
    if slots == 0 {
        None
    } else {
        Some((face_material as usize).min(slots - 1))
    }
}

struct WorkingImage {
    id: ImageId,
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

fn bake_images(
    scene: &mut Scene,
    objects: &[ObjectId],
    request: &BakeRequest,
    lighting: &Lighting,
) -> BackendResult<BakeOutcome> {
    let mut working: Vec<WorkingImage> = Vec::new();

    for &id in objects {
        let object = scene.object(id)?;
        let mesh = scene.mesh(scene.object_mesh(id)?)?;
        let uv = mesh.uv.as_ref().ok_or_else(|| BackendError::MissingUvs {
            object: object.name.clone(),
        })?;
        let slots = object.material_slots.clone().unwrap_or_default();

        // Each material bakes into the image of its active image node.
        let mut targets: Vec<Option<ImageId>> = Vec::with_capacity(slots.len());
        for slot in &slots {
            let Some(material_id) = slot else {
                targets.push(None);
                continue;
            };
            let material = scene.material(*material_id)?;
            match material.node_tree.active_node().map(|n| &n.kind) {
                Some(NodeKind::ImageTexture { image: Some(image) }) => targets.push(Some(*image)),
                _ => {
                    return Err(BackendError::NoImageTarget {
                        object: object.name.clone(),
                        material: material.name.clone(),
                    })
                }
            }
        }
        if targets.iter().all(Option::is_none) {
            return Err(BackendError::NoImageTarget {
                object: object.name.clone(),
                material: String::from("<none>"),
            });
        }

        let shaders = slot_shaders(scene, &slots)?;
        let attributes = CornerAttributes::gather(mesh, shaders.iter().flatten());
        let rotation = object.transform.rotation_matrix();
        let offsets = mesh.corner_offsets();

        for (fi, face) in mesh.faces.iter().enumerate() {
            let Some(slot) = slot_for(face.material_index, slots.len()) else {
                continue;
            };
            let (Some(image_id), Some(shader)) = (targets[slot], shaders[slot].as_ref()) else {
                continue;
            };
            let index = match working.iter().position(|w| w.id == image_id) {
                Some(index) => index,
                None => {
                    let image = scene.image(image_id)?;
                    let pixels = if image.is_loaded() {
                        image.pixels.clone()
                    } else {
                        vec![[0.0, 0.0, 0.0, 1.0]; image.width as usize * image.height as usize]
                    };
                    working.push(WorkingImage {
                        id: image_id,
                        width: image.width,
                        height: image.height,
                        pixels,
                    });
                    working.len() - 1
                }
            };
            let target = &mut working[index];
            let normal = rotate(&rotation, mesh.face_normal(fi));
            let first = offsets[fi];
            for k in 1..face.vertices.len().saturating_sub(1) {
                let corners = [first, first + k, first + k + 1];
                rasterize(target, [uv[corners[0]], uv[corners[1]], uv[corners[2]]], |uv_point, weights| {
                    let sample = [
                        (corners[0], weights[0]),
                        (corners[1], weights[1]),
                        (corners[2], weights[2]),
                    ];
                    let values = shader.evaluate(
                        scene,
                        &attributes,
                        SamplePoint {
                            uv: Some(uv_point),
                            corners: &sample,
                        },
                    );
                    lighting.shade(request.bake_type, &request.contributions, &values, normal)
                });
            }
        }
    }

    let mut outcome = BakeOutcome::default();
    for image in working {
        scene.image_mut(image.id)?.pixels = image.pixels;
        outcome.outputs.push(BakeOutput::Image { image: image.id });
    }
    Ok(outcome)
}

/// Writes `shade(uv, barycentric)` into every pixel whose center lies in the triangle.
fn rasterize(
    target: &mut WorkingImage,
    tri: [[f32; 2]; 3],
    mut shade: impl FnMut([f32; 2], [f32; 3]) -> Rgba,
) {
    let (w, h) = (target.width as f32, target.height as f32);
    let [a, b, c] = tri;
    let area = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
    if area.abs() <= f32::EPSILON {
        return;
    }
    let min_u = a[0].min(b[0]).min(c[0]);
    let max_u = a[0].max(b[0]).max(c[0]);
    let min_v = a[1].min(b[1]).min(c[1]);
    let max_v = a[1].max(b[1]).max(c[1]);
    let x0 = ((min_u * w).floor().max(0.0)) as u32;
    let x1 = ((max_u * w).ceil().min(w)) as u32;
    let y0 = ((min_v * h).floor().max(0.0)) as u32;
    let y1 = ((max_v * h).ceil().min(h)) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let p = [(x as f32 + 0.5) / w, (y as f32 + 0.5) / h];
            let w0 = ((b[0] - p[0]) * (c[1] - p[1]) - (c[0] - p[0]) * (b[1] - p[1])) / area;
            let w1 = ((c[0] - p[0]) * (a[1] - p[1]) - (a[0] - p[0]) * (c[1] - p[1])) / area;
            let w2 = 1.0 - w0 - w1;
            if w0 < -1e-6 || w1 < -1e-6 || w2 < -1e-6 {
                continue;
            }
            let idx = (y * target.width + x) as usize;
            target.pixels[idx] = shade(p, [w0, w1, w2]);
        }
    }
}

fn bake_vertex_colors(
    scene: &mut Scene,
    objects: &[ObjectId],
    request: &BakeRequest,
    lighting: &Lighting,
) -> BackendResult<BakeOutcome> {
    let mut outcome = BakeOutcome::default();
    for &id in objects {
        let object = scene.object(id)?;
        let mesh_id = scene.object_mesh(id)?;
        let mesh = scene.mesh(mesh_id)?;
        let index = mesh
            .render_color_index
            .filter(|&i| i < mesh.color_attributes.len())
            .ok_or_else(|| BackendError::NoVertexColorTarget {
                object: object.name.clone(),
            })?;

        let slots = object.material_slots.clone().unwrap_or_default();
        let shaders = slot_shaders(scene, &slots)?;
        let fallback = SurfaceShader::fallback();
        let attributes = CornerAttributes::gather(mesh, shaders.iter().flatten());
        let rotation = object.transform.rotation_matrix();
        let offsets = mesh.corner_offsets();

        let mut corners = Vec::with_capacity(mesh.corner_count());
        for (fi, face) in mesh.faces.iter().enumerate() {
            let shader = slot_for(face.material_index, shaders.len())
                .and_then(|slot| shaders[slot].as_ref())
                .unwrap_or(&fallback);
            let normal = rotate(&rotation, mesh.face_normal(fi));
            for k in 0..face.vertices.len() {
                let corner = offsets[fi] + k;
                let weights = [(corner, 1.0)];
                let values = shader.evaluate(
                    scene,
                    &attributes,
                    SamplePoint {
                        uv: mesh.uv.as_ref().map(|uv| uv[corner]),
                        corners: &weights,
                    },
                );
                corners.push(lighting.shade(request.bake_type, &request.contributions, &values, normal));
            }
        }

        let attribute = mesh.color_attributes[index].name.clone();
        scene.mesh_mut(mesh_id)?.write_corner_values(index, &corners);
        outcome.outputs.push(BakeOutput::VertexColor {
            mesh: mesh_id,
            attribute,
        });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DEFAULT_UNWRAP, FORCED_UNWRAP};
    use bakeline_scene::{
        AttributeDomain, Axis, ColorDataType, Face, ImageBuffer, Light, Material, Transform,
    };
    use pretty_assertions::assert_eq;

    fn cube_faces() -> (Vec<[f32; 3]>, Vec<Face>) {
        let p = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        let f = vec![
            Face::new([0, 3, 2, 1]),
            Face::new([4, 5, 6, 7]),
            Face::new([0, 1, 5, 4]),
            Face::new([1, 2, 6, 5]),
            Face::new([2, 3, 7, 6]),
            Face::new([3, 0, 4, 7]),
        ];
        (p, f)
    }

    fn lit_scene() -> Scene {
        let mut scene = Scene::new();
        scene.lights.push(Light {
            name: "Sun".into(),
            direction: [0.0, 0.0, -1.0],
            color: [1.0; 3],
            strength: 1.0,
        });
        scene
    }

    fn add_cube(scene: &mut Scene, name: &str) -> ObjectId {
        let (p, f) = cube_faces();
        let mesh = scene.add_mesh(Mesh::from_polygons(name, p, f));
        scene.add_object(Object::mesh(name, mesh))
    }

    #[test]
    fn test_smart_project_fills_unit_square() {
        let mut scene = lit_scene();
        let a = add_cube(&mut scene, "A");
        let b = add_cube(&mut scene, "B");
        let mut ctx = PipelineContext::new();
        ctx.select_group(&[a, b]);

        let mut backend = ReferenceBackend::new();
        backend.smart_project(&mut scene, &ctx, DEFAULT_UNWRAP).unwrap();

        for id in [a, b] {
            let mesh = scene.mesh(scene.object_mesh(id).unwrap()).unwrap();
            let uv = mesh.uv.as_ref().unwrap();
            assert_eq!(uv.len(), mesh.corner_count());
            assert!(uv
                .iter()
                .all(|p| (0.0..=1.0).contains(&p[0]) && (0.0..=1.0).contains(&p[1])));
        }
        assert_eq!(
            backend.unwrap_calls(),
            vec![(&[a, b][..], DEFAULT_UNWRAP)]
        );
    }

    #[test]
    fn test_smart_project_requires_selection() {
        let mut scene = lit_scene();
        let mut backend = ReferenceBackend::new();
        let err = backend
            .smart_project(&mut scene, &PipelineContext::new(), FORCED_UNWRAP)
            .unwrap_err();
        assert!(matches!(err, BackendError::NothingSelected { .. }));
    }

    #[test]
    fn test_pack_keeps_margin() {
        let (positions, scale) = pack(&[[1.0, 1.0], [1.0, 1.0]], 0.1);
        let dx = positions[1][0] - (positions[0][0] + 1.0);
        let dy = positions[1][1] - (positions[0][1] + 1.0);
        assert!(dx.max(dy) > 0.0);
        for p in &positions {
            assert!(p[0] > 0.0 && p[1] > 0.0);
            assert!((p[0] + 1.0) * scale < 1.0 && (p[1] + 1.0) * scale < 1.0);
        }
    }

    #[test]
    fn test_boolean_requires_operand() {
        let mut scene = lit_scene();
        let a = add_cube(&mut scene, "A");
        let modifier = Modifier::new(
            "Boolean",
            ModifierKind::Boolean {
                operand: Some("Cutter".into()),
            },
        );
        let mut backend = ReferenceBackend::new();
        let err = backend.apply_modifier(&mut scene, a, &modifier).unwrap_err();
        assert!(matches!(err, BackendError::MissingOperand { .. }));

        let cutter = add_cube(&mut scene, "Cutter");
        scene.object_mut(cutter).unwrap().transform = Transform::at([3.0, 0.0, 0.0]);
        backend.apply_modifier(&mut scene, a, &modifier).unwrap();
        let mesh = scene.mesh(scene.object_mesh(a).unwrap()).unwrap();
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.positions[8], [3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mirror_modifier() {
        let mut scene = lit_scene();
        let a = add_cube(&mut scene, "A");
        let modifier = Modifier::new("Mirror", ModifierKind::Mirror { axis: Axis::X });
        ReferenceBackend::new()
            .apply_modifier(&mut scene, a, &modifier)
            .unwrap();
        let mesh = scene.mesh(scene.object_mesh(a).unwrap()).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
    }

    #[test]
    fn test_vertex_bake_fills_render_color() {
        let mut scene = lit_scene();
        let a = add_cube(&mut scene, "A");
        let mesh_id = scene.object_mesh(a).unwrap();
        let mesh = scene.mesh_mut(mesh_id).unwrap();
        let index = mesh.ensure_color_attribute("Bake", ColorDataType::ByteColor, AttributeDomain::Point);
        mesh.render_color_index = Some(index);

        let mut ctx = PipelineContext::new();
        ctx.select_only(a);
        let request = BakeRequest::for_pass(
            PassKind::Combined,
            BakeTarget::VertexColors,
            RenderSettings {
                samples: 8,
                denoise: false,
            },
        );
        let outcome = ReferenceBackend::new().bake(&mut scene, &ctx, &request).unwrap();
        assert_eq!(
            outcome.outputs,
            vec![BakeOutput::VertexColor {
                mesh: mesh_id,
                attribute: "Bake".into()
            }]
        );
        let attr = scene.mesh(mesh_id).unwrap().attribute("Bake").unwrap();
        assert_eq!(attr.len(), 8);
        // Top vertices touch the lit top face.
        assert!(attr.values[6][0] > 0.0);
        assert!(attr.values.iter().all(|c| c[3] == 1.0));
    }

    #[test]
    fn test_combined_bake_needs_light() {
        let mut scene = Scene::new();
        let a = add_cube(&mut scene, "A");
        let mut ctx = PipelineContext::new();
        ctx.select_only(a);
        let request = BakeRequest::for_pass(
            PassKind::Combined,
            BakeTarget::VertexColors,
            RenderSettings {
                samples: 1,
                denoise: false,
            },
        );
        let err = ReferenceBackend::new().bake(&mut scene, &ctx, &request).unwrap_err();
        assert!(matches!(err, BackendError::NoLighting { .. }));
    }

    #[test]
    fn test_image_bake_needs_uvs_and_target() {
        let mut scene = lit_scene();
        let a = add_cube(&mut scene, "A");
        let image = scene.add_image(ImageBuffer::new("A_COLOR_bake.png", 8, 8, true).unwrap());
        let mut material = Material::with_default_surface("M");
        material
            .node_tree
            .get_or_insert_with("A_COLOR_bake.png", || NodeKind::ImageTexture { image: Some(image) });
        let material = scene.add_material(material);
        scene.object_mut(a).unwrap().material_slots = Some(vec![Some(material)]);

        let mut ctx = PipelineContext::new();
        ctx.select_only(a);
        let request = BakeRequest::for_pass(
            PassKind::Color,
            BakeTarget::ImageTextures,
            RenderSettings {
                samples: 1,
                denoise: true,
            },
        );
        let mut backend = ReferenceBackend::new();
        let err = backend.bake(&mut scene, &ctx, &request).unwrap_err();
        assert!(matches!(err, BackendError::MissingUvs { .. }));

        backend.smart_project(&mut scene, &ctx, FORCED_UNWRAP).unwrap();
        let err = backend.bake(&mut scene, &ctx, &request).unwrap_err();
        assert!(matches!(err, BackendError::NoImageTarget { .. }));

        scene
            .material_mut(material)
            .unwrap()
            .node_tree
            .set_active("A_COLOR_bake.png");
        let outcome = backend.bake(&mut scene, &ctx, &request).unwrap();
        assert_eq!(outcome.outputs, vec![BakeOutput::Image { image }]);
        let baked = scene.image(image).unwrap();
        let covered = baked.pixels.iter().filter(|p| p[0] > 0.5).count();
        assert!(covered > 0);
        assert_eq!(backend.bake_calls().len(), 3);
    }
}
