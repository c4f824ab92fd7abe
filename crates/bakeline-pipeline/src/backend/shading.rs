//! Flat shading model used by the reference backend.

use std::collections::{BTreeSet, HashMap};

use bakeline_scene::material::socket;
use bakeline_scene::mesh::AttributeDomain;
use bakeline_scene::{ImageId, Material, Mesh, NodeKind, Rgba, Scene, ShaderGraph};

use crate::bake::{BakeType, Contribution};

/// What an image texture node yields when its image has no pixel data.
pub const MISSING_TEXTURE_COLOR: Rgba = [1.0, 0.0, 1.0, 1.0];

const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];

/// Where a shader input's value comes from.
#[derive(Debug, Clone, PartialEq)]
enum ColorInput {
    Constant(Rgba),
    Attribute(String),
    Image(ImageId),
}

/// A material's surface reduced to the inputs the bake passes read.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceShader {
    base_color: ColorInput,
    roughness: ColorInput,
    emission: ColorInput,
    emission_strength: f32,
}

/// Shader inputs evaluated at one surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceValues {
    pub base_color: Rgba,
    pub roughness: f32,
    pub emission: Rgba,
}

/// A surface point: UV plus corner interpolation weights.
#[derive(Debug, Clone, Copy)]
pub struct SamplePoint<'a> {
    pub uv: Option<[f32; 2]>,
    pub corners: &'a [(usize, f32)],
}

impl SurfaceShader {
    /// Shader used for empty slots and materials without nodes.
    pub fn fallback() -> Self {
        Self {
            base_color: ColorInput::Constant([0.8, 0.8, 0.8, 1.0]),
            roughness: ColorInput::Constant([0.5, 0.5, 0.5, 1.0]),
            emission: ColorInput::Constant(BLACK),
            emission_strength: 0.0,
        }
    }

    fn black() -> Self {
        Self {
            base_color: ColorInput::Constant(BLACK),
            roughness: ColorInput::Constant([1.0, 1.0, 1.0, 1.0]),
            emission: ColorInput::Constant(BLACK),
            emission_strength: 0.0,
        }
    }

    /// Follows the output node's surface link back to a BSDF or emission node.
    pub fn compile(material: Option<&Material>) -> Self {
        let Some(material) = material.filter(|m| m.use_nodes) else {
            return Self::fallback();
        };
        let graph = &material.node_tree;
        let Some(node) = graph.surface_node() else {
            return Self::black();
        };
        match &node.kind {
            NodeKind::PrincipledBsdf {
                base_color,
                roughness,
                emission_color,
                emission_strength,
            } => Self {
                base_color: input(graph, &node.name, socket::BASE_COLOR, *base_color),
                roughness: input(
                    graph,
                    &node.name,
                    socket::ROUGHNESS,
                    [*roughness, *roughness, *roughness, 1.0],
                ),
                emission: input(graph, &node.name, socket::EMISSION_COLOR, *emission_color),
                emission_strength: *emission_strength,
            },
            NodeKind::Emission { color, strength } => Self {
                emission: input(graph, &node.name, socket::COLOR, *color),
                emission_strength: *strength,
                ..Self::black()
            },
            _ => Self::black(),
        }
    }

    fn attribute_names(&self) -> impl Iterator<Item = &str> {
        [&self.base_color, &self.roughness, &self.emission]
            .into_iter()
            .filter_map(|input| match input {
                ColorInput::Attribute(name) => Some(name.as_str()),
                _ => None,
            })
    }

    pub fn evaluate(
        &self,
        scene: &Scene,
        attributes: &CornerAttributes,
        point: SamplePoint<'_>,
    ) -> SurfaceValues {
        let sample = |input: &ColorInput| match input {
            ColorInput::Constant(c) => *c,
            ColorInput::Attribute(name) => attributes.interpolate(name, point.corners),
            ColorInput::Image(id) => scene
                .image(*id)
                .ok()
                .and_then(|img| img.sample(point.uv.unwrap_or([0.0, 0.0])))
                .unwrap_or(MISSING_TEXTURE_COLOR),
        };
        let rough = sample(&self.roughness);
        let e = sample(&self.emission);
        let s = self.emission_strength;
        SurfaceValues {
            base_color: sample(&self.base_color),
            roughness: (rough[0] + rough[1] + rough[2]) / 3.0,
            emission: [e[0] * s, e[1] * s, e[2] * s, 1.0],
        }
    }
}

fn input(graph: &ShaderGraph, node: &str, socket: &str, fallback: Rgba) -> ColorInput {
    match graph.input_source(node, socket).map(|n| &n.kind) {
        Some(NodeKind::ImageTexture { image: Some(id) }) => ColorInput::Image(*id),
        Some(NodeKind::ImageTexture { image: None }) => ColorInput::Constant(MISSING_TEXTURE_COLOR),
        Some(NodeKind::Attribute { attribute_name }) => ColorInput::Attribute(attribute_name.clone()),
        _ => ColorInput::Constant(fallback),
    }
}

/// Corner-domain values of the attributes a set of shaders reads.
#[derive(Debug, Default)]
pub struct CornerAttributes {
    values: HashMap<String, Vec<Rgba>>,
}

impl CornerAttributes {
    pub fn gather<'a>(mesh: &Mesh, shaders: impl IntoIterator<Item = &'a SurfaceShader>) -> Self {
        let mut values = HashMap::new();
        for shader in shaders {
            for name in shader.attribute_names() {
                if values.contains_key(name) {
                    continue;
                }
                if let Some(index) = mesh.attribute_index(name) {
                    values.insert(
                        name.to_string(),
                        mesh.attribute_values_in(index, AttributeDomain::Corner),
                    );
                }
            }
        }
        Self { values }
    }

    /// Missing attributes read as black.
    fn interpolate(&self, name: &str, corners: &[(usize, f32)]) -> Rgba {
        let Some(values) = self.values.get(name) else {
            return BLACK;
        };
        let mut out = [0.0f32; 4];
        for &(corner, weight) in corners {
            let c = values.get(corner).copied().unwrap_or(BLACK);
            for (o, v) in out.iter_mut().zip(c) {
                *o += v * weight;
            }
        }
        out
    }
}

/// Directional lights and world ambient.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    ambient: [f32; 3],
    /// Unit direction towards each light, and its radiance.
    lights: Vec<([f32; 3], [f32; 3])>,
}

impl Lighting {
    pub fn from_scene(scene: &Scene) -> Self {
        let lights = scene
            .lights
            .iter()
            .filter_map(|light| {
                let d = light.direction;
                let len = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
                if len <= f32::EPSILON {
                    return None;
                }
                let toward = [-d[0] / len, -d[1] / len, -d[2] / len];
                let radiance = light.color.map(|c| c * light.strength);
                Some((toward, radiance))
            })
            .collect();
        Self {
            ambient: scene.world_color,
            lights,
        }
    }

    /// True when nothing illuminates the scene.
    pub fn is_dark(&self) -> bool {
        self.lights.is_empty() && self.ambient.iter().all(|&c| c <= 0.0)
    }

    fn irradiance(&self, normal: [f32; 3], direct: bool, indirect: bool) -> [f32; 3] {
        let mut out = if indirect { self.ambient } else { [0.0; 3] };
        if direct {
            for (toward, radiance) in &self.lights {
                let lambert =
                    (normal[0] * toward[0] + normal[1] * toward[1] + normal[2] * toward[2]).max(0.0);
                for i in 0..3 {
                    out[i] += radiance[i] * lambert;
                }
            }
        }
        out
    }

    /// Result of one bake type at a surface point with world normal `normal`.
    pub fn shade(
        &self,
        bake_type: BakeType,
        contributions: &BTreeSet<Contribution>,
        values: &SurfaceValues,
        normal: [f32; 3],
    ) -> Rgba {
        let has = |c: Contribution| contributions.contains(&c);
        let base = values.base_color;
        match bake_type {
            BakeType::Roughness => [values.roughness, values.roughness, values.roughness, 1.0],
            BakeType::Normal => [0.5, 0.5, 1.0, 1.0],
            BakeType::Emit => values.emission,
            BakeType::Diffuse => {
                let lit = has(Contribution::Direct) || has(Contribution::Indirect);
                let light = if lit {
                    self.irradiance(normal, has(Contribution::Direct), has(Contribution::Indirect))
                } else {
                    [1.0; 3]
                };
                let albedo = if has(Contribution::Color) {
                    [base[0], base[1], base[2]]
                } else {
                    [1.0; 3]
                };
                [albedo[0] * light[0], albedo[1] * light[1], albedo[2] * light[2], 1.0]
            }
            BakeType::Combined => {
                let light =
                    self.irradiance(normal, has(Contribution::Direct), has(Contribution::Indirect));
                let mut out = [0.0, 0.0, 0.0, 1.0];
                if has(Contribution::Diffuse) {
                    for i in 0..3 {
                        out[i] += base[i] * light[i];
                    }
                }
                if has(Contribution::Emit) {
                    for i in 0..3 {
                        out[i] += values.emission[i];
                    }
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::PassKind;
    use bakeline_scene::material::OUTPUT_NODE;
    use bakeline_scene::{ImageBuffer, Light};

    fn lit_scene() -> Scene {
        let mut scene = Scene::new();
        scene.lights.push(Light {
            name: "Sun".into(),
            direction: [0.0, 0.0, -1.0],
            color: [1.0; 3],
            strength: 1.0,
        });
        scene.world_color = [0.1, 0.1, 0.1];
        scene
    }

    fn values(shader: &SurfaceShader, scene: &Scene) -> SurfaceValues {
        shader.evaluate(
            scene,
            &CornerAttributes::default(),
            SamplePoint {
                uv: Some([0.5, 0.5]),
                corners: &[],
            },
        )
    }

    #[test]
    fn test_combined_is_lambert_plus_ambient_plus_emission() {
        let scene = lit_scene();
        let lighting = Lighting::from_scene(&scene);
        let shader = SurfaceShader::compile(Some(&Material::with_default_surface("M")));
        let v = values(&shader, &scene);
        let (bake_type, filter) = PassKind::Combined.pass_filter();

        let up = lighting.shade(bake_type, &filter, &v, [0.0, 0.0, 1.0]);
        assert!((up[0] - 0.8 * 1.1).abs() < 1e-5);

        let side = lighting.shade(bake_type, &filter, &v, [1.0, 0.0, 0.0]);
        assert!((side[0] - 0.8 * 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_color_pass_is_unlit_albedo() {
        let scene = Scene::new();
        let lighting = Lighting::from_scene(&scene);
        assert!(lighting.is_dark());
        let shader = SurfaceShader::compile(None);
        let v = values(&shader, &scene);
        let (bake_type, filter) = PassKind::Color.pass_filter();
        assert_eq!(
            lighting.shade(bake_type, &filter, &v, [0.0, 0.0, 1.0]),
            [0.8, 0.8, 0.8, 1.0]
        );
    }

    #[test]
    fn test_emission_shader_reads_linked_image() {
        let mut scene = Scene::new();
        let mut img = ImageBuffer::new("baked.png", 1, 1, true).unwrap();
        img.set(0, 0, [0.2, 0.4, 0.6, 1.0]);
        let img = scene.add_image(img);

        let mut material = Material::with_default_surface("M");
        let graph = &mut material.node_tree;
        graph.get_or_insert_with("baked.png", || NodeKind::ImageTexture { image: Some(img) });
        graph.get_or_insert_with("Glow", NodeKind::emission);
        graph.connect("baked.png", socket::COLOR, "Glow", socket::COLOR);
        graph.connect("Glow", socket::EMISSION, OUTPUT_NODE, socket::SURFACE);

        let shader = SurfaceShader::compile(Some(&material));
        assert_eq!(values(&shader, &scene).emission, [0.2, 0.4, 0.6, 1.0]);
        assert_eq!(values(&shader, &scene).base_color, BLACK);
    }

    #[test]
    fn test_unloaded_image_samples_magenta() {
        let mut scene = Scene::new();
        let mut img = ImageBuffer::new("disk.png", 4, 4, false).unwrap();
        img.pixels.clear();
        let img = scene.add_image(img);

        let mut material = Material::with_default_surface("M");
        let graph = &mut material.node_tree;
        graph.get_or_insert_with("Tex", || NodeKind::ImageTexture { image: Some(img) });
        graph.connect(
            "Tex",
            socket::COLOR,
            bakeline_scene::material::PRINCIPLED_NODE,
            socket::BASE_COLOR,
        );
        let shader = SurfaceShader::compile(Some(&material));
        assert_eq!(values(&shader, &scene).base_color, MISSING_TEXTURE_COLOR);
    }
}
