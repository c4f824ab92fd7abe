//! Mesh geometry and per-element color channels.
//!
//! A [`Mesh`] is polygon soup with shared vertices: faces are vertex loops, and
//! every loop entry is a *corner*. Color attributes live on one of four element
//! domains and always hold exactly one value per element of that domain.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::color::{average, quantize_byte_color, Rgba, DEFAULT_COLOR};
use crate::error::{SceneError, SceneResult};

/// Element domain a color attribute is stored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeDomain {
    Point,
    Edge,
    Face,
    Corner,
}

impl AttributeDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeDomain::Point => "point",
            AttributeDomain::Edge => "edge",
            AttributeDomain::Face => "face",
            AttributeDomain::Corner => "corner",
        }
    }
}

/// Storage precision of a color attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorDataType {
    /// 8-bit sRGB-encoded channels.
    ByteColor,
    /// 32-bit linear float channels.
    #[default]
    FloatColor,
}

/// Mirror and projection axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A named RGBA channel with one value per element of its domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAttribute {
    pub name: String,
    pub domain: AttributeDomain,
    #[serde(default)]
    pub data_type: ColorDataType,
    pub values: Vec<Rgba>,
}

impl ColorAttribute {
    /// Creates a channel of `len` default-colored elements.
    pub fn new(
        name: impl Into<String>,
        domain: AttributeDomain,
        data_type: ColorDataType,
        len: usize,
    ) -> Self {
        Self {
            name: name.into(),
            domain,
            data_type,
            values: vec![DEFAULT_COLOR; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stores a value, rounding it to the channel's precision.
    pub fn set(&mut self, index: usize, color: Rgba) {
        self.values[index] = self.store(color);
    }

    fn store(&self, color: Rgba) -> Rgba {
        match self.data_type {
            ColorDataType::ByteColor => quantize_byte_color(color),
            ColorDataType::FloatColor => color,
        }
    }
}

/// A polygon: a loop of vertex indices plus its material slot index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub vertices: Vec<u32>,
    #[serde(default)]
    pub material_index: u32,
}

impl Face {
    pub fn new(vertices: impl Into<Vec<u32>>) -> Self {
        Self {
            vertices: vertices.into(),
            material_index: 0,
        }
    }

    pub fn with_material(mut self, material_index: u32) -> Self {
        self.material_index = material_index;
        self
    }
}

/// Mesh geometry shared by one or more objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    #[serde(default)]
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub faces: Vec<Face>,
    /// Per-corner UV coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv: Option<Vec<[f32; 2]>>,
    #[serde(default)]
    pub color_attributes: Vec<ColorAttribute>,
    /// Index into `color_attributes` used when rendering and baking vertex colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_color_index: Option<usize>,
    /// Auto-smooth angle in radians, when auto smoothing is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_smooth_angle: Option<f32>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positions: Vec::new(),
            faces: Vec::new(),
            uv: None,
            color_attributes: Vec::new(),
            render_color_index: None,
            auto_smooth_angle: None,
        }
    }

    /// Creates a mesh from positions and faces.
    pub fn from_polygons(
        name: impl Into<String>,
        positions: Vec<[f32; 3]>,
        faces: Vec<Face>,
    ) -> Self {
        Self {
            positions,
            faces,
            ..Self::new(name)
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn corner_count(&self) -> usize {
        self.faces.iter().map(|f| f.vertices.len()).sum()
    }

    /// Index of each face's first corner.
    pub fn corner_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.faces.len());
        let mut next = 0;
        for face in &self.faces {
            offsets.push(next);
            next += face.vertices.len();
        }
        offsets
    }

    /// Unique undirected edges in first-seen face order.
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for face in &self.faces {
            let n = face.vertices.len();
            for i in 0..n {
                let a = face.vertices[i];
                let b = face.vertices[(i + 1) % n];
                if a == b {
                    continue;
                }
                let key = [a.min(b), a.max(b)];
                if seen.insert(key) {
                    edges.push(key);
                }
            }
        }
        edges
    }

    /// Number of elements on `domain`.
    pub fn element_count(&self, domain: AttributeDomain) -> usize {
        match domain {
            AttributeDomain::Point => self.vertex_count(),
            AttributeDomain::Edge => self.edges().len(),
            AttributeDomain::Face => self.face_count(),
            AttributeDomain::Corner => self.corner_count(),
        }
    }

    /// Newell normal of a face; zero for degenerate faces.
    pub fn face_normal(&self, face: usize) -> [f32; 3] {
        let verts = &self.faces[face].vertices;
        let mut n = [0.0f32; 3];
        for i in 0..verts.len() {
            let a = self.positions[verts[i] as usize];
            let b = self.positions[verts[(i + 1) % verts.len()] as usize];
            n[0] += (a[1] - b[1]) * (a[2] + b[2]);
            n[1] += (a[2] - b[2]) * (a[0] + b[0]);
            n[2] += (a[0] - b[0]) * (a[1] + b[1]);
        }
        normalize(n)
    }

    /// Face normals averaged onto vertices.
    pub fn vertex_normals(&self) -> Vec<[f32; 3]> {
        let mut acc = vec![[0.0f32; 3]; self.positions.len()];
        for (fi, face) in self.faces.iter().enumerate() {
            let n = self.face_normal(fi);
            for &v in &face.vertices {
                let a = &mut acc[v as usize];
                a[0] += n[0];
                a[1] += n[1];
                a[2] += n[2];
            }
        }
        acc.into_iter().map(normalize).collect()
    }

    /// Checks index ranges and per-domain attribute lengths.
    pub fn validate(&self) -> SceneResult<()> {
        let n = self.positions.len() as u32;
        for (fi, face) in self.faces.iter().enumerate() {
            if face.vertices.len() < 3 {
                return Err(SceneError::invalid_mesh(
                    &self.name,
                    format!("face {} has fewer than 3 vertices", fi),
                ));
            }
            if let Some(v) = face.vertices.iter().find(|&&v| v >= n) {
                return Err(SceneError::invalid_mesh(
                    &self.name,
                    format!("face {} references vertex {} (mesh has {})", fi, v, n),
                ));
            }
        }
        if let Some(uv) = &self.uv {
            if uv.len() != self.corner_count() {
                return Err(SceneError::invalid_mesh(
                    &self.name,
                    format!(
                        "uv layer has {} entries, expected {} corners",
                        uv.len(),
                        self.corner_count()
                    ),
                ));
            }
        }
        for attr in &self.color_attributes {
            let expected = self.element_count(attr.domain);
            if attr.values.len() != expected {
                return Err(SceneError::invalid_mesh(
                    &self.name,
                    format!(
                        "attribute '{}' has {} values, expected {} on {} domain",
                        attr.name,
                        attr.values.len(),
                        expected,
                        attr.domain.as_str()
                    ),
                ));
            }
        }
        if let Some(index) = self.render_color_index {
            if index >= self.color_attributes.len() {
                return Err(SceneError::invalid_mesh(
                    &self.name,
                    format!("render color index {} out of range", index),
                ));
            }
        }
        Ok(())
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.color_attributes.iter().position(|a| a.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&ColorAttribute> {
        self.color_attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut ColorAttribute> {
        self.color_attributes.iter_mut().find(|a| a.name == name)
    }

    /// Returns the index of the named attribute, creating it if absent.
    ///
    /// An existing attribute is reused as-is, whatever its domain or type.
    pub fn ensure_color_attribute(
        &mut self,
        name: &str,
        data_type: ColorDataType,
        domain: AttributeDomain,
    ) -> usize {
        if let Some(index) = self.attribute_index(name) {
            return index;
        }
        let len = self.element_count(domain);
        self.color_attributes
            .push(ColorAttribute::new(name, domain, data_type, len));
        self.color_attributes.len() - 1
    }

    /// The attribute used for rendering vertex colors.
    pub fn render_color_attribute(&self) -> Option<&ColorAttribute> {
        self.render_color_index
            .and_then(|i| self.color_attributes.get(i))
    }

    pub fn render_color_attribute_mut(&mut self) -> Option<&mut ColorAttribute> {
        let index = self.render_color_index?;
        self.color_attributes.get_mut(index)
    }

    /// Multiplies every vertex position component-wise.
    pub fn scale(&mut self, scale: [f32; 3]) {
        for p in &mut self.positions {
            p[0] *= scale[0];
            p[1] *= scale[1];
            p[2] *= scale[2];
        }
    }

    /// Values of an attribute resampled onto `domain`.
    ///
    /// Collapsing onto fewer elements averages, spreading copies.
    pub fn attribute_values_in(&self, index: usize, domain: AttributeDomain) -> Vec<Rgba> {
        let attr = &self.color_attributes[index];
        if attr.domain == domain {
            return attr.values.clone();
        }
        let corners = self.to_corner_values(&attr.values, attr.domain);
        self.from_corner_values(&corners, domain)
    }

    /// Converts an attribute to another domain in place.
    pub fn convert_attribute_domain(&mut self, index: usize, domain: AttributeDomain) {
        if self.color_attributes[index].domain == domain {
            return;
        }
        let values = self.attribute_values_in(index, domain);
        let attr = &mut self.color_attributes[index];
        attr.domain = domain;
        attr.values = values.into_iter().map(|c| attr.store(c)).collect();
    }

    /// Overwrites an attribute from per-corner values, resampled onto its domain.
    pub fn write_corner_values(&mut self, index: usize, corners: &[Rgba]) {
        let domain = self.color_attributes[index].domain;
        let values = self.from_corner_values(corners, domain);
        let attr = &mut self.color_attributes[index];
        attr.values = values.into_iter().map(|c| attr.store(c)).collect();
    }

    fn to_corner_values(&self, values: &[Rgba], domain: AttributeDomain) -> Vec<Rgba> {
        match domain {
            AttributeDomain::Corner => values.to_vec(),
            AttributeDomain::Point => self
                .faces
                .iter()
                .flat_map(|f| f.vertices.iter().map(|&v| values[v as usize]))
                .collect(),
            AttributeDomain::Face => self
                .faces
                .iter()
                .zip(values)
                .flat_map(|(f, &c)| std::iter::repeat(c).take(f.vertices.len()))
                .collect(),
            AttributeDomain::Edge => {
                let mut incident: Vec<Vec<Rgba>> = vec![Vec::new(); self.positions.len()];
                for (edge, &c) in self.edges().iter().zip(values) {
                    incident[edge[0] as usize].push(c);
                    incident[edge[1] as usize].push(c);
                }
                let points: Vec<Rgba> = incident.into_iter().map(average).collect();
                self.to_corner_values(&points, AttributeDomain::Point)
            }
        }
    }

    fn from_corner_values(&self, corners: &[Rgba], domain: AttributeDomain) -> Vec<Rgba> {
        match domain {
            AttributeDomain::Corner => corners.to_vec(),
            AttributeDomain::Point => {
                let mut per_vertex: Vec<Vec<Rgba>> = vec![Vec::new(); self.positions.len()];
                let mut corner = 0;
                for face in &self.faces {
                    for &v in &face.vertices {
                        per_vertex[v as usize].push(corners[corner]);
                        corner += 1;
                    }
                }
                per_vertex.into_iter().map(average).collect()
            }
            AttributeDomain::Face => {
                let mut out = Vec::with_capacity(self.faces.len());
                let mut corner = 0;
                for face in &self.faces {
                    let n = face.vertices.len();
                    out.push(average(corners[corner..corner + n].iter().copied()));
                    corner += n;
                }
                out
            }
            AttributeDomain::Edge => {
                let points = self.from_corner_values(corners, AttributeDomain::Point);
                self.edges()
                    .iter()
                    .map(|e| average([points[e[0] as usize], points[e[1] as usize]]))
                    .collect()
            }
        }
    }

    /// Appends `other` into this mesh.
    ///
    /// Positions pass through `map_position`, face material indices through
    /// `material_remap` (indices past its end map to 0). Attributes are matched
    /// by name; elements without a source value get the default color. With
    /// `reverse_winding` every appended face loop is reversed, corner data included.
    pub fn append(
        &mut self,
        other: &Mesh,
        map_position: impl Fn([f32; 3]) -> [f32; 3],
        material_remap: &[u32],
        reverse_winding: bool,
    ) {
        let vertex_offset = self.positions.len() as u32;
        let own_edges = self.element_count(AttributeDomain::Edge);
        let own_counts = [
            self.vertex_count(),
            own_edges,
            self.face_count(),
            self.corner_count(),
        ];

        // Source corner order for the appended faces.
        let other_offsets = other.corner_offsets();
        let mut corner_order = Vec::with_capacity(other.corner_count());
        for (fi, face) in other.faces.iter().enumerate() {
            let start = other_offsets[fi];
            let n = face.vertices.len();
            if reverse_winding {
                corner_order.extend((0..n).rev().map(|i| start + i));
            } else {
                corner_order.extend(start..start + n);
            }
        }

        // Attributes only present on `other` are created first so that the
        // merge loop below treats every name uniformly.
        for attr in &other.color_attributes {
            if self.attribute_index(&attr.name).is_none() {
                let len = match attr.domain {
                    AttributeDomain::Point => own_counts[0],
                    AttributeDomain::Edge => own_counts[1],
                    AttributeDomain::Face => own_counts[2],
                    AttributeDomain::Corner => own_counts[3],
                };
                self.color_attributes.push(ColorAttribute::new(
                    attr.name.clone(),
                    attr.domain,
                    attr.data_type,
                    len,
                ));
            }
        }

        let mut appended_values = Vec::with_capacity(self.color_attributes.len());
        for attr in &self.color_attributes {
            let source = other.attribute_index(&attr.name);
            let values: Vec<Rgba> = match (source, attr.domain) {
                (Some(si), AttributeDomain::Corner) => {
                    let v = other.attribute_values_in(si, AttributeDomain::Corner);
                    corner_order.iter().map(|&c| v[c]).collect()
                }
                (Some(si), domain) => other.attribute_values_in(si, domain),
                (None, domain) => vec![DEFAULT_COLOR; other.element_count(domain)],
            };
            appended_values.push(values);
        }

        self.positions
            .extend(other.positions.iter().map(|&p| map_position(p)));
        for face in &other.faces {
            let mut vertices: Vec<u32> = face.vertices.iter().map(|v| v + vertex_offset).collect();
            if reverse_winding {
                vertices.reverse();
            }
            let material_index = material_remap
                .get(face.material_index as usize)
                .copied()
                .unwrap_or(0);
            self.faces.push(Face {
                vertices,
                material_index,
            });
        }

        if self.uv.is_some() || other.uv.is_some() {
            let mut uv = self
                .uv
                .take()
                .unwrap_or_else(|| vec![[0.0, 0.0]; own_counts[3]]);
            match &other.uv {
                Some(other_uv) => uv.extend(corner_order.iter().map(|&c| other_uv[c])),
                None => uv.extend(std::iter::repeat([0.0, 0.0]).take(corner_order.len())),
            }
            self.uv = Some(uv);
        }

        for (attr, values) in self.color_attributes.iter_mut().zip(appended_values) {
            let stored: Vec<Rgba> = values.into_iter().map(|c| attr.store(c)).collect();
            attr.values.extend(stored);
        }
        // Appended vertices are disjoint, so existing edges keep their order and
        // only edge-domain lengths need reconciling.
        self.resync_edge_attributes();
    }

    /// Mirrors the mesh across the plane orthogonal to `axis`, keeping the original half.
    pub fn mirror(&mut self, axis: Axis) {
        let copy = self.clone();
        let remap: Vec<u32> = (0..=self.max_material_index()).collect();
        let i = axis.index();
        self.append(
            &copy,
            |mut p| {
                p[i] = -p[i];
                p
            },
            &remap,
            true,
        );
    }

    fn max_material_index(&self) -> u32 {
        self.faces.iter().map(|f| f.material_index).max().unwrap_or(0)
    }

    /// Splits vertices along edges whose adjacent faces meet at more than `angle` radians.
    ///
    /// Faces around each vertex are clustered by normal; every cluster after the
    /// first gets its own copy of the vertex (position and point attributes).
    pub fn split_sharp_edges(&mut self, angle: f32) {
        let normals: Vec<[f32; 3]> = (0..self.faces.len()).map(|f| self.face_normal(f)).collect();
        let mut vertex_corners: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.positions.len()];
        for (fi, face) in self.faces.iter().enumerate() {
            for (ci, &v) in face.vertices.iter().enumerate() {
                vertex_corners[v as usize].push((fi, ci));
            }
        }

        let cos_limit = angle.cos();
        for (v, corners) in vertex_corners.into_iter().enumerate() {
            let mut clusters: Vec<([f32; 3], u32)> = Vec::new();
            for (fi, ci) in corners {
                let n = normals[fi];
                let target = match clusters.iter().find(|(rep, _)| dot(*rep, n) >= cos_limit) {
                    Some(&(_, vertex)) => vertex,
                    None => {
                        let vertex = if clusters.is_empty() {
                            v as u32
                        } else {
                            self.duplicate_vertex(v)
                        };
                        clusters.push((n, vertex));
                        vertex
                    }
                };
                self.faces[fi].vertices[ci] = target;
            }
        }
        self.resync_edge_attributes();
    }

    fn duplicate_vertex(&mut self, v: usize) -> u32 {
        self.positions.push(self.positions[v]);
        for attr in &mut self.color_attributes {
            if attr.domain == AttributeDomain::Point {
                let c = attr.values[v];
                attr.values.push(c);
            }
        }
        (self.positions.len() - 1) as u32
    }

    /// Pads or truncates edge-domain attributes after a topology change.
    fn resync_edge_attributes(&mut self) {
        if !self
            .color_attributes
            .iter()
            .any(|a| a.domain == AttributeDomain::Edge)
        {
            return;
        }
        let edges = self.element_count(AttributeDomain::Edge);
        for attr in &mut self.color_attributes {
            if attr.domain == AttributeDomain::Edge {
                attr.values.resize(edges, DEFAULT_COLOR);
            }
        }
    }
}

pub(crate) fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= f32::EPSILON {
        [0.0; 3]
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

#[inline]
pub(crate) fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use super::*;
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

    /// Two quads folded 90 degrees along the shared edge (1, 2).
    fn folded() -> Mesh {
        Mesh::from_polygons(
            "Folded",
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
            ],
            vec![Face::new([0, 1, 2, 3]), Face::new([1, 4, 5, 2])],
        )
    }

    #[test]
    fn test_element_counts() {
        let mesh = folded();
        assert_eq!(mesh.element_count(AttributeDomain::Point), 6);
        assert_eq!(mesh.element_count(AttributeDomain::Face), 2);
        assert_eq!(mesh.element_count(AttributeDomain::Corner), 8);
        assert_eq!(mesh.element_count(AttributeDomain::Edge), 7);
    }

    #[test]
    fn test_face_normal() {
        assert_eq!(quad().face_normal(0), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut mesh = quad();
        mesh.faces.push(Face::new([0, 1, 9]));
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_attribute() {
        let mut mesh = quad();
        mesh.color_attributes.push(ColorAttribute::new(
            "Col",
            AttributeDomain::Corner,
            ColorDataType::FloatColor,
            3,
        ));
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_ensure_color_attribute_is_get_or_create() {
        let mut mesh = quad();
        let a = mesh.ensure_color_attribute("Bake", ColorDataType::ByteColor, AttributeDomain::Point);
        let b = mesh.ensure_color_attribute("Bake", ColorDataType::FloatColor, AttributeDomain::Corner);
        assert_eq!(a, b);
        assert_eq!(mesh.color_attributes.len(), 1);
        assert_eq!(mesh.color_attributes[0].domain, AttributeDomain::Point);
        assert_eq!(mesh.color_attributes[0].len(), 4);
    }

    #[test]
    fn test_point_to_corner_and_back() {
        let mut mesh = folded();
        let idx = mesh.ensure_color_attribute("Col", ColorDataType::FloatColor, AttributeDomain::Point);
        for v in 0..6 {
            mesh.color_attributes[idx].set(v, [v as f32, 0.0, 0.0, 1.0]);
        }
        mesh.convert_attribute_domain(idx, AttributeDomain::Corner);
        let attr = &mesh.color_attributes[idx];
        assert_eq!(attr.values.len(), 8);
        assert_eq!(attr.values[4][0], 1.0);
        assert_eq!(attr.values[7][0], 2.0);

        mesh.convert_attribute_domain(idx, AttributeDomain::Point);
        assert_eq!(mesh.color_attributes[idx].values[5][0], 5.0);
    }

    #[test]
    fn test_face_domain_averages_corners() {
        let mut mesh = quad();
        let idx = mesh.ensure_color_attribute("Col", ColorDataType::FloatColor, AttributeDomain::Corner);
        mesh.color_attributes[idx].values = vec![
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        assert_eq!(
            mesh.attribute_values_in(idx, AttributeDomain::Face),
            vec![[0.5, 0.0, 0.0, 1.0]]
        );
    }

    #[test]
    fn test_append_offsets_and_attributes() {
        let mut a = quad();
        a.uv = Some(vec![[0.0, 0.0]; 4]);
        let mut b = quad();
        let idx = b.ensure_color_attribute("Col", ColorDataType::FloatColor, AttributeDomain::Point);
        b.color_attributes[idx].values = vec![[1.0, 1.0, 1.0, 1.0]; 4];

        a.append(&b, |p| [p[0] + 5.0, p[1], p[2]], &[2], false);

        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.faces[1].vertices, vec![4, 5, 6, 7]);
        assert_eq!(a.faces[1].material_index, 2);
        assert_eq!(a.positions[4], [5.0, 0.0, 0.0]);
        assert_eq!(a.uv.as_ref().unwrap().len(), 8);
        let col = a.attribute("Col").unwrap();
        assert_eq!(col.values.len(), 8);
        assert_eq!(col.values[0], DEFAULT_COLOR);
        assert_eq!(col.values[7], [1.0, 1.0, 1.0, 1.0]);
        a.validate().unwrap();
    }

    #[test]
    fn test_mirror_flips_winding() {
        let mut mesh = quad();
        mesh.mirror(Axis::X);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.positions[5], [-1.0, 0.0, 0.0]);
        // Mirrored geometry keeps facing +Z once the winding is reversed.
        assert_eq!(mesh.face_normal(1), [0.0, 0.0, 1.0]);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_split_sharp_edges() {
        let mut mesh = folded();
        let idx = mesh.ensure_color_attribute("Col", ColorDataType::FloatColor, AttributeDomain::Point);
        mesh.color_attributes[idx].set(1, [0.5, 0.5, 0.5, 1.0]);

        mesh.split_sharp_edges(30f32.to_radians());

        // Vertices 1 and 2 sit on the 90 degree fold and are duplicated.
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.color_attributes[idx].values.len(), 8);
        assert_eq!(mesh.color_attributes[idx].values[6], [0.5, 0.5, 0.5, 1.0]);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_split_keeps_smooth_edges() {
        let mut mesh = folded();
        mesh.split_sharp_edges(120f32.to_radians());
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn test_byte_color_quantizes() {
        let mut attr = ColorAttribute::new("Bake", AttributeDomain::Point, ColorDataType::ByteColor, 1);
        attr.set(0, [0.123_456, 0.5, 0.9, 1.0]);
        assert_ne!(attr.values[0][0], 0.123_456);
        assert!((attr.values[0][0] - 0.123_456).abs() < 0.01);
    }
}
