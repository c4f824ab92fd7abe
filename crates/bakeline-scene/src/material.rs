//! Materials and their shader graphs.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::ids::ImageId;

/// Name of the surface output node created with a default graph.
pub const OUTPUT_NODE: &str = "Material Output";

/// Name of the BSDF node created with a default graph.
pub const PRINCIPLED_NODE: &str = "Principled BSDF";

/// Socket names used when linking nodes.
pub mod socket {
    pub const COLOR: &str = "Color";
    pub const BASE_COLOR: &str = "Base Color";
    pub const ROUGHNESS: &str = "Roughness";
    pub const EMISSION_COLOR: &str = "Emission Color";
    pub const EMISSION: &str = "Emission";
    pub const BSDF: &str = "BSDF";
    pub const SURFACE: &str = "Surface";
}

/// What a shader node computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    PrincipledBsdf {
        base_color: Rgba,
        roughness: f32,
        #[serde(default)]
        emission_color: Rgba,
        #[serde(default)]
        emission_strength: f32,
    },
    Emission {
        color: Rgba,
        strength: f32,
    },
    ImageTexture {
        #[serde(default)]
        image: Option<ImageId>,
    },
    Attribute {
        attribute_name: String,
    },
    Output,
}

impl NodeKind {
    /// A principled BSDF with the editor's default parameters.
    pub fn default_bsdf() -> Self {
        NodeKind::PrincipledBsdf {
            base_color: [0.8, 0.8, 0.8, 1.0],
            roughness: 0.5,
            emission_color: [0.0, 0.0, 0.0, 1.0],
            emission_strength: 0.0,
        }
    }

    pub fn emission() -> Self {
        NodeKind::Emission {
            color: [1.0, 1.0, 1.0, 1.0],
            strength: 1.0,
        }
    }
}

/// A node in a shader graph; names are unique within the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderNode {
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub select: bool,
}

/// A directed edge from an output socket to an input socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from_node: String,
    pub from_socket: String,
    pub to_node: String,
    pub to_socket: String,
}

/// Nodes, links and the active node of a material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShaderGraph {
    #[serde(default)]
    pub nodes: Vec<ShaderNode>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl ShaderGraph {
    /// Principled BSDF feeding the material output.
    pub fn default_surface() -> Self {
        let mut graph = ShaderGraph::default();
        graph.insert(PRINCIPLED_NODE, NodeKind::default_bsdf());
        graph.insert(OUTPUT_NODE, NodeKind::Output);
        graph.connect(PRINCIPLED_NODE, socket::BSDF, OUTPUT_NODE, socket::SURFACE);
        graph
    }

    pub fn node(&self, name: &str) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut ShaderNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    fn insert(&mut self, name: &str, kind: NodeKind) -> &mut ShaderNode {
        self.nodes.push(ShaderNode {
            name: name.to_string(),
            kind,
            select: false,
        });
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    /// Returns the node called `name`, creating it with `make` if absent.
    pub fn get_or_insert_with(
        &mut self,
        name: &str,
        make: impl FnOnce() -> NodeKind,
    ) -> &mut ShaderNode {
        match self.nodes.iter().position(|n| n.name == name) {
            Some(index) => &mut self.nodes[index],
            None => self.insert(name, make()),
        }
    }

    /// Marks `name` as the active node. Returns false if no such node exists.
    pub fn set_active(&mut self, name: &str) -> bool {
        if self.node(name).is_none() {
            return false;
        }
        self.active = Some(name.to_string());
        true
    }

    pub fn active_node(&self) -> Option<&ShaderNode> {
        self.active.as_deref().and_then(|name| self.node(name))
    }

    /// Links an output socket to an input socket, replacing any link already
    /// feeding that input.
    pub fn connect(&mut self, from_node: &str, from_socket: &str, to_node: &str, to_socket: &str) {
        self.links
            .retain(|l| !(l.to_node == to_node && l.to_socket == to_socket));
        self.links.push(Link {
            from_node: from_node.to_string(),
            from_socket: from_socket.to_string(),
            to_node: to_node.to_string(),
            to_socket: to_socket.to_string(),
        });
    }

    /// The link feeding an input socket, if any.
    pub fn input_link(&self, node: &str, socket: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.to_node == node && l.to_socket == socket)
    }

    /// The node linked into an input socket, if any.
    pub fn input_source(&self, node: &str, socket: &str) -> Option<&ShaderNode> {
        self.input_link(node, socket)
            .and_then(|l| self.node(&l.from_node))
    }

    /// The first output node.
    pub fn output_node(&self) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| matches!(n.kind, NodeKind::Output))
    }

    /// The node feeding the output's surface input.
    pub fn surface_node(&self) -> Option<&ShaderNode> {
        let output = self.output_node()?;
        self.input_source(&output.name, socket::SURFACE)
    }

    /// Image texture nodes that reference an image.
    pub fn image_nodes(&self) -> impl Iterator<Item = (&ShaderNode, ImageId)> {
        self.nodes.iter().filter_map(|n| match n.kind {
            NodeKind::ImageTexture { image: Some(id) } => Some((n, id)),
            _ => None,
        })
    }
}

/// A material with an optional node-based shader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub use_nodes: bool,
    #[serde(default)]
    pub node_tree: ShaderGraph,
}

impl Material {
    /// A material without a node tree.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_nodes: false,
            node_tree: ShaderGraph::default(),
        }
    }

    /// A node-based material with the default surface graph.
    pub fn with_default_surface(name: impl Into<String>) -> Self {
        let mut material = Self::new(name);
        material.enable_nodes();
        material
    }

    /// Turns on node shading; an empty graph gets the default surface.
    pub fn enable_nodes(&mut self) {
        self.use_nodes = true;
        if self.node_tree.nodes.is_empty() {
            self.node_tree = ShaderGraph::default_surface();
        }
    }
}
