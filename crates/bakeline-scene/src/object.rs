//! Scene objects and their modifier stacks.

use serde::{Deserialize, Serialize};

use crate::ids::{MaterialId, MeshId};
use crate::mesh::Axis;
use crate::transform::Transform;

/// Object type. Only meshes take part in baking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    #[default]
    Mesh,
    Empty,
    Curve,
    Light,
}

/// A pending, non-destructive geometry operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModifierKind {
    Mirror {
        axis: Axis,
    },
    /// Splits edges sharper than `split_angle` radians.
    EdgeSplit {
        split_angle: f32,
    },
    /// Union with the named operand object.
    Boolean {
        #[serde(default)]
        operand: Option<String>,
    },
}

impl ModifierKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ModifierKind::Mirror { .. } => "MIRROR",
            ModifierKind::EdgeSplit { .. } => "EDGE_SPLIT",
            ModifierKind::Boolean { .. } => "BOOLEAN",
        }
    }
}

fn yes() -> bool {
    true
}

/// A named entry in an object's modifier stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    #[serde(flatten)]
    pub kind: ModifierKind,
    #[serde(default = "yes")]
    pub show_in_editmode: bool,
    #[serde(default = "yes")]
    pub show_render: bool,
}

impl Modifier {
    pub fn new(name: impl Into<String>, kind: ModifierKind) -> Self {
        Self {
            name: name.into(),
            kind,
            show_in_editmode: true,
            show_render: true,
        }
    }

    /// Only modifiers enabled for both editing and rendering get applied.
    pub fn is_applicable(&self) -> bool {
        self.show_in_editmode && self.show_render
    }
}

/// A placed scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    #[serde(default)]
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshId>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// `None` models a slot collection that does not exist yet; `Some(None)`
    /// entries are empty slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_slots: Option<Vec<Option<MaterialId>>>,
    #[serde(default = "yes")]
    pub visible: bool,
}

impl Object {
    /// A visible mesh object with an identity transform.
    pub fn mesh(name: impl Into<String>, mesh: MeshId) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Mesh,
            mesh: Some(mesh),
            transform: Transform::default(),
            modifiers: Vec::new(),
            material_slots: None,
            visible: true,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_materials(mut self, slots: Vec<Option<MaterialId>>) -> Self {
        self.material_slots = Some(slots);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Visible mesh objects with geometry are the only pass participants.
    pub fn is_renderable_mesh(&self) -> bool {
        self.kind == ObjectKind::Mesh && self.mesh.is_some() && self.visible
    }

    /// Non-empty material slots in slot order.
    pub fn materials(&self) -> impl Iterator<Item = MaterialId> + '_ {
        self.material_slots
            .iter()
            .flatten()
            .filter_map(|slot| *slot)
    }

    pub fn first_material(&self) -> Option<MaterialId> {
        self.material_slots
            .as_ref()
            .and_then(|slots| slots.first().copied().flatten())
    }
}
