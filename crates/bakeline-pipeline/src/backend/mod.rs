//! The seam between the policy engine and whatever performs geometry edits,
//! UV projection and baking.
//!
//! Every call is synchronous and blocking. A backend sees the scene and the
//! explicit [`PipelineContext`]; it never keeps its own notion of selection.
//!
//! [`BakeRequest`] and [`BakeOutcome`] are plain data, so an asynchronous
//! backend can hand the request to a worker and report the outcome on
//! completion without changing callers.

mod reference;
mod shading;

pub use reference::{BackendCall, ReferenceBackend};
pub use shading::{Lighting, SurfaceShader, MISSING_TEXTURE_COLOR};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use bakeline_scene::{ImageId, MeshId, Modifier, ObjectId, Scene};

use crate::bake::{BakeType, Contribution, PassKind};
use crate::context::PipelineContext;
use crate::error::BackendResult;

/// Parameters for an automatic UV projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnwrapParams {
    pub angle_limit_deg: f32,
    /// Gap between islands as a fraction of UV space.
    pub island_margin: f32,
}

/// Default projection parameters of a backend. The pipeline does not use
/// them; UNWRAP groups always project with [`FORCED_UNWRAP`].
pub const DEFAULT_UNWRAP: UnwrapParams = UnwrapParams {
    angle_limit_deg: 66.0,
    island_margin: 0.04,
};

/// Tight projection used for UNWRAP groups, both the shared pass and the
/// solo re-projection.
pub const FORCED_UNWRAP: UnwrapParams = UnwrapParams {
    angle_limit_deg: 66.0,
    island_margin: 0.005,
};

/// Where bake results go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BakeTarget {
    /// The active image texture node of each material.
    ImageTextures,
    /// The mesh's render color attribute.
    VertexColors,
}

/// Render quality for one bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub samples: u32,
    pub denoise: bool,
}

/// One bake invocation over the selected objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeRequest {
    pub pass: PassKind,
    pub bake_type: BakeType,
    pub contributions: BTreeSet<Contribution>,
    pub target: BakeTarget,
    pub settings: RenderSettings,
}

/// Data written by a bake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BakeOutput {
    Image { image: ImageId },
    VertexColor { mesh: MeshId, attribute: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BakeOutcome {
    pub outputs: Vec<BakeOutput>,
}

/// Geometry, projection and bake operations.
pub trait SceneBackend {
    /// Applies one modifier to `object`'s mesh data.
    ///
    /// The caller has already given the object exclusive mesh data and removes
    /// the modifier from the stack on success.
    fn apply_modifier(
        &mut self,
        scene: &mut Scene,
        object: ObjectId,
        modifier: &Modifier,
    ) -> BackendResult<()>;

    /// Projects UVs for all selected mesh objects as one parameterization space.
    fn smart_project(
        &mut self,
        scene: &mut Scene,
        ctx: &PipelineContext,
        params: UnwrapParams,
    ) -> BackendResult<()>;

    /// Bakes the selected objects.
    fn bake(
        &mut self,
        scene: &mut Scene,
        ctx: &PipelineContext,
        request: &BakeRequest,
    ) -> BackendResult<BakeOutcome>;
}
