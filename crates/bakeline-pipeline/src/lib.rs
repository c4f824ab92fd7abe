//! Bakeline Bake Pipeline
//!
//! This crate decides, for every mesh in a scene, what preprocessing and
//! baking happens, in what order and at what resolution, and how the baked
//! results are folded back into materials.
//!
//! # Overview
//!
//! Processing policy comes from group names. A root group named
//! `PROPS_JOIN_UNWRAP_TEX_512` merges its members, unwraps them and bakes
//! combined lighting into a 1024 × multiplier texture:
//!
//! | Token | Effect |
//! |-------|--------|
//! | `JOIN` | Merge the group's direct members into the first one |
//! | `UNWRAP` | Shared UV projection, then a tight solo pass on the first member |
//! | `VERT` | Bake combined lighting into the `Bake` vertex color channel |
//! | `TEX` | Bake into an image saved beside the scene, then consolidate |
//! | `256`/`512`/`1024`/`2048` | Resolution tier one step above the token |
//! | `PROPS`/`ARCH` | Root category; PROPS roots are processed first |
//!
//! # Pipeline
//!
//! For each root group, and then each group below it:
//!
//! 1. **Normalize** every mesh under the group (apply modifiers, freeze scale)
//! 2. **Lay out** the group's direct members (join, unwrap)
//! 3. **Bake** each direct member in the domains the root asks for
//! 4. **Consolidate** texture-baked objects onto an emission material
//!
//! In preview mode, objects under `PROPS` + `VERT` roots finally get an
//! emission shader reading their vertex colors.
//!
//! # Backends
//!
//! Geometry edits, UV projection and baking go through [`SceneBackend`].
//! [`ReferenceBackend`] is a deterministic implementation with flat
//! Lambert shading, used by the CLI and the test suite.
//!
//! # Example
//!
//! ```ignore
//! use bakeline_pipeline::{run, PipelineConfig, ReferenceBackend};
//! use bakeline_scene::Scene;
//! use std::path::Path;
//!
//! let mut scene = Scene::load(Path::new("levels/garage.json"))?;
//! let report = run(&mut scene, &mut ReferenceBackend::new(), PipelineConfig::default())?;
//! println!("{} bakes", report.bakes().count());
//! ```
//!
//! # Crate Structure
//!
//! - [`policy`] - Naming-policy resolver
//! - [`context`] - Explicit selection state
//! - [`normalize`] - Modifier application and scale freezing
//! - [`topology`] - Merge and unwrap
//! - [`materials`] - Bake target materials
//! - [`bake`] - Pass kinds and the bake call
//! - [`passes`] - Vertex and texture bake passes
//! - [`consolidate`] - Post-bake material consolidation
//! - [`image_io`] - PNG output and median filter
//! - [`driver`] - Whole-scene driver
//! - [`backend`] - Backend trait and reference backend
//! - [`config`] - Pipeline configuration
//! - [`report`] - Run report
//! - [`error`] - Error types

pub mod backend;
pub mod bake;
pub mod config;
pub mod consolidate;
pub mod context;
pub mod driver;
pub mod error;
pub mod image_io;
pub mod materials;
pub mod normalize;
pub mod passes;
pub mod policy;
pub mod report;
pub mod topology;

pub use backend::{
    BakeOutcome, BakeOutput, BakeRequest, BakeTarget, ReferenceBackend, RenderSettings,
    SceneBackend, UnwrapParams, DEFAULT_UNWRAP, FORCED_UNWRAP,
};
pub use bake::{BakeType, Contribution, PassKind};
pub use config::{EdgeSplitMode, PipelineConfig};
pub use consolidate::EmissionSource;
pub use context::PipelineContext;
pub use driver::{run, Pipeline};
pub use error::{BackendError, BackendResult, PipelineError, PipelineResult};
pub use policy::{BakeDomain, BakePolicy, Category};
pub use report::{PipelineEvent, PipelineReport};
