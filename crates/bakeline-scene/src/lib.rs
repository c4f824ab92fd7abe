//! Bakeline Scene Model
//!
//! This crate provides the in-memory scene document that the bake pipeline
//! operates on: named groups of mesh objects, shared mesh data, node-based
//! materials and image buffers.
//!
//! # Overview
//!
//! All scene entities live in arenas owned by [`Scene`] and are referenced by
//! typed ids ([`ObjectId`], [`MeshId`], [`MaterialId`], [`ImageId`],
//! [`GroupId`]). Meshes may be shared between objects; [`Scene::make_single_user`]
//! detaches them before destructive edits.
//!
//! Groups form a forest. Groups that are not a child of another group are
//! *root groups*, and their names carry the processing policy.
//!
//! # Documents
//!
//! Scenes are stored as JSON. The document location is remembered on load and
//! is the base directory for every file the pipeline writes:
//!
//! ```ignore
//! use bakeline_scene::Scene;
//! use std::path::Path;
//!
//! let scene = Scene::load(Path::new("levels/garage.json"))?;
//! println!("outputs go to {}", scene.base_dir()?.display());
//! ```
//!
//! # Crate Structure
//!
//! - [`scene`] - Scene arenas, hierarchy traversal, join and copy-on-write
//! - [`object`] - Objects and modifier stacks
//! - [`mesh`] - Geometry and color attributes
//! - [`material`] - Materials and shader graphs
//! - [`image`] - Image buffers
//! - [`transform`] - Object transforms
//! - [`color`] - Color helpers
//! - [`error`] - Error types

pub mod color;
pub mod error;
pub mod ids;
pub mod image;
pub mod material;
pub mod mesh;
pub mod object;
pub mod scene;
pub mod transform;

pub use color::Rgba;
pub use error::{CodedError, SceneError, SceneResult};
pub use ids::{GroupId, ImageId, MaterialId, MeshId, ObjectId};
pub use image::{ColorSpace, ImageBuffer, ImageSource};
pub use material::{Link, Material, NodeKind, ShaderGraph, ShaderNode};
pub use mesh::{AttributeDomain, Axis, ColorAttribute, ColorDataType, Face, Mesh};
pub use object::{Modifier, ModifierKind, Object, ObjectKind};
pub use scene::{Light, Scene, SceneGroup};
pub use transform::Transform;
