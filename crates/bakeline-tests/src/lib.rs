//! Bakeline End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the bake pipeline and its
//! collaborators:
//!
//! - Pipeline: scene document -> baked vertex colors, images and materials
//! - Attribute codec: color channel -> compressed blob -> color channel
//! - Texture compression: PNG directory -> encoder invocations
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bakeline-tests
//! ```

pub mod fixtures;
