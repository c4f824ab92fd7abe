//! Bakeline CLI library.
//!
//! Command implementations for the `bakeline` binary: running the bake
//! pipeline over a scene document, inspecting naming policy, compressing
//! baked textures and moving baked vertex colors in and out of scenes.

pub mod commands;
pub mod logging;
