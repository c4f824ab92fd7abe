//! CLI command implementations

pub mod bake;
pub mod colors;
pub mod compress;
pub mod doctor;
pub mod policy;

mod reporting;
