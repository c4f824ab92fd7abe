//! Bakeline Texture Compressor
//!
//! Converts a directory of baked PNG textures to block-compressed KTX2 and
//! writes glTF copies that reference the compressed files.
//!
//! # Overview
//!
//! A run has two steps: [`plan`] scans one directory (not recursively) and
//! [`execute`] carries the plan out.
//!
//! | File | Action |
//! |------|--------|
//! | `*.gltf` (stem without `_ktx2`) | Write `{stem}_ktx2.gltf` with `.png` replaced by `.ktx2` |
//! | `*.png` | Encode to `{stem}.ktx2`; BC5 when the stem mentions `normal`, else BC7 |
//! | `jpg`, `tga`, `exr`, ... | Reported as unsupported |
//!
//! # Encoder Requirements
//!
//! Images are encoded with [kram](https://github.com/alecazam/kram). The
//! encoder is searched for in:
//!
//! 1. The configured path
//! 2. `BAKELINE_ENCODER` environment variable
//! 3. System PATH
//!
//! # Crate Structure
//!
//! - [`plan`] - Directory scan
//! - [`execute`] - Plan execution and run report
//! - [`encoder`] - Encoder subprocess management
//! - [`error`] - Error types

pub mod encoder;
pub mod error;
pub mod execute;
pub mod plan;

pub use encoder::{EncodeFailure, EncoderConfig, ENCODER_ENV};
pub use error::{CompressError, CompressResult};
pub use execute::{execute, CompressReport, FailedEncode};
pub use plan::{plan, BlockFormat, CompressPlan, Job};
