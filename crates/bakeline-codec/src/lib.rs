//! Bakeline Attribute Codec
//!
//! Moves a baked color channel in and out of a scene as a compact binary
//! blob, so baked vertex colors can be shipped without the scene document.
//!
//! The blob is the channel's RGB values as tightly packed little-endian
//! `f32` triples in element order, compressed as one LZ4 block with the
//! uncompressed size prepended. Alpha is not stored; import sets it to 1.0.
//!
//! # Crate Structure
//!
//! - [`blob`] - Blob encoding
//! - [`channel`] - Channel export and import
//! - [`error`] - Error types

pub mod blob;
pub mod channel;
pub mod error;

pub use blob::{decode_rgb, encode_rgb};
pub use channel::{default_blob_path, export_channel, import_channel, DEFAULT_BLOB_NAME};
pub use error::{CodecError, CodecResult};
