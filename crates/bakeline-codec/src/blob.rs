//! Packed RGB blob format.
//!
//! Little-endian `f32` triples, one per element, compressed as a single
//! size-prepended LZ4 block.

use byteorder::{ByteOrder, LittleEndian};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use bakeline_scene::Rgba;

use crate::error::{CodecError, CodecResult};

/// Bytes per element in the uncompressed payload.
pub const BYTES_PER_ELEMENT: usize = 12;

/// Packs the RGB part of `values` and compresses it. Alpha is dropped.
pub fn encode_rgb(values: &[Rgba]) -> Vec<u8> {
    let mut raw = vec![0u8; values.len() * BYTES_PER_ELEMENT];
    for (chunk, color) in raw.chunks_exact_mut(BYTES_PER_ELEMENT).zip(values) {
        LittleEndian::write_f32_into(&color[..3], chunk);
    }
    compress_prepend_size(&raw)
}

/// Decompresses a blob into RGB triples.
pub fn decode_rgb(blob: &[u8]) -> CodecResult<Vec<[f32; 3]>> {
    let raw = decompress_size_prepended(blob)?;
    if raw.len() % BYTES_PER_ELEMENT != 0 {
        return Err(CodecError::Truncated { len: raw.len() });
    }
    Ok(raw
        .chunks_exact(BYTES_PER_ELEMENT)
        .map(|chunk| {
            let mut rgb = [0.0f32; 3];
            LittleEndian::read_f32_into(chunk, &mut rgb);
            rgb
        })
        .collect())
}
