//! Baked image output.
//!
//! Images are written as 8-bit RGBA PNG with fixed encoder settings, so the
//! same bake produces byte-identical files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bakeline_scene::color::linear_to_srgb;
use bakeline_scene::{ColorSpace, ImageBuffer, Rgba};
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};

use crate::error::{PipelineError, PipelineResult};

/// PNG export configuration.
#[derive(Debug, Clone)]
pub struct PngConfig {
    pub compression: Compression,
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            // No filtering keeps output stable across encoder versions.
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Smaller files, slower encode.
    pub fn best_compression() -> Self {
        Self {
            compression: Compression::Best,
            filter: FilterType::Paeth,
        }
    }
}

/// Converts an image to top-down 8-bit RGBA rows.
///
/// Image rows are stored bottom-up; color-managed images get sRGB-encoded
/// color channels. Alpha is always linear.
pub fn to_rgba8(image: &ImageBuffer) -> Vec<u8> {
    let encode = |v: f32| match image.colorspace {
        ColorSpace::Srgb => linear_to_srgb(v),
        ColorSpace::NonColor => v.clamp(0.0, 1.0),
    };
    let byte = |v: f32| (v * 255.0).round() as u8;

    let mut data = Vec::with_capacity(image.pixels.len() * 4);
    for y in (0..image.height).rev() {
        for x in 0..image.width {
            let [r, g, b, a] = image.get(x, y);
            data.extend_from_slice(&[
                byte(encode(r)),
                byte(encode(g)),
                byte(encode(b)),
                byte(a.clamp(0.0, 1.0)),
            ]);
        }
    }
    data
}

/// Encodes an image into any writer.
pub fn write_png_to_writer<W: Write>(
    image: &ImageBuffer,
    writer: W,
    config: &PngConfig,
) -> Result<(), png::EncodingError> {
    let mut encoder = Encoder::new(writer, image.width, image.height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&to_rgba8(image))?;
    Ok(())
}

/// Writes an image to a PNG file.
pub fn write_png(image: &ImageBuffer, path: &Path, config: &PngConfig) -> PipelineResult<()> {
    let file = File::create(path).map_err(|source| PipelineError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write_png_to_writer(image, &mut writer, config).map_err(|source| {
        PipelineError::PngEncode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(|source| PipelineError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// 3x3 per-channel median filter; edge pixels use clamped neighbours.
pub fn median_filter(image: &mut ImageBuffer) {
    if !image.is_loaded() {
        return;
    }
    let (w, h) = (image.width as i64, image.height as i64);
    let source = image.pixels.clone();
    let at = |x: i64, y: i64| -> Rgba {
        let x = x.clamp(0, w - 1);
        let y = y.clamp(0, h - 1);
        source[(y * w + x) as usize]
    };

    for y in 0..h {
        for x in 0..w {
            let mut window = [[0.0f32; 9]; 4];
            let mut i = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    for (values, v) in window.iter_mut().zip(at(x + dx, y + dy)) {
                        values[i] = v;
                    }
                    i += 1;
                }
            }
            let mut out = [0.0f32; 4];
            for (ch, values) in window.iter_mut().enumerate() {
                values.sort_by(f32::total_cmp);
                out[ch] = values[4];
            }
            image.pixels[(y * w + x) as usize] = out;
        }
    }
}
