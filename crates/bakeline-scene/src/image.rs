//! Image buffers used as bake targets and texture sources.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::color::Rgba;
use crate::error::{SceneError, SceneResult};

/// Color interpretation of an image's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Display-referred color; encoded with the sRGB transfer on save.
    #[default]
    Srgb,
    /// Raw data such as normals or roughness.
    NonColor,
}

/// Where an image's pixels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Created in memory (e.g. as a bake target).
    #[default]
    Generated,
    /// Backed by a file on disk.
    File,
}

/// A 2D RGBA pixel grid.
///
/// Pixels are not part of the scene document; file-backed images carry their
/// path instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBuffer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub float_buffer: bool,
    #[serde(default)]
    pub colorspace: ColorSpace,
    #[serde(default)]
    pub source: ImageSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<PathBuf>,
    /// Row-major linear RGBA, bottom row first.
    #[serde(skip)]
    pub pixels: Vec<Rgba>,
}

impl ImageBuffer {
    /// Allocates a black, opaque image.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        float_buffer: bool,
    ) -> SceneResult<Self> {
        let name = name.into();
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidImageSize {
                name,
                width,
                height,
            });
        }
        Ok(Self {
            name,
            width,
            height,
            float_buffer,
            colorspace: ColorSpace::Srgb,
            source: ImageSource::Generated,
            filepath: None,
            pixels: vec![[0.0, 0.0, 0.0, 1.0]; width as usize * height as usize],
        })
    }

    /// True when pixel data is present in memory.
    pub fn is_loaded(&self) -> bool {
        self.pixels.len() == self.width as usize * self.height as usize && !self.pixels.is_empty()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        self.pixels[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = (y * self.width + x) as usize;
        self.pixels[idx] = color;
    }

    /// Nearest-neighbour lookup with wrapping UVs; `None` if not loaded.
    pub fn sample(&self, uv: [f32; 2]) -> Option<Rgba> {
        if !self.is_loaded() {
            return None;
        }
        let wrap = |t: f32, size: u32| {
            let t = t.rem_euclid(1.0);
            ((t * size as f32) as u32).min(size - 1)
        };
        Some(self.get(wrap(uv[0], self.width), wrap(uv[1], self.height)))
    }

    /// Marks the image as backed by `path`.
    pub fn mark_saved(&mut self, path: impl Into<PathBuf>) {
        self.source = ImageSource::File;
        self.filepath = Some(path.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(ImageBuffer::new("bad", 0, 16, true).is_err());
    }

    #[test]
    fn test_sample_wraps() {
        let mut img = ImageBuffer::new("t", 2, 2, false).unwrap();
        img.set(1, 0, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(img.sample([0.75, 0.25]), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(img.sample([1.75, -0.75]), Some([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_unloaded_image_has_no_samples() {
        let json = r#"{"name": "disk.png", "width": 4, "height": 4, "source": "file"}"#;
        let img: ImageBuffer = serde_json::from_str(json).unwrap();
        assert!(!img.is_loaded());
        assert_eq!(img.sample([0.5, 0.5]), None);
    }
}
