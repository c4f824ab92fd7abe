//! Directory scan: decides what happens to each file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CompressError, CompressResult};

/// Marker in the stem of rewritten linking documents.
pub const COMPRESSED_MARKER: &str = "_ktx2";

/// Raster formats the encoder is not fed. They are reported, not converted.
pub const UNSUPPORTED_EXTENSIONS: [&str; 8] =
    ["jpg", "jpeg", "tga", "bmp", "tif", "tiff", "exr", "hdr"];

/// Block-compression format of an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockFormat {
    /// Two-channel; used for normal maps.
    Bc5,
    Bc7,
}

impl BlockFormat {
    /// BC5 for images whose stem mentions `normal`, BC7 otherwise.
    pub fn for_stem(stem: &str) -> Self {
        if stem.to_lowercase().contains("normal") {
            BlockFormat::Bc5
        } else {
            BlockFormat::Bc7
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockFormat::Bc5 => "bc5",
            BlockFormat::Bc7 => "bc7",
        }
    }
}

/// One unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum Job {
    /// Copy a glTF document with its `.png` references pointed at `.ktx2`.
    RewriteDocument { input: PathBuf, output: PathBuf },
    /// Encode a PNG into a same-stem KTX2 file.
    EncodeImage {
        input: PathBuf,
        output: PathBuf,
        format: BlockFormat,
    },
}

/// Everything found in one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressPlan {
    pub jobs: Vec<Job>,
    /// Raster images in a format the encoder is not given.
    pub unsupported: Vec<PathBuf>,
}

impl CompressPlan {
    pub fn image_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs
            .iter()
            .filter(|job| matches!(job, Job::EncodeImage { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty() && self.unsupported.is_empty()
    }
}

/// Classifies one file name inside `dir`.
fn classify(dir: &Path, path: &Path, plan: &mut CompressPlan) {
    let (Some(stem), Some(ext)) = (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|s| s.to_str()),
    ) else {
        return;
    };
    let ext = ext.to_lowercase();

    match ext.as_str() {
        "gltf" if !stem.to_lowercase().contains(COMPRESSED_MARKER) => {
            plan.jobs.push(Job::RewriteDocument {
                input: path.to_path_buf(),
                output: dir.join(format!("{}{}.gltf", stem, COMPRESSED_MARKER)),
            });
        }
        "png" => plan.jobs.push(Job::EncodeImage {
            input: path.to_path_buf(),
            output: dir.join(format!("{}.ktx2", stem)),
            format: BlockFormat::for_stem(stem),
        }),
        other if UNSUPPORTED_EXTENSIONS.contains(&other) => {
            plan.unsupported.push(path.to_path_buf());
        }
        _ => {}
    }
}

/// Scans `dir` (not recursively) in file name order.
pub fn plan(dir: &Path) -> CompressResult<CompressPlan> {
    let read_dir = |source| CompressError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir)? {
        let entry = entry.map_err(read_dir)?;
        if entry.file_type().map_err(read_dir)?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut plan = CompressPlan::default();
    for path in &paths {
        classify(dir, path, &mut plan);
    }
    Ok(plan)
}
