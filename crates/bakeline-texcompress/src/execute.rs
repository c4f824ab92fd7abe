//! Runs a compression plan.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::encoder::{run_encoder, EncoderConfig};
use crate::error::{CompressError, CompressResult};
use crate::plan::{CompressPlan, Job};

/// An image the encoder did not convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedEncode {
    pub input: PathBuf,
    pub message: String,
}

/// Outcome of a compression run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressReport {
    /// Rewritten linking documents.
    pub documents: Vec<PathBuf>,
    /// KTX2 files produced.
    pub encoded: Vec<PathBuf>,
    pub failed: Vec<FailedEncode>,
    pub unsupported: Vec<PathBuf>,
}

impl CompressReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Replaces `.png` texture references with `.ktx2`.
pub fn rewrite_references(document: &str) -> String {
    document.replace(".png", ".ktx2")
}

fn rewrite_document(input: &Path, output: &Path) -> CompressResult<()> {
    let text = std::fs::read_to_string(input).map_err(|source| CompressError::Document {
        path: input.to_path_buf(),
        source,
    })?;
    std::fs::write(output, rewrite_references(&text)).map_err(|source| {
        CompressError::Document {
            path: output.to_path_buf(),
            source,
        }
    })
}

/// Executes every job in plan order.
///
/// The encoder is located once, before any file is touched, and only when the
/// plan has images to encode. Each image is encoded exactly once; failures
/// are collected in the report.
pub fn execute(plan: &CompressPlan, config: &EncoderConfig) -> CompressResult<CompressReport> {
    let encoder = match plan.image_jobs().next() {
        Some(_) => Some(config.find_encoder()?),
        None => None,
    };

    let mut report = CompressReport {
        unsupported: plan.unsupported.clone(),
        ..Default::default()
    };
    for path in &plan.unsupported {
        tracing::warn!("{} is not supported by the encoder, skipping", path.display());
    }

    for job in &plan.jobs {
        match job {
            Job::RewriteDocument { input, output } => {
                rewrite_document(input, output)?;
                tracing::info!("rewrote {} -> {}", input.display(), output.display());
                report.documents.push(output.clone());
            }
            Job::EncodeImage {
                input,
                output,
                format,
            } => {
                let Some(encoder) = encoder.as_deref() else {
                    continue;
                };
                tracing::info!("encoding {} as {}", input.display(), format.as_str());
                match run_encoder(encoder, input, output, *format, config.timeout)? {
                    Ok(()) => report.encoded.push(output.clone()),
                    Err(failure) => {
                        tracing::warn!("failed to encode {}: {}", input.display(), failure);
                        report.failed.push(FailedEncode {
                            input: input.clone(),
                            message: failure.to_string(),
                        });
                    }
                }
            }
        }
    }
    Ok(report)
}
