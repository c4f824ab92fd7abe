//! Shared human-readable output.

use bakeline_pipeline::PipelineEvent;
use bakeline_scene::CodedError;
use colored::Colorize;
use serde::Serialize;

/// JSON shape of a failed command.
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub code: String,
    pub category: String,
    pub message: String,
}

impl JsonError {
    pub fn from_coded(error: &dyn CodedError) -> Self {
        Self {
            code: error.code().to_string(),
            category: error.category().to_string(),
            message: error.to_string(),
        }
    }
}

/// Prints `[CODE] message` to stderr.
pub fn print_coded_error(error: &dyn CodedError) {
    eprintln!(
        "{} [{}] {}",
        "error".red().bold(),
        error.code().red(),
        error
    );
}

/// One line per event.
pub fn format_event(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::GroupStarted {
            group,
            root,
            policy,
        } => {
            let mut flags = Vec::new();
            if policy.join {
                flags.push("join");
            }
            if policy.unwrap {
                flags.push("unwrap");
            }
            if policy.vert {
                flags.push("vert");
            }
            if policy.tex {
                flags.push("tex");
            }
            format!(
                "{} {} (root {}) [{}]",
                "group".cyan().bold(),
                group,
                root,
                flags.join(", ")
            )
        }
        PipelineEvent::Normalized {
            object,
            modifiers_applied,
            scale_applied,
            detached_mesh,
        } => {
            let mut parts = Vec::new();
            if !modifiers_applied.is_empty() {
                parts.push(format!("applied {}", modifiers_applied.join(", ")));
            }
            if *scale_applied {
                parts.push("froze scale".to_string());
            }
            if *detached_mesh {
                parts.push("detached mesh".to_string());
            }
            format!("  {} {}: {}", "normalize".dimmed(), object, parts.join("; "))
        }
        PipelineEvent::Merged { into, removed } => {
            format!("  {} {} <- {}", "join".yellow(), into, removed.join(", "))
        }
        PipelineEvent::Unwrapped { objects, params } => format!(
            "  {} {} (margin {}, angle {})",
            "unwrap".yellow(),
            objects.join(", "),
            params.island_margin,
            params.angle_limit_deg
        ),
        PipelineEvent::MaterialCreated { object, material } => {
            format!("  {} {} for {}", "material".dimmed(), material, object)
        }
        PipelineEvent::Baked {
            object,
            pass,
            domain,
            resolution,
            samples,
            denoise,
        } => {
            let size = resolution
                .map(|r| format!(" {}x{}", r, r))
                .unwrap_or_default();
            format!(
                "  {} {} {} {}{} ({} samples{})",
                "bake".green().bold(),
                object,
                pass.as_str(),
                domain,
                size,
                samples,
                if *denoise { ", denoised" } else { "" }
            )
        }
        PipelineEvent::ImageSaved { path, .. } => {
            format!("  {} {}", "saved".green(), path.display())
        }
        PipelineEvent::Consolidated { object, material } => {
            format!("  {} {} -> {}", "consolidate".cyan(), object, material)
        }
        PipelineEvent::PreviewInstalled { object, material } => {
            format!("  {} {} -> {}", "preview".cyan(), object, material)
        }
    }
}
