//! Bake command implementation
//!
//! Runs the bake pipeline over a scene document and saves the result.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use bakeline_pipeline::{PipelineConfig, PipelineReport, ReferenceBackend};
use bakeline_scene::Scene;

use super::reporting::{format_event, print_coded_error, JsonError};

#[derive(Debug, Serialize)]
struct BakeOutput<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a PipelineReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
    duration_ms: u64,
}

/// Run the bake command
///
/// # Arguments
/// * `scene_path` - Scene document to process
/// * `config_path` - Optional pipeline config (JSON)
/// * `out_path` - Where to save the processed scene (default: overwrite `scene_path`)
/// * `json_output` - Print the run report as JSON
///
/// # Returns
/// Exit code: 0 on success, 1 for input or config errors, 2 if the pipeline failed
pub fn run(
    scene_path: &str,
    config_path: Option<&str>,
    out_path: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    let start = Instant::now();

    let mut scene = Scene::load(Path::new(scene_path))
        .with_context(|| format!("Failed to load scene: {}", scene_path))?;
    let config = match config_path {
        Some(path) => PipelineConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => PipelineConfig::default(),
    };

    if !json_output {
        println!("{} {}", "Baking:".cyan().bold(), scene_path);
    }

    let mut backend = ReferenceBackend::new();
    let result = bakeline_pipeline::run(&mut scene, &mut backend, config);
    let duration_ms = start.elapsed().as_millis() as u64;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            let code = if e.is_input_error() { 1 } else { 2 };
            if json_output {
                let output = BakeOutput {
                    ok: false,
                    report: None,
                    error: Some(JsonError::from_coded(&e)),
                    duration_ms,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_coded_error(&e);
            }
            return Ok(ExitCode::from(code));
        }
    };

    let out = Path::new(out_path.unwrap_or(scene_path));
    scene
        .save(out)
        .with_context(|| format!("Failed to save scene: {}", out.display()))?;

    if json_output {
        let output = BakeOutput {
            ok: true,
            report: Some(&report),
            error: None,
            duration_ms,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for event in &report.events {
            println!("{}", format_event(event));
        }
        println!(
            "{} {} bakes, {} images in {}ms -> {}",
            "Done:".green().bold(),
            report.bakes().count(),
            report.saved_images().count(),
            duration_ms,
            out.display()
        );
    }
    Ok(ExitCode::SUCCESS)
}
