//! Compress command implementation
//!
//! Converts baked PNG textures in a directory to KTX2.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use bakeline_texcompress::{execute, plan, EncoderConfig, Job};

/// Run the compress command
///
/// # Returns
/// Exit code: 0 if every image was encoded, 2 if any encode failed
pub fn run(
    dir: &str,
    encoder: Option<&str>,
    timeout_secs: Option<u64>,
    dry_run: bool,
    json_output: bool,
) -> Result<ExitCode> {
    let plan = plan(Path::new(dir)).with_context(|| format!("Failed to scan {}", dir))?;

    if dry_run {
        if json_output {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            for job in &plan.jobs {
                match job {
                    Job::RewriteDocument { input, output } => println!(
                        "{} {} -> {}",
                        "rewrite".cyan(),
                        input.display(),
                        output.display()
                    ),
                    Job::EncodeImage {
                        input,
                        output,
                        format,
                    } => println!(
                        "{} {} -> {} ({})",
                        "encode".cyan(),
                        input.display(),
                        output.display(),
                        format.as_str()
                    ),
                }
            }
            for path in &plan.unsupported {
                println!("{} {}", "unsupported".yellow(), path.display());
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = EncoderConfig::default();
    if let Some(path) = encoder {
        config = config.encoder_path(path);
    }
    if let Some(secs) = timeout_secs {
        config = config.timeout_secs(secs);
    }

    let report = execute(&plan, &config).context("Texture compression failed")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for path in &report.documents {
            println!("{} {}", "rewrote".green(), path.display());
        }
        for path in &report.encoded {
            println!("{} {}", "encoded".green(), path.display());
        }
        for path in &report.unsupported {
            println!("{} {} (not supported)", "skipped".yellow(), path.display());
        }
        for failed in &report.failed {
            println!(
                "{} {}: {}",
                "failed".red().bold(),
                failed.input.display(),
                failed.message
            );
        }
    }

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
