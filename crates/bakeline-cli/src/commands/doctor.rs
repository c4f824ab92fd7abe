//! Doctor command implementation
//!
//! Checks the texture encoder and output permissions.

use anyhow::Result;
use colored::Colorize;
use std::env;
use std::process::ExitCode;

use bakeline_texcompress::{EncoderConfig, ENCODER_ENV};

/// Run the doctor command
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run() -> Result<ExitCode> {
    println!("{}", "Bakeline Doctor".cyan().bold());
    println!("{}", "===============".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} bakeline-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Dependencies:".bold());
    match EncoderConfig::default().find_encoder() {
        Ok(path) => println!("  {} texture encoder at {}", "ok".green(), path.display()),
        Err(_) => {
            println!("  {} texture encoder not found", "!!".yellow());
            println!(
                "     {}",
                format!(
                    "Needed by `bakeline compress`. Set {} or put kram on PATH.",
                    ENCODER_ENV
                )
                .dimmed()
            );
            // Only compression needs it.
        }
    }
    println!();

    println!("{}", "Permissions:".bold());
    match env::current_dir() {
        Ok(dir) => {
            let test_file = dir.join(".bakeline_write_test");
            match std::fs::write(&test_file, b"test") {
                Ok(()) => {
                    let _ = std::fs::remove_file(&test_file);
                    println!("  {} current directory is writable", "ok".green());
                }
                Err(e) => {
                    println!("  {} cannot write to current directory: {}", "!!".red(), e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("  {} cannot read current directory: {}", "!!".red(), e);
            all_ok = false;
        }
    }
    println!();

    if all_ok {
        println!("{}", "All checks passed.".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", "Some checks failed.".red().bold());
        Ok(ExitCode::from(1))
    }
}
