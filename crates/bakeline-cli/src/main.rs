//! Bakeline CLI - Command-line interface for lightmap and vertex color baking
//!
//! This binary provides commands for baking scene documents, inspecting
//! group-name policy, moving vertex colors in and out of scenes, and
//! compressing baked textures.

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;

use bakeline_cli::{commands, logging};

/// Bakeline - name-driven bake pipeline
#[derive(Parser)]
#[command(name = "bakeline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bake pipeline over a scene document
    Bake {
        /// Path to the scene document (JSON)
        #[arg(short, long)]
        scene: String,

        /// Path to a pipeline config file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Where to save the processed scene (default: overwrite --scene)
        #[arg(short, long)]
        out: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show the bake policy a group name resolves to
    Policy {
        /// Group names to resolve
        #[arg(required = true)]
        names: Vec<String>,

        /// Resolution multiplier applied to the tier
        #[arg(short, long, default_value_t = 1.0)]
        multiplier: f32,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert baked PNG textures in a directory to KTX2
    Compress {
        /// Directory holding the PNG textures and glTF documents
        #[arg(short, long)]
        dir: String,

        /// Path to the encoder executable (default: $BAKELINE_ENCODER, then PATH)
        #[arg(long)]
        encoder: Option<String>,

        /// Per-image encoder timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print the planned jobs without running them
        #[arg(long)]
        dry_run: bool,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Write an object's color attribute to a compressed blob
    ExportColors {
        /// Path to the scene document
        #[arg(short, long)]
        scene: String,

        /// Object name
        #[arg(long)]
        object: String,

        /// Color attribute name
        #[arg(short, long, default_value = "Bake")]
        attribute: String,

        /// Blob path (default: "bytes" next to the scene)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Read a compressed blob back into an object's color attribute
    ImportColors {
        /// Path to the scene document (saved in place)
        #[arg(short, long)]
        scene: String,

        /// Object name
        #[arg(long)]
        object: String,

        /// Color attribute name
        #[arg(short, long, default_value = "Bake")]
        attribute: String,

        /// Blob path (default: "bytes" next to the scene)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Check the environment for the texture encoder and write access
    Doctor,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Bake {
            scene,
            config,
            out,
            json,
        } => commands::bake::run(&scene, config.as_deref(), out.as_deref(), json),
        Commands::Policy {
            names,
            multiplier,
            json,
        } => commands::policy::run(&names, multiplier, json),
        Commands::Compress {
            dir,
            encoder,
            timeout_secs,
            dry_run,
            json,
        } => commands::compress::run(&dir, encoder.as_deref(), timeout_secs, dry_run, json),
        Commands::ExportColors {
            scene,
            object,
            attribute,
            file,
        } => commands::colors::export(&scene, &object, &attribute, file.as_deref()),
        Commands::ImportColors {
            scene,
            object,
            attribute,
            file,
        } => commands::colors::import(&scene, &object, &attribute, file.as_deref()),
        Commands::Doctor => commands::doctor::run(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
