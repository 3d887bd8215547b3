use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

use admin_config::config::loader::load_document;
use admin_config::config::{builtin_registry, resolve};

#[derive(Parser)]
#[command(name = "config-cli")]
#[command(about = "Offline checker for admin configuration documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a document and print issues plus the normalised result
    Check {
        /// Document to check (.json or .toml)
        path: PathBuf,
    },
    /// List every declared field
    Schema,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let registry = builtin_registry()?;

    match cli.command {
        Commands::Check { path } => {
            let document = load_document(&path)?;
            let resolution = resolve(&document, &registry);
            let degraded = resolution.is_degraded();
            let report = json!({
                "degraded": degraded,
                "issues": &resolution.issues,
                "config": resolution.snapshot.to_document(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            if degraded {
                eprintln!("Error: configuration has rejected values");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Schema => {
            for (namespace, key, spec) in registry.iter() {
                println!(
                    "{}.{}\t{}\tdefault={}\tfixer={}",
                    namespace,
                    key,
                    spec.name,
                    spec.default,
                    spec.fixer.label()
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
