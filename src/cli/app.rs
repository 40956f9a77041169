//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{generate, query, scan};
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "flux-deps")]
#[command(author, version, about = "Dependency analysis for Flux Kustomizations")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory to scan for Kustomizations (overrides flux-deps.toml)
    #[arg(long, short = 'd', global = true, env = "FLUX_DEPS_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the markdown dependency report
    Generate {
        /// Report path (overrides flux-deps.toml)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show the deployment order grouped by level
    Order,

    /// Show dependencies, dependents and chain of one Kustomization
    Show {
        /// Kustomization key as <namespace>/<name>
        key: String,
    },

    /// List dependencies that are referenced but never declared
    Missing,

    /// List dependency cycles
    Cycles,

    /// Exit non-zero if any dependency is missing or cyclic
    Check,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose("flux-deps starting");
    match &config.project_root {
        Some(root) => output.verbose_ctx("config", &format!("Project root: {}", root.display())),
        None => output.verbose_ctx("config", "No flux-deps.toml found, using defaults"),
    }

    let dir = cli.dir.clone().unwrap_or_else(|| config.kubernetes_dir());
    let analysis = scan::analyze(&output, &dir, &config.project.manifest_file)?;

    match cli.command {
        Commands::Generate { output: path } => {
            let path = path.unwrap_or_else(|| config.output_path());
            generate::generate(&output, &analysis, &path)?
        }
        Commands::Order => query::order(&output, &analysis)?,
        Commands::Show { key } => {
            output.verbose_ctx("show", &format!("Looking up {}", key));
            query::show(&output, &analysis, &key)?
        }
        Commands::Missing => query::missing(&output, &analysis)?,
        Commands::Cycles => query::cycles(&output, &analysis)?,
        Commands::Check => query::check(&output, &analysis)?,
    }

    Ok(())
}
