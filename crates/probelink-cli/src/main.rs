//! Probelink CLI - Main entry point
//!
//! Lists the firmware images already built under a release directory
//! or a local project tree. Does not build anything.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use probelink_core::{FirmwareBundle, IdentifierRegistry};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "probelink")]
#[command(about = "Debug-probe firmware artifact discovery")]
#[command(version)]
struct Args {
    /// Path to the identifier registry (TOML)
    #[arg(short, long, default_value = "registry.toml")]
    registry: PathBuf,

    /// Print the bundle as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a finished release directory
    Release {
        /// Directory with one subdirectory per firmware build
        dir: PathBuf,
    },
    /// Scan a local project build tree
    Project {
        /// Project root containing projectfiles/
        root: PathBuf,

        /// Tool-chain subdirectory under projectfiles/
        #[arg(short, long, default_value = "uvision")]
        tool: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let registry = IdentifierRegistry::from_file(&args.registry)
        .with_context(|| format!("loading registry {}", args.registry.display()))?;
    info!(
        hdks = registry.hdks.len(),
        boards = registry.boards.len(),
        "Identifier registry loaded"
    );

    let bundle = match &args.command {
        Command::Release { dir } => FirmwareBundle::from_release_dir(dir, &registry)
            .with_context(|| format!("scanning release directory {}", dir.display()))?,
        Command::Project { root, tool } => FirmwareBundle::from_project_tree(root, tool, &registry)
            .with_context(|| format!("scanning project tree {}", root.display()))?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        println!("Discovered {} firmware images:", bundle.len());
        for image in bundle.images() {
            println!("  {}", image);
        }
    }

    Ok(())
}
