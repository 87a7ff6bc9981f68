//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod analyze;
pub mod clean;
pub mod config;
pub mod doctor;
pub mod report;
pub mod train;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cs_core::config::Config;
use cs_storage::FileSystemRunStorage;
use std::path::{Path, PathBuf};

/// Project-local configuration file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = ".comment-sentiment/config.toml";

/// comment-sentiment - sentiment analysis for YouTube comments
#[derive(Debug, Parser)]
#[command(name = "comment-sentiment")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch and analyze the comments of a video
    Analyze(analyze::AnalyzeArgs),

    /// Train the statistical classifier from a labeled CSV
    Train(train::TrainArgs),

    /// Print normalized comment text
    Clean(clean::CleanArgs),

    /// Summarize a saved analysis run
    Report(report::ReportArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),

    /// Diagnose configuration, artifacts and credentials
    Doctor(doctor::DoctorArgs),
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config_path: PathBuf,
}

impl GlobalOptions {
    /// Load the configuration file, falling back to defaults when it is missing
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(&self.config_path)
            .with_context(|| format!("Failed to load {}", self.config_path.display()))
    }
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    // Secrets may live in a .env file; load it before clap reads env defaults
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {:?}", path);
    }

    let global = GlobalOptions {
        config_path: cli
            .config
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
    };

    // Dispatch to command handler
    match cli.command {
        Commands::Analyze(args) => analyze::execute(args, &global),
        Commands::Train(args) => train::execute(args, &global),
        Commands::Clean(args) => clean::execute(args),
        Commands::Report(args) => report::execute(args, &global),
        Commands::Config(cmd) => config::execute(cmd, &global),
        Commands::Doctor(args) => doctor::execute(args, &global),
    }
}

/// Snapshot storage under the configured cache directory
pub(crate) fn open_run_storage(config: &Config) -> Result<FileSystemRunStorage> {
    let dir = cache_dir(&config.app.cache_dir);
    FileSystemRunStorage::new(&dir)
        .with_context(|| format!("Failed to open cache directory {}", dir.display()))
}

/// An empty cache directory setting means the per-user cache
pub(crate) fn cache_dir(configured: &Path) -> PathBuf {
    if configured.as_os_str().is_empty() {
        FileSystemRunStorage::default_dir()
    } else {
        configured.to_path_buf()
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
