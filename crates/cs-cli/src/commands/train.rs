//! Train command
//!
//! Fit the statistical classifier on a labeled CSV and persist its artifacts.

use super::GlobalOptions;
use anyhow::{Context, Result};
use clap::Args;
use cs_core::classical::train_and_persist;
use cs_storage::{load_training_csv, FileSystemArtifactStore};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the train command
#[derive(Debug, Args)]
pub struct TrainArgs {
    /// Labeled CSV with `text` and `label` columns
    #[arg(long)]
    pub csv: PathBuf,

    /// Fraction of each class held out for validation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed for the train/validation shuffle
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Execute the train command
pub fn execute(args: TrainArgs, global: &GlobalOptions) -> Result<()> {
    use colored::Colorize;

    let mut config = global.load_config()?;
    if let Some(test_size) = args.test_size {
        config.classical.test_size = test_size;
    }
    if let Some(seed) = args.seed {
        config.classical.seed = seed;
    }
    config.validate().context("Invalid training settings")?;

    let examples = load_training_csv(&args.csv)
        .with_context(|| format!("Failed to load training data from {}", args.csv.display()))?;
    println!(
        "{} Loaded {} rows from {}",
        "✓".green(),
        examples.len(),
        args.csv.display()
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Training TF-IDF + logistic regression...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let store = FileSystemArtifactStore::from_config(&config.classical);
    let outcome = train_and_persist(examples, &config.classical, &store);
    spinner.finish_and_clear();
    let outcome = outcome.context("Training failed")?;

    println!(
        "{} Trained on {} rows, validated on {}",
        "✓".green(),
        outcome.train_size,
        outcome.validation.len()
    );
    println!("\n{}", "Validation report".bold().underline());
    println!("{}", outcome.report);
    println!(
        "{} Saved {} and {}",
        "✓".green(),
        store.vectorizer_path().display().to_string().cyan(),
        store.model_path().display().to_string().cyan()
    );

    Ok(())
}
