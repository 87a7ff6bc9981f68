//! Doctor command
//!
//! Diagnose configuration, classifier artifacts and credentials.

use super::{cache_dir, GlobalOptions};
use anyhow::Result;
use clap::Args;
use cs_core::analysis::RunStorage;
use cs_core::classical::{ArtifactStore, ClassifierState};
use cs_core::config::Config;
use cs_storage::{FileSystemArtifactStore, FileSystemRunStorage};

/// Arguments for the doctor command
#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Show suggested fixes for every finding
    #[arg(long)]
    pub suggestions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
}

/// Check result
struct CheckResult {
    name: String,
    status: Status,
    message: String,
    suggestion: Option<String>,
}

impl CheckResult {
    fn ok(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: Status::Ok,
            message: message.into(),
            suggestion: None,
        }
    }

    fn fail(name: &str, message: impl Into<String>, suggestion: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status: Status::Fail,
            message: message.into(),
            suggestion: suggestion.map(|s| s.to_string()),
        }
    }

    fn warn(name: &str, message: impl Into<String>, suggestion: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status: Status::Warn,
            message: message.into(),
            suggestion: suggestion.map(|s| s.to_string()),
        }
    }
}

/// Execute the doctor command
pub fn execute(args: DoctorArgs, global: &GlobalOptions) -> Result<()> {
    use colored::Colorize;

    let mut sections = Vec::new();

    let (config_results, config) = check_configuration(global);
    sections.push(("1. Configuration", config_results));
    let config = config.unwrap_or_default();
    sections.push(("2. Statistical Classifier", check_artifacts(&config)));
    sections.push(("3. Credentials", check_credentials()));
    sections.push(("4. Cache", check_cache(&config)));

    let mut warnings = 0;
    let mut errors = Vec::new();

    for (title, results) in &sections {
        println!("\n{}", title.bold().underline());
        for result in results {
            let status = match result.status {
                Status::Ok => "✓".green(),
                Status::Warn => "⚠".yellow(),
                Status::Fail => "✗".red(),
            };
            println!("   {} {}: {}", status, result.name, result.message);

            if args.suggestions || result.status != Status::Ok {
                if let Some(suggestion) = &result.suggestion {
                    println!("     {}", suggestion.dimmed());
                }
            }

            match result.status {
                Status::Warn => warnings += 1,
                Status::Fail => errors.push(result),
                Status::Ok => {}
            }
        }
    }

    println!(
        "\n{}: {} warnings, {} errors",
        "Summary".bold(),
        warnings.to_string().yellow(),
        errors.len().to_string().red()
    );

    if !errors.is_empty() {
        println!("\n{}", "✗ Errors:".red());
        for result in &errors {
            println!("  - {}: {}", result.name, result.message);
            if let Some(suggestion) = &result.suggestion {
                println!("    Fix: {}", suggestion);
            }
        }
    } else if warnings == 0 {
        println!("\n{} All checks passed!", "✓".green());
    }

    Ok(())
}

fn check_configuration(global: &GlobalOptions) -> (Vec<CheckResult>, Option<Config>) {
    let mut results = vec![CheckResult::ok(
        "comment-sentiment version",
        env!("CARGO_PKG_VERSION"),
    )];

    let path = &global.config_path;
    if !path.exists() {
        results.push(CheckResult::warn(
            "Config file",
            format!("{} not found, using defaults", path.display()),
            Some("Run 'comment-sentiment config reset' to create one"),
        ));
        return (results, Some(Config::default()));
    }

    match global.load_config() {
        Ok(config) => {
            results.push(CheckResult::ok("Config file", path.display().to_string()));
            (results, Some(config))
        }
        Err(e) => {
            results.push(CheckResult::fail(
                "Config file",
                format!("{:#}", e),
                Some("Run 'comment-sentiment config validate' for details"),
            ));
            (results, None)
        }
    }
}

fn check_artifacts(config: &Config) -> Vec<CheckResult> {
    let store = FileSystemArtifactStore::from_config(&config.classical);
    match store.load() {
        Ok(ClassifierState::Loaded(classifier)) => vec![CheckResult::ok(
            "Artifacts",
            format!(
                "{} features, labels: {}",
                classifier.vectorizer().n_features(),
                classifier.labels().join(", ")
            ),
        )],
        Ok(ClassifierState::Unavailable { reason }) => vec![CheckResult::warn(
            "Artifacts",
            format!("unavailable ({}); only neural labels will be produced", reason),
            Some("Run 'comment-sentiment train --csv <labeled.csv>'"),
        )],
        Err(e) => vec![CheckResult::fail(
            "Artifacts",
            format!("{:#}", e),
            Some("Retrain to regenerate both artifact files"),
        )],
    }
}

fn check_credentials() -> Vec<CheckResult> {
    let present = |name: &str| {
        std::env::var(name)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    };

    let mut results = Vec::new();
    if present("YOUTUBE_API_KEY") {
        results.push(CheckResult::ok("YOUTUBE_API_KEY", "set"));
    } else {
        results.push(CheckResult::warn(
            "YOUTUBE_API_KEY",
            "not set; fetching needs --api-key",
            Some("Add YOUTUBE_API_KEY to the environment or a .env file"),
        ));
    }
    if present("HF_TOKEN") {
        results.push(CheckResult::ok("HF_TOKEN", "set"));
    } else {
        results.push(CheckResult::warn(
            "HF_TOKEN",
            "not set; inference requests will be anonymous",
            Some("Add HF_TOKEN to the environment or a .env file"),
        ));
    }
    results
}

fn check_cache(config: &Config) -> Vec<CheckResult> {
    let dir = cache_dir(&config.app.cache_dir);
    match FileSystemRunStorage::new(&dir).and_then(|storage| storage.list()) {
        Ok(runs) => vec![CheckResult::ok(
            "Cache directory",
            format!("{} ({} saved runs)", dir.display(), runs.len()),
        )],
        Err(e) => vec![CheckResult::fail(
            "Cache directory",
            format!("{}: {}", dir.display(), e),
            Some("Set [app] cache_dir to a writable directory"),
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_artifacts_warn() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.classical.vectorizer_path = temp.path().join("v.json");
        config.classical.model_path = temp.path().join("m.json");

        let results = check_artifacts(&config);
        assert_eq!(results[0].status, Status::Warn);
    }

    #[test]
    fn test_invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "[classical]\ntest_size = 3.0\n").unwrap();

        let (results, config) = check_configuration(&GlobalOptions { config_path });
        assert!(config.is_none());
        assert!(results.iter().any(|r| r.status == Status::Fail));
    }

    #[test]
    fn test_cache_check_creates_directory() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.app.cache_dir = temp.path().join("cache");

        let results = check_cache(&config);
        assert_eq!(results[0].status, Status::Ok);
        assert!(temp.path().join("cache/runs").exists());
    }
}
