//! Config command
//!
//! Manage comment-sentiment configuration.

use super::GlobalOptions;
use anyhow::{Context, Result};
use clap::Subcommand;
use cs_core::config::Config;
use std::fs;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the configuration file path
    Path,

    /// Reset to default configuration
    Reset {
        /// Force reset without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, global: &GlobalOptions) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(global, json),
        ConfigCommand::Path => {
            println!("{}", global.config_path.display());
            Ok(())
        }
        ConfigCommand::Reset { force } => reset_config(global, force),
        ConfigCommand::Validate => validate_config(global),
    }
}

fn show_config(global: &GlobalOptions, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let config = global.load_config()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if global.config_path.exists() {
        println!("# {}", global.config_path.display().to_string().dimmed());
    } else {
        eprintln!(
            "{} {} not found, showing defaults. Run 'comment-sentiment config reset' to create it.",
            "⚠".yellow(),
            global.config_path.display()
        );
    }
    print!("{}", config.to_toml_string()?);

    Ok(())
}

fn reset_config(global: &GlobalOptions, force: bool) -> Result<()> {
    use colored::Colorize;

    let config_path = &global.config_path;

    if !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt("Reset configuration to defaults?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    // Backup existing
    if config_path.exists() {
        let backup_path = format!(
            "{}.backup-{}",
            config_path.display(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        fs::copy(config_path, &backup_path)?;
        println!("{} Backed up to {}", "✓".green(), backup_path);
    }

    let content = format!(
        "# comment-sentiment configuration\n\n{}",
        Config::default().to_toml_string()?
    );
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Configuration reset to defaults at {}",
        "✓".green(),
        config_path.display()
    );

    Ok(())
}

fn validate_config(global: &GlobalOptions) -> Result<()> {
    use colored::Colorize;

    let config_path = &global.config_path;

    if !config_path.exists() {
        eprintln!(
            "{} Configuration not found at {}; defaults will be used",
            "⚠".yellow(),
            config_path.display()
        );
        return Ok(());
    }

    let content = fs::read_to_string(config_path)?;

    let value = toml::from_str::<toml::Value>(&content)
        .with_context(|| format!("{} is not valid TOML", config_path.display()))?;
    println!("{} Configuration is valid TOML", "✓".green());

    let known = ["app", "classical", "neural", "fetch", "analysis"];
    if let Some(table) = value.as_table() {
        for key in table.keys().filter(|k| !known.contains(&k.as_str())) {
            println!("{} Unknown section [{}] is ignored", "⚠".yellow(), key);
        }
    }

    Config::from_toml_str(&content).context("Configuration values are invalid")?;
    println!("{} All values are within range", "✓".green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn global(dir: &TempDir) -> GlobalOptions {
        GlobalOptions {
            config_path: dir.path().join("nested/config.toml"),
        }
    }

    #[test]
    fn test_forced_reset_writes_loadable_defaults() {
        let temp = TempDir::new().unwrap();
        let global = global(&temp);

        reset_config(&global, true).unwrap();

        let loaded = Config::load_or_default(&global.config_path).unwrap();
        assert_eq!(loaded.app.max_comments, Config::default().app.max_comments);
    }

    #[test]
    fn test_validate_rejects_bad_band() {
        let temp = TempDir::new().unwrap();
        let global = GlobalOptions {
            config_path: temp.path().join("config.toml"),
        };
        fs::write(
            &global.config_path,
            "[neural]\nneutral_lower = 0.6\nneutral_upper = 0.4\n",
        )
        .unwrap();
        assert!(validate_config(&global).is_err());
    }

    #[test]
    fn test_validate_missing_file_is_ok() {
        let global = GlobalOptions {
            config_path: PathBuf::from("/nonexistent/config.toml"),
        };
        assert!(validate_config(&global).is_ok());
    }
}
