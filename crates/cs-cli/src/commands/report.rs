//! Report command
//!
//! Summarize the latest or a given analysis run.

use super::{open_run_storage, GlobalOptions};
use anyhow::{Context, Result};
use clap::Args;
use cs_core::analysis::RunStorage;
use cs_core::report::AnalysisSummary;
use cs_core::types::RunId;

/// Arguments for the report command
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Run ID to summarize (defaults to the latest run)
    #[arg(long)]
    pub run: Option<String>,

    /// Number of top tokens to list
    #[arg(long, default_value_t = 25)]
    pub top: usize,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the report command
pub fn execute(args: ReportArgs, global: &GlobalOptions) -> Result<()> {
    use colored::Colorize;

    let config = global.load_config()?;
    let storage = open_run_storage(&config)?;

    let run = match &args.run {
        Some(id) => {
            let id = RunId::from_string(id).context(format!("Invalid run ID: {}", id))?;
            storage
                .load(&id)
                .context(format!("Run '{}' not found", id))?
        }
        None => storage
            .latest()?
            .context("No saved runs found. Run 'comment-sentiment analyze' first")?,
    };

    let summary = AnalysisSummary::from_records(&run.records, args.top);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Run".bold(),
        run.id.to_string().cyan()
    );
    println!("  Source:   {}", run.source);
    println!("  Created:  {}", run.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Comments: {}", summary.total);
    for advisory in &run.advisories {
        println!("  {} {}", "⚠".yellow(), advisory);
    }

    println!("\n{} ({})", "Neural sentiment".bold().underline(), run.neural_model);
    for share in &summary.neural {
        println!("  {:<10} {:>5} ({:.1}%)", share.label, share.count, share.percent);
    }

    if summary.statistical.is_empty() {
        println!("\n{}", "Statistical sentiment: unavailable".dimmed());
    } else {
        println!("\n{}", "Statistical sentiment".bold().underline());
        for share in &summary.statistical {
            println!("  {:<10} {:>5} ({:.1}%)", share.label, share.count, share.percent);
        }
    }

    if let Some(agreement) = summary.agreement {
        println!(
            "\n{} {:.1}% ({} of {})",
            "Agreement:".bold(),
            agreement.rate() * 100.0,
            agreement.agreed,
            agreement.compared
        );
    }

    if !summary.top_tokens.is_empty() {
        println!("\n{}", "Top tokens".bold().underline());
        for token in &summary.top_tokens {
            println!("  {:<20} {:>5}", token.token, token.count);
        }
    }

    Ok(())
}
