//! Analyze command
//!
//! Fetch comments, score them with both classifiers and save the run.

use super::{open_run_storage, GlobalOptions};
use anyhow::{bail, Context, Result};
use clap::Args;
use cs_core::analysis::{AnalysisRun, Pipeline, RunSource, RunStorage};
use cs_core::classical::ArtifactStore;
use cs_core::report::AnalysisSummary;
use cs_core::types::{CommentRecord, SentimentLabel};
use cs_integration::{model, CommentSource, YouTubeClient};
use cs_storage::{load_comments_json, FileSystemArtifactStore};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Rows shown in the comparison table
const PREVIEW_ROWS: usize = 20;

/// Arguments for the analyze command
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Video to fetch comments for
    #[arg(long, conflicts_with = "input", required_unless_present = "input")]
    pub video_id: Option<String>,

    /// Analyze a JSON array of comment records instead of fetching
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Maximum number of comments to fetch
    #[arg(long)]
    pub max_comments: Option<usize>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Print the full run as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not save the run to the cache directory
    #[arg(long)]
    pub no_save: bool,
}

/// Execute the analyze command
pub fn execute(args: AnalyzeArgs, global: &GlobalOptions) -> Result<()> {
    use colored::Colorize;

    let config = global.load_config()?;
    let max_comments = args.max_comments.unwrap_or(config.app.max_comments);

    let (source, comments) = match (&args.video_id, &args.input) {
        (_, Some(path)) => {
            let comments = load_comments_json(path)
                .with_context(|| format!("Failed to read comments from {}", path.display()))?;
            let comments: Vec<CommentRecord> = comments.into_iter().take(max_comments).collect();
            (RunSource::File { path: path.clone() }, comments)
        }
        (Some(video_id), None) => {
            let api_key = args.api_key.clone().unwrap_or_default();
            let client = YouTubeClient::new(api_key, &config.fetch)?;
            let comments = fetch_with_progress(&client, video_id, max_comments, args.json)
                .with_context(|| format!("Failed to fetch comments for {}", video_id))?;
            (
                RunSource::Video {
                    video_id: video_id.clone(),
                },
                comments,
            )
        }
        (None, None) => bail!("Either --video-id or --input is required"),
    };

    if comments.is_empty() {
        eprintln!("{} No comments found for {}", "⚠".yellow(), source);
        return Ok(());
    }

    let artifacts = FileSystemArtifactStore::from_config(&config.classical);
    let classifier = artifacts.load().with_context(|| {
        format!(
            "Failed to load classifier artifacts ({})",
            artifacts.location()
        )
    })?;
    let model = model::from_config(&config.neural, std::env::var("HF_TOKEN").ok())
        .context("Failed to set up the neural model")?;
    let pipeline = Pipeline::from_config(classifier, model, &config);

    let run = pipeline.run(source, comments).context("Analysis failed")?;

    for advisory in &run.advisories {
        eprintln!("{} {}", "⚠".yellow(), advisory);
    }

    if !args.no_save {
        let storage = open_run_storage(&config)?;
        storage.save(&run).context("Failed to save run")?;
        if !args.json {
            println!(
                "{} Saved run {} ({})",
                "✓".green(),
                run.id.to_string().cyan(),
                storage.latest_csv_path().display()
            );
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_run(&run);
    }

    Ok(())
}

fn fetch_with_progress(
    client: &dyn CommentSource,
    video_id: &str,
    max_comments: usize,
    quiet: bool,
) -> Result<Vec<CommentRecord>> {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(max_comments as u64)
    };
    bar.set_style(
        ProgressStyle::with_template("Fetching comments {bar:30} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let result = client.fetch_with_progress(video_id, max_comments, &mut |count: usize| {
        bar.set_position(count as u64)
    });
    bar.finish_and_clear();
    Ok(result?)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

fn paint(label: SentimentLabel) -> colored::ColoredString {
    use colored::Colorize;

    match label {
        SentimentLabel::Positive => label.as_str().green(),
        SentimentLabel::Negative => label.as_str().red(),
        SentimentLabel::Neutral => label.as_str().yellow(),
    }
}

fn print_run(run: &AnalysisRun) {
    use colored::Colorize;

    println!(
        "\n{} ({} comments from {})",
        "Comparison".bold().underline(),
        run.records.len(),
        run.source
    );
    println!(
        "{:<50} {:<12} {:<10} {:>6}",
        "text", "statistical", "neural", "score"
    );
    for record in run.records.iter().take(PREVIEW_ROWS) {
        println!(
            "{:<50} {:<12} {:<10} {:>6.3}",
            truncate(&record.comment.record.raw_text.replace('\n', " "), 50),
            record.statistical_label.as_deref().unwrap_or("-"),
            paint(record.neural_label),
            record.neural_confidence
        );
    }
    if run.records.len() > PREVIEW_ROWS {
        println!("{}", format!("... {} more", run.records.len() - PREVIEW_ROWS).dimmed());
    }

    let summary = AnalysisSummary::from_records(&run.records, 0);
    println!("\n{} ({})", "Neural sentiment".bold().underline(), run.neural_model);
    for share in &summary.neural {
        println!("  {:<10} {:>5} ({:.1}%)", share.label, share.count, share.percent);
    }
    if let Some(agreement) = summary.agreement {
        println!(
            "\n{} {:.1}% of {} comments",
            "Agreement (statistical vs neural):".bold(),
            agreement.rate() * 100.0,
            agreement.compared
        );
    }
}
