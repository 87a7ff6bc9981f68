//! File system storage for analysis runs

use crate::atomic::{write_atomic, write_json_atomic};
use cs_core::analysis::{AnalysisRun, RunInfo, RunStorage};
use cs_core::error::{Result, SentimentError};
use cs_core::types::{ProtocolVersion, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Flat export of the most recent scored table
pub const LATEST_CSV: &str = "latest_comments_with_preds.csv";

const RUN_SCHEMA_VERSION: &str = "1.0";

#[derive(Serialize, Deserialize)]
struct RunFile {
    schema_version: String,
    run: AnalysisRun,
}

/// One row of the CSV export
#[derive(Serialize)]
struct CsvRow<'a> {
    author: &'a str,
    published_at: DateTime<Utc>,
    like_count: u64,
    text: &'a str,
    clean_text: &'a str,
    statistical_label: &'a str,
    neural_label: &'a str,
    neural_confidence: f64,
    neural_raw_label: &'a str,
}

/// Write the scored records of a run as CSV
pub fn export_csv(run: &AnalysisRun, path: &Path) -> Result<()> {
    write_atomic(path, |writer| {
        let mut csv = csv::Writer::from_writer(writer);
        for record in &run.records {
            let comment = &record.comment;
            csv.serialize(CsvRow {
                author: &comment.record.author,
                published_at: comment.record.published_at,
                like_count: comment.record.like_count,
                text: &comment.record.raw_text,
                clean_text: &comment.clean_text,
                statistical_label: record.statistical_label.as_deref().unwrap_or(""),
                neural_label: record.neural_label.as_str(),
                neural_confidence: record.neural_confidence,
                neural_raw_label: &record.neural_raw_label,
            })
            .map_err(|e| SentimentError::Dataset(format!("Failed to write CSV row: {}", e)))?;
        }
        csv.flush()?;
        Ok(())
    })
}

/// Runs as JSON files under `<cache_dir>/runs`, plus the latest CSV export
pub struct FileSystemRunStorage {
    base_dir: PathBuf,
    runs_dir: PathBuf,
}

impl FileSystemRunStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let runs_dir = base_dir.join("runs");
        fs::create_dir_all(&runs_dir).map_err(|e| {
            SentimentError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create runs directory: {}", e),
            ))
        })?;
        Ok(Self { base_dir, runs_dir })
    }

    /// Per-user cache directory, used when no cache directory is configured
    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("com", "comment-sentiment", "comment-sentiment")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".comment-sentiment")
                    .join("cache")
            })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn runs_dir(&self) -> &Path {
        &self.runs_dir
    }

    pub fn latest_csv_path(&self) -> PathBuf {
        self.base_dir.join(LATEST_CSV)
    }

    fn run_path(&self, id: &RunId) -> PathBuf {
        self.runs_dir.join(format!("{}.json", id))
    }

    fn read_run(&self, path: &Path) -> Result<AnalysisRun> {
        let file = fs::File::open(path)?;
        let run_file: RunFile = serde_json::from_reader(BufReader::new(file))?;

        let current = ProtocolVersion::parse(RUN_SCHEMA_VERSION).unwrap_or_default();
        match ProtocolVersion::parse(&run_file.schema_version) {
            Some(version) if version.is_compatible(&current) => Ok(run_file.run),
            _ => Err(SentimentError::UnsupportedSchemaVersion(format!(
                "run file {} has version {}",
                path.display(),
                run_file.schema_version
            ))),
        }
    }
}

impl RunStorage for FileSystemRunStorage {
    fn save(&self, run: &AnalysisRun) -> Result<()> {
        let file = RunFile {
            schema_version: RUN_SCHEMA_VERSION.to_string(),
            run: run.clone(),
        };
        write_json_atomic(&self.run_path(&run.id), &file)?;
        export_csv(run, &self.latest_csv_path())?;
        debug!("Saved run {} ({} records)", run.id, run.records.len());
        Ok(())
    }

    fn load(&self, id: &RunId) -> Result<AnalysisRun> {
        let path = self.run_path(id);
        if !path.exists() {
            return Err(SentimentError::RunNotFound(id.to_string()));
        }
        self.read_run(&path)
    }

    fn list(&self) -> Result<Vec<RunInfo>> {
        let mut runs = Vec::new();

        let entries = fs::read_dir(&self.runs_dir).map_err(|e| {
            SentimentError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read runs directory: {}", e),
            ))
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            // Skip non-json and temp files
            if !path.extension().map(|e| e == "json").unwrap_or(false) {
                continue;
            }
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }

            match self.read_run(&path) {
                Ok(run) => runs.push(RunInfo::from(&run)),
                Err(e) => warn!("Failed to read run file {:?}: {}", path, e),
            }
        }

        runs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(runs)
    }
}
