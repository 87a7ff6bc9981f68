//! Loaders for labeled training data and offline comment files

use cs_core::classical::TrainingExample;
use cs_core::error::{Result, SentimentError};
use cs_core::types::CommentRecord;
use serde::Deserialize;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct LabeledRow {
    text: String,
    label: String,
}

/// Parse a `text,label` CSV with a header row
pub fn read_training_csv<R: Read>(reader: R) -> Result<Vec<TrainingExample>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| SentimentError::Dataset(format!("Failed to read CSV header: {}", e)))?;
    for column in ["text", "label"] {
        if !headers.iter().any(|h| h == column) {
            return Err(SentimentError::Dataset(format!(
                "CSV is missing required column '{}'",
                column
            )));
        }
    }

    let mut examples = Vec::new();
    for (line, result) in reader.deserialize::<LabeledRow>().enumerate() {
        let row = result.map_err(|e| {
            SentimentError::Dataset(format!("Malformed CSV row {}: {}", line + 2, e))
        })?;
        examples.push(TrainingExample::new(row.text, row.label.trim()));
    }
    Ok(examples)
}

/// Load a training CSV from disk
pub fn load_training_csv(path: &Path) -> Result<Vec<TrainingExample>> {
    if !path.exists() {
        return Err(SentimentError::FileNotFound(path.to_path_buf()));
    }
    let file = fs::File::open(path)?;
    let examples = read_training_csv(BufReader::new(file))
        .map_err(|e| e.with_context(format!("loading {}", path.display())))?;
    debug!("Loaded {} training rows from {:?}", examples.len(), path);
    Ok(examples)
}

/// Load a JSON array of comment records
pub fn load_comments_json(path: &Path) -> Result<Vec<CommentRecord>> {
    if !path.exists() {
        return Err(SentimentError::FileNotFound(path.to_path_buf()));
    }
    let file = fs::File::open(path)?;
    let records: Vec<CommentRecord> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SentimentError::Dataset(format!("{}: {}", path.display(), e)))?;
    debug!("Loaded {} comments from {:?}", records.len(), path);
    Ok(records)
}
