//! Offline training of the statistical classifier
//!
//! Training is a single pass: drop unusable rows, split 80/20 stratified by
//! label, fit vectorizer and model on the training part, score the held-out
//! part, then hand both artifacts to an [`ArtifactStore`]. Rerunning
//! overwrites the previous artifacts.

use super::classifier::StatisticalClassifier;
use super::metrics::ClassificationReport;
use super::model::{FitParams, LinearModel};
use super::persistence::ArtifactStore;
use super::vectorizer::TfidfVectorizer;
use crate::config::ClassicalConfig;
use crate::error::{Result, SentimentError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// One labeled row of the training CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: String,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Train/validation partition
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: Vec<TrainingExample>,
    pub validation: Vec<TrainingExample>,
}

/// Partition examples so every label keeps roughly the same share in both parts.
///
/// Each label contributes `round(count * test_size)` rows to validation, at
/// least one when it has two or more rows, and never all of them.
pub fn stratified_split(
    examples: Vec<TrainingExample>,
    test_size: f64,
    seed: u64,
) -> Result<DatasetSplit> {
    let mut by_label: BTreeMap<String, Vec<TrainingExample>> = BTreeMap::new();
    for example in examples {
        by_label.entry(example.label.clone()).or_default().push(example);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut validation = Vec::new();

    for (_, mut group) in by_label {
        group.shuffle(&mut rng);
        let len = group.len();
        let n_val = if len < 2 {
            0
        } else {
            ((len as f64 * test_size).round() as usize).clamp(1, len - 1)
        };
        let rest = group.split_off(n_val);
        validation.extend(group);
        train.extend(rest);
    }

    if validation.is_empty() {
        return Err(SentimentError::Training(
            "not enough rows per label to hold out a validation set".to_string(),
        ));
    }

    train.shuffle(&mut rng);
    validation.shuffle(&mut rng);
    Ok(DatasetSplit { train, validation })
}

/// Everything produced by one training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub classifier: StatisticalClassifier,
    pub report: ClassificationReport,
    /// Held-out rows, in the order they were scored
    pub validation: Vec<TrainingExample>,
    /// Predictions for `validation`, index-aligned
    pub validation_predictions: Vec<String>,
    pub train_size: usize,
}

/// Fit vectorizer and model and evaluate on a stratified hold-out
pub fn train(examples: Vec<TrainingExample>, config: &ClassicalConfig) -> Result<TrainingOutcome> {
    let before = examples.len();
    let examples: Vec<TrainingExample> = examples
        .into_iter()
        .filter(|e| !e.text.trim().is_empty() && !e.label.trim().is_empty())
        .map(|e| TrainingExample::new(e.text, e.label.trim()))
        .collect();
    if examples.len() < before {
        info!("Dropped {} rows with empty text or label", before - examples.len());
    }

    if examples.len() < 2 {
        return Err(SentimentError::Training(format!(
            "need at least 2 labeled rows, got {}",
            examples.len()
        )));
    }

    let split = stratified_split(examples, config.test_size, config.seed)?;
    let train_texts: Vec<&str> = split.train.iter().map(|e| e.text.as_str()).collect();
    let train_labels: Vec<String> = split.train.iter().map(|e| e.label.clone()).collect();

    let mut vectorizer = TfidfVectorizer::new(config.ngram_range, Some(config.max_features));
    vectorizer.fit(&train_texts)?;
    let features = vectorizer.transform_batch(&train_texts);

    let params = FitParams {
        c: config.c,
        max_iter: config.max_iter,
        learning_rate: config.learning_rate,
    };
    let model = LinearModel::fit(&features, &train_labels, vectorizer.n_features(), params)?;
    let classifier = StatisticalClassifier::new(vectorizer, model)?;

    let validation_texts: Vec<&str> = split.validation.iter().map(|e| e.text.as_str()).collect();
    let validation_predictions = classifier.predict(&validation_texts)?;
    let expected: Vec<&str> = split.validation.iter().map(|e| e.label.as_str()).collect();
    let report = ClassificationReport::from_predictions(&expected, &validation_predictions);

    info!(
        "Trained on {} rows, validated on {}: accuracy {:.4}",
        split.train.len(),
        split.validation.len(),
        report.accuracy
    );

    Ok(TrainingOutcome {
        classifier,
        report,
        validation: split.validation,
        validation_predictions,
        train_size: split.train.len(),
    })
}

/// Train, then persist both artifacts through `store`
pub fn train_and_persist(
    examples: Vec<TrainingExample>,
    config: &ClassicalConfig,
    store: &dyn ArtifactStore,
) -> Result<TrainingOutcome> {
    let outcome = train(examples, config)?;
    store.save(&outcome.classifier)?;
    info!("Saved classifier artifacts to {}", store.location());
    Ok(outcome)
}
