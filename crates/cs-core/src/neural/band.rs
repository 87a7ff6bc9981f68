//! Confidence-band mapping from binary model output to three-way labels

use crate::config::{NeuralConfig, DEFAULT_NEUTRAL_LOWER, DEFAULT_NEUTRAL_UPPER};
use crate::types::SentimentLabel;
use serde::{Deserialize, Serialize};

/// Raw output of a binary sentiment model for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    /// Label as the model emits it, e.g. `POSITIVE`
    pub label: String,
    /// Certainty in `label`, in `[0, 1]`
    pub score: f64,
}

impl RawPrediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// A raw label counts as positive when its lowercase form contains `pos`
    pub fn is_positive(&self) -> bool {
        self.label.to_lowercase().contains("pos")
    }
}

/// Three-way prediction derived from a [`RawPrediction`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralPrediction {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub raw_label: String,
}

/// Scores strictly inside `(lower, upper)` are treated as neutral.
///
/// Binary models have no neutral class; a score close to 0.5 means the model
/// itself could barely decide, and that is the only neutral signal used.
/// Both edges are exclusive: a score equal to `lower` or `upper` keeps its
/// binary polarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub lower: f64,
    pub upper: f64,
}

impl Default for ConfidenceBand {
    fn default() -> Self {
        Self {
            lower: DEFAULT_NEUTRAL_LOWER,
            upper: DEFAULT_NEUTRAL_UPPER,
        }
    }
}

impl ConfidenceBand {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn from_config(config: &NeuralConfig) -> Self {
        Self::new(config.neutral_lower, config.neutral_upper)
    }

    pub fn contains(&self, score: f64) -> bool {
        self.lower < score && score < self.upper
    }

    /// Map one raw prediction to the shared taxonomy
    pub fn map(&self, raw: &RawPrediction) -> NeuralPrediction {
        let label = if self.contains(raw.score) {
            SentimentLabel::Neutral
        } else if raw.is_positive() {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };
        NeuralPrediction {
            label,
            confidence: raw.score,
            raw_label: raw.label.clone(),
        }
    }
}
