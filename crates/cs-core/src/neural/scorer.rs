//! Neural scorer over an external binary sentiment model

use super::band::{ConfidenceBand, NeuralPrediction, RawPrediction};
use crate::config::NeuralConfig;
use crate::error::{Result, SentimentError};
use tracing::debug;

/// Capability interface of a pretrained binary (positive/negative) classifier.
///
/// Implementations own truncation: any input length must be accepted.
pub trait BinarySentimentModel: Send + Sync {
    /// Identifier of the underlying model
    fn model_id(&self) -> &str;

    /// One raw prediction per input text, in input order
    fn classify(&self, texts: &[String]) -> Result<Vec<RawPrediction>>;
}

impl<M: BinarySentimentModel + ?Sized> BinarySentimentModel for Box<M> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn classify(&self, texts: &[String]) -> Result<Vec<RawPrediction>> {
        (**self).classify(texts)
    }
}

/// Wraps a binary model and maps its output to three-way labels
pub struct NeuralScorer<M: BinarySentimentModel> {
    model: M,
    band: ConfidenceBand,
    batch_size: usize,
}

impl<M: BinarySentimentModel> NeuralScorer<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            band: ConfidenceBand::default(),
            batch_size: 32,
        }
    }

    pub fn from_config(model: M, config: &NeuralConfig) -> Self {
        Self {
            model,
            band: ConfidenceBand::from_config(config),
            batch_size: config.batch_size.max(1),
        }
    }

    pub fn with_band(mut self, band: ConfidenceBand) -> Self {
        self.band = band;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn band(&self) -> ConfidenceBand {
        self.band
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Score every text. Any model failure fails the whole call.
    pub fn score(&self, texts: &[String]) -> Result<Vec<NeuralPrediction>> {
        let mut out = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let raw = self.model.classify(chunk)?;
            if raw.len() != chunk.len() {
                return Err(SentimentError::model(
                    self.model.model_id(),
                    format!("returned {} predictions for {} inputs", raw.len(), chunk.len()),
                ));
            }
            out.extend(raw.iter().map(|r| self.band.map(r)));
        }

        debug!("Scored {} texts with {}", out.len(), self.model.model_id());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Positive when the text mentions "good", with a score taken from its length
    struct KeywordModel {
        calls: AtomicUsize,
    }

    impl KeywordModel {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl BinarySentimentModel for KeywordModel {
        fn model_id(&self) -> &str {
            "keyword"
        }

        fn classify(&self, texts: &[String]) -> Result<Vec<RawPrediction>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let label = if t.contains("good") { "POSITIVE" } else { "NEGATIVE" };
                    let score = if t.contains("meh") { 0.5 } else { 0.95 };
                    RawPrediction::new(label, score)
                })
                .collect())
        }
    }

    struct ShortModel;

    impl BinarySentimentModel for ShortModel {
        fn model_id(&self) -> &str {
            "short"
        }

        fn classify(&self, texts: &[String]) -> Result<Vec<RawPrediction>> {
            Ok(texts
                .iter()
                .skip(1)
                .map(|_| RawPrediction::new("POSITIVE", 0.9))
                .collect())
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_score_maps_labels() {
        let scorer = NeuralScorer::new(KeywordModel::new());
        let out = scorer.score(&texts(&["good stuff", "bad stuff", "good meh"])).unwrap();
        assert_eq!(out[0].label, SentimentLabel::Positive);
        assert_eq!(out[1].label, SentimentLabel::Negative);
        assert_eq!(out[2].label, SentimentLabel::Neutral);
        assert_eq!(out[2].raw_label, "POSITIVE");
    }

    #[test]
    fn test_empty_input_skips_model() {
        let scorer = NeuralScorer::new(KeywordModel::new());
        assert!(scorer.score(&[]).unwrap().is_empty());
        assert_eq!(scorer.model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_batches_preserve_order() {
        let scorer = NeuralScorer::new(KeywordModel::new()).with_batch_size(2);
        let input = texts(&["good", "bad", "good", "bad", "good"]);
        let out = scorer.score(&input).unwrap();
        assert_eq!(scorer.model.calls.load(Ordering::SeqCst), 3);
        let labels: Vec<_> = out.iter().map(|p| p.label).collect();
        assert_eq!(
            labels,
            vec![
                SentimentLabel::Positive,
                SentimentLabel::Negative,
                SentimentLabel::Positive,
                SentimentLabel::Negative,
                SentimentLabel::Positive,
            ]
        );
    }

    #[test]
    fn test_wrong_prediction_count_fails() {
        let scorer = NeuralScorer::new(ShortModel);
        let err = scorer.score(&texts(&["a", "b"])).unwrap_err();
        assert!(matches!(err, SentimentError::Model { .. }));
    }

    #[test]
    fn test_custom_band_from_config() {
        let config = NeuralConfig {
            neutral_lower: 0.4,
            neutral_upper: 0.96,
            ..NeuralConfig::default()
        };
        let scorer = NeuralScorer::from_config(KeywordModel::new(), &config);
        let out = scorer.score(&texts(&["good"])).unwrap();
        assert_eq!(out[0].label, SentimentLabel::Neutral);
    }
}
