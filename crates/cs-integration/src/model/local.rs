//! In-process DistilBERT sequence classifier on candle

use super::huggingface::clip;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{linear, ops::softmax, Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use cs_core::config::NeuralConfig;
use cs_core::error::{Result, SentimentError};
use cs_core::neural::{BinarySentimentModel, RawPrediction};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

/// Longest token sequence the position embeddings cover
const MAX_TOKENS: usize = 512;

/// Fields of `config.json` the classification head needs
#[derive(Debug, Deserialize)]
struct HeadConfig {
    dim: usize,
    #[serde(default)]
    id2label: HashMap<String, String>,
}

impl HeadConfig {
    /// Labels ordered by class index
    fn labels(&self) -> Result<Vec<String>> {
        let mut labels = Vec::with_capacity(self.id2label.len());
        for idx in 0..self.id2label.len() {
            let label = self.id2label.get(&idx.to_string()).ok_or_else(|| {
                SentimentError::Config(format!("id2label has no entry for class {}", idx))
            })?;
            labels.push(label.clone());
        }
        if labels.len() < 2 {
            return Err(SentimentError::Config(format!(
                "a binary classifier needs 2 labels, config has {}",
                labels.len()
            )));
        }
        Ok(labels)
    }
}

/// Files making up one checkpoint
struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: PathBuf,
}

impl ModelFiles {
    fn from_dir(dir: &Path) -> Result<Self> {
        let files = Self {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights: dir.join("model.safetensors"),
        };
        for path in [&files.config, &files.tokenizer, &files.weights] {
            if !path.exists() {
                return Err(SentimentError::FileNotFound(path.clone()));
            }
        }
        Ok(files)
    }

    fn from_hub(model_name: &str) -> Result<Self> {
        let hub_err = |e: hf_hub::api::sync::ApiError| SentimentError::model(model_name, e.to_string());
        let api = Api::new().map_err(hub_err)?;
        let repo = api.repo(Repo::new(model_name.to_string(), RepoType::Model));
        Ok(Self {
            config: repo.get("config.json").map_err(hub_err)?,
            tokenizer: repo.get("tokenizer.json").map_err(hub_err)?,
            weights: repo.get("model.safetensors").map_err(hub_err)?,
        })
    }
}

/// DistilBERT encoder with the `pre_classifier` / `classifier` head of a
/// sequence classification checkpoint. Runs on the CPU, one text per forward
/// pass, so no padding or attention masking is involved.
pub struct LocalDistilBert {
    model_name: String,
    encoder: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    device: Device,
    max_input_chars: usize,
}

impl LocalDistilBert {
    /// Load from `local_model_dir`, or from the Hub cache when it is unset
    pub fn load(config: &NeuralConfig) -> Result<Self> {
        let files = match &config.local_model_dir {
            Some(dir) => ModelFiles::from_dir(dir)?,
            None => ModelFiles::from_hub(&config.model_name)?,
        };
        Self::from_files(&config.model_name, &files, config.max_input_chars)
    }

    fn from_files(model_name: &str, files: &ModelFiles, max_input_chars: usize) -> Result<Self> {
        let candle_err = |e: candle_core::Error| SentimentError::model(model_name, e.to_string());
        let device = Device::Cpu;

        let raw = std::fs::read_to_string(&files.config)?;
        let encoder_config: DistilBertConfig = serde_json::from_str(&raw)?;
        let head: HeadConfig = serde_json::from_str(&raw)?;
        let labels = head.labels()?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(|e| {
            SentimentError::model(
                model_name,
                format!("loading tokenizer from {}: {}", files.tokenizer.display(), e),
            )
        })?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| SentimentError::model(model_name, e.to_string()))?;

        // SAFETY: the weights file is only read, and not modified while mapped
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, &device)
                .map_err(candle_err)?
        };
        let encoder = DistilBertModel::load(vb.pp("distilbert"), &encoder_config).map_err(candle_err)?;
        let pre_classifier = linear(head.dim, head.dim, vb.pp("pre_classifier")).map_err(candle_err)?;
        let classifier = linear(head.dim, labels.len(), vb.pp("classifier")).map_err(candle_err)?;

        info!("Loaded {} locally with labels {:?}", model_name, labels);
        Ok(Self {
            model_name: model_name.to_string(),
            encoder,
            pre_classifier,
            classifier,
            tokenizer,
            labels,
            device,
            max_input_chars: max_input_chars.max(1),
        })
    }

    /// Class probabilities for one text
    fn probabilities(&self, text: &str) -> candle_core::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(clip(text, self.max_input_chars), true)
            .map_err(candle_core::Error::msg)?;
        let ids = encoding.get_ids();

        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let mask = Tensor::zeros((ids.len(), ids.len()), DType::U8, &self.device)?;
        let hidden = self.encoder.forward(&input_ids, &mask)?;

        let cls = hidden.i((.., 0))?;
        let pooled = self.pre_classifier.forward(&cls)?.relu()?;
        let logits = self.classifier.forward(&pooled)?;
        softmax(&logits, D::Minus1)?.squeeze(0)?.to_vec1::<f32>()
    }

    fn predict(&self, text: &str) -> Result<RawPrediction> {
        let probs = self
            .probabilities(text)
            .map_err(|e| SentimentError::model(&self.model_name, e.to_string()))?;
        top_prediction(&self.labels, &probs)
            .ok_or_else(|| SentimentError::model(&self.model_name, "model produced no scores"))
    }
}

/// Highest-probability label; ties go to the lower class index
fn top_prediction(labels: &[String], probs: &[f32]) -> Option<RawPrediction> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &p) in probs.iter().enumerate().take(labels.len()) {
        if best.map_or(true, |(_, b)| p > b) {
            best = Some((idx, p));
        }
    }
    best.map(|(idx, p)| RawPrediction::new(labels[idx].clone(), f64::from(p)))
}

impl BinarySentimentModel for LocalDistilBert {
    fn model_id(&self) -> &str {
        &self.model_name
    }

    fn classify(&self, texts: &[String]) -> Result<Vec<RawPrediction>> {
        let out = texts
            .iter()
            .map(|t| self.predict(t))
            .collect::<Result<Vec<_>>>()?;
        debug!("Classified {} texts locally", texts.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels() -> Vec<String> {
        vec!["NEGATIVE".to_string(), "POSITIVE".to_string()]
    }

    #[test]
    fn test_head_config_orders_labels_by_index() {
        let head: HeadConfig = serde_json::from_str(
            r#"{"dim": 768, "id2label": {"1": "POSITIVE", "0": "NEGATIVE"}, "n_layers": 6}"#,
        )
        .unwrap();
        assert_eq!(head.labels().unwrap(), labels());
    }

    #[test]
    fn test_head_config_needs_two_contiguous_labels() {
        let head: HeadConfig = serde_json::from_str(r#"{"dim": 8}"#).unwrap();
        assert!(matches!(head.labels(), Err(SentimentError::Config(_))));

        let head: HeadConfig =
            serde_json::from_str(r#"{"dim": 8, "id2label": {"0": "NEGATIVE", "2": "POSITIVE"}}"#)
                .unwrap();
        assert!(head.labels().is_err());
    }

    #[test]
    fn test_top_prediction() {
        let p = top_prediction(&labels(), &[0.2, 0.8]).unwrap();
        assert_eq!(p.label, "POSITIVE");
        assert!((p.score - 0.8).abs() < 1e-6);

        let p = top_prediction(&labels(), &[0.5, 0.5]).unwrap();
        assert_eq!(p.label, "NEGATIVE");

        assert!(top_prediction(&labels(), &[]).is_none());
    }

    #[test]
    fn test_missing_model_dir_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = NeuralConfig {
            local_model_dir: Some(dir.path().to_path_buf()),
            ..NeuralConfig::default()
        };
        let err = LocalDistilBert::load(&config).err().unwrap();
        assert!(matches!(err, SentimentError::FileNotFound(_)));
    }
}
