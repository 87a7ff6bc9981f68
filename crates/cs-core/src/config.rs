//! Configuration management for comment-sentiment

use crate::error::{Result, SentimentError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Lower edge of the neutral confidence band (exclusive)
pub const DEFAULT_NEUTRAL_LOWER: f64 = 0.45;
/// Upper edge of the neutral confidence band (exclusive)
pub const DEFAULT_NEUTRAL_UPPER: f64 = 0.55;
/// Default pretrained binary sentiment model
pub const DEFAULT_NEURAL_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Statistical classifier settings
    pub classical: ClassicalConfig,
    /// Neural scorer settings
    pub neural: NeuralConfig,
    /// Comment fetch settings
    pub fetch: FetchConfig,
    /// Orchestration settings
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| e.with_context(format!("Invalid configuration in {}", path.display())))
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the few constraints the pipeline depends on
    pub fn validate(&self) -> Result<()> {
        let lower = self.neural.neutral_lower;
        let upper = self.neural.neutral_upper;
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
            return Err(SentimentError::Config(format!(
                "neutral band must satisfy 0 <= lower < upper <= 1, got ({}, {})",
                lower, upper
            )));
        }

        let (min_n, max_n) = self.classical.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(SentimentError::Config(format!(
                "ngram_range must satisfy 1 <= min <= max, got ({}, {})",
                min_n, max_n
            )));
        }

        if !(self.classical.test_size > 0.0 && self.classical.test_size < 1.0) {
            return Err(SentimentError::Config(format!(
                "test_size must be in (0, 1), got {}",
                self.classical.test_size
            )));
        }

        let classical = &self.classical;
        if !(classical.c.is_finite() && classical.c > 0.0) {
            return Err(SentimentError::Config(format!(
                "classical.c must be finite and positive, got {}",
                classical.c
            )));
        }
        if !(classical.learning_rate.is_finite() && classical.learning_rate > 0.0) {
            return Err(SentimentError::Config(format!(
                "classical.learning_rate must be finite and positive, got {}",
                classical.learning_rate
            )));
        }
        if classical.max_iter == 0 {
            return Err(SentimentError::Config(
                "classical.max_iter must be at least 1".to_string(),
            ));
        }

        if self.neural.batch_size == 0 {
            return Err(SentimentError::Config(
                "neural.batch_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum number of comments fetched per analysis
    pub max_comments: usize,
    /// Directory for analysis snapshots
    pub cache_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_comments: 500,
            cache_dir: PathBuf::from("cache"),
        }
    }
}

/// Statistical classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassicalConfig {
    /// Persisted vectorizer
    pub vectorizer_path: PathBuf,
    /// Persisted linear model
    pub model_path: PathBuf,
    /// Smallest and largest n-gram length
    pub ngram_range: (usize, usize),
    /// Vocabulary size cap
    pub max_features: usize,
    /// Inverse regularization strength
    pub c: f64,
    /// Gradient descent iterations
    pub max_iter: usize,
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Validation fraction of the training CSV
    pub test_size: f64,
    /// Shuffle seed for the train/validation split
    pub seed: u64,
}

impl Default for ClassicalConfig {
    fn default() -> Self {
        Self {
            vectorizer_path: PathBuf::from("artifacts/vectorizer.json"),
            model_path: PathBuf::from("artifacts/model.json"),
            ngram_range: (1, 2),
            max_features: 30000,
            c: 2.0,
            max_iter: 200,
            learning_rate: 1.0,
            test_size: 0.2,
            seed: 42,
        }
    }
}

/// Where the binary sentiment model runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeuralBackend {
    /// Hugging Face inference endpoint
    #[default]
    Hosted,
    /// In-process model loaded from safetensors weights
    Local,
}

/// Neural scorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuralConfig {
    pub backend: NeuralBackend,
    /// Model identifier passed to the inference backend
    pub model_name: String,
    /// Inference endpoint base URL (hosted backend)
    pub endpoint: String,
    /// Directory with `config.json`, `tokenizer.json` and `model.safetensors`
    /// (local backend). Unset means download `model_name` from the Hub.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_model_dir: Option<PathBuf>,
    /// Scores strictly above this and strictly below `neutral_upper` map to neutral
    pub neutral_lower: f64,
    pub neutral_upper: f64,
    /// Texts per model call
    pub batch_size: usize,
    /// Inputs longer than this many characters are clipped before scoring
    pub max_input_chars: usize,
    /// HTTP timeout
    pub timeout_secs: u64,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            backend: NeuralBackend::Hosted,
            model_name: DEFAULT_NEURAL_MODEL.to_string(),
            endpoint: "https://router.huggingface.co/hf-inference/models".to_string(),
            local_model_dir: None,
            neutral_lower: DEFAULT_NEUTRAL_LOWER,
            neutral_upper: DEFAULT_NEUTRAL_UPPER,
            batch_size: 32,
            max_input_chars: 2000,
            timeout_secs: 60,
        }
    }
}

/// Comment fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Comments requested per page (API maximum is 100)
    pub page_size: usize,
    /// `time` or `relevance`
    pub order: String,
    /// API base URL
    pub endpoint: String,
    /// HTTP timeout
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            order: "time".to_string(),
            endpoint: "https://www.googleapis.com/youtube/v3".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run both classifiers on separate threads
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}
