//! Error types for comment-sentiment

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for comment-sentiment
#[derive(Debug, Error)]
pub enum SentimentError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Malformed training or comment dataset
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis run not found
    #[error("Run not found: {0}")]
    RunNotFound(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported artifact schema version
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    /// Vectorizer and model were not produced by the same training run
    #[error("Artifact mismatch: vectorizer fingerprint {vectorizer}, model expects {model}")]
    ArtifactMismatch { vectorizer: String, model: String },

    /// Statistical classifier used while its artifacts are unavailable
    #[error("Statistical classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Feature dimension does not match the trained model
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Training could not be performed
    #[error("Training error: {0}")]
    Training(String),

    /// External neural model call failed
    #[error("Model '{model}' failed: {message}")]
    Model { model: String, message: String },

    /// External comment fetch failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SentimentError>,
    },
}

impl SentimentError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SentimentError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a model failure for the given model id
    pub fn model(model: impl Into<String>, message: impl Into<String>) -> Self {
        SentimentError::Model {
            model: model.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for SentimentError {
    fn from(err: toml::de::Error) -> Self {
        SentimentError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for SentimentError {
    fn from(err: toml::ser::Error) -> Self {
        SentimentError::Toml(err.to_string())
    }
}

/// Result type alias for comment-sentiment
pub type Result<T> = std::result::Result<T, SentimentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SentimentError::ClassifierUnavailable("artifacts missing".to_string());
        assert_eq!(
            err.to_string(),
            "Statistical classifier unavailable: artifacts missing"
        );
    }

    #[test]
    fn test_model_error_display() {
        let err = SentimentError::model("distilbert", "HTTP 503");
        assert_eq!(err.to_string(), "Model 'distilbert' failed: HTTP 503");
    }

    #[test]
    fn test_error_with_context() {
        let err = SentimentError::Training("only one class".to_string());
        let err = err.with_context("Failed to train classifier");
        assert!(err.to_string().contains("Failed to train classifier"));
        assert!(err.to_string().contains("only one class"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SentimentError = io_err.into();
        assert!(matches!(err, SentimentError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("not = = toml").unwrap_err();
        let err: SentimentError = toml_err.into();
        assert!(matches!(err, SentimentError::Toml(_)));
    }
}
