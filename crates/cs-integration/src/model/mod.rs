//! Binary sentiment model backends

mod huggingface;
#[cfg(feature = "local-model")]
mod local;

pub use huggingface::HuggingFaceModel;
#[cfg(feature = "local-model")]
pub use local::LocalDistilBert;

use cs_core::config::{NeuralBackend, NeuralConfig};
use cs_core::error::Result;
use cs_core::neural::BinarySentimentModel;

/// Build the backend selected by `config.backend`
pub fn from_config(
    config: &NeuralConfig,
    token: Option<String>,
) -> Result<Box<dyn BinarySentimentModel>> {
    match config.backend {
        NeuralBackend::Hosted => Ok(Box::new(HuggingFaceModel::new(config, token)?)),
        NeuralBackend::Local => local_backend(config),
    }
}

#[cfg(feature = "local-model")]
fn local_backend(config: &NeuralConfig) -> Result<Box<dyn BinarySentimentModel>> {
    Ok(Box::new(LocalDistilBert::load(config)?))
}

#[cfg(not(feature = "local-model"))]
fn local_backend(_config: &NeuralConfig) -> Result<Box<dyn BinarySentimentModel>> {
    Err(cs_core::error::SentimentError::Config(
        "neural.backend = \"local\" needs a build with the `local-model` feature".to_string(),
    ))
}
