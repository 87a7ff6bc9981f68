//! Binary sentiment model served by the Hugging Face inference API

use cs_core::config::NeuralConfig;
use cs_core::error::{Result, SentimentError};
use cs_core::neural::{BinarySentimentModel, RawPrediction};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [&'a str],
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    truncation: bool,
}

/// One label list per input, or a flat list: all labels of a single input,
/// or the top label of each input
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<Vec<RawPrediction>>),
    Flat(Vec<RawPrediction>),
    Error { error: String },
}

/// Clip to at most `max_chars` characters on a char boundary
pub(crate) fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Highest-scoring label of one input
fn top_label(mut labels: Vec<RawPrediction>) -> Option<RawPrediction> {
    labels.sort_by(|a, b| b.score.total_cmp(&a.score));
    labels.into_iter().next()
}

/// Reduce a response to one prediction per input
fn into_predictions(
    model: &str,
    response: InferenceResponse,
    inputs: usize,
) -> Result<Vec<RawPrediction>> {
    let per_input = match response {
        InferenceResponse::Batch(batch) => batch,
        InferenceResponse::Flat(labels) if inputs == 1 => vec![labels],
        InferenceResponse::Flat(labels) => labels.into_iter().map(|l| vec![l]).collect(),
        InferenceResponse::Error { error } => return Err(SentimentError::model(model, error)),
    };

    per_input
        .into_iter()
        .map(|labels| {
            if let Some(bad) = labels.iter().find(|l| !(0.0..=1.0).contains(&l.score)) {
                return Err(SentimentError::model(
                    model,
                    format!("score {} for label {} is outside [0, 1]", bad.score, bad.label),
                ));
            }
            top_label(labels)
                .ok_or_else(|| SentimentError::model(model, "empty label list in response"))
        })
        .collect()
}

/// Remote text-classification model. Calls are blocking and never retried.
pub struct HuggingFaceModel {
    client: Client,
    url: String,
    model_name: String,
    token: Option<String>,
    max_input_chars: usize,
}

impl HuggingFaceModel {
    pub fn new(config: &NeuralConfig, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SentimentError::model(&config.model_name, format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}",
                config.endpoint.trim_end_matches('/'),
                config.model_name
            ),
            model_name: config.model_name.clone(),
            token: token.filter(|t| !t.trim().is_empty()),
            max_input_chars: config.max_input_chars.max(1),
        })
    }
}

impl BinarySentimentModel for HuggingFaceModel {
    fn model_id(&self) -> &str {
        &self.model_name
    }

    fn classify(&self, texts: &[String]) -> Result<Vec<RawPrediction>> {
        let inputs: Vec<&str> = texts
            .iter()
            .map(|t| clip(t, self.max_input_chars))
            .collect();
        let body = InferenceRequest {
            inputs: &inputs,
            parameters: InferenceParameters { truncation: true },
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| SentimentError::model(&self.model_name, format!("request failed: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| SentimentError::model(&self.model_name, format!("reading response: {}", e)))?;

        let parsed: InferenceResponse = serde_json::from_str(&text).map_err(|_| {
            SentimentError::model(
                &self.model_name,
                format!("unexpected response ({}): {}", status, clip(&text, 200)),
            )
        })?;
        if !status.is_success() {
            if let InferenceResponse::Error { error } = parsed {
                return Err(SentimentError::model(
                    &self.model_name,
                    format!("{} ({})", error, status),
                ));
            }
            return Err(SentimentError::model(&self.model_name, format!("HTTP {}", status)));
        }

        debug!("Classified {} texts remotely", texts.len());
        into_predictions(&self.model_name, parsed, texts.len())
    }
}
