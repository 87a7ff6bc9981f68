//! Statistical classifier state
//!
//! Artifacts are loaded at most once per process. Missing artifacts are not an
//! error: they produce [`ClassifierState::Unavailable`], which the
//! orchestrator checks explicitly.

use super::model::LinearModel;
use super::vectorizer::TfidfVectorizer;
use crate::error::{Result, SentimentError};

/// A fitted vectorizer paired with the model trained on its features
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticalClassifier {
    vectorizer: TfidfVectorizer,
    model: LinearModel,
}

impl StatisticalClassifier {
    /// Pair a vectorizer with a model, checking that their feature spaces agree
    pub fn new(vectorizer: TfidfVectorizer, model: LinearModel) -> Result<Self> {
        if vectorizer.n_features() != model.n_features() {
            return Err(SentimentError::DimensionMismatch {
                expected: model.n_features(),
                got: vectorizer.n_features(),
            });
        }
        Ok(Self { vectorizer, model })
    }

    /// Label every text; output is index-aligned with the input
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>> {
        texts
            .iter()
            .map(|text| {
                let features = self.vectorizer.transform(text.as_ref());
                self.model.predict(&features).map(str::to_string)
            })
            .collect()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Labels the model can produce
    pub fn labels(&self) -> &[String] {
        self.model.classes()
    }
}

/// Whether the statistical classifier can be used for this process
#[derive(Debug, Clone)]
pub enum ClassifierState {
    Loaded(StatisticalClassifier),
    Unavailable { reason: String },
}

impl ClassifierState {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ClassifierState::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ClassifierState::Loaded(_))
    }

    pub fn as_loaded(&self) -> Option<&StatisticalClassifier> {
        match self {
            ClassifierState::Loaded(classifier) => Some(classifier),
            ClassifierState::Unavailable { .. } => None,
        }
    }

    /// Label every text. Calling this while unavailable is a usage error.
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>> {
        match self {
            ClassifierState::Loaded(classifier) => classifier.predict(texts),
            ClassifierState::Unavailable { reason } => {
                Err(SentimentError::ClassifierUnavailable(reason.clone()))
            }
        }
    }
}

/// Free-function form of [`ClassifierState::predict`]
pub fn predict<S: AsRef<str>>(texts: &[S], state: &ClassifierState) -> Result<Vec<String>> {
    state.predict(texts)
}
