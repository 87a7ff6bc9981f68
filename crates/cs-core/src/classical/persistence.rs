//! Artifact file formats and the storage trait

use super::classifier::{ClassifierState, StatisticalClassifier};
use super::model::LinearModel;
use super::vectorizer::TfidfVectorizer;
use crate::error::{Result, SentimentError};
use crate::types::ProtocolVersion;
use serde::{Deserialize, Serialize};

/// Current artifact schema version
pub const ARTIFACT_SCHEMA_VERSION: &str = "1.0";

/// On-disk form of the vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerFile {
    pub schema_version: String,
    pub fingerprint: String,
    pub vectorizer: TfidfVectorizer,
}

/// On-disk form of the linear model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub schema_version: String,
    /// Fingerprint of the vectorizer whose features the model was trained on
    pub vectorizer_fingerprint: String,
    pub model: LinearModel,
}

impl VectorizerFile {
    pub fn new(vectorizer: TfidfVectorizer) -> Self {
        Self {
            schema_version: ARTIFACT_SCHEMA_VERSION.to_string(),
            fingerprint: vectorizer.fingerprint(),
            vectorizer,
        }
    }
}

impl ModelFile {
    pub fn new(model: LinearModel, vectorizer_fingerprint: impl Into<String>) -> Self {
        Self {
            schema_version: ARTIFACT_SCHEMA_VERSION.to_string(),
            vectorizer_fingerprint: vectorizer_fingerprint.into(),
            model,
        }
    }
}

/// Split a classifier into its two artifact files
pub fn to_files(classifier: &StatisticalClassifier) -> (VectorizerFile, ModelFile) {
    let vectorizer = VectorizerFile::new(classifier.vectorizer().clone());
    let model = ModelFile::new(classifier.model().clone(), vectorizer.fingerprint.clone());
    (vectorizer, model)
}

fn check_schema(version: &str, what: &str) -> Result<()> {
    let parsed = ProtocolVersion::parse(version).ok_or_else(|| {
        SentimentError::UnsupportedSchemaVersion(format!("{} has malformed version {}", what, version))
    })?;
    let current = ProtocolVersion::parse(ARTIFACT_SCHEMA_VERSION).unwrap_or_default();
    if !parsed.is_compatible(&current) {
        return Err(SentimentError::UnsupportedSchemaVersion(format!(
            "{} is version {} (expected {}.x)",
            what, version, current.major
        )));
    }
    Ok(())
}

/// Reassemble a classifier from its artifact files.
///
/// Both files must carry a compatible schema version and agree on the
/// vectorizer fingerprint.
pub fn from_files(vectorizer: VectorizerFile, model: ModelFile) -> Result<StatisticalClassifier> {
    check_schema(&vectorizer.schema_version, "vectorizer")?;
    check_schema(&model.schema_version, "model")?;

    let actual = vectorizer.vectorizer.fingerprint();
    if actual != vectorizer.fingerprint {
        return Err(SentimentError::ArtifactMismatch {
            vectorizer: actual,
            model: vectorizer.fingerprint,
        });
    }
    if model.vectorizer_fingerprint != actual {
        return Err(SentimentError::ArtifactMismatch {
            vectorizer: actual,
            model: model.vectorizer_fingerprint,
        });
    }

    StatisticalClassifier::new(vectorizer.vectorizer, model.model)
}

/// Where classifier artifacts live between training and serving
pub trait ArtifactStore: Send + Sync {
    /// Persist both artifacts, replacing any previous pair
    fn save(&self, classifier: &StatisticalClassifier) -> Result<()>;

    /// Load the pair. Missing artifacts yield [`ClassifierState::Unavailable`];
    /// unreadable or mismatched ones are errors.
    fn load(&self) -> Result<ClassifierState>;

    /// Human-readable location for log messages
    fn location(&self) -> String;
}

/// In-memory artifact store for testing
#[cfg(test)]
pub mod memory {
    use super::*;
    use std::sync::RwLock;

    /// Keeps artifacts as serialized JSON so loading exercises the file format
    pub struct MemoryArtifactStore {
        files: RwLock<Option<(String, String)>>,
    }

    impl MemoryArtifactStore {
        pub fn new() -> Self {
            Self {
                files: RwLock::new(None),
            }
        }
    }

    impl Default for MemoryArtifactStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ArtifactStore for MemoryArtifactStore {
        fn save(&self, classifier: &StatisticalClassifier) -> Result<()> {
            let (vectorizer, model) = to_files(classifier);
            let pair = (
                serde_json::to_string(&vectorizer)?,
                serde_json::to_string(&model)?,
            );
            *self.files.write().unwrap() = Some(pair);
            Ok(())
        }

        fn load(&self) -> Result<ClassifierState> {
            let files = self.files.read().unwrap();
            match files.as_ref() {
                None => Ok(ClassifierState::unavailable("no artifacts saved")),
                Some((vectorizer, model)) => {
                    let classifier =
                        from_files(serde_json::from_str(vectorizer)?, serde_json::from_str(model)?)?;
                    Ok(ClassifierState::Loaded(classifier))
                }
            }
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }
}
