//! File system storage for statistical classifier artifacts

use crate::atomic::write_json_atomic;
use cs_core::classical::{
    from_files, to_files, ArtifactStore, ClassifierState, ModelFile, StatisticalClassifier,
    VectorizerFile,
};
use cs_core::config::ClassicalConfig;
use cs_core::error::{Result, SentimentError};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Vectorizer and model kept as two JSON files
pub struct FileSystemArtifactStore {
    vectorizer_path: PathBuf,
    model_path: PathBuf,
}

impl FileSystemArtifactStore {
    pub fn new(vectorizer_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            vectorizer_path: vectorizer_path.into(),
            model_path: model_path.into(),
        }
    }

    pub fn from_config(config: &ClassicalConfig) -> Self {
        Self::new(&config.vectorizer_path, &config.model_path)
    }

    pub fn vectorizer_path(&self) -> &Path {
        &self.vectorizer_path
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let file = fs::File::open(path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SentimentError::from(e).with_context(format!("reading {}", path.display())))
    }
}

impl ArtifactStore for FileSystemArtifactStore {
    fn save(&self, classifier: &StatisticalClassifier) -> Result<()> {
        let (vectorizer, model) = to_files(classifier);
        write_json_atomic(&self.vectorizer_path, &vectorizer)?;
        write_json_atomic(&self.model_path, &model)?;
        debug!(
            "Saved artifacts {:?} and {:?}",
            self.vectorizer_path, self.model_path
        );
        Ok(())
    }

    fn load(&self) -> Result<ClassifierState> {
        for path in [&self.vectorizer_path, &self.model_path] {
            if !path.exists() {
                debug!("Artifact {:?} not found", path);
                return Ok(ClassifierState::unavailable(format!(
                    "{} not found",
                    path.display()
                )));
            }
        }

        let vectorizer: VectorizerFile = Self::read(&self.vectorizer_path)?;
        let model: ModelFile = Self::read(&self.model_path)?;
        let classifier = from_files(vectorizer, model)
            .map_err(|e| e.with_context(format!("loading artifacts from {}", self.location())))?;

        info!(
            "Loaded statistical classifier ({} features, labels: {})",
            classifier.vectorizer().n_features(),
            classifier.labels().join(", ")
        );
        Ok(ClassifierState::Loaded(classifier))
    }

    fn location(&self) -> String {
        format!(
            "{} + {}",
            self.vectorizer_path.display(),
            self.model_path.display()
        )
    }
}
