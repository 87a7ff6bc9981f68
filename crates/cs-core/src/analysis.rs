//! Dual-model orchestration over one batch of comments

use crate::classical::{ClassifierState, StatisticalClassifier};
use crate::config::Config;
use crate::error::Result;
use crate::neural::{BinarySentimentModel, NeuralPrediction, NeuralScorer};
use crate::types::{CleanedComment, CommentRecord, RunId, ScoredRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::thread;
use tracing::{debug, info, warn};

/// Batch-level condition reported once instead of per record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Statistical artifacts were not loaded; `statistical_label` is absent
    StatisticalUnavailable { reason: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::StatisticalUnavailable { reason } => write!(
                f,
                "Statistical classifier unavailable ({}); showing neural labels only",
                reason
            ),
        }
    }
}

/// Scored table for one batch plus its advisories
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisOutput {
    pub records: Vec<ScoredRecord>,
    pub advisories: Vec<Advisory>,
}

impl AnalysisOutput {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Score a batch with both classifiers and merge by input position.
///
/// The neural scorer runs for every record. The statistical classifier runs
/// only when loaded. With `parallel` set the two run on scoped threads; the
/// merge happens after both finish, so output order always matches input
/// order and output length always equals input length.
pub fn analyze<M: BinarySentimentModel>(
    comments: Vec<CleanedComment>,
    classifier: &ClassifierState,
    scorer: &NeuralScorer<M>,
    parallel: bool,
) -> Result<AnalysisOutput> {
    let mut advisories = Vec::new();
    if let ClassifierState::Unavailable { reason } = classifier {
        warn!("Statistical classifier unavailable: {}", reason);
        advisories.push(Advisory::StatisticalUnavailable {
            reason: reason.clone(),
        });
    }

    if comments.is_empty() {
        return Ok(AnalysisOutput {
            records: Vec::new(),
            advisories,
        });
    }

    let texts: Vec<String> = comments.iter().map(|c| c.clean_text.clone()).collect();
    let (statistical, neural) = match classifier.as_loaded() {
        Some(loaded) if parallel => score_parallel(&texts, loaded, scorer),
        Some(loaded) => (Some(loaded.predict(&texts)), scorer.score(&texts)),
        None => (None, scorer.score(&texts)),
    };

    let neural = neural?;
    let statistical = statistical.transpose()?;
    debug!(
        "Merging {} neural and {} statistical predictions",
        neural.len(),
        statistical.as_ref().map_or(0, Vec::len)
    );

    let records = merge(comments, neural, statistical);
    Ok(AnalysisOutput {
        records,
        advisories,
    })
}

type ScorePair = (
    Option<Result<Vec<String>>>,
    Result<Vec<NeuralPrediction>>,
);

fn score_parallel<M: BinarySentimentModel>(
    texts: &[String],
    classifier: &StatisticalClassifier,
    scorer: &NeuralScorer<M>,
) -> ScorePair {
    thread::scope(|s| {
        let statistical = s.spawn(|| classifier.predict(texts));
        let neural = scorer.score(texts);
        let statistical = match statistical.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        (Some(statistical), neural)
    })
}

fn merge(
    comments: Vec<CleanedComment>,
    neural: Vec<NeuralPrediction>,
    statistical: Option<Vec<String>>,
) -> Vec<ScoredRecord> {
    let mut statistical = statistical.map(Vec::into_iter);
    comments
        .into_iter()
        .zip(neural)
        .map(|(comment, prediction)| ScoredRecord {
            comment,
            statistical_label: statistical.as_mut().and_then(Iterator::next),
            neural_label: prediction.label,
            neural_confidence: prediction.confidence,
            neural_raw_label: prediction.raw_label,
        })
        .collect()
}

/// Process-wide analysis state, built once at startup and shared by reference
pub struct Pipeline<M: BinarySentimentModel> {
    classifier: ClassifierState,
    scorer: NeuralScorer<M>,
    parallel: bool,
}

impl<M: BinarySentimentModel> Pipeline<M> {
    pub fn new(classifier: ClassifierState, scorer: NeuralScorer<M>) -> Self {
        Self {
            classifier,
            scorer,
            parallel: true,
        }
    }

    /// Build from configuration and already-loaded classifier state
    pub fn from_config(classifier: ClassifierState, model: M, config: &Config) -> Self {
        info!(
            "Pipeline ready (neural: {}, statistical: {})",
            model.model_id(),
            if classifier.is_available() { "loaded" } else { "unavailable" }
        );
        Self {
            classifier,
            scorer: NeuralScorer::from_config(model, &config.neural),
            parallel: config.analysis.parallel,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn classifier(&self) -> &ClassifierState {
        &self.classifier
    }

    pub fn model_id(&self) -> &str {
        self.scorer.model_id()
    }

    /// Normalize and score a batch of fetched comments
    pub fn analyze_batch(&self, comments: Vec<CommentRecord>) -> Result<AnalysisOutput> {
        let cleaned = comments.into_iter().map(CleanedComment::from_record).collect();
        analyze(cleaned, &self.classifier, &self.scorer, self.parallel)
    }

    /// Analyze a batch and wrap the result as a run
    pub fn run(&self, source: RunSource, comments: Vec<CommentRecord>) -> Result<AnalysisRun> {
        let output = self.analyze_batch(comments)?;
        Ok(AnalysisRun::new(
            source,
            self.model_id(),
            self.classifier.is_available(),
            output,
        ))
    }
}

/// Where the comments of a run came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunSource {
    /// Fetched from the video platform
    Video { video_id: String },
    /// Read from a local JSON file
    File { path: PathBuf },
}

impl fmt::Display for RunSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunSource::Video { video_id } => write!(f, "video {}", video_id),
            RunSource::File { path } => write!(f, "file {}", path.display()),
        }
    }
}

/// One completed analysis, as persisted by the snapshot store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub id: RunId,
    pub created_at: DateTime<Utc>,
    pub source: RunSource,
    /// Identifier of the neural model that scored the run
    pub neural_model: String,
    pub statistical_available: bool,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
    pub records: Vec<ScoredRecord>,
}

impl AnalysisRun {
    pub fn new(
        source: RunSource,
        neural_model: impl Into<String>,
        statistical_available: bool,
        output: AnalysisOutput,
    ) -> Self {
        Self {
            id: RunId::generate(),
            created_at: Utc::now(),
            source,
            neural_model: neural_model.into(),
            statistical_available,
            advisories: output.advisories,
            records: output.records,
        }
    }
}

/// Lightweight listing entry for a stored run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub id: RunId,
    pub created_at: DateTime<Utc>,
    pub source: RunSource,
    pub record_count: usize,
}

impl From<&AnalysisRun> for RunInfo {
    fn from(run: &AnalysisRun) -> Self {
        Self {
            id: run.id.clone(),
            created_at: run.created_at,
            source: run.source.clone(),
            record_count: run.records.len(),
        }
    }
}

/// Storage backend for completed runs
pub trait RunStorage: Send + Sync {
    fn save(&self, run: &AnalysisRun) -> Result<()>;

    fn load(&self, id: &RunId) -> Result<AnalysisRun>;

    fn list(&self) -> Result<Vec<RunInfo>>;

    /// Most recently created run
    fn latest(&self) -> Result<Option<AnalysisRun>> {
        let newest = self
            .list()?
            .into_iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        match newest {
            Some(info) => self.load(&info.id).map(Some),
            None => Ok(None),
        }
    }
}

/// In-memory run storage for testing
#[cfg(test)]
pub mod memory {
    use super::*;
    use crate::error::SentimentError;
    use std::collections::HashMap;
    use std::sync::RwLock;

    #[derive(Default)]
    pub struct MemoryRunStorage {
        runs: RwLock<HashMap<RunId, AnalysisRun>>,
    }

    impl RunStorage for MemoryRunStorage {
        fn save(&self, run: &AnalysisRun) -> Result<()> {
            self.runs.write().unwrap().insert(run.id.clone(), run.clone());
            Ok(())
        }

        fn load(&self, id: &RunId) -> Result<AnalysisRun> {
            self.runs
                .read()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| SentimentError::RunNotFound(id.to_string()))
        }

        fn list(&self) -> Result<Vec<RunInfo>> {
            Ok(self.runs.read().unwrap().values().map(RunInfo::from).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classical::{FitParams, LinearModel, TfidfVectorizer};
    use crate::error::SentimentError;
    use crate::neural::RawPrediction;
    use crate::types::SentimentLabel;
    use pretty_assertions::assert_eq;

    struct FakeModel;

    impl BinarySentimentModel for FakeModel {
        fn model_id(&self) -> &str {
            "fake-sst2"
        }

        fn classify(&self, texts: &[String]) -> Result<Vec<RawPrediction>> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("love") {
                        RawPrediction::new("POSITIVE", 0.98)
                    } else if t.contains("hate") {
                        RawPrediction::new("NEGATIVE", 0.92)
                    } else {
                        RawPrediction::new("POSITIVE", 0.5)
                    }
                })
                .collect())
        }
    }

    struct BrokenModel;

    impl BinarySentimentModel for BrokenModel {
        fn model_id(&self) -> &str {
            "broken"
        }

        fn classify(&self, _texts: &[String]) -> Result<Vec<RawPrediction>> {
            Err(SentimentError::model("broken", "endpoint returned 503"))
        }
    }

    fn record(text: &str) -> CommentRecord {
        let ts = "2024-05-01T12:00:00Z".parse().unwrap();
        CommentRecord {
            author: "viewer".to_string(),
            raw_text: text.to_string(),
            like_count: 0,
            published_at: ts,
            updated_at: ts,
        }
    }

    fn loaded() -> ClassifierState {
        let docs = [
            "love this video",
            "love the music",
            "hate this video",
            "hate the ads",
        ];
        let labels: Vec<String> = ["positive", "positive", "negative", "negative"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut vectorizer = TfidfVectorizer::new((1, 2), None);
        vectorizer.fit(&docs).unwrap();
        let x = vectorizer.transform_batch(&docs);
        let model =
            LinearModel::fit(&x, &labels, vectorizer.n_features(), FitParams::default()).unwrap();
        ClassifierState::Loaded(StatisticalClassifier::new(vectorizer, model).unwrap())
    }

    fn batch() -> Vec<CommentRecord> {
        vec![
            record("I LOVE this video!! https://x.co"),
            record("@troll I hate the ads"),
            record("ok 😀"),
            record("Love the music #fun"),
        ]
    }

    #[test]
    fn test_empty_batch_returns_empty() {
        for state in [loaded(), ClassifierState::unavailable("missing")] {
            let pipeline = Pipeline::new(state, NeuralScorer::new(BrokenModel));
            let out = pipeline.analyze_batch(Vec::new()).unwrap();
            assert!(out.is_empty());
        }
    }

    #[test]
    fn test_absent_artifacts_degrade() {
        let pipeline = Pipeline::new(
            ClassifierState::unavailable("vectorizer.json not found"),
            NeuralScorer::new(FakeModel),
        );
        let out = pipeline.analyze_batch(batch()).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.records.iter().all(|r| r.statistical_label.is_none()));
        assert_eq!(
            out.advisories,
            vec![Advisory::StatisticalUnavailable {
                reason: "vectorizer.json not found".to_string()
            }]
        );
    }

    #[test]
    fn test_records_keep_input_order() {
        let pipeline = Pipeline::new(loaded(), NeuralScorer::new(FakeModel));
        let out = pipeline.analyze_batch(batch()).unwrap();
        assert!(out.advisories.is_empty());

        let texts: Vec<&str> = out
            .records
            .iter()
            .map(|r| r.comment.clean_text.as_str())
            .collect();
        assert_eq!(
            texts,
            vec!["i love this video!!", "i hate the ads", "ok", "love the music"]
        );

        let neural: Vec<SentimentLabel> = out.records.iter().map(|r| r.neural_label).collect();
        assert_eq!(
            neural,
            vec![
                SentimentLabel::Positive,
                SentimentLabel::Negative,
                SentimentLabel::Neutral,
                SentimentLabel::Positive,
            ]
        );
        assert_eq!(out.records[0].statistical_label.as_deref(), Some("positive"));
        assert_eq!(out.records[1].statistical_label.as_deref(), Some("negative"));
        assert!(out.records.iter().all(|r| r.statistical_label.is_some()));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = Pipeline::new(loaded(), NeuralScorer::new(FakeModel)).with_parallel(true);
        let sequential = Pipeline::new(loaded(), NeuralScorer::new(FakeModel)).with_parallel(false);
        assert_eq!(
            parallel.analyze_batch(batch()).unwrap(),
            sequential.analyze_batch(batch()).unwrap()
        );
    }

    #[test]
    fn test_neural_failure_fails_batch() {
        let pipeline = Pipeline::new(loaded(), NeuralScorer::new(BrokenModel));
        let err = pipeline.analyze_batch(batch()).unwrap_err();
        assert!(matches!(err, SentimentError::Model { .. }));
    }

    #[test]
    fn test_run_carries_metadata() {
        let pipeline = Pipeline::new(
            ClassifierState::unavailable("missing"),
            NeuralScorer::new(FakeModel),
        );
        let run = pipeline
            .run(
                RunSource::Video {
                    video_id: "dQw4w9WgXcQ".to_string(),
                },
                batch(),
            )
            .unwrap();
        assert_eq!(run.neural_model, "fake-sst2");
        assert!(!run.statistical_available);
        assert_eq!(run.records.len(), 4);
        assert!(RunId::from_string(run.id.0.clone()).is_ok());

        let json = serde_json::to_string(&run).unwrap();
        let restored: AnalysisRun = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, run);
    }

    #[test]
    fn test_memory_storage_latest() {
        let storage = memory::MemoryRunStorage::default();
        assert!(storage.latest().unwrap().is_none());

        let source = RunSource::File {
            path: PathBuf::from("comments.json"),
        };
        let first = AnalysisRun::new(source.clone(), "fake", false, AnalysisOutput::default());
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = AnalysisRun::new(source, "fake", false, AnalysisOutput::default());
        storage.save(&second).unwrap();
        storage.save(&first).unwrap();

        assert_eq!(storage.list().unwrap().len(), 2);
        assert_eq!(storage.latest().unwrap().unwrap().id, second.id);
        assert!(matches!(
            storage.load(&RunId("20240101000000-deadbeef".to_string())),
            Err(SentimentError::RunNotFound(_))
        ));
    }
}
