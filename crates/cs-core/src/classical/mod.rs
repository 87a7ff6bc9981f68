//! Statistical sentiment classifier
//!
//! A TF-IDF vectorizer over word unigrams and bigrams feeding a multinomial
//! logistic regression. Labels are whatever the training CSV contained.
//!
//! # Example
//!
//! ```ignore
//! use cs_core::classical::{train_and_persist, ArtifactStore};
//!
//! let outcome = train_and_persist(examples, &config.classical, &store)?;
//! println!("{}", outcome.report);
//!
//! // Later, in the serving process
//! let state = store.load()?;
//! let labels = state.predict(&["great video"])?;
//! ```

mod classifier;
pub mod metrics;
pub mod model;
pub mod persistence;
pub mod training;
pub mod vectorizer;

pub use classifier::{predict, ClassifierState, StatisticalClassifier};
pub use metrics::{ClassMetrics, ClassificationReport};
pub use model::{FitParams, LinearModel};
pub use persistence::{
    from_files, to_files, ArtifactStore, ModelFile, VectorizerFile, ARTIFACT_SCHEMA_VERSION,
};
pub use training::{stratified_split, train, train_and_persist, TrainingExample, TrainingOutcome};
pub use vectorizer::{SparseVector, TfidfVectorizer};
