//! cs-core - Core library for comment-sentiment
//!
//! Comment cleaning, the statistical and neural sentiment classifiers, and
//! the orchestrator that runs both over one batch of comments. File and
//! network access live in the storage and integration crates, behind the
//! traits defined here.

pub mod analysis;
pub mod classical;
pub mod config;
pub mod error;
pub mod neural;
pub mod normalize;
pub mod report;
pub mod types;

pub use analysis::{
    analyze, Advisory, AnalysisOutput, AnalysisRun, Pipeline, RunInfo, RunSource, RunStorage,
};
pub use error::{Result, SentimentError};
pub use normalize::normalize;
pub use types::*;
