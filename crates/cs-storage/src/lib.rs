//! cs-storage - Storage library for comment-sentiment
//!
//! File-system implementations of the storage traits in `cs-core`, plus
//! loaders for training and comment datasets.

mod artifact_store;
mod atomic;
mod dataset;
mod snapshot_store;

pub use artifact_store::FileSystemArtifactStore;
pub use dataset::{load_comments_json, load_training_csv, read_training_csv};
pub use snapshot_store::{export_csv, FileSystemRunStorage, LATEST_CSV};
