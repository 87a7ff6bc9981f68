//! cs-integration - External collaborators for comment-sentiment
//!
//! ## Features
//!
//! - Paged comment fetch from the YouTube Data API
//! - Hosted binary sentiment model over the Hugging Face inference API
//! - Local DistilBERT classifier on candle (`local-model` feature)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cs_integration::{CommentSource, HuggingFaceModel, YouTubeClient};
//!
//! let client = YouTubeClient::new(api_key, &config.fetch)?;
//! let comments = client.fetch("dQw4w9WgXcQ", 200)?;
//! let model = cs_integration::model::from_config(&config.neural, token)?;
//! ```

pub mod model;
pub mod source;

pub use model::HuggingFaceModel;
#[cfg(feature = "local-model")]
pub use model::LocalDistilBert;
pub use source::youtube::YouTubeClient;
pub use source::CommentSource;
