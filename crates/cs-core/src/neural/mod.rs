//! Neural sentiment scorer
//!
//! The pretrained model is an external collaborator behind
//! [`BinarySentimentModel`]; this module only turns its binary output into
//! `positive` / `negative` / `neutral` through a [`ConfidenceBand`].

mod band;
mod scorer;

pub use band::{ConfidenceBand, NeuralPrediction, RawPrediction};
pub use scorer::{BinarySentimentModel, NeuralScorer};
