//! Application layer: Use cases and services.
//!
//! This module wires the domain rules to the loaded artifacts and the
//! history port.

mod prediction;
mod preprocess;

#[cfg(test)]
pub(crate) use prediction::fixtures;
pub use prediction::{PredictionOutcome, PredictionService};
pub use preprocess::{
    EncodedFeatureVector, PreprocessError, Preprocessor, UnknownCategory, UnknownCategoryPolicy,
};
