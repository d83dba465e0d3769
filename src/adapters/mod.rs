//! Adapters layer: Concrete implementations of ports.
//!
//! - `artifacts`: JSON model/scaler/encoder artifacts and their integrity check
//! - `memory`: in-memory session history
//! - `sanitize`: measurement and secret filtering for logs

pub mod artifacts;
pub mod memory;
pub mod sanitize;

pub use artifacts::{ArtifactBundle, ArtifactError, ArtifactOptions};
pub use memory::SessionHistory;
