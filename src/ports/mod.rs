//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the things it does not own: the exported
//! model and the session history.

mod classifier;
mod history;

pub use classifier::{Classifier, ModelError};
pub use history::HistoryLog;
