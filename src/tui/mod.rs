//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Dashboard with usage guide and session summary
//! - Patient survey input
//! - Prediction results with BMI and class probabilities
//! - Session history

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
