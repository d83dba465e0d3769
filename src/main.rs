//! Obesense: obesity-level estimation in the terminal
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use obesense::adapters::sanitize::SanitizingMakeWriter;
use obesense::adapters::ArtifactBundle;
use obesense::application::PredictionService;
use obesense::config::AppConfig;
use obesense::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Writing logs to the terminal would corrupt the TUI (alternate screen).
    let interactive = std::io::stdout().is_terminal();
    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces as the open error below.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Cannot open log file {}", config.log_file.display()))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting Obesense...");

    // Refuse to start without a usable artifact set.
    let options = config.artifact_options()?;
    let bundle = ArtifactBundle::load(&config.artifact_dir, &options).map_err(|e| {
        tracing::error!("Artifact load failed: {e}");
        e
    })?;
    let service = PredictionService::new(Arc::new(bundle), config.unknown_category);

    let mut app = App::new(service);
    app.run()?;

    tracing::info!("Obesense shutdown complete.");
    Ok(())
}
