//! Audit pipeline: configuration → scan → report file → console summary.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::{Config, ConfigError};
use crate::services::{
    ConsoleReporter, ContentRepository, ReportWriter, ScanOutcome, UnlinkedAssetScanner,
};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    InvalidConfig,
    Failed,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::InvalidConfig | RunStatus::Failed => 1,
        }
    }
}

/// Summary of a completed audit
#[derive(Debug)]
pub struct AuditReport {
    pub outcome: ScanOutcome,
    pub report_path: PathBuf,
}

/// Scan, write the report and print the summary.
///
/// Batch failures during the scan are absorbed into the outcome; a failed
/// report write is returned as an error.
pub async fn run_audit<R, W>(
    config: &Config,
    repository: R,
    console: &mut ConsoleReporter<W>,
    started_at: DateTime<Utc>,
) -> Result<AuditReport>
where
    R: ContentRepository,
    W: Write,
{
    console
        .banner(&config.space_id, &config.environment_id)
        .context("Failed to write to console")?;

    let scanner = UnlinkedAssetScanner::from_config(repository, config);
    let outcome = scanner
        .scan_with_progress(|event| {
            if let Err(e) = console.progress(&event) {
                warn!(error = %e, "Failed to write scan progress");
            }
        })
        .await;

    let writer = ReportWriter::new(&config.output_dir);
    let report_path = writer
        .write(&outcome.unlinked, started_at)
        .await
        .context("Failed to write unlinked asset report")?;

    console
        .summary(&outcome, &report_path)
        .context("Failed to write summary to console")?;

    info!(
        unlinked = outcome.unlinked.len(),
        report = %report_path.display(),
        "Audit complete"
    );
    Ok(AuditReport {
        outcome,
        report_path,
    })
}

/// Run the whole audit from an already-resolved configuration.
///
/// `connect` is only called once the configuration is valid, so a bad
/// configuration never reaches the network.
pub async fn execute<R, F, W>(
    config: std::result::Result<Config, ConfigError>,
    connect: F,
    console: &mut ConsoleReporter<W>,
    started_at: DateTime<Utc>,
) -> RunStatus
where
    F: FnOnce(&Config) -> R,
    R: ContentRepository,
    W: Write,
{
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("{}", config_error_message(&e));
            return RunStatus::InvalidConfig;
        }
    };

    info!(config = ?config, "Configuration loaded");
    let repository = connect(&config);

    match run_audit(&config, repository, console, started_at).await {
        Ok(_) => RunStatus::Completed,
        Err(e) => {
            error!(error = ?e, "Audit failed");
            eprintln!("❌ Error: {:?}", e);
            RunStatus::Failed
        }
    }
}

const REQUIRED_VARS_HINT: &str = "   Required: CONTENTFUL_SPACE_ID and CONTENTFUL_MANAGEMENT_TOKEN";

/// Console text for a configuration failure
pub fn config_error_message(error: &ConfigError) -> String {
    match error {
        ConfigError::Missing(_) => {
            format!("❌ Configuration error: {}\n{}", error, REQUIRED_VARS_HINT)
        }
        ConfigError::Invalid { .. } => format!("❌ Configuration error: {}", error),
    }
}
