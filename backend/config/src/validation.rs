//! Config validation: schema checks with user-friendly error messages.

use shelfscan_core::MergePolicy;
use thiserror::Error;

use crate::schema::ShelfScanConfig;

/// A config validation error with field path and message.
#[derive(Debug, Clone, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ShelfScanConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_extraction(config, &mut report);
    validate_ledger(config, &mut report);
    validate_vision(config, &mut report);
    validate_logging(config, &mut report);
    validate_export(config, &mut report);
    report
}

fn validate_extraction(config: &ShelfScanConfig, report: &mut ValidationReport) {
    let Some(extraction) = &config.extraction else { return };
    if let Some(sentinel) = &extraction.sentinel {
        if sentinel.trim().is_empty() {
            report.error(
                "extraction.sentinel",
                "Sentinel cannot be blank; missing fields would be indistinguishable from empty ones",
            );
        }
    }
}

fn validate_ledger(config: &ShelfScanConfig, report: &mut ValidationReport) {
    let Some(ledger) = &config.ledger else { return };
    if let Some(policy) = &ledger.merge_policy {
        if let Err(e) = policy.parse::<MergePolicy>() {
            report.error("ledger.mergePolicy", e);
        }
    }
    if ledger.soft_entry_limit == Some(0) {
        report.warn("ledger.softEntryLimit", "A limit of 0 warns on the first product");
    }
}

fn validate_vision(config: &ShelfScanConfig, report: &mut ValidationReport) {
    let Some(vision) = &config.vision else { return };
    if let Some(provider) = &vision.provider {
        if !matches!(provider.as_str(), "gemini" | "openai") {
            report.error(
                "vision.provider",
                format!("Unknown vision provider '{provider}'. Use 'gemini' or 'openai'"),
            );
        }
    }
    if vision.timeout_secs == Some(0) {
        report.error("vision.timeoutSecs", "timeoutSecs must be > 0");
    }
    if vision.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
        report.warn(
            "vision.apiKey",
            "No API key configured; `scan` needs GEMINI_API_KEY or OPENAI_API_KEY",
        );
    }
}

fn validate_logging(config: &ShelfScanConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !matches!(
            level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) && !level.contains('=')
        {
            report.warn("logging.level", format!("Unrecognized log level '{level}'"));
        }
    }
    if logging.file == Some(true) && logging.dir.as_deref().map(str::is_empty).unwrap_or(true) {
        report.error("logging.dir", "File logging needs a directory");
    }
}

fn validate_export(config: &ShelfScanConfig, report: &mut ValidationReport) {
    let Some(export) = &config.export else { return };
    if let Some(format) = &export.format {
        if !matches!(format.to_ascii_lowercase().as_str(), "json" | "csv") {
            report.error(
                "export.format",
                format!("Unknown export format '{format}'. Use 'json' or 'csv'"),
            );
        }
    }
}
