//! Config defaults: applies default values to parsed config.

use shelfscan_core::{MergePolicy, DEFAULT_SENTINEL};

use crate::schema::{
    ExportConfig, ExtractionConfig, LedgerConfig, LoggingConfig, ShelfScanConfig, VisionConfig,
};

/// Default vision provider.
pub const DEFAULT_VISION_PROVIDER: &str = "gemini";

/// Default request timeout for vision calls, in seconds.
pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 60;

/// Default directory for exported snapshots.
pub const DEFAULT_EXPORT_DIR: &str = "exports";

/// Default directory for log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Model used when none is configured for `provider`.
pub fn default_model(provider: &str) -> &'static str {
    match provider {
        "openai" => "gpt-4o",
        _ => "gemini-2.0-flash",
    }
}

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ShelfScanConfig) -> ShelfScanConfig {
    let config = apply_extraction_defaults(config);
    let config = apply_ledger_defaults(config);
    let config = apply_vision_defaults(config);
    let config = apply_logging_defaults(config);
    apply_export_defaults(config)
}

fn apply_extraction_defaults(mut config: ShelfScanConfig) -> ShelfScanConfig {
    let extraction = config.extraction.get_or_insert_with(ExtractionConfig::default);
    if extraction.sentinel.is_none() {
        extraction.sentinel = Some(DEFAULT_SENTINEL.to_string());
    }
    config
}

fn apply_ledger_defaults(mut config: ShelfScanConfig) -> ShelfScanConfig {
    let ledger = config.ledger.get_or_insert_with(LedgerConfig::default);
    if ledger.merge_policy.is_none() {
        ledger.merge_policy = Some(MergePolicy::default().to_string());
    }
    config
}

/// Provider, then a model matching it, then the timeout.
fn apply_vision_defaults(mut config: ShelfScanConfig) -> ShelfScanConfig {
    let vision = config.vision.get_or_insert_with(VisionConfig::default);
    let provider = vision
        .provider
        .get_or_insert_with(|| DEFAULT_VISION_PROVIDER.to_string())
        .clone();
    if vision.model.is_none() {
        vision.model = Some(default_model(&provider).to_string());
    }
    if vision.timeout_secs.is_none() {
        vision.timeout_secs = Some(DEFAULT_VISION_TIMEOUT_SECS);
    }
    config
}

fn apply_logging_defaults(mut config: ShelfScanConfig) -> ShelfScanConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some("info".to_string());
    }
    if logging.file.is_none() {
        logging.file = Some(false);
    }
    if logging.dir.is_none() {
        logging.dir = Some(DEFAULT_LOG_DIR.to_string());
    }
    config
}

fn apply_export_defaults(mut config: ShelfScanConfig) -> ShelfScanConfig {
    let export = config.export.get_or_insert_with(ExportConfig::default);
    if export.dir.is_none() {
        export.dir = Some(DEFAULT_EXPORT_DIR.to_string());
    }
    if export.format.is_none() {
        export.format = Some("json".to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_section() {
        let cfg = apply_all_defaults(ShelfScanConfig::default());
        assert_eq!(cfg.sentinel(), DEFAULT_SENTINEL);
        assert_eq!(cfg.ledger.unwrap().merge_policy.unwrap(), "product");
        let vision = cfg.vision.unwrap();
        assert_eq!(vision.provider.unwrap(), "gemini");
        assert_eq!(vision.model.unwrap(), "gemini-2.0-flash");
        assert_eq!(vision.timeout_secs.unwrap(), DEFAULT_VISION_TIMEOUT_SECS);
        assert_eq!(cfg.export.unwrap().format.unwrap(), "json");
    }

    #[test]
    fn model_follows_configured_provider() {
        let cfg = ShelfScanConfig {
            vision: Some(VisionConfig {
                provider: Some("openai".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.vision.unwrap().model.unwrap(), "gpt-4o");
    }

    #[test]
    fn does_not_override_user_values() {
        let cfg = ShelfScanConfig {
            extraction: Some(ExtractionConfig { sentinel: Some("N/A".into()) }),
            ledger: Some(LedgerConfig {
                merge_policy: Some("batch".into()),
                soft_entry_limit: Some(50),
            }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.sentinel(), "N/A");
        assert_eq!(cfg.merge_policy(), MergePolicy::Batch);
        assert_eq!(cfg.soft_entry_limit(), Some(50));
    }
}
