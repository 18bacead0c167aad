//! `shelfscan-config`: ShelfScan configuration management.
//!
//! Provides:
//! - Typed config schema (extraction, ledger, vision, logging, export)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution
//! - Config redaction for safe display
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::{apply_all_defaults, default_model};
pub use env::{contains_env_var_reference, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::{collect_redacted_paths, redact};
pub use schema::ShelfScanConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution, apply defaults to, and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Validation
/// warnings are logged; validation errors fail the load.
pub async fn load_and_prepare(path: &Path) -> Result<ShelfScanConfig> {
    let raw_config = load_config(path).await?;
    prepare(raw_config, resolve_env_vars)
}

/// Everything [`load_and_prepare`] does after reading the file.
pub fn prepare(
    raw_config: ShelfScanConfig,
    resolve: impl Fn(&Value) -> Result<Value>,
) -> Result<ShelfScanConfig> {
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve(&value).context("Failed to resolve env vars in config")?;
    let config: ShelfScanConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ExportConfig, VisionConfig};
    use std::collections::HashMap;

    #[test]
    fn prepare_resolves_env_and_defaults() {
        let raw = ShelfScanConfig {
            vision: Some(VisionConfig {
                api_key: Some("${GEMINI_API_KEY}".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let env: HashMap<String, String> =
            [("GEMINI_API_KEY".to_string(), "key-123".to_string())].into();
        let cfg = prepare(raw, |v| resolve_env_vars_with(v, &env)).unwrap();
        let vision = cfg.vision.unwrap();
        assert_eq!(vision.api_key.as_deref(), Some("key-123"));
        assert_eq!(vision.provider.as_deref(), Some("gemini"));
    }

    #[test]
    fn prepare_rejects_invalid_config() {
        let raw = ShelfScanConfig {
            export: Some(ExportConfig {
                format: Some("xlsx".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = prepare(raw, |v| Ok(v.clone())).unwrap_err();
        assert!(err.to_string().contains("export.format"));
    }
}
