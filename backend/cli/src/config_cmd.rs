//! CLI Config Command
//!
//! Inspect and initialise the ShelfScan config file.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use shelfscan_config::{
    apply_all_defaults, collect_redacted_paths, load_config, redact, validate, write_config,
    ShelfScanConfig,
};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective config with secrets masked
    Show,
    /// Write a config file populated with defaults
    Init {
        /// Overwrite an existing file (the old one is kept as a backup)
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

pub async fn run(path: &Path, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(path).await,
        ConfigCommands::Init { force } => init(path, force).await,
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

async fn show(path: &Path) -> Result<()> {
    if !path.exists() {
        note_info(&format!("No config at {}; showing defaults", path.display()));
    }
    let config = apply_all_defaults(load_config(path).await?);
    print!("{}", render_redacted(&config)?);

    let report = validate(&config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }
    Ok(())
}

async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        note_warn(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }
    let config = apply_all_defaults(ShelfScanConfig::default());
    write_config(&config, path).await?;
    note_success(&format!("Wrote {}", path.display()));
    note_info("Set GEMINI_API_KEY or OPENAI_API_KEY before running `shelfscan scan`.");
    Ok(())
}

/// YAML view of `config` with every secret masked.
fn render_redacted(config: &ShelfScanConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    let masked = collect_redacted_paths(&value);
    if !masked.is_empty() {
        tracing::debug!(paths = ?masked, "Masked config secrets");
    }
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_config::schema::VisionConfig;

    #[test]
    fn rendered_config_hides_api_key() {
        let config = ShelfScanConfig {
            vision: Some(VisionConfig {
                api_key: Some("AIzaSyVerySecretValue".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let yaml = render_redacted(&apply_all_defaults(config)).unwrap();
        assert!(yaml.contains("AIza***"));
        assert!(!yaml.contains("VerySecret"));
        assert!(yaml.contains("mergePolicy: product"));
    }

    #[tokio::test]
    async fn init_does_not_overwrite_without_force() {
        let dir = std::env::temp_dir().join(format!("shelfscan-cli-init-{}", std::process::id()));
        let path = dir.join("config.yaml");
        init(&path, false).await.unwrap();
        tokio::fs::write(&path, "ledger:\n  mergePolicy: batch\n").await.unwrap();

        init(&path, false).await.unwrap();
        let kept = load_config(&path).await.unwrap();
        assert_eq!(kept.merge_policy().as_str(), "batch");

        init(&path, true).await.unwrap();
        let replaced = load_config(&path).await.unwrap();
        assert_eq!(replaced.merge_policy().as_str(), "product");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
