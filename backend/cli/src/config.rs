use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};

use shelfscan_config::defaults::{
    DEFAULT_EXPORT_DIR, DEFAULT_LOG_DIR, DEFAULT_VISION_PROVIDER, DEFAULT_VISION_TIMEOUT_SECS,
};
use shelfscan_config::{
    config_dir, config_file_path, default_model, load_and_prepare, validate, ConfigValidationError,
    ShelfScanConfig,
};
use shelfscan_core::MergePolicy;
use shelfscan_inventory::{ExportFormat, InventoryLedger};
use shelfscan_understanding::{TextExtractor, VisionProvider};

/// Env var that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "SHELFSCAN_LOG";

/// Runtime settings for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Prepared config (env resolved, defaults applied, validated)
    pub config: ShelfScanConfig,
    /// File the config was read from
    pub path: PathBuf,
    /// Validation warnings, reported once logging is up
    pub warnings: Vec<ConfigValidationError>,
}

impl Settings {
    /// Load settings from `path`, or from the default config location.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(path);
        let config = load_and_prepare(&path)
            .await
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        Ok(Self::from_config(config, path))
    }

    /// Wrap an already prepared config.
    pub fn from_config(config: ShelfScanConfig, path: PathBuf) -> Self {
        let warnings = validate(&config).warnings;
        Self { config, path, warnings }
    }

    /// Re-emit validation warnings. Loading runs before the subscriber
    /// exists, so the ones logged during `load` are lost.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
    }

    /// Log level, with `SHELFSCAN_LOG` taking precedence over the file.
    pub fn log_level(&self) -> String {
        std::env::var(LOG_LEVEL_ENV)
            .ok()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.config.log_level().to_string())
    }

    /// Directory for JSON log files, when file logging is enabled.
    pub fn log_dir(&self) -> Option<PathBuf> {
        let logging = self.config.logging.as_ref()?;
        if !logging.file.unwrap_or(false) {
            return None;
        }
        Some(PathBuf::from(logging.dir.as_deref().unwrap_or(DEFAULT_LOG_DIR)))
    }

    pub fn extractor(&self) -> TextExtractor {
        TextExtractor::new(self.config.sentinel())
    }

    /// An empty ledger using `policy`, or the configured merge policy.
    pub fn ledger(&self, policy: Option<MergePolicy>) -> InventoryLedger {
        InventoryLedger::new(self.merge_policy(policy))
            .with_soft_limit(self.config.soft_entry_limit())
    }

    pub fn merge_policy(&self, policy: Option<MergePolicy>) -> MergePolicy {
        policy.unwrap_or_else(|| self.config.merge_policy())
    }

    pub fn export_dir(&self) -> PathBuf {
        let dir = self.config.export.as_ref().and_then(|e| e.dir.as_deref());
        PathBuf::from(dir.unwrap_or(DEFAULT_EXPORT_DIR))
    }

    pub fn export_format(&self) -> ExportFormat {
        self.config
            .export
            .as_ref()
            .and_then(|e| e.format.as_deref())
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    }

    pub fn vision_timeout(&self) -> Duration {
        let secs = self
            .config
            .vision
            .as_ref()
            .and_then(|v| v.timeout_secs)
            .unwrap_or(DEFAULT_VISION_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Build the vision provider, reading the API key from the environment.
    pub fn vision_provider(&self, provider: Option<&str>) -> Result<VisionProvider> {
        self.vision_provider_with(provider, |name| std::env::var(name).ok())
    }

    /// Build the vision provider.
    ///
    /// A `provider` override that differs from the configured one drops the
    /// configured model and key, since both belong to the other provider.
    pub fn vision_provider_with(
        &self,
        provider: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<VisionProvider> {
        let vision = self.config.vision.clone().unwrap_or_default();
        let configured = vision
            .provider
            .as_deref()
            .unwrap_or(DEFAULT_VISION_PROVIDER)
            .trim()
            .to_ascii_lowercase();
        let name = provider
            .map(|p| p.trim().to_ascii_lowercase())
            .unwrap_or_else(|| configured.clone());
        let same_provider = name == configured;

        let env_var = match name.as_str() {
            "gemini" => "GEMINI_API_KEY",
            "openai" => "OPENAI_API_KEY",
            other => bail!("unknown vision provider '{other}' (expected 'gemini' or 'openai')"),
        };

        let api_key = vision
            .api_key
            .filter(|k| same_provider && !k.trim().is_empty())
            .or_else(|| env(env_var).filter(|k| !k.trim().is_empty()));
        let Some(api_key) = api_key else {
            bail!("no API key for {name}: set vision.apiKey in the config or export {env_var}");
        };

        let model = vision
            .model
            .filter(|_| same_provider)
            .unwrap_or_else(|| default_model(&name).to_string());

        let provider = match name.as_str() {
            "openai" => VisionProvider::openai(api_key),
            _ => VisionProvider::gemini(api_key),
        };
        Ok(provider.with_model(model))
    }
}

/// Explicit `--config` path, else `config.yaml` in the config directory.
pub fn resolve_config_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path(&config_dir()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_config::apply_all_defaults;
    use shelfscan_config::schema::{ExportConfig, LoggingConfig, VisionConfig};

    fn settings(config: ShelfScanConfig) -> Settings {
        Settings::from_config(apply_all_defaults(config), PathBuf::from("config.yaml"))
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn configured_key_and_model_are_used() {
        let s = settings(ShelfScanConfig {
            vision: Some(VisionConfig {
                provider: Some("openai".into()),
                model: Some("gpt-4o-mini".into()),
                api_key: Some("sk-test".into()),
                timeout_secs: Some(5),
            }),
            ..Default::default()
        });
        let provider = s.vision_provider_with(None, no_env).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4o-mini");
        assert_eq!(s.vision_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn env_key_fills_missing_config_key() {
        let s = settings(ShelfScanConfig::default());
        let provider = s
            .vision_provider_with(None, |name| (name == "GEMINI_API_KEY").then(|| "AIza-env".to_string()))
            .unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-2.0-flash");
    }

    #[test]
    fn override_switches_provider_and_model() {
        let s = settings(ShelfScanConfig {
            vision: Some(VisionConfig {
                provider: Some("gemini".into()),
                model: Some("gemini-1.5-pro".into()),
                api_key: Some("AIza-config".into()),
                timeout_secs: None,
            }),
            ..Default::default()
        });
        let provider = s
            .vision_provider_with(Some("openai"), |name| (name == "OPENAI_API_KEY").then(|| "sk-env".to_string()))
            .unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4o");
    }

    #[test]
    fn provider_names_compare_case_insensitively() {
        let s = Settings::from_config(
            ShelfScanConfig {
                vision: Some(VisionConfig {
                    provider: Some("Gemini".into()),
                    model: Some("gemini-1.5-pro".into()),
                    api_key: Some("AIza-config".into()),
                    timeout_secs: None,
                }),
                ..Default::default()
            },
            PathBuf::from("config.yaml"),
        );
        let provider = s.vision_provider_with(Some("GEMINI"), no_env).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-1.5-pro");
        let provider = s.vision_provider_with(None, no_env).unwrap();
        assert_eq!(provider.model(), "gemini-1.5-pro");
    }

    #[test]
    fn validation_warnings_are_kept_for_later() {
        let s = settings(ShelfScanConfig {
            vision: Some(VisionConfig {
                provider: Some("gemini".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(s.warnings.iter().any(|w| w.path == "vision.apiKey"));

        let keyed = settings(ShelfScanConfig {
            vision: Some(VisionConfig {
                api_key: Some("AIza-config".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(keyed.warnings.iter().all(|w| w.path != "vision.apiKey"));
    }

    #[test]
    fn missing_key_is_an_error() {
        let s = settings(ShelfScanConfig::default());
        let err = s.vision_provider_with(None, no_env).unwrap_err().to_string();
        assert!(err.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let s = settings(ShelfScanConfig::default());
        assert!(s.vision_provider_with(Some("claude"), no_env).is_err());
    }

    #[test]
    fn log_dir_only_when_file_logging_enabled() {
        let off = settings(ShelfScanConfig::default());
        assert_eq!(off.log_dir(), None);

        let on = settings(ShelfScanConfig {
            logging: Some(LoggingConfig {
                file: Some(true),
                dir: Some("/var/log/shelfscan".into()),
                level: None,
            }),
            ..Default::default()
        });
        assert_eq!(on.log_dir(), Some(PathBuf::from("/var/log/shelfscan")));
    }

    #[test]
    fn export_settings_follow_config() {
        let s = settings(ShelfScanConfig {
            export: Some(ExportConfig {
                dir: Some("out".into()),
                format: Some("csv".into()),
            }),
            ..Default::default()
        });
        assert_eq!(s.export_dir(), PathBuf::from("out"));
        assert_eq!(s.export_format(), ExportFormat::Csv);
    }

    #[test]
    fn policy_override_wins() {
        let s = settings(ShelfScanConfig::default());
        assert_eq!(s.merge_policy(None), MergePolicy::ProductIdentity);
        assert_eq!(s.ledger(Some(MergePolicy::Batch)).policy(), MergePolicy::Batch);
    }
}
