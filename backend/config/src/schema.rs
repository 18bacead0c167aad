//! ShelfScan configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every section and field is
//! optional in the file; `defaults::apply_all_defaults` fills the gaps.

use serde::{Deserialize, Serialize};

use shelfscan_core::{MergePolicy, DEFAULT_SENTINEL};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for ShelfScan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfScanConfig {
    /// Label text extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionConfig>,

    /// Inventory ledger behaviour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<LedgerConfig>,

    /// Vision provider used by `scan`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<VisionConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Snapshot export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    /// Placeholder for fields missing from the label text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinel: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_policy: Option<String>, // "product" | "batch"
    /// Distinct entries after which a warning is logged. Nothing is evicted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_entry_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>, // "gemini" | "openai"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling JSON log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Write JSON logs to `dir` in addition to the console
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>, // "json" | "csv"
}

// ---------------------------------------------------------------------------
// Resolved accessors
// ---------------------------------------------------------------------------

impl ShelfScanConfig {
    pub fn sentinel(&self) -> &str {
        self.extraction
            .as_ref()
            .and_then(|e| e.sentinel.as_deref())
            .unwrap_or(DEFAULT_SENTINEL)
    }

    /// Configured merge policy; unparseable values fall back to the default
    /// (validation reports them).
    pub fn merge_policy(&self) -> MergePolicy {
        self.ledger
            .as_ref()
            .and_then(|l| l.merge_policy.as_deref())
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }

    pub fn soft_entry_limit(&self) -> Option<usize> {
        self.ledger.as_ref().and_then(|l| l.soft_entry_limit)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }
}
