//! Snapshot export and slug utilities.
//!
//! The ledger itself lives only for the session; exporting is how a caller
//! keeps it.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;
use uuid::Uuid;

use shelfscan_logging::{ScanEvent, ScanEventLogger};

use crate::ledger::LedgerSnapshot;

// ---------------------------------------------------------------------------
// Session slug
// ---------------------------------------------------------------------------

/// Generate a human-readable slug for a session (e.g. "fresh-basket-42").
pub fn session_slug(session_id: &Uuid) -> String {
    const ADJECTIVES: &[&str] = &[
        "fresh", "crisp", "golden", "spicy", "sweet", "salty", "ripe", "zesty", "tangy", "toasty",
    ];
    const NOUNS: &[&str] = &[
        "basket", "shelf", "aisle", "crate", "carton", "pantry", "counter", "trolley", "bazaar", "stall",
    ];

    // Uuid bytes are already uniformly random for v4 ids.
    let bytes = session_id.as_bytes();
    let adj = ADJECTIVES[bytes[0] as usize % ADJECTIVES.len()];
    let noun = NOUNS[bytes[1] as usize % NOUNS.len()];
    let num = bytes[2] % 100;
    format!("{}-{}-{}", adj, noun, num)
}

fn session_id_short(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => bail!("unknown export format '{other}' (expected 'json' or 'csv')"),
        }
    }
}

/// Render a snapshot as pretty JSON.
pub fn render_json(snapshot: &LedgerSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("Failed to serialize ledger snapshot")
}

/// Render a snapshot as CSV: header row, then one row per entry, CRLF
/// line endings and RFC 4180 quoting.
pub fn render_csv(snapshot: &LedgerSnapshot) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer
        .write_record(LedgerSnapshot::headers())
        .context("Failed to write CSV header")?;
    for row in snapshot.rows() {
        writer.write_record(&row).context("Failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

// ---------------------------------------------------------------------------
// Exporter
// ---------------------------------------------------------------------------

pub struct SnapshotExporter {
    pub output_dir: PathBuf,
}

impl SnapshotExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    /// Default file name for a snapshot: `<slug>-<short id>.<ext>`.
    pub fn file_name(snapshot: &LedgerSnapshot, format: ExportFormat) -> String {
        format!(
            "{}-{}.{}",
            session_slug(&snapshot.session_id),
            session_id_short(&snapshot.session_id),
            format.extension()
        )
    }

    /// Write `snapshot` into the output directory under its default name.
    pub async fn export(&self, snapshot: &LedgerSnapshot, format: ExportFormat) -> Result<PathBuf> {
        let path = self.output_dir.join(Self::file_name(snapshot, format));
        write_snapshot(snapshot, &path, format).await?;
        Ok(path)
    }
}

/// Write `snapshot` to `path` in `format`, creating parent directories.
pub async fn write_snapshot(snapshot: &LedgerSnapshot, path: &Path, format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create export directory: {}", parent.display()))?;
    }
    let body = match format {
        ExportFormat::Json => render_json(snapshot)?,
        ExportFormat::Csv => render_csv(snapshot)?,
    };
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;

    info!("[Export] Session {} → {}", snapshot.session_id, path.display());
    ScanEventLogger::log_event(
        &snapshot.session_id.to_string(),
        ScanEvent::SnapshotExported {
            path: path.display().to_string(),
            entries: snapshot.entries.len(),
        },
    );
    Ok(())
}

/// Read a JSON snapshot written by [`write_snapshot`].
pub async fn load_json(path: &Path) -> Result<LedgerSnapshot> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot JSON at: {}", path.display()))
}
