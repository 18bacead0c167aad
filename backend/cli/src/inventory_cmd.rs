//! CLI Inventory Commands
//!
//! `ingest` feeds label text files into a ledger; `scan` sends label images
//! to a vision provider first. Both print the resulting ledger table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use shelfscan_core::MergePolicy;
use shelfscan_inventory::{
    load_json, write_snapshot, ExportFormat, InventoryLedger, LedgerSnapshot, ScanOutcome,
    ScanSession, SnapshotExporter,
};
use shelfscan_understanding::{load_label_image, VisionAnalyzer};

use crate::config::Settings;
use crate::terminal_output::{
    ledger_summary, note_error, note_info, note_success, note_warn, render_ledger,
};

/// Ledger options shared by `ingest` and `scan`.
#[derive(Args, Debug, Clone, Default)]
pub struct LedgerArgs {
    /// Merge policy: "product" (brand, quantity, MRP) or "batch" (adds dates)
    #[arg(long)]
    pub policy: Option<MergePolicy>,
    /// Continue from a JSON snapshot written by an earlier run
    #[arg(long, value_name = "SNAPSHOT")]
    pub resume: Option<PathBuf>,
    /// Write the final snapshot here (format from the extension)
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
    /// Write the final snapshot into the configured export directory
    #[arg(long)]
    pub save: bool,
    /// Print the snapshot as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Label text files, one analysis response per file
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    #[command(flatten)]
    pub ledger: LedgerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Label images (jpg, png, gif, webp, heic)
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
    /// Vision provider: "gemini" or "openai"
    #[arg(long)]
    pub provider: Option<String>,
    #[command(flatten)]
    pub ledger: LedgerArgs,
}

pub async fn run_ingest(settings: &Settings, args: IngestArgs) -> Result<()> {
    let mut session = open_session(settings, &args.ledger).await?;
    let quiet = args.ledger.json;

    for file in &args.files {
        let text = match tokio::fs::read_to_string(file).await {
            Ok(text) => text,
            Err(e) => {
                note_error(&format!("{}: {e}", file.display()));
                continue;
            }
        };
        let outcome = session.ingest_text(Some(&text));
        if !quiet {
            report_outcome(file, &outcome);
        }
    }

    finish(settings, &session.snapshot(), &args.ledger).await
}

pub async fn run_scan(settings: &Settings, args: ScanArgs) -> Result<()> {
    let provider = settings.vision_provider(args.provider.as_deref())?;
    if !args.ledger.json {
        note_info(&format!("Analyzing {} image(s) with {} ({})", args.images.len(), provider.name(), provider.model()));
    }
    let analyzer = VisionAnalyzer::new(provider, settings.vision_timeout())?;
    let mut session = open_session(settings, &args.ledger).await?;

    for path in &args.images {
        let image = match load_label_image(path).await {
            Ok(image) => image,
            Err(e) => {
                note_error(&format!("{}: {e}", path.display()));
                continue;
            }
        };
        match session.scan_image(&analyzer, &image).await {
            Ok(outcome) if !args.ledger.json => report_outcome(path, &outcome),
            Ok(_) => {}
            Err(e) => note_error(&format!("{}: {e}", path.display())),
        }
    }

    finish(settings, &session.snapshot(), &args.ledger).await
}

/// New session, resumed from a snapshot when `--resume` is given.
async fn open_session(settings: &Settings, args: &LedgerArgs) -> Result<ScanSession> {
    let ledger = match &args.resume {
        Some(path) => resume_ledger(path, settings.merge_policy(args.policy)).await?,
        None => settings.ledger(args.policy),
    };
    let ledger = ledger.with_soft_limit(settings.config.soft_entry_limit());
    Ok(ScanSession::new(settings.extractor(), ledger))
}

async fn resume_ledger(path: &Path, policy: MergePolicy) -> Result<InventoryLedger> {
    let snapshot = load_json(path)
        .await
        .with_context(|| format!("Cannot resume from {}", path.display()))?;
    if snapshot.policy != policy {
        note_warn(&format!(
            "Snapshot was recorded with policy '{}'; re-merging under '{policy}'",
            snapshot.policy
        ));
    }
    Ok(InventoryLedger::from_snapshot(snapshot, policy))
}

fn report_outcome(source: &Path, outcome: &ScanOutcome) {
    let brand = &outcome.record().brand_name;
    match outcome.update() {
        None => note_warn(&format!("{}: no label text, skipped", source.display())),
        Some(update) if update.is_inserted() => note_success(&format!(
            "{}: new product '{brand}' at row {}",
            source.display(),
            update.position() + 1
        )),
        Some(update) => note_success(&format!(
            "{}: '{brand}' seen again (count {})",
            source.display(),
            update.count()
        )),
    }
}

/// Print the ledger and write any requested exports.
async fn finish(settings: &Settings, snapshot: &LedgerSnapshot, args: &LedgerArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        print!("{}", render_ledger(snapshot));
        println!("  {}", ledger_summary(snapshot));
    }

    if let Some(path) = &args.export {
        let format = export_format_for(path, settings.export_format());
        write_snapshot(snapshot, path, format).await?;
        note_success(&format!("Exported {format} snapshot to {}", path.display()));
    }
    if args.save {
        let exporter = SnapshotExporter::new(settings.export_dir());
        let path = exporter.export(snapshot, settings.export_format()).await?;
        note_success(&format!("Saved snapshot to {}", path.display()));
    }
    Ok(())
}

/// Format implied by `path`'s extension, else `fallback`.
fn export_format_for(path: &Path, fallback: ExportFormat) -> ExportFormat {
    ExportFormat::from_path(path).unwrap_or(fallback)
}
