//! Scan session: one extractor and one ledger, driven by the caller.
//!
//! A session is the unit of state. Nothing is global; two sessions never
//! see each other's products.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use shelfscan_core::{LabelAnalyzer, LabelImage, ProductField, ProductRecord, ShelfError};
use shelfscan_logging::{ScanEvent, ScanEventLogger};
use shelfscan_understanding::TextExtractor;

use crate::ledger::{InventoryLedger, LedgerSnapshot, UpdateOutcome};

/// Result of feeding one analysis response into a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// No text was supplied; the ledger was left untouched.
    Skipped { record: ProductRecord },
    /// The record was extracted and merged into the ledger.
    Recorded {
        record: ProductRecord,
        update: UpdateOutcome,
    },
}

impl ScanOutcome {
    pub fn record(&self) -> &ProductRecord {
        match self {
            Self::Skipped { record } | Self::Recorded { record, .. } => record,
        }
    }

    pub fn update(&self) -> Option<UpdateOutcome> {
        match self {
            Self::Skipped { .. } => None,
            Self::Recorded { update, .. } => Some(*update),
        }
    }
}

pub struct ScanSession {
    extractor: TextExtractor,
    ledger: InventoryLedger,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new(TextExtractor::default(), InventoryLedger::default())
    }
}

impl ScanSession {
    pub fn new(extractor: TextExtractor, ledger: InventoryLedger) -> Self {
        info!(session = %ledger.session_id(), policy = %ledger.policy(), "Scan session started");
        Self { extractor, ledger }
    }

    pub fn session_id(&self) -> Uuid {
        self.ledger.session_id()
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub fn into_ledger(self) -> InventoryLedger {
        self.ledger
    }

    /// Extract a record from one analysis response and merge it.
    ///
    /// Absent or blank text yields the all-default record and does not touch
    /// the ledger.
    pub fn ingest_text(&mut self, text: Option<&str>) -> ScanOutcome {
        let session = self.session_id().to_string();
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                warn!(session = %session, "No analysis text; ledger unchanged");
                return ScanOutcome::Skipped {
                    record: self.extractor.extract_opt(None),
                };
            }
        };

        let record = self.extractor.extract(text);
        let sentinel = self.extractor.sentinel();
        let defaulted_fields = ProductField::ALL
            .iter()
            .filter(|f| record.get(**f) == sentinel)
            .count();
        ScanEventLogger::log_event(
            &session,
            ScanEvent::RecordExtracted {
                brand: record.brand_name.clone(),
                defaulted_fields,
            },
        );

        let update = self.ledger.update(record.clone());
        ScanEventLogger::log_event(
            &session,
            ScanEvent::LedgerUpdated {
                position: update.position(),
                count: update.count(),
                inserted: update.is_inserted(),
            },
        );
        ScanOutcome::Recorded { record, update }
    }

    /// Send `image` to `analyzer` and ingest the returned text.
    ///
    /// Analyzer failures are returned to the caller and leave the ledger
    /// untouched.
    pub async fn scan_image(
        &mut self,
        analyzer: &dyn LabelAnalyzer,
        image: &LabelImage,
    ) -> Result<ScanOutcome, ShelfError> {
        let session = self.session_id().to_string();
        let text = match analyzer.analyze(image).await {
            Ok(text) => text,
            Err(e) => {
                ScanEventLogger::log_event(
                    &session,
                    ScanEvent::AnalysisFailed {
                        source: image.source.clone(),
                        error_msg: e.to_string(),
                    },
                );
                return Err(e);
            }
        };
        ScanEventLogger::log_event(
            &session,
            ScanEvent::LabelAnalyzed {
                source: image.source.clone(),
                provider: analyzer.name().to_string(),
                chars: text.chars().count(),
            },
        );
        Ok(self.ingest_text(Some(&text)))
    }
}
