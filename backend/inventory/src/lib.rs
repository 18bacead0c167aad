pub mod export;
pub mod ledger;
pub mod session;
pub mod shared;

pub use export::{load_json, render_csv, render_json, session_slug, write_snapshot, ExportFormat, SnapshotExporter};
pub use ledger::{InventoryLedger, LedgerSnapshot, UpdateOutcome};
pub use session::{ScanOutcome, ScanSession};
pub use shared::SharedLedger;
