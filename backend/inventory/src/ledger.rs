//! Inventory ledger: the ordered, deduplicated list of products seen in a
//! session.
//!
//! Entries keep first-seen order forever. A record whose [`DedupKey`]
//! matches an existing entry only bumps that entry's count; the stored
//! record is never overwritten. Nothing is ever removed, so the ledger
//! grows with the number of distinct products; an optional soft limit only
//! logs a warning.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use shelfscan_core::{DedupKey, LedgerEntry, MergePolicy, ProductField, ProductRecord};

/// What [`InventoryLedger::update`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// A new entry was appended at `position` with count 1.
    Inserted { position: usize },
    /// The entry at `position` now has `count` observations.
    Merged { position: usize, count: u64 },
}

impl UpdateOutcome {
    pub fn position(&self) -> usize {
        match self {
            Self::Inserted { position } | Self::Merged { position, .. } => *position,
        }
    }

    pub fn count(&self) -> u64 {
        match self {
            Self::Inserted { .. } => 1,
            Self::Merged { count, .. } => *count,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

/// Point-in-time copy of a ledger, suitable for display or export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub session_id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub policy: MergePolicy,
    pub entries: Vec<LedgerEntry>,
}

impl LedgerSnapshot {
    /// Column headers: brand, manufacture date, expiry date, quantity,
    /// price, details, count.
    pub fn headers() -> Vec<&'static str> {
        let mut headers: Vec<&'static str> =
            ProductField::ALL.iter().map(|f| f.column_header()).collect();
        headers.push("Count");
        headers
    }

    /// One row per entry in first-seen order, cells in [`Self::headers`] order.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.entries.iter().map(LedgerEntry::row).collect()
    }

    pub fn total_units(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Session-scoped, append/increment-only product ledger.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    session_id: Uuid,
    policy: MergePolicy,
    entries: Vec<LedgerEntry>,
    index: HashMap<DedupKey, usize>,
    soft_limit: Option<usize>,
    warned: bool,
}

impl Default for InventoryLedger {
    fn default() -> Self {
        Self::new(MergePolicy::default())
    }
}

impl InventoryLedger {
    /// Empty ledger for a fresh session.
    pub fn new(policy: MergePolicy) -> Self {
        Self::with_session(Uuid::new_v4(), policy)
    }

    pub fn with_session(session_id: Uuid, policy: MergePolicy) -> Self {
        Self {
            session_id,
            policy,
            entries: Vec::new(),
            index: HashMap::new(),
            soft_limit: None,
            warned: false,
        }
    }

    /// Warn once when the number of distinct entries exceeds `limit`.
    pub fn with_soft_limit(mut self, limit: Option<usize>) -> Self {
        self.soft_limit = limit;
        self
    }

    /// Rebuild a ledger from an exported snapshot.
    ///
    /// Entries that share a key under `policy` are folded into the first
    /// one: counts are summed and the later record is dropped.
    pub fn from_snapshot(snapshot: LedgerSnapshot, policy: MergePolicy) -> Self {
        let mut ledger = Self::with_session(snapshot.session_id, policy);
        for mut entry in snapshot.entries {
            // Every entry stands for at least one sighting.
            entry.count = entry.count.max(1);
            let key = DedupKey::of(&entry.record, policy);
            match ledger.index.get(&key) {
                Some(&position) => {
                    let existing = &mut ledger.entries[position];
                    existing.count += entry.count;
                    existing.first_seen = existing.first_seen.min(entry.first_seen);
                    existing.last_seen = existing.last_seen.max(entry.last_seen);
                }
                None => {
                    ledger.index.insert(key, ledger.entries.len());
                    ledger.entries.push(entry);
                }
            }
        }
        debug!(session = %ledger.session_id, entries = ledger.entries.len(), "Ledger restored from snapshot");
        ledger
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Sum of all counts.
    pub fn total_units(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// The entry `record` would merge into, if any.
    pub fn find(&self, record: &ProductRecord) -> Option<&LedgerEntry> {
        self.index
            .get(&DedupKey::of(record, self.policy))
            .map(|&position| &self.entries[position])
    }

    /// Merge `record` into the ledger.
    pub fn update(&mut self, record: ProductRecord) -> UpdateOutcome {
        let key = DedupKey::of(&record, self.policy);
        if let Some(&position) = self.index.get(&key) {
            let entry = &mut self.entries[position];
            entry.bump();
            debug!(position, count = entry.count, brand = %entry.record.brand_name, "Merged into ledger entry");
            return UpdateOutcome::Merged { position, count: entry.count };
        }

        let position = self.entries.len();
        debug!(position, brand = %record.brand_name, "New ledger entry");
        self.entries.push(LedgerEntry::new(record));
        self.index.insert(key, position);
        self.check_soft_limit();
        UpdateOutcome::Inserted { position }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            session_id: self.session_id,
            taken_at: Utc::now(),
            policy: self.policy,
            entries: self.entries.clone(),
        }
    }

    fn check_soft_limit(&mut self) {
        let Some(limit) = self.soft_limit else { return };
        if !self.warned && self.entries.len() > limit {
            self.warned = true;
            warn!(
                session = %self.session_id,
                entries = self.entries.len(),
                limit,
                "Ledger exceeded its soft entry limit; entries are never evicted"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(brand: &str, qty: &str, mrp: &str) -> ProductRecord {
        ProductRecord {
            brand_name: brand.into(),
            quantity: qty.into(),
            mrp: mrp.into(),
            ..Default::default()
        }
    }

    fn dated(brand: &str, expiry: &str, details: &str) -> ProductRecord {
        ProductRecord {
            date_of_expiry: expiry.into(),
            basic_details: details.into(),
            ..record(brand, "500 g", "₹120")
        }
    }

    #[test]
    fn starts_empty() {
        let ledger = InventoryLedger::default();
        assert!(ledger.is_empty());
        assert!(ledger.snapshot().entries.is_empty());
    }

    #[test]
    fn repeat_merges_and_keeps_first_record() {
        let mut ledger = InventoryLedger::default();
        let first = dated("Acme", "01/2024", "wheat");
        let second = dated("Acme", "06/2025", "wheat, sugar");

        assert_eq!(ledger.update(first.clone()), UpdateOutcome::Inserted { position: 0 });
        assert_eq!(ledger.update(second), UpdateOutcome::Merged { position: 0, count: 2 });

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].count, 2);
        assert_eq!(snapshot.entries[0].record, first);
    }

    #[test]
    fn brand_matching_ignores_case() {
        let mut ledger = InventoryLedger::default();
        ledger.update(record("Acme", "500 g", "₹120"));
        ledger.update(record("ACME", "500 g", "₹120"));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].count, 2);
        assert_eq!(ledger.entries()[0].record.brand_name, "Acme");
    }

    #[test]
    fn quantity_discriminates() {
        let mut ledger = InventoryLedger::default();
        ledger.update(record("Acme", "500 g", "₹120"));
        ledger.update(record("Acme", "1 kg", "₹120"));
        assert_eq!(ledger.len(), 2);
        assert!(ledger.entries().iter().all(|e| e.count == 1));
    }

    #[test]
    fn order_is_first_seen_regardless_of_counts() {
        let mut ledger = InventoryLedger::default();
        ledger.update(record("Alpha", "1", "₹1"));
        ledger.update(record("Beta", "2", "₹2"));
        ledger.update(record("Gamma", "3", "₹3"));
        for _ in 0..5 {
            ledger.update(record("Gamma", "3", "₹3"));
        }
        ledger.update(record("Beta", "2", "₹2"));

        let brands: Vec<_> = ledger
            .snapshot()
            .entries
            .iter()
            .map(|e| (e.record.brand_name.clone(), e.count))
            .collect();
        assert_eq!(
            brands,
            vec![
                (String::from("Alpha"), 1),
                (String::from("Beta"), 2),
                (String::from("Gamma"), 6),
            ]
        );
    }

    #[test]
    fn sentinel_records_merge_like_any_other() {
        let mut ledger = InventoryLedger::default();
        ledger.update(ProductRecord::default());
        ledger.update(ProductRecord::default());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total_units(), 2);
    }

    #[test]
    fn batch_policy_keeps_batches_apart() {
        let mut ledger = InventoryLedger::new(MergePolicy::Batch);
        ledger.update(dated("Acme", "01/2024", "a"));
        ledger.update(dated("Acme", "06/2025", "b"));
        ledger.update(dated("acme", "01/2024", "c"));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0].count, 2);
        assert_eq!(ledger.entries()[0].record.basic_details, "a");
    }

    #[test]
    fn find_uses_policy_key() {
        let mut ledger = InventoryLedger::default();
        ledger.update(record("Acme", "500 g", "₹120"));
        assert!(ledger.find(&record(" acme ", "500 g", "₹120")).is_some());
        assert!(ledger.find(&record("Acme", "500 g", "₹99")).is_none());
    }

    #[test]
    fn snapshot_rows_follow_column_order() {
        let mut ledger = InventoryLedger::default();
        ledger.update(dated("Acme", "01/2024", "wheat"));
        let snapshot = ledger.snapshot();
        assert_eq!(
            LedgerSnapshot::headers(),
            vec!["Brand", "Mfg Date", "Expiry Date", "Quantity", "MRP", "Details", "Count"]
        );
        assert_eq!(
            snapshot.rows()[0],
            vec!["Acme", "Not specified", "01/2024", "500 g", "₹120", "wheat", "1"]
        );
    }

    #[test]
    fn restores_from_snapshot_and_keeps_counting() {
        let mut ledger = InventoryLedger::default();
        ledger.update(record("Acme", "500 g", "₹120"));
        ledger.update(record("Acme", "500 g", "₹120"));
        ledger.update(record("Zest", "1 L", "₹60"));
        let snapshot = ledger.snapshot();

        let mut restored = InventoryLedger::from_snapshot(snapshot.clone(), MergePolicy::ProductIdentity);
        assert_eq!(restored.session_id(), snapshot.session_id);
        assert_eq!(restored.update(record("ACME", "500 g", "₹120")), UpdateOutcome::Merged { position: 0, count: 3 });
        assert_eq!(restored.update(record("New", "1", "₹1")), UpdateOutcome::Inserted { position: 2 });
    }

    #[test]
    fn restore_treats_zero_count_as_one_sighting() {
        let mut ledger = InventoryLedger::default();
        ledger.update(record("Acme", "500 g", "₹120"));
        let mut snapshot = ledger.snapshot();
        snapshot.entries[0].count = 0;

        let mut restored = InventoryLedger::from_snapshot(snapshot, MergePolicy::ProductIdentity);
        assert_eq!(restored.entries()[0].count, 1);
        assert_eq!(restored.total_units(), 1);
        assert_eq!(restored.update(record("Acme", "500 g", "₹120")), UpdateOutcome::Merged { position: 0, count: 2 });
    }

    #[test]
    fn restore_folds_entries_that_collide_under_new_policy() {
        let mut ledger = InventoryLedger::new(MergePolicy::Batch);
        ledger.update(dated("Acme", "01/2024", "first"));
        ledger.update(dated("Acme", "06/2025", "second"));
        ledger.update(dated("Acme", "06/2025", "second"));

        let restored = InventoryLedger::from_snapshot(ledger.snapshot(), MergePolicy::ProductIdentity);
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.entries()[0].count, 3);
        assert_eq!(restored.entries()[0].record.basic_details, "first");
    }

    #[test]
    fn soft_limit_never_evicts() {
        let mut ledger = InventoryLedger::default().with_soft_limit(Some(1));
        ledger.update(record("A", "1", "1"));
        ledger.update(record("B", "1", "1"));
        ledger.update(record("C", "1", "1"));
        assert_eq!(ledger.len(), 3);
    }
}
