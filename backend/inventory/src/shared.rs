use std::sync::{Arc, Mutex, MutexGuard};

use shelfscan_core::ProductRecord;

use crate::ledger::{InventoryLedger, LedgerSnapshot, UpdateOutcome};

/// Clonable, thread-safe handle to one [`InventoryLedger`].
///
/// `update` is a read-then-write over the ledger, so every call holds the
/// lock for its full duration.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<InventoryLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: InventoryLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    // A panic mid-update cannot leave a half-applied entry behind, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, InventoryLedger> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn update(&self, record: ProductRecord) -> UpdateOutcome {
        self.lock().update(record)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut InventoryLedger) -> R) -> R {
        f(&mut self.lock())
    }
}
