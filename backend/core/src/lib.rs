pub mod error;
pub mod traits;
pub mod types;

pub use error::ShelfError;
pub use traits::{LabelAnalyzer, LabelImage};
pub use types::{
    DedupKey, LedgerEntry, MergePolicy, ProductField, ProductRecord, DEFAULT_SENTINEL,
};
