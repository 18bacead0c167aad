use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder stored in a field that could not be extracted.
pub const DEFAULT_SENTINEL: &str = "Not specified";

/// The six fields of a product label, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductField {
    BrandName,
    DateOfManufacturing,
    DateOfExpiry,
    Quantity,
    Mrp,
    BasicDetails,
}

impl ProductField {
    /// Every field in schema order.
    pub const ALL: [ProductField; 6] = [
        ProductField::BrandName,
        ProductField::DateOfManufacturing,
        ProductField::DateOfExpiry,
        ProductField::Quantity,
        ProductField::Mrp,
        ProductField::BasicDetails,
    ];

    /// Column header used by table renderers and CSV export.
    pub fn column_header(&self) -> &'static str {
        match self {
            Self::BrandName => "Brand",
            Self::DateOfManufacturing => "Mfg Date",
            Self::DateOfExpiry => "Expiry Date",
            Self::Quantity => "Quantity",
            Self::Mrp => "MRP",
            Self::BasicDetails => "Details",
        }
    }

    /// Label spellings accepted for this field, lowercase with single spaces.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::BrandName => &["brand name", "brand", "brand/manufacturer", "product brand"],
            Self::DateOfManufacturing => &[
                "date of manufacturing",
                "date of manufacture",
                "manufacturing date",
                "manufacture date",
                "mfg date",
                "mfg. date",
                "mfd",
                "mfg",
                "packed on",
            ],
            Self::DateOfExpiry => &[
                "date of expiry",
                "expiry date",
                "expiration date",
                "exp date",
                "exp. date",
                "expiry",
                "best before",
                "use by",
            ],
            Self::Quantity => &[
                "quantity",
                "net quantity",
                "net qty",
                "net qty.",
                "qty",
                "net weight",
                "net wt",
                "net wt.",
                "net content",
                "net contents",
            ],
            Self::Mrp => &[
                "mrp",
                "mrp (maximum retail price)",
                "maximum retail price",
                "m.r.p.",
                "m.r.p",
                "price",
            ],
            Self::BasicDetails => &["basic details", "details", "product details", "description"],
        }
    }

    /// Whether unmarked lines following this field's marker extend its value.
    pub fn is_continuation(&self) -> bool {
        matches!(self, Self::BasicDetails)
    }

    /// Resolve a normalized label (lowercase, single-spaced) to a field.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.synonyms().contains(&label))
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_header())
    }
}

/// Structured view of one product label. All six fields are always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub brand_name: String,
    pub date_of_manufacturing: String,
    pub date_of_expiry: String,
    pub quantity: String,
    pub mrp: String,
    pub basic_details: String,
}

impl ProductRecord {
    /// A record whose every field holds `sentinel`.
    pub fn with_sentinel(sentinel: &str) -> Self {
        Self {
            brand_name: sentinel.to_string(),
            date_of_manufacturing: sentinel.to_string(),
            date_of_expiry: sentinel.to_string(),
            quantity: sentinel.to_string(),
            mrp: sentinel.to_string(),
            basic_details: sentinel.to_string(),
        }
    }

    pub fn get(&self, field: ProductField) -> &str {
        match field {
            ProductField::BrandName => &self.brand_name,
            ProductField::DateOfManufacturing => &self.date_of_manufacturing,
            ProductField::DateOfExpiry => &self.date_of_expiry,
            ProductField::Quantity => &self.quantity,
            ProductField::Mrp => &self.mrp,
            ProductField::BasicDetails => &self.basic_details,
        }
    }

    pub fn set(&mut self, field: ProductField, value: impl Into<String>) {
        let slot = match field {
            ProductField::BrandName => &mut self.brand_name,
            ProductField::DateOfManufacturing => &mut self.date_of_manufacturing,
            ProductField::DateOfExpiry => &mut self.date_of_expiry,
            ProductField::Quantity => &mut self.quantity,
            ProductField::Mrp => &mut self.mrp,
            ProductField::BasicDetails => &mut self.basic_details,
        };
        *slot = value.into();
    }

    /// `(field, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (ProductField, &str)> + '_ {
        ProductField::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    pub fn is_all_default(&self, sentinel: &str) -> bool {
        self.fields().all(|(_, v)| v == sentinel)
    }
}

impl Default for ProductRecord {
    fn default() -> Self {
        Self::with_sentinel(DEFAULT_SENTINEL)
    }
}

/// How records are judged to describe the same product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Brand + quantity + MRP. Batch dates are ignored.
    #[default]
    #[serde(rename = "product")]
    ProductIdentity,
    /// Brand + quantity + MRP + both dates; distinct batches stay distinct.
    Batch,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductIdentity => "product",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" | "product_identity" => Ok(Self::ProductIdentity),
            "batch" => Ok(Self::Batch),
            other => Err(format!("unknown merge policy '{other}' (expected 'product' or 'batch')")),
        }
    }
}

/// Normalized identity of a record under a [`MergePolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub brand: String,
    pub quantity: String,
    pub mrp: String,
    /// `(manufactured, expiry)`; only set under [`MergePolicy::Batch`].
    pub batch: Option<(String, String)>,
}

impl DedupKey {
    pub fn of(record: &ProductRecord, policy: MergePolicy) -> Self {
        let batch = match policy {
            MergePolicy::ProductIdentity => None,
            MergePolicy::Batch => Some((
                record.date_of_manufacturing.trim().to_string(),
                record.date_of_expiry.trim().to_string(),
            )),
        };
        Self {
            brand: record.brand_name.trim().to_lowercase(),
            quantity: record.quantity.trim().to_string(),
            mrp: record.mrp.trim().to_string(),
            batch,
        }
    }
}

/// A distinct product in the ledger and how many times it was observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub record: ProductRecord,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(record: ProductRecord) -> Self {
        let now = Utc::now();
        Self {
            record,
            count: 1,
            first_seen: now,
            last_seen: now,
        }
    }

    /// Record one more observation. Stored fields are left as first seen.
    pub fn bump(&mut self) {
        self.count += 1;
        self.last_seen = Utc::now();
    }

    /// Cells in the fixed display order: six fields, then the count.
    pub fn row(&self) -> Vec<String> {
        let mut cells: Vec<String> = self.record.fields().map(|(_, v)| v.to_string()).collect();
        cells.push(self.count.to_string());
        cells
    }
}
