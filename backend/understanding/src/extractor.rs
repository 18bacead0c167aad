//! Text extractor: maps a vision model's free-form label description onto
//! the six-field product schema.
//!
//! Input is processed line by line against a prioritized chain of
//! [`LineStrategy`] values. A line whose label resolves to a schema field
//! moves the cursor to that field and replaces its value. Every other line,
//! including a marker whose label is outside the schema, extends the current
//! field only when it is a continuation field.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use shelfscan_core::{ProductField, ProductRecord, DEFAULT_SENTINEL};

use crate::strategy::{default_strategies, LineStrategy};

static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*+•]\s+").unwrap());

/// How a single line relates to the schema.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    /// A recognized field marker and its raw value.
    Field(ProductField, &'a str),
    /// Free text, or a marker whose label is not a field.
    Plain,
}

/// Stateless parser from label text to [`ProductRecord`].
///
/// Safe to share between threads; holds only its sentinel and strategy chain.
pub struct TextExtractor {
    sentinel: String,
    strategies: Vec<Box<dyn LineStrategy>>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}

impl TextExtractor {
    /// Extractor with the built-in numbered → bold → colon chain.
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self::with_strategies(sentinel, default_strategies())
    }

    /// Extractor with a custom strategy chain, highest priority first.
    pub fn with_strategies(
        sentinel: impl Into<String>,
        strategies: Vec<Box<dyn LineStrategy>>,
    ) -> Self {
        Self {
            sentinel: sentinel.into(),
            strategies,
        }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Extract a record from optional text. `None` yields the all-default record.
    pub fn extract_opt(&self, text: Option<&str>) -> ProductRecord {
        match text {
            Some(text) => self.extract(text),
            None => ProductRecord::with_sentinel(&self.sentinel),
        }
    }

    /// Extract a record from `text`. Never fails; missing fields get the sentinel.
    pub fn extract(&self, text: &str) -> ProductRecord {
        let mut record = ProductRecord::with_sentinel("");
        let mut cursor: Option<ProductField> = None;
        let mut markers = 0usize;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match self.classify(line) {
                LineKind::Field(field, value) => {
                    record.set(field, clean_value(value));
                    cursor = Some(field);
                    markers += 1;
                }
                LineKind::Plain => {
                    if let Some(field) = cursor.filter(ProductField::is_continuation) {
                        append_continuation(&mut record, field, line);
                    }
                }
            }
        }

        for field in ProductField::ALL {
            if record.get(field).is_empty() {
                record.set(field, self.sentinel.as_str());
            }
        }

        debug!(markers, brand = %record.brand_name, "Extracted product record");
        record
    }

    fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        for strategy in &self.strategies {
            let Some(labeled) = strategy.attempt(line) else {
                continue;
            };
            if let Some(field) = ProductField::from_label(&normalize_label(labeled.label)) {
                return LineKind::Field(field, labeled.value);
            }
            debug!(strategy = strategy.name(), label = labeled.label, "Unknown label kept as text");
            return LineKind::Plain;
        }
        LineKind::Plain
    }
}

/// Lowercase and collapse internal whitespace.
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Trim whitespace and markdown emphasis from a value.
fn clean_value(raw: &str) -> String {
    raw.replace("**", "")
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .to_string()
}

fn append_continuation(record: &mut ProductRecord, field: ProductField, line: &str) {
    let extra = clean_value(&BULLET_RE.replace(line, ""));
    if extra.is_empty() {
        return;
    }
    let current = record.get(field);
    let joined = if current.is_empty() {
        extra
    } else {
        format!("{current} {extra}")
    };
    record.set(field, joined);
}
