//! Row and record types shared by the transform and validation stages.
//!
//! [`RawRecord`] is the only untyped shape in the crate: a header → cell map
//! as produced by the upstream reader. Everything past the row mapper works
//! on [`CanonicalSalesRecord`].

use std::{collections::HashMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Date,
    Product,
    Quantity,
    Price,
    Category,
    Sku,
    Supplier,
    Stock,
}

impl CanonicalField {
    /// Required fields in the order the row mapper checks them.
    pub const REQUIRED: [CanonicalField; 4] = [
        CanonicalField::Date,
        CanonicalField::Product,
        CanonicalField::Quantity,
        CanonicalField::Price,
    ];

    pub const OPTIONAL: [CanonicalField; 4] = [
        CanonicalField::Category,
        CanonicalField::Sku,
        CanonicalField::Supplier,
        CanonicalField::Stock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Date => "date",
            CanonicalField::Product => "product",
            CanonicalField::Quantity => "quantity",
            CanonicalField::Price => "price",
            CanonicalField::Category => "category",
            CanonicalField::Sku => "sku",
            CanonicalField::Supplier => "supplier",
            CanonicalField::Stock => "stock",
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input row keyed by source header. A header that is absent and a cell
/// that is empty are indistinguishable to the mapper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    cells: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Cell text with surrounding whitespace removed, `None` when blank.
    pub fn non_blank(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Rows from the upstream reader together with its declared header order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSalesRecord {
    pub date: NaiveDate,
    pub product: String,
    pub quantity: f64,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u64>,
}

impl CanonicalSalesRecord {
    pub fn new(date: NaiveDate, product: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            date,
            product: product.into(),
            quantity,
            price,
            category: None,
            sku: None,
            supplier: None,
            stock: None,
        }
    }
}

/// A row the mapper could not turn into a record. `row` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingFailure {
    pub row: usize,
    pub field: CanonicalField,
    pub value: Option<String>,
    pub reason: String,
}

impl fmt::Display for MappingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} field '{}' (value {}): {}",
            self.row,
            self.field,
            self.value
                .as_deref()
                .map(|v| format!("'{v}'"))
                .unwrap_or_else(|| "<missing>".to_string()),
            self.reason
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub skipped_rows: usize,
}

impl TransformStats {
    /// Every input row lands in exactly one bucket.
    pub fn is_balanced(&self) -> bool {
        self.valid_rows + self.invalid_rows + self.skipped_rows == self.total_rows
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformResult {
    pub data: Vec<CanonicalSalesRecord>,
    pub errors: Vec<MappingFailure>,
    pub stats: TransformStats,
}
