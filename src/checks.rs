//! Semantic checks on a canonical record.
//!
//! Both the transform re-check and the row validator call
//! [`record_issues`], so the two stages can never disagree about what an
//! acceptable record is.

use chrono::{Days, NaiveDate};

use crate::record::{CanonicalField, CanonicalSalesRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordIssue {
    FutureDate { date: NaiveDate, latest: NaiveDate },
    EmptyProduct,
    QuantityNotNumber(f64),
    QuantityNotPositive(f64),
    PriceNotNumber(f64),
    PriceNegative(f64),
}

impl RecordIssue {
    pub fn field(&self) -> CanonicalField {
        match self {
            RecordIssue::FutureDate { .. } => CanonicalField::Date,
            RecordIssue::EmptyProduct => CanonicalField::Product,
            RecordIssue::QuantityNotNumber(_) | RecordIssue::QuantityNotPositive(_) => {
                CanonicalField::Quantity
            }
            RecordIssue::PriceNotNumber(_) | RecordIssue::PriceNegative(_) => CanonicalField::Price,
        }
    }

    pub fn message(&self) -> String {
        match self {
            RecordIssue::FutureDate { latest, .. } => {
                format!("Date cannot be in the future (latest accepted: {latest})")
            }
            RecordIssue::EmptyProduct => "Product name is missing".to_string(),
            RecordIssue::QuantityNotNumber(_) => "Quantity must be a finite number".to_string(),
            RecordIssue::QuantityNotPositive(_) => "Quantity must be greater than zero".to_string(),
            RecordIssue::PriceNotNumber(_) => "Price must be a finite number".to_string(),
            RecordIssue::PriceNegative(_) => "Price cannot be negative".to_string(),
        }
    }

    /// The offending value as it should be shown to the uploader.
    pub fn value(&self, record: &CanonicalSalesRecord) -> String {
        match self {
            RecordIssue::FutureDate { date, .. } => date.format("%Y-%m-%d").to_string(),
            RecordIssue::EmptyProduct => record.product.clone(),
            RecordIssue::QuantityNotNumber(v)
            | RecordIssue::QuantityNotPositive(v)
            | RecordIssue::PriceNotNumber(v)
            | RecordIssue::PriceNegative(v) => v.to_string(),
        }
    }
}

/// Latest sale date accepted when evaluated on `today` (today plus one day).
pub fn latest_accepted_date(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

/// Every semantic problem with `record`, in field order. Empty means valid.
pub fn record_issues(record: &CanonicalSalesRecord, today: NaiveDate) -> Vec<RecordIssue> {
    let mut issues = Vec::new();

    let latest = latest_accepted_date(today);
    if record.date > latest {
        issues.push(RecordIssue::FutureDate {
            date: record.date,
            latest,
        });
    }

    if record.product.trim().is_empty() {
        issues.push(RecordIssue::EmptyProduct);
    }

    if !record.quantity.is_finite() {
        issues.push(RecordIssue::QuantityNotNumber(record.quantity));
    } else if record.quantity <= 0.0 {
        issues.push(RecordIssue::QuantityNotPositive(record.quantity));
    }

    if !record.price.is_finite() {
        issues.push(RecordIssue::PriceNotNumber(record.price));
    } else if record.price < 0.0 {
        issues.push(RecordIssue::PriceNegative(record.price));
    }

    issues
}
