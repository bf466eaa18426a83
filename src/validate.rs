//! Validation stage: per-row semantic checks plus corpus statistics.
//!
//! Validation does not trust the transform stage. Every record is checked
//! again, and each failing condition produces its own [`ValidationError`].

use chrono::{Local, NaiveDate};
use log::{debug, info};
use serde::Serialize;

use crate::{
    checks::record_issues,
    config::Thresholds,
    record::CanonicalSalesRecord,
    stats::{Tally, ValidationStats, ValidationWarning},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// 1-based position in the validated sequence; 0 for whole-input errors.
    pub row: usize,
    pub field: String,
    pub value: Option<String>,
    pub message: String,
    pub severity: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub stats: ValidationStats,
}

/// Errors for one record; empty when the record is acceptable.
pub fn validate_row(
    record: &CanonicalSalesRecord,
    row_number: usize,
    today: NaiveDate,
) -> Vec<ValidationError> {
    record_issues(record, today)
        .into_iter()
        .map(|issue| ValidationError {
            row: row_number,
            field: issue.field().to_string(),
            value: Some(issue.value(record)),
            message: issue.message(),
            severity: "error",
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    thresholds: Thresholds,
}

impl Validator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn validate(&self, rows: &[CanonicalSalesRecord]) -> ValidationVerdict {
        self.validate_at(rows, Local::now().date_naive())
    }

    pub fn validate_at(&self, rows: &[CanonicalSalesRecord], today: NaiveDate) -> ValidationVerdict {
        if rows.is_empty() {
            return ValidationVerdict {
                valid: false,
                errors: vec![ValidationError {
                    row: 0,
                    field: "data".to_string(),
                    value: None,
                    message: "No valid data found".to_string(),
                    severity: "error",
                }],
                warnings: Vec::new(),
                stats: ValidationStats::zeroed(today),
            };
        }

        let mut errors = Vec::new();
        let mut tally = Tally::new();
        for (idx, record) in rows.iter().enumerate() {
            let row_errors = validate_row(record, idx + 1, today);
            if row_errors.is_empty() {
                tally.ingest(record);
            } else {
                debug!("Row {} failed {} check(s)", idx + 1, row_errors.len());
                errors.extend(row_errors);
            }
        }

        let (stats, warnings) = tally.finish(rows.len(), today, &self.thresholds);
        let valid = errors.is_empty() && stats.valid_rows > 0;
        info!(
            "Validated {} row(s): {} valid, {} error(s), {} warning(s)",
            stats.total_rows,
            stats.valid_rows,
            errors.len(),
            warnings.len()
        );
        ValidationVerdict {
            valid,
            errors,
            warnings,
            stats,
        }
    }
}

/// Validate with the default thresholds against today's local date.
pub fn validate(rows: &[CanonicalSalesRecord]) -> ValidationVerdict {
    Validator::default().validate(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::WarningKind;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_input_is_invalid_with_one_error_and_no_warnings() {
        let verdict = Validator::default().validate_at(&[], day(2024, 6, 1));
        assert!(!verdict.valid);
        assert_eq!(verdict.errors.len(), 1);
        assert_eq!(verdict.errors[0].row, 0);
        assert!(verdict.warnings.is_empty());
        assert_eq!(verdict.stats.valid_rows, 0);
        assert_eq!(verdict.stats.date_range.days, 0);
    }

    #[test]
    fn one_row_can_emit_several_errors() {
        let record = CanonicalSalesRecord::new(day(2030, 1, 1), "", -2.0, f64::NAN);
        let errors = validate_row(&record, 4, day(2024, 6, 1));
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["date", "product", "quantity", "price"]);
        assert!(errors.iter().all(|e| e.row == 4 && e.severity == "error"));
    }

    #[test]
    fn invalid_rows_are_excluded_from_statistics() {
        let today = day(2024, 6, 1);
        let rows = vec![
            CanonicalSalesRecord::new(day(2024, 1, 1), "A", 2.0, 10.0),
            CanonicalSalesRecord::new(day(2024, 1, 5), "B", 4.0, 20.0),
            CanonicalSalesRecord::new(day(2024, 12, 1), "C", 100.0, 100.0),
        ];
        let verdict = Validator::default().validate_at(&rows, today);
        assert!(!verdict.valid);
        assert_eq!(verdict.errors.len(), 1);
        assert_eq!(verdict.stats.total_rows, 3);
        assert_eq!(verdict.stats.valid_rows, 2);
        assert_eq!(verdict.stats.invalid_rows, 1);
        assert_eq!(verdict.stats.unique_products, 2);
        assert_eq!(verdict.stats.date_range.days, 5);
        assert_eq!(verdict.stats.averages.quantity, 3.0);
        assert_eq!(verdict.stats.averages.price, 15.0);
    }

    #[test]
    fn clean_corpus_is_valid_even_with_warnings() {
        let today = day(2024, 6, 1);
        let rows = vec![CanonicalSalesRecord::new(day(2024, 5, 30), "A", 1.0, 0.0)];
        let verdict = Validator::default().validate_at(&rows, today);
        assert!(verdict.valid);
        assert!(verdict.errors.is_empty());
        assert!(verdict
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::PriceZero));
    }
}
