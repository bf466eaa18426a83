//! Batch transform: raw rows in, canonical records plus full accounting out.
//!
//! The batch always completes. Each row ends up in exactly one of
//! `data`, `errors`, or the skipped count.

use chrono::{Local, NaiveDate};
use log::{debug, info};

use crate::{
    checks::record_issues,
    mapping::{RecheckPolicy, TransformConfig, map_row},
    record::{MappingFailure, RawRecord, TransformResult, TransformStats},
};

/// Transform `rows` against today's local date.
pub fn transform(rows: &[RawRecord], config: &TransformConfig) -> TransformResult {
    transform_at(rows, config, Local::now().date_naive())
}

pub fn transform_at(rows: &[RawRecord], config: &TransformConfig, today: NaiveDate) -> TransformResult {
    if rows.is_empty() {
        return TransformResult::default();
    }

    let mut data = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();
    let mut skipped_rows = 0usize;

    for (idx, row) in rows.iter().enumerate() {
        let row_number = idx + 1;
        let record = match map_row(row, config, row_number) {
            Ok(record) => record,
            Err(failure) => {
                debug!("Rejected {failure}");
                errors.push(failure);
                continue;
            }
        };

        let issues = record_issues(&record, today);
        let Some(first) = issues.first() else {
            data.push(record);
            continue;
        };
        match config.recheck {
            RecheckPolicy::Report => {
                let failure = MappingFailure {
                    row: row_number,
                    field: first.field(),
                    value: Some(first.value(&record)),
                    reason: first.message(),
                };
                debug!("Rejected {failure}");
                errors.push(failure);
            }
            RecheckPolicy::Skip => {
                debug!(
                    "Skipped row {row_number}: {} ({})",
                    first.message(),
                    first.field()
                );
                skipped_rows += 1;
            }
        }
    }

    let stats = TransformStats {
        total_rows: rows.len(),
        valid_rows: data.len(),
        invalid_rows: errors.len(),
        skipped_rows,
    };
    info!(
        "Transformed {} row(s): {} accepted, {} rejected, {} skipped",
        stats.total_rows, stats.valid_rows, stats.invalid_rows, stats.skipped_rows
    );
    TransformResult {
        data,
        errors,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mapping::ColumnMapping, record::CanonicalField};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn row(date: &str, product: &str, quantity: &str, price: &str) -> RawRecord {
        RawRecord::from_pairs([
            ("date", date),
            ("product", product),
            ("quantity", quantity),
            ("price", price),
        ])
    }

    #[test]
    fn empty_input_yields_zeroed_result() {
        let config = TransformConfig::new(ColumnMapping::identity());
        let result = transform_at(&[], &config, today());
        assert!(result.data.is_empty());
        assert!(result.errors.is_empty());
        assert_eq!(result.stats, TransformStats::default());
    }

    #[test]
    fn bad_rows_do_not_stop_the_batch() {
        let config = TransformConfig::new(ColumnMapping::identity());
        let rows = vec![
            row("2024-01-01", "A", "1", "2"),
            row("not a date", "A", "1", "2"),
            row("2024-01-02", "", "1", "2"),
            row("2024-01-03", "B", "3", "4"),
        ];
        let result = transform_at(&rows, &config, today());
        assert_eq!(result.data.len(), 2);
        assert_eq!(
            result.errors.iter().map(|e| e.row).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(result.stats.invalid_rows, 2);
        assert!(result.stats.is_balanced());
    }

    #[test]
    fn future_dates_are_reported_by_default() {
        let config = TransformConfig::new(ColumnMapping::identity());
        let rows = vec![row("2024-06-02", "A", "1", "1"), row("2024-06-03", "A", "1", "1")];
        let result = transform_at(&rows, &config, today());
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.errors[0].field, CanonicalField::Date);
        assert_eq!(result.errors[0].value.as_deref(), Some("2024-06-03"));
        assert_eq!(result.stats.skipped_rows, 0);
    }

    #[test]
    fn skip_policy_counts_recheck_failures_as_skipped() {
        let config =
            TransformConfig::new(ColumnMapping::identity()).with_recheck(RecheckPolicy::Skip);
        let huge = "9".repeat(400);
        let rows = vec![
            row("2024-06-03", "A", "1", "1"),
            row("2024-05-01", "A", &huge, "1"),
            row("2024-05-01", "A", "1", "1"),
        ];
        let result = transform_at(&rows, &config, today());
        assert_eq!(result.data.len(), 1);
        assert!(result.errors.is_empty());
        assert_eq!(result.stats.skipped_rows, 2);
        assert!(result.stats.is_balanced());
    }
}
