//! Human and JSON renderings of a pipeline run for the upload screen or a
//! terminal.

use std::fmt::Write as _;

use serde::Serialize;

use crate::{
    record::{MappingFailure, TransformResult, TransformStats},
    validate::ValidationVerdict,
};

/// How many rejected rows or errors are listed before the rest are summarized.
pub const DEFAULT_EXAMPLE_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct CheckReport<'a> {
    pub transform: TransformSection<'a>,
    pub verdict: &'a ValidationVerdict,
}

#[derive(Debug, Serialize)]
pub struct TransformSection<'a> {
    pub stats: TransformStats,
    pub errors: &'a [MappingFailure],
}

impl<'a> CheckReport<'a> {
    pub fn new(transform: &'a TransformResult, verdict: &'a ValidationVerdict) -> Self {
        Self {
            transform: TransformSection {
                stats: transform.stats,
                errors: &transform.errors,
            },
            verdict,
        }
    }
}

pub fn render_text(
    transform: &TransformResult,
    verdict: &ValidationVerdict,
    example_limit: usize,
) -> String {
    let mut out = String::new();
    let stats = &transform.stats;
    let _ = writeln!(
        out,
        "Transform: {} row(s) read, {} accepted, {} rejected, {} skipped",
        stats.total_rows, stats.valid_rows, stats.invalid_rows, stats.skipped_rows
    );
    render_examples(
        &mut out,
        "Rejected rows",
        transform.errors.iter().map(ToString::to_string),
        transform.errors.len(),
        example_limit,
    );

    let _ = writeln!(
        out,
        "\nVerdict: {}",
        if verdict.valid { "VALID" } else { "INVALID" }
    );
    render_examples(
        &mut out,
        "Errors",
        verdict.errors.iter().map(|e| {
            format!(
                "row {} field '{}' (value {}): {}",
                e.row,
                e.field,
                e.value.as_deref().unwrap_or("<none>"),
                e.message
            )
        }),
        verdict.errors.len(),
        example_limit,
    );
    if !verdict.warnings.is_empty() {
        let _ = writeln!(out, "Warnings:");
        for warning in &verdict.warnings {
            let _ = writeln!(out, "  [{}] {}", warning.kind.as_str(), warning.message);
        }
    }

    let s = &verdict.stats;
    let rows = vec![
        vec!["total rows".to_string(), s.total_rows.to_string()],
        vec!["valid rows".to_string(), s.valid_rows.to_string()],
        vec!["invalid rows".to_string(), s.invalid_rows.to_string()],
        vec!["unique products".to_string(), s.unique_products.to_string()],
        vec![
            "date range".to_string(),
            format!(
                "{} .. {} ({} day(s))",
                s.date_range.min, s.date_range.max, s.date_range.days
            ),
        ],
        vec![
            "avg quantity".to_string(),
            format!("{:.2}", s.averages.quantity),
        ],
        vec!["avg price".to_string(), format!("{:.2}", s.averages.price)],
    ];
    let _ = writeln!(out);
    out.push_str(&render_table(
        &["statistic".to_string(), "value".to_string()],
        &rows,
    ));
    out
}

fn render_examples<I>(out: &mut String, title: &str, lines: I, total: usize, limit: usize)
where
    I: Iterator<Item = String>,
{
    if total == 0 {
        return;
    }
    if total > limit {
        let _ = writeln!(out, "{title} (first {limit} of {total}):");
    } else {
        let _ = writeln!(out, "{title}:");
    }
    for line in lines.take(limit) {
        let _ = writeln!(out, "  {line}");
    }
}

/// Left-aligned columns separated by two spaces, with a dashed rule under the
/// header.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let cells: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cleaned = value.replace(['\n', '\r', '\t'], " ");
            format!("{cleaned:<width$}")
        })
        .collect();
    cells.join("  ").trim_end().to_string()
}
