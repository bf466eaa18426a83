#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use sales_ingest::record::RawRecord;
use tempfile::{TempDir, tempdir};

/// Fixed "today" so future-date checks are deterministic.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn raw_row(date: &str, product: &str, quantity: &str, price: &str) -> RawRecord {
    RawRecord::from_pairs([
        ("date", date),
        ("product", product),
        ("quantity", quantity),
        ("price", price),
    ])
}

/// `count` rows cycling through `span_days` consecutive dates from `start`.
pub fn daily_rows(start: NaiveDate, span_days: u64, product: &str, count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            let date = start
                .checked_add_days(Days::new(i as u64 % span_days))
                .expect("date in range");
            raw_row(&date.format("%Y-%m-%d").to_string(), product, "2", "10.00")
        })
        .collect()
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
