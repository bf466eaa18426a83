use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::yaml_provider;

/// Data-quality heuristics used by the statistics engine.
///
/// Defaults are the shipped values; a thresholds file may override any
/// subset of keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Shortest history (in calendar days, inclusive) considered enough for forecasting.
    pub min_history_days: u32,
    pub min_rows_per_product: usize,
    pub min_unique_products: usize,
    /// A quantity or price above this multiple of its mean is flagged.
    pub high_value_multiplier: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_history_days: 90,
            min_rows_per_product: 30,
            min_unique_products: 3,
            high_value_multiplier: 10.0,
        }
    }
}

impl Thresholds {
    pub fn load(path: &Path) -> Result<Self> {
        yaml_provider::load_from_path(path)
            .with_context(|| format!("Loading thresholds from {path:?}"))
    }
}

/// Size and row-count policy applied by the caller before the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Files larger than this are refused before any parsing.
    pub max_file_bytes: u64,
    /// Above this size the upload proceeds with a warning.
    pub warning_file_bytes: u64,
    /// Above this many rows the upload proceeds with a warning.
    pub warning_rows: usize,
    /// Above this many rows the upload is refused.
    pub max_rows: Option<usize>,
    /// File extensions accepted for upload, compared case-insensitively.
    pub allowed_extensions: &'static [&'static str],
}

pub const MIB: u64 = 1024 * 1024;

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 50 * MIB,
            warning_file_bytes: 10 * MIB,
            warning_rows: 50_000,
            max_rows: None,
            allowed_extensions: &["csv", "tsv"],
        }
    }
}

impl UploadLimits {
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

/// Human-readable byte count, e.g. `12.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}
