//! Reads a delimited upload into a [`RawTable`].

use std::{fs, io::Read, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, warn};

use crate::{
    config::{UploadLimits, format_file_size},
    error::IngestError,
    io_utils,
    record::{RawRecord, RawTable},
};

/// Read an upload from disk after checking its extension and size against `limits`.
pub fn read_table(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
    limits: &UploadLimits,
) -> Result<RawTable> {
    check_upload_file(path, limits)?;
    let reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    read_table_from_csv(reader, encoding).with_context(|| format!("Reading {path:?}"))
}

pub fn read_table_from_reader<R: Read>(
    input: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable> {
    read_table_from_csv(io_utils::open_csv_reader(input, delimiter), encoding)
}

fn read_table_from_csv<R: Read>(
    mut reader: csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<RawTable> {
    let raw_headers = io_utils::reader_headers(&mut reader, encoding)?;
    let slots = io_utils::normalize_headers(&raw_headers);
    let headers: Vec<String> = slots.iter().flatten().cloned().collect();
    if headers.is_empty() {
        return Err(IngestError::MissingHeaders.into());
    }

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let line = row_idx + 2;
        let record = record.with_context(|| format!("Reading row {line}"))?;
        let decoded = io_utils::decode_record(&record, encoding).map_err(|_| IngestError::Decode {
            row: line,
            encoding: encoding.name(),
        })?;
        if decoded.iter().all(|cell| cell.trim().is_empty()) {
            debug!("Ignoring blank line {line}");
            continue;
        }
        let mut row = RawRecord::new();
        for (slot, value) in slots.iter().zip(decoded) {
            if let Some(name) = slot {
                row.insert(name.clone(), value);
            }
        }
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Refuse files with an unexpected extension or above the size cap. Stdin is not checked.
pub fn check_upload_file(path: &Path, limits: &UploadLimits) -> Result<()> {
    if io_utils::is_dash(path) {
        return Ok(());
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    if !limits.allows_extension(extension) {
        return Err(IngestError::UnsupportedExtension {
            extension: extension.to_string(),
            allowed: limits.allowed_extensions.join(", "),
        }
        .into());
    }

    let size = fs::metadata(path)
        .with_context(|| format!("Reading metadata for {path:?}"))?
        .len();
    if size > limits.max_file_bytes {
        return Err(IngestError::FileTooLarge {
            size: format_file_size(size),
            limit: format_file_size(limits.max_file_bytes),
        }
        .into());
    }
    if size > limits.warning_file_bytes {
        warn!(
            "Input is {} (warning level {}); processing may take a while",
            format_file_size(size),
            format_file_size(limits.warning_file_bytes)
        );
    }
    Ok(())
}

/// Apply the caller-side row policy before the pipeline sees the table.
pub fn enforce_limits(table: &RawTable, limits: &UploadLimits) -> Result<(), IngestError> {
    let rows = table.rows.len();
    if let Some(limit) = limits.max_rows
        && rows > limit
    {
        return Err(IngestError::TooManyRows { rows, limit });
    }
    if rows > limits.warning_rows {
        warn!(
            "Upload has {rows} row(s) (warning level {}); processing may take a while",
            limits.warning_rows
        );
    }
    Ok(())
}
