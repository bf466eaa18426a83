//! Loading and dumping of the small YAML documents the tool reads: column
//! mappings and threshold overrides. JSON files go through `serde_json` so a
//! mapping produced by a web client can be used as-is.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

pub fn load_from_path<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Reading {path:?}"))?;
    if is_json(path) {
        serde_json::from_str(&raw).with_context(|| format!("Parsing JSON in {path:?}"))
    } else {
        from_str(&raw).with_context(|| format!("Parsing YAML in {path:?}"))
    }
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    Ok(serde_yaml::from_str(input)?)
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}
