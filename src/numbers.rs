//! Locale-aware numeric parsing for spreadsheet cells.
//!
//! Sellers export from tools that disagree on decimal conventions, so the
//! caller declares which separator marks the fraction. Everything else that
//! looks like grouping or decoration (currency symbols, units, spaces) is
//! discarded before the leading float is read.

use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecimalSeparator {
    #[default]
    #[serde(rename = ".", alias = "dot")]
    Dot,
    #[serde(rename = ",", alias = "comma")]
    Comma,
}

impl DecimalSeparator {
    pub fn as_char(self) -> char {
        match self {
            DecimalSeparator::Dot => '.',
            DecimalSeparator::Comma => ',',
        }
    }
}

impl fmt::Display for DecimalSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for DecimalSeparator {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "." | "dot" | "period" => Ok(DecimalSeparator::Dot),
            "," | "comma" => Ok(DecimalSeparator::Comma),
            other => Err(format!(
                "Unknown decimal separator '{other}' (expected '.', ',', 'dot' or 'comma')"
            )),
        }
    }
}

fn leading_float() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)").expect("leading float pattern is valid")
    })
}

/// Parse a raw cell into a float using the declared decimal separator.
///
/// Never fails: unparseable input yields `f64::NAN`, and callers decide what a
/// NaN means for their field. With [`DecimalSeparator::Comma`] every dot is
/// treated as thousands grouping and the first comma becomes the decimal
/// point; with [`DecimalSeparator::Dot`] every comma is grouping.
pub fn parse_number(raw: &str, separator: DecimalSeparator) -> f64 {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = match separator {
        DecimalSeparator::Comma => compact.replace('.', "").replacen(',', ".", 1),
        DecimalSeparator::Dot => compact.replace(',', ""),
    };
    let cleaned: String = normalized
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    leading_float()
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Parse a non-negative integer count (e.g. stock on hand), truncating any
/// fractional part toward zero. Returns `None` for NaN, infinite, or negative
/// input.
pub fn parse_count(raw: &str, separator: DecimalSeparator) -> Option<u64> {
    let value = parse_number(raw, separator);
    if value.is_finite() && value >= 0.0 {
        Some(value.trunc() as u64)
    } else {
        None
    }
}
