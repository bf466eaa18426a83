//! Date parsing for ambiguous, human-produced spreadsheet dates.
//!
//! Numeric dates are read day-first by default (`05/03/2024` is 5 March), then
//! year-first, and month-first only when the uploader explicitly asked for it.
//! Anything else goes through a generic pass over common ISO and English
//! layouts. Calendar validity is checked strictly: `31/04/2024` is rejected
//! rather than rolled over into May.

use std::{fmt, str::FromStr, sync::OnceLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFormatHint {
    #[default]
    #[serde(alias = "AUTO")]
    Auto,
    #[serde(alias = "DD/MM/YYYY")]
    DayFirst,
    #[serde(alias = "YYYY-MM-DD")]
    YearFirst,
    #[serde(alias = "MM/DD/YYYY")]
    MonthFirst,
}

impl DateFormatHint {
    pub fn as_str(self) -> &'static str {
        match self {
            DateFormatHint::Auto => "auto",
            DateFormatHint::DayFirst => "day-first",
            DateFormatHint::YearFirst => "year-first",
            DateFormatHint::MonthFirst => "month-first",
        }
    }
}

impl fmt::Display for DateFormatHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFormatHint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(DateFormatHint::Auto),
            "day-first" | "dd/mm/yyyy" => Ok(DateFormatHint::DayFirst),
            "year-first" | "yyyy-mm-dd" => Ok(DateFormatHint::YearFirst),
            "month-first" | "mm/dd/yyyy" => Ok(DateFormatHint::MonthFirst),
            other => Err(format!(
                "Unknown date format '{other}' (expected auto, day-first, year-first or month-first)"
            )),
        }
    }
}

fn three_part_short_first() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4})$").expect("valid date pattern")
    })
}

fn three_part_year_first() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})$").expect("valid date pattern")
    })
}

/// Parse a raw cell into a calendar date, or `None` when no reading applies.
pub fn parse_date(raw: &str, hint: DateFormatHint) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(caps) = three_part_short_first().captures(value)
        && let Some(date) = ymd(&caps[3], &caps[2], &caps[1])
    {
        return Some(date);
    }

    if let Some(caps) = three_part_year_first().captures(value)
        && let Some(date) = ymd(&caps[1], &caps[2], &caps[3])
    {
        return Some(date);
    }

    if hint == DateFormatHint::MonthFirst
        && let Some(caps) = three_part_short_first().captures(value)
        && let Some(date) = ymd(&caps[3], &caps[1], &caps[2])
    {
        return Some(date);
    }

    parse_generic(value)
}

// from_ymd_opt refuses out-of-range components, so a successful build is
// already a faithful round trip of the captured digits.
fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_generic(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%b %d %Y",
        "%b %d, %Y",
        "%B %d %Y",
        "%B %d, %Y",
        "%d %b %Y",
        "%d %B %Y",
        "%a %b %d %Y",
    ];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.date_naive());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.date_naive());
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed.date());
        }
    }
    None
}
