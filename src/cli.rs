use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{dates::DateFormatHint, numbers::DecimalSeparator};

#[derive(Debug, Parser)]
#[command(author, version, about = "Map and validate uploaded sales spreadsheets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Transform a sales CSV through a column mapping and validate the result
    Check(CheckArgs),
    /// Print a YAML column mapping guessed from a CSV's headers
    MappingTemplate(MappingTemplateArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Column mapping file (YAML or JSON)
    #[arg(short, long)]
    pub mapping: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Decimal separator used by numeric cells ('.' or ',')
    #[arg(long = "decimal-separator", default_value_t = DecimalSeparator::Dot)]
    pub decimal_separator: DecimalSeparator,
    /// How ambiguous numeric dates are read (auto, day-first, year-first, month-first)
    #[arg(long = "date-format", default_value_t = DateFormatHint::Auto)]
    pub date_format: DateFormatHint,
    /// Optional YAML file overriding data-quality thresholds
    #[arg(long)]
    pub thresholds: Option<PathBuf>,
    /// Count rows failing the post-mapping re-check as skipped instead of rejected
    #[arg(long = "legacy-skip")]
    pub legacy_skip: bool,
    /// Refuse inputs with more than this many data rows
    #[arg(long = "max-rows")]
    pub max_rows: Option<usize>,
    /// Refuse input files larger than this many bytes (defaults to 50 MB)
    #[arg(long = "max-file-bytes")]
    pub max_file_bytes: Option<u64>,
    /// Emit the full report as JSON instead of text
    #[arg(long)]
    pub json: bool,
    /// Write accepted records as JSON here when the verdict is valid
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Number of rejected rows and errors listed in the text report
    #[arg(long = "examples", default_value_t = crate::report::DEFAULT_EXAMPLE_LIMIT)]
    pub examples: usize,
}

#[derive(Debug, Args)]
pub struct MappingTemplateArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
