pub mod checks;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod io_utils;
pub mod mapping;
pub mod numbers;
pub mod record;
pub mod report;
pub mod stats;
pub mod table_input;
pub mod transform;
pub mod validate;
pub mod yaml_provider;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{CheckArgs, Cli, Commands, MappingTemplateArgs},
    config::{Thresholds, UploadLimits},
    error::IngestError,
    mapping::{ColumnMapping, RecheckPolicy, TransformConfig},
    record::{RawRecord, TransformResult},
    validate::{ValidationVerdict, Validator},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sales_ingest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Outcome of a CLI invocation that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
}

pub fn run() -> Result<Outcome> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => handle_check(&args),
        Commands::MappingTemplate(args) => handle_mapping_template(&args).map(|_| Outcome::Accepted),
    }
}

/// Transform then validate: the whole in-memory pipeline for one upload.
pub fn run_pipeline(
    rows: &[RawRecord],
    config: &TransformConfig,
    validator: &Validator,
) -> (TransformResult, ValidationVerdict) {
    let transformed = transform::transform(rows, config);
    let verdict = validator.validate(&transformed.data);
    (transformed, verdict)
}

fn handle_check(args: &CheckArgs) -> Result<Outcome> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Checking '{}' with delimiter '{}' (decimal '{}', dates {})",
        args.input.display(),
        printable_delimiter(delimiter),
        args.decimal_separator,
        args.date_format
    );

    let mapping = ColumnMapping::load(&args.mapping)?;
    let thresholds = match &args.thresholds {
        Some(path) => Thresholds::load(path)?,
        None => Thresholds::default(),
    };
    let validator = Validator::new(thresholds);
    debug!("Thresholds: {:?}", validator.thresholds());

    let defaults = UploadLimits::default();
    let limits = UploadLimits {
        max_rows: args.max_rows,
        max_file_bytes: args.max_file_bytes.unwrap_or(defaults.max_file_bytes),
        ..defaults
    };
    let table = table_input::read_table(&args.input, delimiter, encoding, &limits)?;
    table_input::enforce_limits(&table, &limits)?;

    for (field, column) in mapping.missing_columns(&table.headers) {
        let problem = if column.is_empty() {
            IngestError::UnmappedField {
                field: field.to_string(),
            }
        } else {
            IngestError::UnknownColumn {
                field: field.to_string(),
                column,
            }
        };
        warn!("{problem}");
    }

    let config = TransformConfig::new(mapping)
        .with_date_format(args.date_format)
        .with_decimal_separator(args.decimal_separator)
        .with_recheck(if args.legacy_skip {
            RecheckPolicy::Skip
        } else {
            RecheckPolicy::Report
        });
    let (transformed, verdict) = run_pipeline(&table.rows, &config, &validator);

    if args.json {
        io_utils::write_json(None, &report::CheckReport::new(&transformed, &verdict))?;
    } else {
        print!(
            "{}",
            report::render_text(&transformed, &verdict, args.examples)
        );
    }

    if !verdict.valid {
        return Ok(Outcome::Rejected);
    }
    if let Some(output) = &args.output {
        io_utils::write_json(Some(output), &transformed.data)
            .with_context(|| format!("Writing accepted records to {output:?}"))?;
        info!(
            "{} accepted record(s) written to {:?}",
            transformed.data.len(),
            output
        );
    }
    Ok(Outcome::Accepted)
}

fn handle_mapping_template(args: &MappingTemplateArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let table =
        table_input::read_table(&args.input, delimiter, encoding, &UploadLimits::default())?;
    let mapping = mapping::suggest_mapping(&table.headers);
    print!("{}", mapping.to_yaml_string()?);
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
