use thiserror::Error;

/// Failures of the reading and policy layer around the pipeline.
///
/// The transform and validation stages never return these; bad rows are
/// reported as values inside their results.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input has no header row")]
    MissingHeaders,

    #[error("mapped column '{column}' for field '{field}' is not present in the input headers")]
    UnknownColumn { field: String, column: String },

    #[error("required field '{field}' has no column mapped")]
    UnmappedField { field: String },

    #[error("input has {rows} row(s), above the configured limit of {limit}")]
    TooManyRows { rows: usize, limit: usize },

    #[error("input file is {size}, above the upload limit of {limit}")]
    FileTooLarge { size: String, limit: String },

    #[error("file extension '{extension}' is not accepted (expected one of: {allowed})")]
    UnsupportedExtension { extension: String, allowed: String },

    #[error("failed to decode row {row} with encoding {encoding}")]
    Decode { row: usize, encoding: &'static str },
}
