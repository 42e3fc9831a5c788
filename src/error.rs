use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Coarse classification of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Column metadata is missing or malformed, or the data does not fit it.
    Format,
    /// A named column (the requested index) is not present.
    Lookup,
    /// The file could not be opened or read.
    Io,
    /// A caller-supplied argument is unusable (bad pattern, unknown extension).
    InvalidInput,
}

/// Every way a table load can fail. Nothing is partially returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read container {}: {source}", path.display())]
    Container {
        path: PathBuf,
        #[source]
        source: ParquetError,
    },

    #[error("cannot read CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}': missing attribute '{attribute}'")]
    MissingAttribute { column: String, attribute: &'static str },

    #[error("column '{column}': malformed attribute '{attribute}': {reason}")]
    MalformedAttribute {
        column: String,
        attribute: &'static str,
        reason: String,
    },

    #[error("column '{column}': unrecognized encoding tag {tag}")]
    UnknownTag { column: String, tag: i64 },

    #[error("column '{column}': cannot read physical data: {source}")]
    Read {
        column: String,
        #[source]
        source: ArrowError,
    },

    #[error("column '{column}': cannot decode physical data: {source}")]
    Decode {
        column: String,
        #[source]
        source: ArrowError,
    },

    #[error("column '{column}': expected {expected} rows, found {found}")]
    RowCount {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("column '{column}', row {row}: cannot parse '{value}' as a timestamp")]
    BadTimestamp {
        column: String,
        row: usize,
        value: String,
    },

    #[error("index column '{0}' is not among the loaded columns")]
    MissingIndex(String),

    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Open { .. }
            | LoadError::Container { .. }
            | LoadError::Csv { .. }
            | LoadError::Read { .. } => ErrorKind::Io,
            LoadError::MissingAttribute { .. }
            | LoadError::MalformedAttribute { .. }
            | LoadError::UnknownTag { .. }
            | LoadError::Decode { .. }
            | LoadError::RowCount { .. }
            | LoadError::BadTimestamp { .. } => ErrorKind::Format,
            LoadError::MissingIndex(_) => ErrorKind::Lookup,
            LoadError::Pattern { .. } | LoadError::UnsupportedExtension(_) => {
                ErrorKind::InvalidInput
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
