//! Failure modes of cut construction and evaluation
//!
//! None of these are recoverable from within a pipeline: they abort the
//! current `run` and are surfaced to whoever drives the analysis.

use crate::{cut::Version, expr::ParseError};

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T, E = CutError> = std::result::Result<T, E>;

/// Everything that can go wrong while building or applying cuts
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum CutError {
    /// A cut is missing some mandatory parameter
    #[error("{cut} is not configured: {what}")]
    NotConfigured { cut: String, what: &'static str },

    /// An expression or range references a column absent from the table
    #[error("unresolved reference to column '{column}'")]
    UnresolvedColumn { column: String },

    /// A column exists but holds the wrong kind of data
    #[error("column '{column}' holds {found} values where {expected} values are expected")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A column does not have as many rows as the table it is inserted into
    #[error("column '{column}' has {found} rows, but the table has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A multi-version cut was asked for a version that does not exist
    #[error("{cut} version {requested} is not implemented (available: {available})")]
    UnsupportedVariant {
        cut: String,
        requested: Version,
        available: &'static str,
    },

    /// An expression string could not be parsed
    #[error("cannot parse expression \"{expression}\"")]
    Parse {
        expression: String,
        #[source]
        source: ParseError,
    },

    /// An expression is well-formed but mixes booleans and numbers wrongly
    #[error("type error in expression \"{expression}\": {reason}")]
    Type {
        expression: String,
        reason: &'static str,
    },

    /// Composite splicing referred to a member which is not there
    #[error("{composite} has no member {member}")]
    UnknownMember { composite: String, member: String },

    /// The registry has no cut set under this name
    #[error("no cut set named '{name}' in context '{context}'")]
    UnknownCutSet { context: String, name: String },

    /// An auxiliary data file could not be read
    #[error("cannot read data file {}", path.display())]
    DataFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An auxiliary data file is not valid JSON of the expected shape
    #[error("malformed data file {}", path.display())]
    DataFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An auxiliary data file parsed, but its content is inconsistent
    #[error("invalid data file {}: {reason}", path.display())]
    InvalidData { path: PathBuf, reason: String },
}
