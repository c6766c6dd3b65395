//! Parse error taxonomy shared by both log parsers.

use std::path::PathBuf;

use logtab_table::TableError;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that abort a parse call.
///
/// Line numbers are 1-based positions in the input file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: malformed line: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("malformed header: {reason}")]
    MalformedHeader { reason: String },

    #[error("line {line}: malformed sample: {reason}")]
    MalformedSample { line: usize, reason: String },

    #[error("line {line}: malformed timestamp: {reason}")]
    MalformedTimestamp { line: usize, reason: String },

    #[error("line {line}: missing required field `{field}`")]
    MissingField { line: usize, field: String },

    #[error("invalid route pattern for handler `{handler}`: {source}")]
    InvalidPattern {
        handler: String,
        #[source]
        source: regex::Error,
    },

    #[error("table error: {0}")]
    Table(#[from] TableError),
}

impl ParseError {
    /// Stable snake_case name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::FileNotFound { .. } => "file_not_found",
            ParseError::Io { .. } => "io",
            ParseError::MalformedLine { .. } => "malformed_line",
            ParseError::MalformedHeader { .. } => "malformed_header",
            ParseError::MalformedSample { .. } => "malformed_sample",
            ParseError::MalformedTimestamp { .. } => "malformed_timestamp",
            ParseError::MissingField { .. } => "missing_field",
            ParseError::InvalidPattern { .. } => "invalid_pattern",
            ParseError::Table(_) => "table",
        }
    }

    /// Line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MalformedLine { line, .. }
            | ParseError::MalformedSample { line, .. }
            | ParseError::MalformedTimestamp { line, .. }
            | ParseError::MissingField { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Whether the error is confined to a single access-log line and may be
    /// skipped in lenient mode.
    pub fn is_line_error(&self) -> bool {
        matches!(
            self,
            ParseError::MalformedLine { .. }
                | ParseError::MalformedTimestamp { .. }
                | ParseError::MissingField { .. }
        )
    }

    /// CLI exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ParseError::FileNotFound { .. } | ParseError::Io { .. } => ExitCode::IoError,
            ParseError::InvalidPattern { .. } => ExitCode::ConfigError,
            ParseError::Table(TableError::Io(_)) => ExitCode::IoError,
            ParseError::Table(_) => ExitCode::InternalError,
            _ => ExitCode::ParseError,
        }
    }
}
