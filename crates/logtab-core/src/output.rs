//! Rendering parsed tables for the command line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use logtab_table::{
    describe_schema, to_pretty_string, write_csv, write_json, ParquetWriter, Table, TableError,
    TableName, WriterConfig,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::exit_codes::ExitCode;

/// Supported table output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Boxed text table (default)
    #[default]
    Table,

    /// JSON array of row objects
    Json,

    /// CSV with a header row
    Csv,

    /// Parquet file (requires --output)
    Parquet,

    /// Row count and column types only
    Summary,
}

impl OutputFormat {
    /// Whether the format can only be written to a file.
    pub fn requires_file(self) -> bool {
        matches!(self, OutputFormat::Parquet)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Parquet => write!(f, "parquet"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("--format {0} requires --output")]
    OutputPathRequired(OutputFormat),

    #[error("failed to write {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Stdout(#[source] std::io::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl OutputError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            OutputError::OutputPathRequired(_) => ExitCode::ArgsError,
            OutputError::Io { .. } | OutputError::Stdout(_) => ExitCode::IoError,
            OutputError::Table(TableError::Io(_)) => ExitCode::IoError,
            OutputError::Table(_) => ExitCode::InternalError,
        }
    }
}

/// `rows: N` followed by one `name: type` line per column.
pub fn render_summary(table: &Table) -> String {
    let mut out = format!("rows: {}\ncolumns: {}\n", table.num_rows(), table.num_columns());
    for (name, label) in describe_schema(&table.schema()) {
        out.push_str(&format!("  {}: {}\n", name, label));
    }
    out
}

/// Write a table in a text format.
pub fn render<W: Write>(table: &Table, format: OutputFormat, mut out: W) -> Result<(), OutputError> {
    match format {
        OutputFormat::Table => {
            let text = to_pretty_string(table)?;
            writeln!(out, "{}", text).map_err(OutputError::Stdout)?;
        }
        OutputFormat::Json => {
            write_json(table, &mut out)?;
            writeln!(out).map_err(OutputError::Stdout)?;
        }
        OutputFormat::Csv => write_csv(table, &mut out)?,
        OutputFormat::Summary => {
            out.write_all(render_summary(table).as_bytes())
                .map_err(OutputError::Stdout)?;
        }
        OutputFormat::Parquet => return Err(OutputError::OutputPathRequired(format)),
    }
    out.flush().map_err(OutputError::Stdout)
}

/// Emit a table to `output` or stdout. Returns the written path, if any.
pub fn emit(
    table: &Table,
    name: TableName,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<Option<PathBuf>, OutputError> {
    match (format, output) {
        (OutputFormat::Parquet, Some(path)) => {
            let writer = ParquetWriter::new(name, WriterConfig::new(name));
            Ok(Some(writer.write(table, path)?))
        }
        (f, None) if f.requires_file() => Err(OutputError::OutputPathRequired(f)),
        (f, Some(path)) => {
            let file = File::create(path).map_err(|source| OutputError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            render(table, f, BufWriter::new(file))?;
            debug!(path = %path.display(), format = %f, "table written");
            Ok(Some(path.to_path_buf()))
        }
        (f, None) => {
            let stdout = std::io::stdout();
            render(table, f, stdout.lock())?;
            Ok(None)
        }
    }
}
