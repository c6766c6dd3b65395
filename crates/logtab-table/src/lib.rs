//! Tabular output for logtab.
//!
//! This crate provides:
//! - Row-oriented table construction with per-column type inference
//! - A thin `Table` wrapper over an Arrow record batch
//! - Exporters for pretty text, CSV, JSON, and Parquet

pub mod builder;
pub mod cell;
pub mod error;
pub mod schema;
pub mod table;
pub mod writer;

pub use builder::{Row, TableBuilder};
pub use cell::{Cell, CellKind};
pub use error::{Result, TableError};
pub use schema::{describe_schema, type_label, TableName};
pub use table::Table;
pub use writer::{to_pretty_string, write_csv, write_json, ParquetWriter, WriterConfig};
