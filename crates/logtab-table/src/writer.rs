//! Table exporters: pretty text, CSV, JSON, and Parquet files.
//!
//! Parquet output is written to a temporary sibling file first and renamed
//! into place once the writer has been closed.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::json::writer::{JsonArray, WriterBuilder};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, Encoding, ZstdLevel};
use parquet::file::properties::{WriterProperties, WriterVersion};
use tracing::debug;

use crate::error::{Result, TableError};
use crate::schema::TableName;
use crate::table::Table;

/// Render the table as an aligned text grid.
pub fn to_pretty_string(table: &Table) -> Result<String> {
    let batch = table.record_batch().clone();
    Ok(pretty_format_batches(&[batch])?.to_string())
}

/// Write the table as CSV with a header row.
///
/// List columns are rendered as JSON arrays since CSV has no nested type.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let batch = flatten_lists(table.record_batch())?;
    let mut csv = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(writer);
    csv.write(&batch)?;
    Ok(())
}

/// Write the table as a JSON array of row objects.
///
/// Null cells are written as `null` so every object carries every column.
pub fn write_json<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut json = WriterBuilder::new()
        .with_explicit_nulls(true)
        .build::<_, JsonArray>(writer);
    json.write(table.record_batch())?;
    json.finish()?;
    Ok(())
}

/// Configuration for Parquet output.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression codec.
    pub compression: Compression,

    /// Maximum rows per row group.
    pub row_group_size: usize,
}

impl WriterConfig {
    /// Create config with defaults for a table.
    pub fn new(table: TableName) -> Self {
        WriterConfig {
            compression: Compression::ZSTD(ZstdLevel::default()),
            row_group_size: table.row_group_size(),
        }
    }

    /// Use snappy compression instead of zstd.
    pub fn with_snappy(mut self) -> Self {
        self.compression = Compression::SNAPPY;
        self
    }
}

/// Writes one table to one Parquet file.
pub struct ParquetWriter {
    table: TableName,
    config: WriterConfig,
}

impl ParquetWriter {
    pub fn new(table: TableName, config: WriterConfig) -> Self {
        ParquetWriter { table, config }
    }

    /// Write `data` to `output_path`, creating parent directories.
    ///
    /// Returns the final path.
    pub fn write(&self, data: &Table, output_path: &Path) -> Result<PathBuf> {
        let file_name = output_path
            .file_name()
            .ok_or_else(|| TableError::InvalidPath(output_path.display().to_string()))?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        let temp_path = output_path.with_file_name(temp_name);

        let props = WriterProperties::builder()
            .set_writer_version(WriterVersion::PARQUET_2_0)
            .set_compression(self.config.compression)
            .set_max_row_group_size(self.config.row_group_size)
            // Dictionary encoding for string columns
            .set_dictionary_enabled(true)
            .set_encoding(Encoding::PLAIN)
            .build();

        let file = File::create(&temp_path)?;
        let mut writer = ArrowWriter::try_new(file, data.schema(), Some(props))?;
        writer.write(data.record_batch())?;
        writer.close()?;

        atomic_rename(&temp_path, output_path)?;
        debug!(
            table = %self.table,
            rows = data.num_rows(),
            path = %output_path.display(),
            "parquet file written"
        );
        Ok(output_path.to_path_buf())
    }
}

/// Helper to rename temp file to final path atomically.
pub fn atomic_rename(temp_path: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp_path, final_path)?;
    Ok(())
}

/// Replace `List<Utf8>` columns with JSON-array text columns.
fn flatten_lists(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema_ref();
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        if let DataType::List(_) = field.data_type() {
            let list = column.as_list::<i32>();
            let mut rendered: Vec<Option<String>> = Vec::with_capacity(list.len());
            for i in 0..list.len() {
                if list.is_null(i) {
                    rendered.push(None);
                    continue;
                }
                let values = list.value(i);
                let items: Vec<Option<&str>> = match values.as_string_opt::<i32>() {
                    Some(strings) => strings.iter().collect(),
                    None => Vec::new(),
                };
                rendered.push(Some(serde_json::to_string(&items)?));
            }
            fields.push(Field::new(field.name(), DataType::Utf8, true));
            columns.push(Arc::new(StringArray::from(rendered)));
        } else {
            fields.push(field.as_ref().clone());
            columns.push(column.clone());
        }
    }

    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &options,
    )?)
}
