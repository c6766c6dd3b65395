//! No-mock table build + Parquet write/read tests.
//!
//! Validates:
//! - Inferred column types survive a Parquet roundtrip
//! - Zero-row tables still write their full column set
//! - Relabelled tables write the new labels

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float64Type, Int64Type, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate};
use logtab_table::{Cell, CellKind, ParquetWriter, Table, TableBuilder, TableName, WriterConfig};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn write_table(temp_dir: &TempDir, table: TableName, data: &Table) -> PathBuf {
    let path = temp_dir.path().join(format!("{}.parquet", table.as_str()));
    ParquetWriter::new(table, WriterConfig::new(table).with_snappy())
        .write(data, &path)
        .expect("write parquet")
}

fn read_parquet_schema(path: &Path) -> Schema {
    let file = fs::File::open(path).expect("open parquet file");
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).expect("parquet reader");
    builder.schema().as_ref().clone()
}

fn read_parquet_batches(path: &Path) -> Vec<RecordBatch> {
    let file = fs::File::open(path).expect("open parquet file");
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).expect("parquet reader");
    let reader = builder.build().expect("build reader");
    reader.collect::<Result<Vec<_>, _>>().expect("read batches")
}

fn access_like_table() -> Table {
    let t1 = DateTime::parse_from_str("10/Oct/2023:13:55:36 +0000", "%d/%b/%Y:%H:%M:%S %z")
        .expect("timestamp");
    let t2 = DateTime::parse_from_str("10/Oct/2023:13:55:37 +0000", "%d/%b/%Y:%H:%M:%S %z")
        .expect("timestamp");

    let mut builder = TableBuilder::new();
    builder.push_row(vec![
        ("time", Cell::from(t1)),
        ("method", Cell::from("GET")),
        ("status", Cell::from("200")),
        ("handler", Cell::from("routeGetAd")),
        ("params", Cell::from(vec!["slot1".to_string()])),
    ]);
    builder.push_row(vec![
        ("time", Cell::from(t2)),
        ("method", Cell::from("POST")),
        ("status", Cell::from("500")),
        ("handler", Cell::Null),
        ("params", Cell::from(Vec::<String>::new())),
    ]);
    builder.finish().expect("build table")
}

// ============================================================================
// Roundtrip Tests
// ============================================================================

#[test]
fn test_access_like_table_parquet_roundtrip() {
    let temp_dir = TempDir::new().expect("temp dir");
    let table = access_like_table();
    let path = write_table(&temp_dir, TableName::AccessLog, &table);

    let schema = read_parquet_schema(&path);
    assert_eq!(schema.fields().len(), 5);
    assert_eq!(
        schema.field_with_name("status").unwrap().data_type(),
        &DataType::Float64
    );
    assert!(matches!(
        schema.field_with_name("time").unwrap().data_type(),
        DataType::Timestamp(TimeUnit::Microsecond, Some(_))
    ));

    let batches = read_parquet_batches(&path);
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(total, 2);

    let status = batches[0]
        .column_by_name("status")
        .unwrap()
        .as_primitive::<Float64Type>();
    assert_eq!(status.value(1), 500.0);

    let handler = batches[0].column_by_name("handler").unwrap();
    assert!(handler.is_null(1));
}

#[test]
fn test_zero_row_table_keeps_columns() {
    let temp_dir = TempDir::new().expect("temp dir");
    let table = TableBuilder::new()
        .with_column("r", CellKind::Int)
        .with_column("b", CellKind::Int)
        .with_column("datetime", CellKind::NaiveTimestamp)
        .finish()
        .expect("build table");
    let path = write_table(&temp_dir, TableName::Vmstat, &table);

    let schema = read_parquet_schema(&path);
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["r", "b", "datetime"]);

    let total: usize = read_parquet_batches(&path).iter().map(|b| b.num_rows()).sum();
    assert_eq!(total, 0);
}

#[test]
fn test_renamed_table_writes_new_labels() {
    let temp_dir = TempDir::new().expect("temp dir");
    let ts = NaiveDate::from_ymd_opt(2023, 10, 10)
        .unwrap()
        .and_hms_opt(13, 55, 36)
        .unwrap();

    let mut builder = TableBuilder::new();
    builder.push_row(vec![("r", Cell::Int(3)), ("datetime", Cell::from(ts))]);
    let table = builder
        .finish()
        .expect("build table")
        .rename_columns(|name| match name {
            "r" => Some("[Procs] runnable".to_string()),
            _ => None,
        })
        .expect("rename");

    let path = write_table(&temp_dir, TableName::Vmstat, &table);
    let batches = read_parquet_batches(&path);
    let runnable = batches[0]
        .column_by_name("[Procs] runnable")
        .expect("renamed column")
        .as_primitive::<Int64Type>();
    assert_eq!(runnable.value(0), 3);
    assert!(batches[0].column_by_name("datetime").is_some());
}
