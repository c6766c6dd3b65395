//! Row-oriented table construction with per-column type inference.
//!
//! Rows are pushed as ordered `(name, Cell)` pairs. Columns appear in the
//! order they are first seen (declared columns first). When the builder is
//! finished each column is materialized as a single Arrow array whose type
//! is inferred from the cells it holds:
//!
//! - text that always parses as a number becomes `Float64`
//! - integers stay `Int64`, mixing in floats widens to `Float64`
//! - timestamps keep their shared UTC offset as the column timezone
//! - anything else falls back to `Utf8`

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float64Array, Int64Array, ListBuilder, StringArray, StringBuilder,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::FixedOffset;

use crate::cell::{Cell, CellKind};
use crate::error::Result;
use crate::table::Table;

/// Timezone label used when a timestamp column mixes UTC offsets.
pub const MIXED_OFFSET_TIMEZONE: &str = "UTC";

/// One row of named values, in insertion order.
pub type Row = Vec<(String, Cell)>;

struct ColumnSlot {
    name: String,
    declared: Option<CellKind>,
    cells: Vec<Cell>,
}

/// Builds a [`Table`] from rows of named values.
#[derive(Default)]
pub struct TableBuilder {
    columns: Vec<ColumnSlot>,
    index: HashMap<String, usize>,
    rows: usize,
}

/// Concrete column type chosen for a finished column.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ColumnType {
    Utf8,
    Int64,
    Float64,
    Timestamp(String),
    NaiveTimestamp,
    TextList,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a column ahead of any row so that it exists (with a known
    /// type) even if no row ever sets it.
    pub fn declare(&mut self, name: impl Into<String>, kind: CellKind) -> &mut Self {
        let idx = self.slot_for(name.into());
        self.columns[idx].declared = Some(kind);
        self
    }

    /// Builder-style variant of [`TableBuilder::declare`].
    pub fn with_column(mut self, name: impl Into<String>, kind: CellKind) -> Self {
        self.declare(name, kind);
        self
    }

    /// Append one row. A name repeated within the row keeps its first
    /// position and takes the last value.
    pub fn push_row<I, K>(&mut self, row: I)
    where
        I: IntoIterator<Item = (K, Cell)>,
        K: Into<String>,
    {
        for (name, cell) in row {
            let idx = self.slot_for(name.into());
            let cells = &mut self.columns[idx].cells;
            if cells.len() > self.rows {
                if let Some(last) = cells.last_mut() {
                    *last = cell;
                }
            } else {
                cells.push(cell);
            }
        }

        self.rows += 1;
        for slot in &mut self.columns {
            if slot.cells.len() < self.rows {
                slot.cells.push(Cell::Null);
            }
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Materialize the Arrow record batch.
    pub fn finish(self) -> Result<Table> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len());

        for slot in &self.columns {
            let column_type = infer_column_type(&slot.cells, slot.declared);
            let array = build_array(&slot.cells, &column_type);
            fields.push(Field::new(&slot.name, array.data_type().clone(), true));
            arrays.push(array);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(self.rows));
        let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Ok(Table::from_record_batch(batch))
    }

    fn slot_for(&mut self, name: String) -> usize {
        if let Some(idx) = self.index.get(&name) {
            return *idx;
        }
        let idx = self.columns.len();
        self.index.insert(name.clone(), idx);
        self.columns.push(ColumnSlot {
            name,
            declared: None,
            cells: vec![Cell::Null; self.rows],
        });
        idx
    }
}

fn infer_column_type(cells: &[Cell], declared: Option<CellKind>) -> ColumnType {
    let kinds: HashSet<CellKind> = cells.iter().filter_map(Cell::kind).collect();

    if kinds.is_empty() {
        return match declared {
            Some(kind) => declared_type(kind),
            None => ColumnType::Utf8,
        };
    }

    let numeric_only = kinds
        .iter()
        .all(|k| matches!(k, CellKind::Text | CellKind::Int | CellKind::Float));
    if numeric_only {
        let text_is_numeric = cells
            .iter()
            .filter(|c| matches!(c, Cell::Text(_)))
            .all(|c| c.as_f64().is_some());
        if kinds.len() == 1 && kinds.contains(&CellKind::Int) {
            return ColumnType::Int64;
        }
        return if text_is_numeric {
            ColumnType::Float64
        } else {
            ColumnType::Utf8
        };
    }

    if kinds.len() > 1 {
        return ColumnType::Utf8;
    }

    match kinds.into_iter().next() {
        Some(CellKind::Timestamp) => ColumnType::Timestamp(shared_timezone(cells)),
        Some(CellKind::NaiveTimestamp) => ColumnType::NaiveTimestamp,
        Some(CellKind::TextList) => ColumnType::TextList,
        _ => ColumnType::Utf8,
    }
}

fn declared_type(kind: CellKind) -> ColumnType {
    match kind {
        CellKind::Text => ColumnType::Utf8,
        CellKind::Int => ColumnType::Int64,
        CellKind::Float => ColumnType::Float64,
        CellKind::Timestamp => ColumnType::Timestamp(MIXED_OFFSET_TIMEZONE.to_string()),
        CellKind::NaiveTimestamp => ColumnType::NaiveTimestamp,
        CellKind::TextList => ColumnType::TextList,
    }
}

/// The offset every timestamp in the column shares, or UTC when they differ.
fn shared_timezone(cells: &[Cell]) -> String {
    let mut offset: Option<FixedOffset> = None;
    for cell in cells {
        if let Cell::Timestamp(ts) = cell {
            match offset {
                None => offset = Some(*ts.offset()),
                Some(existing) if existing != *ts.offset() => {
                    return MIXED_OFFSET_TIMEZONE.to_string();
                }
                Some(_) => {}
            }
        }
    }
    offset
        .map(|o| o.to_string())
        .unwrap_or_else(|| MIXED_OFFSET_TIMEZONE.to_string())
}

fn build_array(cells: &[Cell], column_type: &ColumnType) -> ArrayRef {
    match column_type {
        ColumnType::Utf8 => Arc::new(StringArray::from(
            cells.iter().map(Cell::render).collect::<Vec<_>>(),
        )),
        ColumnType::Int64 => Arc::new(Int64Array::from(
            cells
                .iter()
                .map(|c| match c {
                    Cell::Int(v) => Some(*v),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Float64 => Arc::new(Float64Array::from(
            cells.iter().map(Cell::as_f64).collect::<Vec<_>>(),
        )),
        ColumnType::Timestamp(tz) => Arc::new(
            TimestampMicrosecondArray::from(
                cells
                    .iter()
                    .map(|c| match c {
                        Cell::Timestamp(ts) => Some(ts.timestamp_micros()),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )
            .with_timezone(tz.as_str()),
        ),
        ColumnType::NaiveTimestamp => Arc::new(TimestampMicrosecondArray::from(
            cells
                .iter()
                .map(|c| match c {
                    Cell::NaiveTimestamp(ts) => Some(ts.and_utc().timestamp_micros()),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::TextList => {
            let mut builder = ListBuilder::new(StringBuilder::new());
            for cell in cells {
                match cell {
                    Cell::TextList(items) => {
                        for item in items {
                            builder.values().append_value(item);
                        }
                        builder.append(true);
                    }
                    _ => builder.append(false),
                }
            }
            Arc::new(builder.finish())
        }
    }
}
