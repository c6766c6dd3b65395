//! The finished table: a single Arrow record batch with named columns.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::array_value_to_string;

use crate::error::Result;

/// An immutable table of named, typed columns.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    pub fn from_record_batch(batch: RecordBatch) -> Self {
        Table { batch }
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Column labels in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    pub fn column_type(&self, name: &str) -> Option<&DataType> {
        self.batch
            .schema_ref()
            .field_with_name(name)
            .ok()
            .map(|f| f.data_type())
    }

    /// Display form of a single cell, `None` when the cell is null or the
    /// column/row does not exist.
    pub fn cell_text(&self, name: &str, row: usize) -> Option<String> {
        let array = self.column(name)?;
        if row >= array.len() || array.is_null(row) {
            return None;
        }
        array_value_to_string(array, row).ok()
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Return a copy of the table with relabelled columns.
    ///
    /// `rename` is asked for every column; `None` keeps the current label.
    /// Column data is shared, not copied.
    pub fn rename_columns<F>(&self, rename: F) -> Result<Table>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: Vec<Field> = self
            .batch
            .schema_ref()
            .fields()
            .iter()
            .map(|field| match rename(field.name()) {
                Some(label) => field.as_ref().clone().with_name(label),
                None => field.as_ref().clone(),
            })
            .collect();

        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows()));
        let batch = RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            self.batch.columns().to_vec(),
            &options,
        )?;
        Ok(Table { batch })
    }
}
