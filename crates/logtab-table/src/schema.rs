//! Table names and schema descriptions.
//!
//! Tables produced:
//! - `access_log`: one row per web-server request line
//! - `vmstat`: one row per resource sample

use arrow::datatypes::{DataType, Schema, TimeUnit};

/// Tables this workspace knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    AccessLog,
    Vmstat,
}

impl TableName {
    /// Stable string name used for file naming and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::AccessLog => "access_log",
            TableName::Vmstat => "vmstat",
        }
    }

    /// Default Parquet row group size (rows) for this table.
    pub fn row_group_size(&self) -> usize {
        match self {
            TableName::AccessLog => 64 * 1024,
            TableName::Vmstat => 8 * 1024,
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Short lowercase label for a column type, e.g. `float64` or
/// `timestamp[us, +09:00]`.
pub fn type_label(data_type: &DataType) -> String {
    match data_type {
        DataType::Utf8 => "utf8".to_string(),
        DataType::Int64 => "int64".to_string(),
        DataType::Float64 => "float64".to_string(),
        DataType::Timestamp(unit, tz) => {
            let unit = match unit {
                TimeUnit::Second => "s",
                TimeUnit::Millisecond => "ms",
                TimeUnit::Microsecond => "us",
                TimeUnit::Nanosecond => "ns",
            };
            match tz {
                Some(tz) => format!("timestamp[{}, {}]", unit, tz),
                None => format!("timestamp[{}]", unit),
            }
        }
        DataType::List(item) => format!("list<{}>", type_label(item.data_type())),
        other => format!("{:?}", other).to_lowercase(),
    }
}

/// `(name, type label)` for every field in schema order.
pub fn describe_schema(schema: &Schema) -> Vec<(String, String)> {
    schema
        .fields()
        .iter()
        .map(|f| (f.name().clone(), type_label(f.data_type())))
        .collect()
}
