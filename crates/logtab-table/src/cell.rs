//! Cell values used for row-oriented table construction.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Format used when a naive timestamp has to be rendered as text.
pub const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single value in a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing value.
    Null,
    /// Raw text; may later be inferred as a float column.
    Text(String),
    /// Signed integer counter.
    Int(i64),
    /// Double-precision number.
    Float(f64),
    /// Absolute instant that remembers its UTC offset.
    Timestamp(DateTime<FixedOffset>),
    /// Wall-clock timestamp without a timezone.
    NaiveTimestamp(NaiveDateTime),
    /// Ordered list of strings.
    TextList(Vec<String>),
}

/// The kind of a non-null cell.
///
/// Also used to declare the type of a column that may end up with no values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Text,
    Int,
    Float,
    Timestamp,
    NaiveTimestamp,
    TextList,
}

impl Cell {
    /// Kind of this cell, `None` for nulls.
    pub fn kind(&self) -> Option<CellKind> {
        match self {
            Cell::Null => None,
            Cell::Text(_) => Some(CellKind::Text),
            Cell::Int(_) => Some(CellKind::Int),
            Cell::Float(_) => Some(CellKind::Float),
            Cell::Timestamp(_) => Some(CellKind::Timestamp),
            Cell::NaiveTimestamp(_) => Some(CellKind::NaiveTimestamp),
            Cell::TextList(_) => Some(CellKind::TextList),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric value of the cell, parsing text when needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text form of the cell, used when a column falls back to strings.
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Int(v) => Some(v.to_string()),
            Cell::Float(v) => Some(v.to_string()),
            Cell::Timestamp(ts) => Some(ts.to_rfc3339()),
            Cell::NaiveTimestamp(ts) => Some(ts.format(NAIVE_TIMESTAMP_FORMAT).to_string()),
            Cell::TextList(items) => {
                Some(serde_json::to_string(items).unwrap_or_else(|_| items.join(",")))
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<DateTime<FixedOffset>> for Cell {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Cell::Timestamp(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::NaiveTimestamp(value)
    }
}

impl From<Vec<String>> for Cell {
    fn from(value: Vec<String>) -> Self {
        Cell::TextList(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_kind_of_null_is_none() {
        assert_eq!(Cell::Null.kind(), None);
        assert!(Cell::Null.is_null());
        assert_eq!(Cell::from("x").kind(), Some(CellKind::Text));
    }

    #[test]
    fn test_as_f64_parses_text() {
        assert_eq!(Cell::from("0.25").as_f64(), Some(0.25));
        assert_eq!(Cell::from(" 200 ").as_f64(), Some(200.0));
        assert_eq!(Cell::from("-").as_f64(), None);
        assert_eq!(Cell::Int(3).as_f64(), Some(3.0));
    }

    #[test]
    fn test_render_naive_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2023, 10, 10)
            .unwrap()
            .and_hms_opt(13, 55, 36)
            .unwrap();
        assert_eq!(
            Cell::from(ts).render().as_deref(),
            Some("2023-10-10 13:55:36")
        );
    }

    #[test]
    fn test_render_list_as_json() {
        let cell = Cell::from(vec!["a".to_string(), "42".to_string()]);
        assert_eq!(cell.render().as_deref(), Some(r#"["a","42"]"#));
    }

    #[test]
    fn test_option_into_cell() {
        assert_eq!(Cell::from(None::<String>), Cell::Null);
        assert_eq!(Cell::from(Some("GET")), Cell::Text("GET".to_string()));
    }
}
