//! Access log parser.
//!
//! Input lines are tab-separated `key:value` pairs (LTSV), e.g.
//!
//! ```text
//! time:10/Oct/2023:13:55:36 +0000	method:GET	uri:/slots/s1/ad	status:200
//! ```
//!
//! Every line becomes one table row holding all of its fields, with `time`
//! parsed into a timestamp in place and two derived fields appended:
//! `handler` (the first matching route, or null) and `params` (that route's
//! capture groups).

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use logtab_table::{Cell, CellKind, Row, Table, TableBuilder, TableName};
use tracing::{debug, info, warn};

use crate::error::{ParseError, Result};
use crate::input::{numbered_lines, read_log};
use crate::routes::{RoutePattern, RouteTable};

pub const TIME_FIELD: &str = "time";
pub const METHOD_FIELD: &str = "method";
pub const URI_FIELD: &str = "uri";
pub const HANDLER_FIELD: &str = "handler";
pub const PARAMS_FIELD: &str = "params";

/// Combined-log timestamp format, e.g. `10/Oct/2023:13:55:36 +0000`.
pub const ACCESS_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Segments shorter than this are dropped before key/value splitting.
const MIN_SEGMENT_CHARS: usize = 3;

/// Parser behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessLogOptions {
    /// Skip (and count) lines that fail to parse instead of aborting.
    pub lenient: bool,
}

/// One parsed access log line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAccessRecord {
    /// Raw fields in line order; a repeated key keeps its first position
    /// and its last value.
    pub fields: Vec<(String, String)>,
    pub time: DateTime<FixedOffset>,
    pub handler: Option<String>,
    pub params: Vec<String>,
}

impl ParsedAccessRecord {
    /// Raw value of a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        field_value(&self.fields, key)
    }

    fn into_row(self) -> Row {
        let time = self.time;
        let mut row: Row = self
            .fields
            .into_iter()
            .map(|(key, value)| {
                let cell = if key == TIME_FIELD {
                    Cell::from(time)
                } else {
                    Cell::from(value)
                };
                (key, cell)
            })
            .collect();
        row.push((HANDLER_FIELD.to_string(), Cell::from(self.handler)));
        row.push((PARAMS_FIELD.to_string(), Cell::from(self.params)));
        row
    }
}

/// Result of a parse, including lines skipped in lenient mode.
#[derive(Debug, Clone)]
pub struct AccessLogOutput {
    pub table: Table,
    pub skipped_lines: usize,
}

/// Parses access logs against a fixed set of route patterns.
#[derive(Debug, Clone)]
pub struct AccessLogParser {
    routes: RouteTable,
    options: AccessLogOptions,
}

impl AccessLogParser {
    pub fn new(routes: RouteTable) -> Self {
        AccessLogParser {
            routes,
            options: AccessLogOptions::default(),
        }
    }

    /// Compile `patterns` and build a parser.
    pub fn from_patterns(patterns: &[RoutePattern]) -> Result<Self> {
        Ok(Self::new(RouteTable::compile(patterns)?))
    }

    pub fn with_options(mut self, options: AccessLogOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse a file into a table.
    pub fn parse(&self, path: &Path) -> Result<Table> {
        Ok(self.parse_with_report(path)?.table)
    }

    /// Parse a file, also reporting how many lines were skipped.
    pub fn parse_with_report(&self, path: &Path) -> Result<AccessLogOutput> {
        debug!(
            path = %path.display(),
            routes = self.routes.len(),
            lenient = self.options.lenient,
            "parsing access log"
        );
        let text = read_log(path)?;
        self.parse_str(&text)
    }

    /// Parse in-memory log text.
    pub fn parse_str(&self, text: &str) -> Result<AccessLogOutput> {
        let mut builder = TableBuilder::new();
        let mut skipped_lines = 0;

        for (line_no, line) in numbered_lines(text) {
            match self.parse_line(line_no, line) {
                Ok(record) => builder.push_row(record.into_row()),
                Err(err) if self.options.lenient && err.is_line_error() => {
                    warn!(line = line_no, kind = err.kind(), error = %err, "skipping access log line");
                    skipped_lines += 1;
                }
                Err(err) => return Err(err),
            }
        }

        if builder.num_rows() == 0 {
            builder
                .declare(TIME_FIELD, CellKind::Timestamp)
                .declare(HANDLER_FIELD, CellKind::Text)
                .declare(PARAMS_FIELD, CellKind::TextList);
        }

        let table = builder.finish()?;
        info!(
            table = %TableName::AccessLog,
            rows = table.num_rows(),
            columns = table.num_columns(),
            skipped = skipped_lines,
            "access log parsed"
        );
        Ok(AccessLogOutput {
            table,
            skipped_lines,
        })
    }

    /// Parse and classify a single line.
    pub fn parse_line(&self, line_no: usize, line: &str) -> Result<ParsedAccessRecord> {
        let fields = split_fields(line_no, line)?;
        let time = parse_access_time(line_no, field_value(&fields, TIME_FIELD))?;
        let method = required_field(&fields, line_no, METHOD_FIELD)?;
        let uri = required_field(&fields, line_no, URI_FIELD)?;

        let (handler, params) = match self.routes.classify(method, uri) {
            Some(m) => (Some(m.handler.to_string()), m.params),
            None => (None, Vec::new()),
        };

        Ok(ParsedAccessRecord {
            fields,
            time,
            handler,
            params,
        })
    }
}

/// Parse an access log with the given route patterns (strict mode).
pub fn parse_access_log(path: &Path, patterns: &[RoutePattern]) -> Result<Table> {
    AccessLogParser::from_patterns(patterns)?.parse(path)
}

/// Split a line into `key:value` pairs on tabs and the first colon.
pub fn split_fields(line_no: usize, line: &str) -> Result<Vec<(String, String)>> {
    let mut fields: Vec<(String, String)> = Vec::new();

    for segment in line.split('\t') {
        if segment.chars().count() < MIN_SEGMENT_CHARS {
            continue;
        }
        let (key, value) = segment
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedLine {
                line: line_no,
                reason: format!("segment {:?} has no ':' separator", segment),
            })?;
        match fields.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => fields.push((key.to_string(), value.to_string())),
        }
    }

    if fields.is_empty() {
        return Err(ParseError::MalformedLine {
            line: line_no,
            reason: "no key:value pairs".to_string(),
        });
    }
    Ok(fields)
}

/// Parse a combined-log timestamp such as `10/Oct/2023:13:55:36 +0000`.
pub fn parse_access_time(line_no: usize, value: Option<&str>) -> Result<DateTime<FixedOffset>> {
    let value = value.ok_or_else(|| ParseError::MalformedTimestamp {
        line: line_no,
        reason: format!("missing `{}` field", TIME_FIELD),
    })?;
    if !single_space_before_offset(value) {
        return Err(ParseError::MalformedTimestamp {
            line: line_no,
            reason: format!(
                "{:?} does not match {}: expected one space before the offset",
                value, ACCESS_TIME_FORMAT
            ),
        });
    }
    DateTime::parse_from_str(value, ACCESS_TIME_FORMAT).map_err(|e| {
        ParseError::MalformedTimestamp {
            line: line_no,
            reason: format!("{:?} does not match {}: {}", value, ACCESS_TIME_FORMAT, e),
        }
    })
}

/// chrono lets a format space match any run of whitespace, including none.
fn single_space_before_offset(value: &str) -> bool {
    value.chars().filter(|c| c.is_whitespace()).count() == 1
        && value
            .split_once(' ')
            .is_some_and(|(stamp, offset)| !stamp.is_empty() && !offset.is_empty())
}

fn field_value<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn required_field<'a>(fields: &'a [(String, String)], line_no: usize, key: &str) -> Result<&'a str> {
    field_value(fields, key).ok_or_else(|| ParseError::MissingField {
        line: line_no,
        field: key.to_string(),
    })
}
