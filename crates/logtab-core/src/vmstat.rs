//! vmstat log parser.
//!
//! Expects the layout produced by `vmstat -t`:
//!
//! ```text
//! procs -----------memory---------- ---swap-- -----io---- -system-- ------cpu----- -----timestamp-----
//!  r  b   swpd   free   buff  cache   si   so    bi    bo   in   cs us sy id wa st                 UTC
//!  1  0      0 812344  10240 204800    0    0     3     9   51   88  1  0 99  0  0 2023-10-10 13:55:36
//! ```
//!
//! Line 1 is a grouping header, line 2 names the counters (its last token
//! labels the two-token timestamp and is dropped), and every later line is
//! one sample. vmstat reprints both header lines periodically; those
//! repeats are skipped.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;
use logtab_table::{Cell, CellKind, Table, TableBuilder, TableName};
use tracing::{debug, info};

use crate::error::{ParseError, Result};
use crate::fields::{readable_name, DATETIME_COLUMN};
use crate::input::{numbered_lines, read_log};

/// Format of the joined `<date> <time>` tokens.
pub const VMSTAT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Trailing tokens of each sample that hold the timestamp.
const TIMESTAMP_TOKENS: usize = 2;

/// Counter names taken from the column header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmstatHeader {
    pub columns: Vec<String>,
}

impl VmstatHeader {
    /// Build from the tokens of the column header line.
    pub fn from_tokens(tokens: &[&str]) -> Result<Self> {
        let Some((_, counters)) = tokens.split_last() else {
            return Err(ParseError::MalformedHeader {
                reason: "column header line is empty".to_string(),
            });
        };
        if counters.is_empty() {
            return Err(ParseError::MalformedHeader {
                reason: "column header line names no counters".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for name in counters {
            if *name == DATETIME_COLUMN {
                return Err(ParseError::MalformedHeader {
                    reason: format!("counter {:?} collides with the derived timestamp column", name),
                });
            }
            if !seen.insert(*name) {
                return Err(ParseError::MalformedHeader {
                    reason: format!("duplicate column {:?}", name),
                });
            }
        }

        Ok(VmstatHeader {
            columns: counters.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// One sample row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmstatSample {
    pub counters: Vec<i64>,
    pub datetime: NaiveDateTime,
}

impl VmstatSample {
    /// Parse a data line's tokens against the header's counter columns.
    pub fn from_tokens(line_no: usize, tokens: &[&str], header: &VmstatHeader) -> Result<Self> {
        if tokens.len() < TIMESTAMP_TOKENS {
            return Err(ParseError::MalformedSample {
                line: line_no,
                reason: format!(
                    "expected counters followed by date and time, found {} tokens",
                    tokens.len()
                ),
            });
        }

        let (counter_tokens, ts_tokens) = tokens.split_at(tokens.len() - TIMESTAMP_TOKENS);
        if counter_tokens.len() != header.columns.len() {
            return Err(ParseError::MalformedSample {
                line: line_no,
                reason: format!(
                    "expected {} counters, found {}",
                    header.columns.len(),
                    counter_tokens.len()
                ),
            });
        }

        let counters = counter_tokens
            .iter()
            .zip(&header.columns)
            .map(|(token, column)| {
                token.parse::<i64>().map_err(|_| ParseError::MalformedSample {
                    line: line_no,
                    reason: format!("counter {}={:?} is not an integer", column, token),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let stamp = format!("{} {}", ts_tokens[0], ts_tokens[1]);
        let datetime = NaiveDateTime::parse_from_str(&stamp, VMSTAT_TIME_FORMAT).map_err(|e| {
            ParseError::MalformedTimestamp {
                line: line_no,
                reason: format!("{:?} does not match {}: {}", stamp, VMSTAT_TIME_FORMAT, e),
            }
        })?;

        Ok(VmstatSample { counters, datetime })
    }
}

/// Parses vmstat logs into one row per sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmstatLogParser {
    readable_columns: bool,
}

impl VmstatLogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relabel columns with their FieldDictionary descriptions.
    pub fn readable(mut self, readable_columns: bool) -> Self {
        self.readable_columns = readable_columns;
        self
    }

    pub fn parse(&self, path: &Path) -> Result<Table> {
        debug!(
            path = %path.display(),
            readable = self.readable_columns,
            "parsing vmstat log"
        );
        let text = read_log(path)?;
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> Result<Table> {
        let lines: Vec<(usize, Vec<&str>)> = numbered_lines(text)
            .map(|(line_no, line)| (line_no, line.split_whitespace().collect()))
            .collect();

        if lines.len() < 2 {
            return Err(ParseError::MalformedHeader {
                reason: format!("expected 2 header lines, found {}", lines.len()),
            });
        }
        let group_tokens = &lines[0].1;
        let header_tokens = &lines[1].1;
        let header = VmstatHeader::from_tokens(header_tokens)?;

        let mut builder = TableBuilder::new();
        for column in &header.columns {
            builder.declare(column.as_str(), CellKind::Int);
        }
        builder.declare(DATETIME_COLUMN, CellKind::NaiveTimestamp);

        let mut repeated_headers = 0;
        for (line_no, tokens) in &lines[2..] {
            if tokens == group_tokens || tokens == header_tokens {
                repeated_headers += 1;
                continue;
            }
            let sample = VmstatSample::from_tokens(*line_no, tokens, &header)?;
            let mut row: Vec<(&str, Cell)> = header
                .columns
                .iter()
                .map(String::as_str)
                .zip(sample.counters.into_iter().map(Cell::Int))
                .collect();
            row.push((DATETIME_COLUMN, Cell::from(sample.datetime)));
            builder.push_row(row);
        }

        let mut table = builder.finish()?;
        if self.readable_columns {
            table = table.rename_columns(readable_name)?;
        }

        info!(
            table = %TableName::Vmstat,
            rows = table.num_rows(),
            columns = table.num_columns(),
            repeated_headers,
            "vmstat log parsed"
        );
        Ok(table)
    }
}

/// Parse a vmstat log, optionally with readable column labels.
pub fn parse_vmstat_log(path: &Path, readable_columns: bool) -> Result<Table> {
    VmstatLogParser::new().readable(readable_columns).parse(path)
}
