//! Human-readable descriptions of vmstat columns.
//!
//! Descriptions are category-prefixed (`[Procs]`, `[Memory]`, `[Swap]`,
//! `[IO]`, `[System]`, `[CPU]`) and follow the vmstat(8) man page. The
//! derived `datetime` column has a reserved entry.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Name of the derived timestamp column in vmstat tables.
pub const DATETIME_COLUMN: &str = "datetime";

/// Code -> description, in vmstat column order.
pub const VMSTAT_FIELDS: &[(&str, &str)] = &[
    ("r", "[Procs] The number of runnable processes (running or waiting for run time)."),
    ("b", "[Procs] The number of processes in uninterruptible sleep."),
    ("swpd", "[Memory] The amount of virtual memory used."),
    ("free", "[Memory] The amount of idle memory."),
    ("buff", "[Memory] The amount of memory used as buffers."),
    ("cache", "[Memory] The amount of memory used as cache."),
    ("inact", "[Memory] The amount of inactive memory."),
    ("active", "[Memory] The amount of active memory."),
    ("si", "[Swap] Amount of memory swapped in from disk (/s)."),
    ("so", "[Swap] Amount of memory swapped to disk (/s)."),
    ("bi", "[IO] Blocks received from a block device (blocks/s)."),
    ("bo", "[IO] Blocks sent to a block device (blocks/s)."),
    ("in", "[System] The number of interrupts per second, including the clock."),
    ("cs", "[System] The number of context switches per second."),
    ("us", "[CPU] Time spent running non-kernel code. (user time, including nice time)"),
    ("sy", "[CPU] Time spent running kernel code. (system time)"),
    ("id", "[CPU] Time spent idle. Prior to Linux 2.5.41, this includes IO-wait time."),
    ("wa", "[CPU] Time spent waiting for IO. Prior to Linux 2.5.41, included in idle."),
    ("st", "[CPU] Time stolen from a virtual machine. Prior to Linux 2.6.11, unknown."),
    (DATETIME_COLUMN, "Datetime"),
];

static FIELD_INDEX: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| VMSTAT_FIELDS.iter().copied().collect());

/// All entries in vmstat column order.
pub fn vmstat_fields() -> &'static [(&'static str, &'static str)] {
    VMSTAT_FIELDS
}

/// Description for a column code.
pub fn describe(code: &str) -> Option<&'static str> {
    FIELD_INDEX.get(code).copied()
}

/// Readable label for a column code, suitable for `Table::rename_columns`.
pub fn readable_name(code: &str) -> Option<String> {
    describe(code).map(str::to_string)
}
