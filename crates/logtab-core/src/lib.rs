//! logtab core library.
//!
//! Parsers that turn operational logs into typed tables:
//! - LTSV web access logs, classified by ordered route patterns
//! - `vmstat -t` resource samples, optionally with readable column labels
//!
//! Plus the CLI plumbing shared with the `logtab` binary: configuration,
//! logging setup, output rendering, and exit codes.

pub mod access;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fields;
pub mod input;
pub mod logging;
pub mod output;
pub mod routes;
pub mod vmstat;

pub use access::{parse_access_log, AccessLogOptions, AccessLogOutput, AccessLogParser};
pub use config::{load_config, Config, ConfigError, ConfigSource, LoadedConfig};
pub use error::{ParseError, Result};
pub use exit_codes::ExitCode;
pub use fields::{describe, readable_name, vmstat_fields};
pub use output::{OutputError, OutputFormat};
pub use routes::{RouteMatch, RoutePattern, RouteTable};
pub use vmstat::{parse_vmstat_log, VmstatLogParser};

pub use logtab_table::{Table, TableName};
