//! End-to-end CLI tests for the logtab binary.
//!
//! Every command runs in a scratch directory with config discovery pinned
//! to that directory, so a user's own logtab.toml never leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ACCESS_LOG: &str = "time:10/Oct/2023:13:55:36 +0000\tmethod:GET\turi:/slots/s1/ad\tstatus:200\treqtime:0.012
time:10/Oct/2023:13:55:37 +0000\tmethod:GET\turi:/me/report\tstatus:200\treqtime:0.250
time:10/Oct/2023:13:55:38 +0000\tmethod:GET\turi:/favicon.ico\tstatus:404\treqtime:0.001
";

const VMSTAT_LOG: &str = "procs -----------memory---------- ---swap-- -----io---- -system-- ------cpu----- -----timestamp-----
 r  b   swpd   free   buff  cache   si   so    bi    bo   in   cs us sy id wa st                 UTC
 1  0      0 812344  10240 204800    0    0     3     9   51   88  1  0 99  0  0 2023-10-10 13:55:36
 0  0      0 812100  10240 204800    0    0     0     4   49   80  0  1 99  0  0 2023-10-10 13:55:37
";

const ROUTES: &str = r#"
[[routes]]
handler = "routeGetAd"
pattern = 'GET /slots/(.+?)/ad$'

[[routes]]
handler = "routeGetReport"
pattern = 'GET /me/report$'
"#;

/// A scratch working directory plus a logtab command rooted in it.
struct Scratch {
    dir: TempDir,
}

impl Scratch {
    fn new() -> Self {
        Scratch {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    fn logtab(&self) -> Command {
        let mut cmd = Command::cargo_bin("logtab").expect("logtab binary should exist");
        cmd.current_dir(self.dir.path())
            .env_remove("LOGTAB_CONFIG")
            .env_remove("LOGTAB_LOG")
            .env_remove("LOGTAB_LOG_FORMAT")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"));
        cmd
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

// ============================================================================
// Access logs
// ============================================================================

mod access {
    use super::*;

    #[test]
    fn csv_includes_handler_column() {
        let s = Scratch::new();
        let log = s.write("access.log", ACCESS_LOG);
        let config = s.write("routes.toml", ROUTES);

        s.logtab()
            .args(["--config", arg(&config), "access", arg(&log), "--format", "csv"])
            .assert()
            .success()
            .stdout(predicate::str::contains("handler"))
            .stdout(predicate::str::contains("routeGetAd"))
            .stdout(predicate::str::contains("routeGetReport"));
    }

    #[test]
    fn working_directory_config_is_discovered() {
        let s = Scratch::new();
        let log = s.write("access.log", ACCESS_LOG);
        s.write("logtab.toml", ROUTES);

        s.logtab()
            .args(["access", arg(&log), "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"handler\":\"routeGetReport\""))
            .stdout(predicate::str::contains("\"handler\":null"));
    }

    #[test]
    fn summary_reports_rows_and_types() {
        let s = Scratch::new();
        let log = s.write("access.log", ACCESS_LOG);

        s.logtab()
            .args(["access", arg(&log), "--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("rows: 3"))
            .stdout(predicate::str::contains("reqtime: float64"));
    }

    #[test]
    fn parquet_written_to_output() {
        let s = Scratch::new();
        let log = s.write("access.log", ACCESS_LOG);
        let out = s.path("out/access.parquet");

        s.logtab()
            .args(["access", arg(&log), "--format", "parquet", "--output", arg(&out)])
            .assert()
            .success();
        assert!(out.exists());
    }

    #[test]
    fn parquet_without_output_is_args_error() {
        let s = Scratch::new();
        let log = s.write("access.log", ACCESS_LOG);

        s.logtab()
            .args(["access", arg(&log), "--format", "parquet"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("requires --output"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let s = Scratch::new();
        s.logtab()
            .args(["access", arg(&s.path("nope.log"))])
            .assert()
            .code(21)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn malformed_line_is_parse_error() {
        let s = Scratch::new();
        let log = s.write("access.log", &format!("{}garbage\n", ACCESS_LOG));

        s.logtab()
            .args(["access", arg(&log)])
            .assert()
            .code(12)
            .stderr(predicate::str::contains("line 4"));
    }

    #[test]
    fn lenient_flag_skips_malformed_line() {
        let s = Scratch::new();
        let log = s.write("access.log", &format!("{}garbage\n", ACCESS_LOG));

        s.logtab()
            .args(["access", arg(&log), "--lenient", "--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("rows: 3"));
    }

    #[test]
    fn invalid_route_pattern_is_config_error() {
        let s = Scratch::new();
        let log = s.write("access.log", ACCESS_LOG);
        let config = s.write(
            "bad.toml",
            "[[routes]]\nhandler = \"bad\"\npattern = 'GET /('\n",
        );

        s.logtab()
            .args(["--config", arg(&config), "access", arg(&log)])
            .assert()
            .code(11);
    }
}

// ============================================================================
// vmstat logs
// ============================================================================

mod vmstat {
    use super::*;

    #[test]
    fn summary_lists_counters_and_datetime() {
        let s = Scratch::new();
        let log = s.write("vmstat.log", VMSTAT_LOG);

        s.logtab()
            .args(["vmstat", arg(&log), "--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("rows: 2"))
            .stdout(predicate::str::contains("columns: 18"))
            .stdout(predicate::str::contains("free: int64"))
            .stdout(predicate::str::contains("datetime: timestamp[us]"));
    }

    #[test]
    fn readable_relabels_columns() {
        let s = Scratch::new();
        let log = s.write("vmstat.log", VMSTAT_LOG);

        s.logtab()
            .args(["vmstat", arg(&log), "--readable", "--format", "csv"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[Memory] The amount of idle memory."));
    }

    #[test]
    fn header_only_file_succeeds() {
        let s = Scratch::new();
        let header: String = VMSTAT_LOG.lines().take(2).collect::<Vec<_>>().join("\n");
        let log = s.write("vmstat.log", &header);

        s.logtab()
            .args(["vmstat", arg(&log), "--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("rows: 0"));
    }

    #[test]
    fn truncated_header_is_parse_error() {
        let s = Scratch::new();
        let log = s.write("vmstat.log", "procs\n");

        s.logtab().args(["vmstat", arg(&log)]).assert().code(12);
    }
}

// ============================================================================
// Misc commands and arguments
// ============================================================================

mod misc {
    use super::*;

    #[test]
    fn fields_lists_dictionary() {
        Scratch::new()
            .logtab()
            .arg("fields")
            .assert()
            .success()
            .stdout(predicate::str::contains("free"))
            .stdout(predicate::str::contains("[CPU] Time spent idle"));
    }

    #[test]
    fn init_writes_template_and_refuses_overwrite() {
        let s = Scratch::new();

        s.logtab().arg("init").assert().success();
        let written = fs::read_to_string(s.path("logtab.toml")).unwrap();
        assert!(written.contains("routeGetAdWithId"));

        s.logtab()
            .arg("init")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("--force"));

        s.logtab().args(["init", "--force"]).assert().success();
    }

    #[test]
    fn init_custom_path() {
        let s = Scratch::new();
        let target = s.path("conf/custom.toml");
        s.logtab()
            .args(["init", "--path", arg(&target)])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
        assert!(target.exists());
    }

    #[test]
    fn missing_explicit_config_is_config_error() {
        let s = Scratch::new();
        s.logtab()
            .args(["--config", arg(&s.path("missing.toml")), "fields"])
            .assert()
            .success();

        let log = s.write("access.log", ACCESS_LOG);
        s.logtab()
            .args(["--config", arg(&s.path("missing.toml")), "access", arg(&log)])
            .assert()
            .code(11);
    }

    #[test]
    fn unknown_flag_is_args_error() {
        Scratch::new()
            .logtab()
            .args(["access", "--bogus"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_format_is_args_error() {
        Scratch::new()
            .logtab()
            .args(["vmstat", "--format", "xml"])
            .assert()
            .code(10);
    }

    #[test]
    fn help_exits_clean() {
        Scratch::new()
            .logtab()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("access"));
    }

    #[test]
    fn jsonl_logs_go_to_stderr() {
        let s = Scratch::new();
        let log = s.write("access.log", ACCESS_LOG);

        s.logtab()
            .args(["--log-format", "jsonl", "-v", "access", arg(&log), "--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("rows: 3"))
            .stderr(predicate::str::contains("\"message\":\"access log parsed\""));
    }
}
