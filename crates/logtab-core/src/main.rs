//! logtab - turn web access logs and vmstat output into typed tables.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use logtab_core::access::AccessLogParser;
use logtab_core::config::{load_config, write_template, LoadedConfig, CONFIG_FILENAME};
use logtab_core::exit_codes::ExitCode;
use logtab_core::fields::vmstat_fields;
use logtab_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use logtab_core::output::{emit, OutputFormat};
use logtab_core::vmstat::VmstatLogParser;
use logtab_core::{AccessLogOptions, TableName};
use tracing::{debug, error, info};

/// Parse access logs and vmstat samples into tables
#[derive(Parser)]
#[command(name = "logtab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config file (default: $LOGTAB_CONFIG, ./logtab.toml, then the XDG config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse an LTSV access log
    Access(AccessArgs),

    /// Parse a `vmstat -t` log
    Vmstat(VmstatArgs),

    /// List vmstat column codes and their descriptions
    Fields,

    /// Write a template config file
    Init(InitArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output format
    #[arg(long, short = 'f', default_value = "table")]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AccessArgs {
    /// Access log (default: `access_log` from config)
    file: Option<PathBuf>,

    /// Skip malformed lines instead of failing
    #[arg(long)]
    lenient: bool,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug)]
struct VmstatArgs {
    /// vmstat log (default: `vmstat_log` from config)
    file: Option<PathBuf>,

    /// Label columns with their descriptions
    #[arg(long)]
    readable: bool,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,

    /// Where to write (default: ./logtab.toml)
    #[arg(long)]
    path: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported through the same path
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = cli.global.log_level.or_else(|| {
        (cli.global.quiet || cli.global.verbose > 0)
            .then(|| LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet))
    });
    let log_config = LogConfig::from_env(cli_level, cli.global.log_format);
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Access(args) => run_access(&cli.global, args),
        Commands::Vmstat(args) => run_vmstat(&cli.global, args),
        Commands::Fields => run_fields(),
        Commands::Init(args) => run_init(args),
    };

    std::process::exit(exit_code.as_i32());
}

fn load(global: &GlobalOpts) -> Result<LoadedConfig, ExitCode> {
    match load_config(global.config.as_deref()) {
        Ok(loaded) => {
            debug!(
                source = %loaded.source,
                path = ?loaded.path,
                routes = loaded.config.routes.len(),
                "config loaded"
            );
            Ok(loaded)
        }
        Err(e) => {
            error!(error = %e, "failed to load config");
            Err(e.exit_code())
        }
    }
}

fn run_access(global: &GlobalOpts, args: &AccessArgs) -> ExitCode {
    let loaded = match load(global) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let config = loaded.config;
    let path = args.file.clone().unwrap_or(config.access_log.clone());

    let parser = match AccessLogParser::from_patterns(&config.routes) {
        Ok(parser) => parser.with_options(AccessLogOptions {
            lenient: args.lenient || config.lenient,
        }),
        Err(e) => {
            error!(error = %e, kind = e.kind(), "invalid route patterns");
            return e.exit_code();
        }
    };

    let parsed = match parser.parse_with_report(&path) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(path = %path.display(), kind = e.kind(), line = ?e.line(), "{}", e);
            return e.exit_code();
        }
    };
    if parsed.skipped_lines > 0 {
        info!(skipped = parsed.skipped_lines, "malformed lines skipped");
    }

    write_output(&parsed.table, TableName::AccessLog, &args.out)
}

fn run_vmstat(global: &GlobalOpts, args: &VmstatArgs) -> ExitCode {
    let loaded = match load(global) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let config = loaded.config;
    let path = args.file.clone().unwrap_or(config.vmstat_log.clone());

    let parser = VmstatLogParser::new().readable(args.readable || config.readable_columns);
    let table = match parser.parse(&path) {
        Ok(table) => table,
        Err(e) => {
            error!(path = %path.display(), kind = e.kind(), line = ?e.line(), "{}", e);
            return e.exit_code();
        }
    };

    write_output(&table, TableName::Vmstat, &args.out)
}

fn write_output(table: &logtab_core::Table, name: TableName, out: &OutputArgs) -> ExitCode {
    match emit(table, name, out.format, out.output.as_deref()) {
        Ok(Some(path)) => {
            info!(table = %name, path = %path.display(), rows = table.num_rows(), "table written");
            ExitCode::Clean
        }
        Ok(None) => ExitCode::Clean,
        Err(e) => {
            error!(error = %e, "failed to write output");
            e.exit_code()
        }
    }
}

fn run_fields() -> ExitCode {
    let width = vmstat_fields()
        .iter()
        .map(|(code, _)| code.len())
        .max()
        .unwrap_or(0);
    for (code, description) in vmstat_fields() {
        println!("{:<width$}  {}", code, description, width = width);
    }
    ExitCode::Clean
}

fn run_init(args: &InitArgs) -> ExitCode {
    let path = args
        .path
        .clone()
        .unwrap_or_else(|| Path::new(".").join(CONFIG_FILENAME));
    match write_template(&path, args.force) {
        Ok(path) => {
            println!("{}", path.display());
            info!(path = %path.display(), "template config written");
            ExitCode::Clean
        }
        Err(e) => {
            error!(error = %e, "failed to write config");
            e.exit_code()
        }
    }
}
