//! Configuration file loading and path discovery.
//!
//! Resolution order: `--config` → `LOGTAB_CONFIG` → `./logtab.toml` →
//! XDG config dir (`~/.config/logtab/logtab.toml`) → built-in defaults.
//! An explicitly named file (CLI or environment) must exist.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exit_codes::ExitCode;
use crate::routes::{RoutePattern, RouteTable};

/// Environment variable naming a config file.
pub const ENV_CONFIG_PATH: &str = "LOGTAB_CONFIG";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "logtab.toml";

/// Application name for XDG directories.
const APP_NAME: &str = "logtab";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),
}

impl ConfigError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ConfigError::Io { .. } => ExitCode::IoError,
            ConfigError::AlreadyExists(_) => ExitCode::ArgsError,
            _ => ExitCode::ConfigError,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default access log when none is given on the command line.
    #[serde(default = "default_access_log")]
    pub access_log: PathBuf,

    /// Default vmstat log when none is given on the command line.
    #[serde(default = "default_vmstat_log")]
    pub vmstat_log: PathBuf,

    /// Relabel vmstat columns with their descriptions.
    #[serde(default)]
    pub readable_columns: bool,

    /// Skip malformed access log lines instead of failing.
    #[serde(default)]
    pub lenient: bool,

    /// Ordered route patterns; the first match wins.
    #[serde(default)]
    pub routes: Vec<RoutePattern>,
}

fn default_access_log() -> PathBuf {
    PathBuf::from("/var/log/nginx/access.log")
}

fn default_vmstat_log() -> PathBuf {
    PathBuf::from("/var/log/vmstat.log")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            access_log: default_access_log(),
            vmstat_log: default_vmstat_log(),
            readable_columns: false,
            lenient: false,
            routes: Vec::new(),
        }
    }
}

impl Config {
    /// Defaults plus a sample route set for an ad-serving application.
    pub fn template() -> Self {
        let routes = [
            ("routePostAd", r"POST /slots/(.+?)/ads$"),
            ("routeGetAd", r"GET /slots/(.+?)/ad$"),
            ("routeGetAdWithId", r"GET /slots/(.+?)/ads/(\d+?)$"),
            ("routeGetAdAsset", r"GET /slots/(.+?)/ads/(\d+?)/asset$"),
            ("routeGetAdCount", r"POST /slots/(.+?)/ads/(\d+?)/count$"),
            ("routeGetAdRedirect", r"GET /slots/(.+?)/ads/(\d+?)/redirect$"),
            ("routeGetReport", r"GET /me/report$"),
            ("routeGetFinalReport", r"GET /me/final_report$"),
        ]
        .into_iter()
        .map(|(handler, pattern)| RoutePattern::new(handler, pattern))
        .collect();

        Config {
            routes,
            ..Config::default()
        }
    }

    pub fn from_toml(s: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Read, parse, and validate a config file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Config::from_toml(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check route names are present and unique and patterns compile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (idx, route) in self.routes.iter().enumerate() {
            if route.handler.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "routes[{}]: handler name is empty",
                    idx
                )));
            }
            if self.routes[..idx].iter().any(|r| r.handler == route.handler) {
                return Err(ConfigError::Invalid(format!(
                    "routes[{}]: duplicate handler `{}`",
                    idx, route.handler
                )));
            }
        }
        self.route_table().map(|_| ())
    }

    /// Compile the configured routes.
    pub fn route_table(&self) -> Result<RouteTable, ConfigError> {
        RouteTable::compile(&self.routes).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Write the template config to `path`, creating parent directories.
/// An existing file is only replaced with `force`.
pub fn write_template(path: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let text = Config::template().to_toml()?;
    fs::write(path, text).map_err(io_err)?;
    Ok(path.to_path_buf())
}

/// Where the configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in the working directory.
    WorkingDirectory,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::WorkingDirectory => write!(f, "working directory"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A loaded config and its provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
}

/// Candidate locations, split out so resolution can be tested without
/// touching the process environment.
#[derive(Debug, Clone, Default)]
pub struct SearchPaths {
    pub cli: Option<PathBuf>,
    pub env: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
    pub xdg_config_dir: Option<PathBuf>,
}

impl SearchPaths {
    /// Search paths from the CLI argument and the current process.
    pub fn from_env(cli: Option<&Path>) -> Self {
        SearchPaths {
            cli: cli.map(Path::to_path_buf),
            env: std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from),
            working_dir: std::env::current_dir().ok(),
            xdg_config_dir: dirs::config_dir(),
        }
    }

    /// Pick the config file to load.
    pub fn resolve(&self) -> Result<(Option<PathBuf>, ConfigSource), ConfigError> {
        if let Some(path) = &self.cli {
            return explicit(path, ConfigSource::CliArgument);
        }
        if let Some(path) = &self.env {
            return explicit(path, ConfigSource::Environment);
        }
        if let Some(dir) = &self.working_dir {
            let path = dir.join(CONFIG_FILENAME);
            if path.is_file() {
                return Ok((Some(path), ConfigSource::WorkingDirectory));
            }
        }
        if let Some(dir) = &self.xdg_config_dir {
            let path = dir.join(APP_NAME).join(CONFIG_FILENAME);
            if path.is_file() {
                return Ok((Some(path), ConfigSource::XdgConfig));
            }
        }
        Ok((None, ConfigSource::BuiltinDefault))
    }

    /// Resolve and load.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let (path, source) = self.resolve()?;
        let config = match &path {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(LoadedConfig {
            config,
            source,
            path,
        })
    }
}

fn explicit(path: &Path, source: ConfigSource) -> Result<(Option<PathBuf>, ConfigSource), ConfigError> {
    if path.is_file() {
        Ok((Some(path.to_path_buf()), source))
    } else {
        Err(ConfigError::NotFound(path.to_path_buf()))
    }
}

/// Load configuration using the standard resolution order.
pub fn load_config(cli_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    SearchPaths::from_env(cli_path).load()
}
