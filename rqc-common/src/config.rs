//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (parsed together with the CLI by `clap`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing default config file is not an error; the service starts with
//! defaults. An explicitly requested config file must exist and parse.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::db::DATABASE_FILE;
use crate::sheet::DEFAULT_REQUIREMENT_COLUMN;
use crate::{Error, Result};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5760;

/// Default upload limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub require_login: Option<bool>,
    pub max_upload_bytes: Option<usize>,
    pub requirement_column: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. "info" or "rqc_web=debug"
    pub level: Option<String>,
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub require_login: Option<bool>,
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub bind_address: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub data_dir: PathBuf,
    pub require_login: bool,
    pub max_upload_bytes: usize,
    pub requirement_column: String,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from("model.json"),
            data_dir: default_data_dir(),
            require_login: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            requirement_column: DEFAULT_REQUIREMENT_COLUMN.to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Fully resolved service settings
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub bind_address: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub data_dir: PathBuf,
    pub require_login: bool,
    pub max_upload_bytes: usize,
    pub requirement_column: String,
    pub log_level: String,
}

impl Settings {
    /// Merge CLI/ENV overrides, TOML values and compiled defaults
    pub fn resolve(overrides: &ConfigOverrides, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        Self {
            bind_address: overrides
                .bind_address
                .clone()
                .or_else(|| toml.bind_address.clone())
                .unwrap_or(defaults.bind_address),
            port: overrides.port.or(toml.port).unwrap_or(defaults.port),
            model_path: overrides
                .model_path
                .clone()
                .or_else(|| toml.model_path.clone())
                .unwrap_or(defaults.model_path),
            data_dir: overrides
                .data_dir
                .clone()
                .or_else(|| toml.data_dir.clone())
                .unwrap_or(defaults.data_dir),
            require_login: overrides
                .require_login
                .or(toml.require_login)
                .unwrap_or(defaults.require_login),
            max_upload_bytes: toml.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            requirement_column: toml
                .requirement_column
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.requirement_column),
            log_level: toml.logging.level.clone().unwrap_or(defaults.log_level),
        }
    }

    /// Settings built purely from compiled defaults
    pub fn defaults() -> Self {
        Self::resolve(&ConfigOverrides::default(), &TomlConfig::default())
    }

    /// SQLite database location inside the data folder
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// `host:port` string to bind the listener to
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Outcome of config file discovery
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// File the values came from, `None` when running on defaults
    pub source: Option<PathBuf>,
    pub config: TomlConfig,
}

/// Load the TOML config
///
/// With `explicit` set the file must exist. Otherwise the platform default
/// location is tried and silently skipped when absent.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(LoadedConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    Ok(LoadedConfig {
        source: Some(path),
        config,
    })
}

/// Parse TOML config text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// `<config_dir>/rqc/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rqc").join("config.toml"))
}

/// OS-dependent default data folder
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("rqc"))
        .unwrap_or_else(|| PathBuf::from("./rqc_data"))
}
