//! Shared configuration logic for the serial bridge and the database utilities.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [database]
//! host = "localhost"
//! port = 3306
//! user = "root"
//! password = "secret"
//! database = "t1db"
//! connect_timeout_secs = 10
//!
//! [schema]
//! name = "testdb"
//!
//! [serial]
//! device = "/dev/ttyUSB0"
//! baud = 9600
//! greeting = "Hello"
//! interval_ms = 100
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! usable configuration. Environment variables are applied on top of the file,
//! see [`Config::apply_env_overrides`].
//!
//! ## Example: Rust Usage
//!
//! ```rust
//! use parkgate_shared::config::Config;
//! let toml_str = r#"
//! [database]
//! host = "db.local"
//!
//! [serial]
//! baud = 115200
//! "#;
//! let config: Config = toml::from_str(toml_str).unwrap();
//! assert_eq!(config.database.host, "db.local");
//! assert_eq!(config.database.port, 3306);
//! assert_eq!(config.serial.baud, 115200);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Path used when no `--config` argument is given.
pub const DEFAULT_CONFIG_PATH: &str = "parkgate.toml";

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_SERIAL_DEVICE: &str = "SERIAL_DEVICE";
pub const ENV_SERIAL_BAUD: &str = "SERIAL_BAUD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {var}")]
    InvalidOverride { var: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub serial: SerialConfig,
}

/// MySQL connection settings.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Default schema selected after connecting. `None` connects to the server only.
    #[serde(default = "default_database")]
    pub database: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    /// `user@host:port/schema` with `schema` as the selected schema, safe to log.
    pub fn target(&self, schema: Option<&str>) -> String {
        format!(
            "{}@{}:{}/{}",
            self.user,
            self.host,
            self.port,
            schema.unwrap_or("")
        )
    }

    /// Apply `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`.
    /// An empty `DB_NAME` clears the default schema.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_DB_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_DB_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { var: ENV_DB_PORT, value: port.clone() })?;
        }
        if let Some(user) = lookup(ENV_DB_USER) {
            self.user = user;
        }
        if let Some(password) = lookup(ENV_DB_PASSWORD) {
            self.password = password;
        }
        if let Some(name) = lookup(ENV_DB_NAME) {
            self.database = if name.is_empty() { None } else { Some(name) };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("database.host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("database.port must be > 0".to_string()));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid("database.connect_timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    /// Name of the schema created by `create-schema`.
    #[serde(default = "default_schema_name")]
    pub name: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            name: default_schema_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_baud")]
    pub baud: u32,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Period between greetings, also the back-off after a failed read.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
    /// Capacity of the queue between the device reader and stdout.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud: default_baud(),
            greeting: default_greeting(),
            interval_ms: default_interval_ms(),
            write_timeout_ms: default_write_timeout_ms(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl SerialConfig {
    /// Apply `SERIAL_DEVICE` and `SERIAL_BAUD`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(device) = lookup(ENV_SERIAL_DEVICE) {
            self.device = device;
        }
        if let Some(baud) = lookup(ENV_SERIAL_BAUD) {
            self.baud = baud
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { var: ENV_SERIAL_BAUD, value: baud.clone() })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.trim().is_empty() {
            return Err(ConfigError::Invalid("serial.device must not be empty".to_string()));
        }
        if self.baud == 0 {
            return Err(ConfigError::Invalid("serial.baud must be > 0".to_string()));
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid("serial.interval_ms must be > 0".to_string()));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::Invalid("serial.write_timeout_ms must be > 0".to_string()));
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::Invalid("serial.queue_depth must be > 0".to_string()));
        }
        Ok(())
    }
}

/// The part of the configuration a binary works with.
///
/// The serial bridge and the database utilities are unrelated, so each one
/// only takes environment overrides for its own section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Database,
    Serial,
}

impl Config {
    /// Apply environment overrides to every section, using `lookup` to
    /// resolve variable names.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.database.apply_env_overrides(&lookup)?;
        self.serial.apply_env_overrides(&lookup)
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_overrides(process_env)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.serial.validate()
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 3306 }
fn default_user() -> String { "root".to_string() }
fn default_database() -> Option<String> { Some("t1db".to_string()) }
fn default_connect_timeout_secs() -> u64 { 10 }
fn default_schema_name() -> String { "testdb".to_string() }
fn default_device() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud() -> u32 { 9600 }
fn default_greeting() -> String { "Hello".to_string() }
fn default_interval_ms() -> u64 { 100 }
fn default_write_timeout_ms() -> u64 { 1000 }
fn default_queue_depth() -> usize { 64 }

pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            Err(ConfigError::Read { path: path.to_string(), source: e })
        }
    }
}

/// Resolve the configuration for a binary working with `section`.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_PATH`] is read
/// if present and the built-in defaults are used otherwise. Process environment
/// overrides for `section` are applied last. Validation is left to the caller,
/// which may still apply command-line overrides.
pub fn resolve_config(path: Option<&str>, section: Section) -> Result<Config, ConfigError> {
    resolve_with(path, DEFAULT_CONFIG_PATH, section, process_env)
}

fn resolve_with<F>(
    path: Option<&str>,
    default_path: &str,
    section: Section,
    lookup: F,
) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_config(path)?,
        None if Path::new(default_path).exists() => load_config(default_path)?,
        None => {
            tracing::debug!("No {} found, using built-in defaults", default_path);
            Config::default()
        }
    };
    match section {
        Section::Database => config.database.apply_env_overrides(lookup)?,
        Section::Serial => config.serial.apply_env_overrides(lookup)?,
    }
    Ok(config)
}
