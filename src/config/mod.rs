//! Configuration management for the cron exporter
//!
//! Configuration is layered: defaults, then an optional TOML file, then
//! `CRON_EXPORTER_*` environment variables, then command-line flags (applied
//! by the binary).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Crontab and execution log configuration
    pub cron: CronConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address; a leading `:` binds all interfaces
    pub listen_address: String,

    /// Path under which metrics are exposed
    pub metrics_path: String,

    /// Enable request logging
    pub enable_request_logging: bool,
}

/// Crontab and execution log configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CronConfig {
    /// Users whose crontabs are scanned
    pub users: Vec<String>,

    /// Log file cron writes execution records to
    pub syslog_file: PathBuf,

    /// Program used to list crontabs
    pub crontab_command: String,

    /// Run the crontab command through `sudo -n`
    pub use_sudo: bool,

    /// Directories holding per-user crontab files, read when the command fails
    pub spool_dirs: Vec<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from(":9114"),
            metrics_path: String::from("/metrics"),
            enable_request_logging: true,
        }
    }
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            users: parse_users("ubuntu,user2,user3"),
            syslog_file: PathBuf::from("/var/log/syslog"),
            crontab_command: String::from("crontab"),
            use_sudo: true,
            spool_dirs: vec![
                PathBuf::from("/var/spool/cron/crontabs"),
                PathBuf::from("/var/spool/cron"),
            ],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Split a comma-separated user list, dropping blanks
pub fn parse_users(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from defaults plus environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load configuration from a TOML file; missing keys take defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Override values from `CRON_EXPORTER_*` environment variables
    pub fn apply_env(&mut self) {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(v) = var("CRON_EXPORTER_LISTEN_ADDRESS") {
            self.server.listen_address = v;
        }
        if let Some(v) = var("CRON_EXPORTER_METRICS_PATH") {
            self.server.metrics_path = v;
        }
        if let Some(v) = var("CRON_EXPORTER_USERS") {
            self.cron.users = parse_users(&v);
        }
        if let Some(v) = var("CRON_EXPORTER_SYSLOG_FILE") {
            self.cron.syslog_file = PathBuf::from(v);
        }
        if let Some(v) = var("CRON_EXPORTER_CRONTAB_COMMAND") {
            self.cron.crontab_command = v;
        }
        if let Some(v) = var("CRON_EXPORTER_USE_SUDO").and_then(|v| v.parse::<bool>().ok()) {
            self.cron.use_sudo = v;
        }
        if let Some(v) = var("CRON_EXPORTER_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = var("CRON_EXPORTER_LOG_FORMAT") {
            self.logging.format = v;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_address()?;

        let path = &self.server.metrics_path;
        if !path.starts_with('/') || path == "/" {
            return Err(ConfigError::invalid(
                "metrics_path",
                format!("'{}' must start with '/' and not be the root path", path),
            ));
        }
        if path == "/health" {
            return Err(ConfigError::invalid("metrics_path", "'/health' is reserved"));
        }

        if self.cron.users.is_empty() {
            return Err(ConfigError::invalid("users", "at least one user is required"));
        }

        if self.cron.crontab_command.trim().is_empty() {
            return Err(ConfigError::invalid("crontab_command", "must not be empty"));
        }

        Ok(())
    }

    /// Socket address to bind, accepting the host-less `:port` form
    ///
    /// Host names such as `localhost:9114` are resolved; the first address wins.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let addr = &self.server.listen_address;
        let full = if addr.starts_with(':') {
            format!("0.0.0.0{}", addr)
        } else {
            addr.clone()
        };
        if let Ok(socket) = full.parse::<SocketAddr>() {
            return Ok(socket);
        }

        full.to_socket_addrs()
            .map_err(|e| {
                ConfigError::invalid("listen_address", format!("Invalid address {}: {}", addr, e))
            })?
            .next()
            .ok_or_else(|| {
                ConfigError::invalid("listen_address", format!("{} resolved to no address", addr))
            })
    }
}
