//! Configuration management for rowspool
//!
//! This module handles loading, parsing, and managing configuration:
//! - Configuration files (TOML format)
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection configuration
    pub connection: ConnectionConfig,

    /// Export configuration
    pub export: ExportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Interop server configuration
    pub server: ServerConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Default connection URL used when none is given on the command line
    pub default_url: String,

    /// Default username
    pub username: Option<String>,

    /// Connect timeout in seconds
    pub connect_timeout: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_url: "postgres://localhost:5432/postgres".to_string(),
            username: None,
            connect_timeout: 30,
        }
    }
}

/// Export tuning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Chunk size in bytes for draining binary column streams
    pub binary_chunk_size: usize,

    /// Buffer capacity in bytes for the records writer
    pub write_buffer_size: usize,

    /// Show a progress spinner on interactive runs
    pub progress: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            binary_chunk_size: 1024 * 1024,
            write_buffer_size: 8 * 1024 * 1024,
            progress: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: LogLevel,

    /// Enable timestamps in logs
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            timestamps: false,
        }
    }
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to a tracing level
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Interop server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server command; no server is started when unset
    pub command: Option<String>,

    /// Arguments passed to the server command
    pub args: Vec<String>,

    /// Delay after spawning before the server is considered up
    pub startup_wait_ms: u64,
}

impl Config {
    /// Load configuration from a file, falling back to defaults.
    ///
    /// An explicitly given path must exist. The default path
    /// (`<config dir>/rowspool/config.toml`) is optional: when missing,
    /// built-in defaults apply.
    ///
    /// # Arguments
    /// * `path` - Optional explicit config file path
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Config::default()),
            },
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        Ok(config)
    }

    /// Default config file location under the user config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rowspool").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.export.binary_chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export.binary_chunk_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.export.write_buffer_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export.write_buffer_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.connection.connect_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connection.connect_timeout".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.binary_chunk_size, 1024 * 1024);
        assert!(config.server.command.is_none());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [connection]
            default_url = "postgres://db.internal:5432/warehouse"
            connect_timeout = 5

            [export]
            progress = false

            [server]
            command = "h2-bridge"
            args = ["--tcp-port", "8899"]
            startup_wait_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(
            config.connection.default_url,
            "postgres://db.internal:5432/warehouse"
        );
        assert_eq!(config.connection.connect_timeout, 5);
        assert!(!config.export.progress);
        // Unset sections and fields keep their defaults
        assert_eq!(config.export.write_buffer_size, 8 * 1024 * 1024);
        assert_eq!(config.server.command.as_deref(), Some("h2-bridge"));
        assert_eq!(config.server.args.len(), 2);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.export.binary_chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load_from_file(Some(Path::new("/nonexistent/rowspool.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
    }
}
