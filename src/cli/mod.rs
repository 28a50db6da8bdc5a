//! Command-line interface for rowspool
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Resolving the effective connection parameters and job identity

use clap::{CommandFactory, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{ConfigError, Result};

/// One-shot SQL query export to NDJSON
#[derive(Parser, Debug)]
#[command(
    name = "rowspool",
    version,
    about = "Export one SQL query to NDJSON with a schema sidecar",
    long_about = "Executes a single SQL query and streams the result set to disk as two
artifacts: <jobId>_schema.json describing the columns and <jobId>.json with
one JSON object per row."
)]
pub struct CliArgs {
    /// SQL query to execute
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Database connection URL
    ///
    /// Format: postgres://host[:port][/database]
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Username for authentication
    #[arg(short = 'u', long, value_name = "USERNAME")]
    pub username: Option<String>,

    /// Password for authentication
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Job identifier used to name both artifacts
    ///
    /// A random identifier is generated when omitted.
    #[arg(short = 'j', long = "job-id", value_name = "ID")]
    pub job_id: Option<String>,

    /// Output directory for the artifacts
    #[arg(short = 'o', long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (no progress, no summary)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for rowspool
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    pub fn new() -> Result<Self> {
        Self::with_args(CliArgs::parse())
    }

    /// Create a CLI interface from pre-parsed arguments
    pub fn with_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and validate it
    fn load_config(args: &CliArgs) -> Result<Config> {
        let config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {e}");
            eprintln!("Using default configuration instead.");
            return Ok(Config::default());
        }

        Ok(config)
    }

    /// Parsed arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The SQL query to execute
    pub fn query(&self) -> Result<&str> {
        self.args.query.as_deref().ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "QUERY".to_string(),
                value: "(none)".to_string(),
            }
            .into()
        })
    }

    /// Effective connection URL: command line first, then config file
    pub fn connection_url(&self) -> String {
        match &self.args.url {
            Some(url) => url.clone(),
            None => self.config.connection.default_url.clone(),
        }
    }

    /// Effective username: command line first, then config file
    pub fn username(&self) -> Option<String> {
        self.args
            .username
            .clone()
            .or_else(|| self.config.connection.username.clone())
    }

    /// Job identifier, generated when not given
    pub fn job_id(&self) -> String {
        match &self.args.job_id {
            Some(id) => id.clone(),
            None => uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Whether to show the progress spinner
    pub fn show_progress(&self) -> bool {
        !self.args.quiet && self.config.export.progress
    }

    /// Handle subcommands that short-circuit the export
    ///
    /// # Returns
    /// * `Result<bool>` - True when a subcommand ran and the process is done
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                println!("rowspool {}", env!("CARGO_PKG_VERSION"));
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                self.generate_completion(shell)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn generate_completion(&self, shell: &str) -> Result<()> {
        let shell: clap_complete::Shell = shell.parse().map_err(|_| ConfigError::InvalidValue {
            field: "SHELL".to_string(),
            value: shell.to_string(),
        })?;

        clap_complete::generate(shell, &mut CliArgs::command(), "rowspool", &mut io::stdout());
        Ok(())
    }
}
