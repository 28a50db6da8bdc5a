//! rowspool library
//!
//! Core functionality for the rowspool one-shot SQL export tool. It can be
//! used as a standalone library to embed query exports in other tools.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `driver`: Database driver boundary and the PostgreSQL adapter
//! - `encode`: Value encoding and row serialization
//! - `error`: Error types and handling
//! - `export`: Streaming export driver, artifact writers, job orchestration
//! - `schema`: Column schema extraction
//! - `server`: Auxiliary interop server lifecycle
//!
//! # Example
//!
//! ```no_run
//! use rowspool::config::Config;
//! use rowspool::export::ExportJob;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let job = ExportJob {
//!         url: "postgres://localhost:5432/app".to_string(),
//!         username: None,
//!         password: None,
//!         query: "SELECT id, name FROM users".to_string(),
//!         job_id: "users".to_string(),
//!         out_dir: ".".into(),
//!         show_progress: false,
//!     };
//!
//!     let result = job.run(&Config::default()).await?;
//!     println!("{} rows exported", result.rows_exported);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod driver;
pub mod encode;
pub mod error;
pub mod export;
pub mod schema;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::{ExportError, Result};
pub use export::{ExportCoordinator, ExportJob, ExportResult};
pub use schema::ColumnDescriptor;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
