//! Error handling module for export operations.
//!
//! This module provides the crate-wide error surface:
//! - A single top-level [`ExportError`] wrapping more specific kinds
//! - A [`Result`] alias used by every fallible operation
//! - `From` conversions so errors propagate with `?`
//!
//! Every error is fatal for the export: there is no retry and no partial
//! recovery anywhere in the crate. Artifacts already flushed to disk when
//! an error occurs are left behind for the caller to discard.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{
    ConfigError, ConnectionError, EncodingError, ExportError, MetadataError, QueryError, Result,
    ServerError,
};
