//! Streaming export of one query's result set.
//!
//! The export system is built from three components:
//!
//! 1. **ExportCoordinator**: the Init → Streaming → Done state machine
//! 2. **Writers**: the schema artifact and the NDJSON records artifact
//! 3. **ProgressTracker**: spinner feedback for interactive runs
//!
//! [`ExportJob`] wraps a whole run, including the optional interop server
//! lifecycle around it.

pub mod coordinator;
pub mod job;
pub mod progress;
pub mod writers;

pub use coordinator::{ExportCoordinator, ExportResult};
pub use job::ExportJob;
pub use progress::ProgressTracker;
pub use writers::NdjsonWriter;
