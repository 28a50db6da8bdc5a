//! Export coordinator: the streaming state machine.
//!
//! Runs Init (schema extraction and schema artifact write), then Streaming
//! (row-by-row serialization into the records artifact), then Done (flush
//! and close). Any error short-circuits to the caller; there is no partial
//! recovery and no resume. Peak memory stays at one row's encoded size,
//! independent of the result set: no row is buffered beyond the current
//! iteration step.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::driver::QueryCursor;
use crate::encode::serialize_row;
use crate::error::Result;
use crate::schema;

use super::progress::ProgressTracker;
use super::writers::{write_schema_artifact, NdjsonWriter};

/// Result of an export operation
#[derive(Debug)]
pub struct ExportResult {
    /// Number of rows exported
    pub rows_exported: u64,
    /// Records file size in bytes
    pub file_size_bytes: u64,
    /// Time taken for export
    pub elapsed_ms: u64,
}

/// Coordinator for one export run.
///
/// Exclusively owns the cursor and both artifact writers for the duration
/// of the run; a coordinator is used once and discarded.
pub struct ExportCoordinator {
    /// Cursor over the query's result set
    cursor: Box<dyn QueryCursor>,
    /// Progress tracker for user feedback
    tracker: ProgressTracker,
    /// Chunk size for draining binary column streams
    binary_chunk_size: usize,
    /// Buffer capacity for the records writer
    write_buffer_size: usize,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(
        cursor: Box<dyn QueryCursor>,
        tracker: ProgressTracker,
        binary_chunk_size: usize,
        write_buffer_size: usize,
    ) -> Self {
        Self {
            cursor,
            tracker,
            binary_chunk_size,
            write_buffer_size,
        }
    }

    /// Execute the export.
    ///
    /// 1. Extract the column schema from cursor metadata
    /// 2. Write the schema artifact, before any row is read
    /// 3. Stream rows one at a time into the records artifact
    /// 4. Finalize writers, close the cursor, report totals
    ///
    /// # Returns
    /// * `Result<ExportResult>` - Export statistics or error
    pub async fn execute(
        &mut self,
        schema_path: &Path,
        records_path: &Path,
    ) -> Result<ExportResult> {
        let start_time = Instant::now();

        info!("Starting export");
        let schema = schema::extract(self.cursor.columns());
        write_schema_artifact(schema_path, &schema).await?;
        debug!("Schema artifact holds {} columns", schema.len());

        let mut writer = NdjsonWriter::create(records_path, self.write_buffer_size).await?;
        let mut exported = 0u64;

        while let Some(row) = self.cursor.next_row().await? {
            let record = serialize_row(row.as_ref(), &schema, self.binary_chunk_size).await?;
            writer.write_record(&record).await?;

            exported += 1;
            self.tracker.update(exported);

            if exported % 50_000 == 0 {
                info!("Progress: {exported} rows exported");
            }
        }

        writer.finalize().await?;
        self.cursor.close().await?;
        self.tracker.finish();

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        let file_size_bytes = writer.file_size().await?;

        info!(
            "Export completed: {} rows, {} bytes, {} ms",
            exported, file_size_bytes, elapsed_ms
        );

        Ok(ExportResult {
            rows_exported: exported,
            file_size_bytes,
            elapsed_ms,
        })
    }
}
