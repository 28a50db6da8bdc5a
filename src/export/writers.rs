//! Artifact writers for export operations.
//!
//! Two artifacts exist per export: the schema description, written once as
//! a single JSON text, and the NDJSON records file, appended one line per
//! row.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::encode::JsonRecord;
use crate::error::Result;
use crate::schema::{self, ColumnDescriptor};

/// Helper function to create a buffered file writer
pub(crate) async fn create_writer(path: &Path, capacity: usize) -> Result<BufWriter<File>> {
    let file = File::create(path).await?;
    Ok(BufWriter::with_capacity(capacity, file))
}

/// Helper function to validate the output directory of a path
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Directory does not exist: {}", parent.display()),
            )
            .into());
        }
    }

    Ok(())
}

/// Write the schema artifact: one JSON array, one write, no repair.
///
/// A truncated file left behind by an underlying I/O failure is acceptable
/// for a batch tool; the export aborts and the caller discards the output.
pub async fn write_schema_artifact(path: &Path, schema: &[ColumnDescriptor]) -> Result<()> {
    validate_path(path)?;
    let body = schema::to_artifact_json(schema)?;
    tokio::fs::write(path, body).await?;
    debug!("Wrote schema artifact: {}", path.display());
    Ok(())
}

/// Writer for the NDJSON records artifact.
///
/// Each record becomes one complete JSON object terminated by a newline,
/// so consumers can parse line-by-line without loading the whole file.
pub struct NdjsonWriter {
    /// Buffered file writer
    writer: BufWriter<File>,
    /// Path to the output file
    path: PathBuf,
    /// Number of records written
    written: u64,
}

impl NdjsonWriter {
    /// Create a new NDJSON writer
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `capacity` - Write buffer capacity in bytes
    ///
    /// # Returns
    /// * `Result<Self>` - New writer instance or error
    pub async fn create(path: &Path, capacity: usize) -> Result<Self> {
        validate_path(path)?;
        let writer = create_writer(path, capacity).await?;

        debug!("Created NDJSON writer for: {}", path.display());

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            written: 0,
        })
    }

    /// Append one record as one line.
    pub async fn write_record(&mut self, record: &JsonRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.written += 1;
        Ok(())
    }

    /// Flush buffered output.
    pub async fn finalize(&mut self) -> Result<()> {
        self.writer.flush().await?;
        debug!(
            "Finalized NDJSON file: {} ({} records)",
            self.path.display(),
            self.written
        );
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Current file size in bytes.
    pub async fn file_size(&self) -> Result<u64> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::codes;
    use crate::driver::ColumnMeta;
    use serde_json::Value as JsonValue;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}_{}", uuid::Uuid::new_v4(), name))
    }

    #[tokio::test]
    async fn test_ndjson_writer_basic() {
        let path = temp_path("records.json");
        let mut writer = NdjsonWriter::create(&path, 8 * 1024).await.unwrap();

        let mut record = JsonRecord::new();
        record.insert("id".to_string(), JsonValue::from(1));
        writer.write_record(&record).await.unwrap();

        let mut record = JsonRecord::new();
        record.insert("id".to_string(), JsonValue::from(2));
        writer.write_record(&record).await.unwrap();

        writer.finalize().await.unwrap();
        assert_eq!(writer.written(), 2);

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "{\"id\":1}\n{\"id\":2}\n");
        assert!(writer.file_size().await.unwrap() > 0);

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_ndjson_writer_invalid_directory() {
        let result = NdjsonWriter::create(Path::new("/nonexistent/directory/file.json"), 1024).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_schema_artifact_written_once() {
        let path = temp_path("schema.json");
        let schema = crate::schema::extract(&[ColumnMeta {
            name: "id".to_string(),
            type_code: codes::INTEGER,
            nullable: Some(false),
        }]);

        write_schema_artifact(&path, &schema).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, r#"[{"column":"id","type":4,"required":true}]"#);

        tokio::fs::remove_file(&path).await.ok();
    }
}
