//! One-shot export job orchestration.
//!
//! Ties the pieces together for a single run: start the optional interop
//! server, connect, execute the query, stream the result set through the
//! coordinator, and release the server on every exit path.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::driver::postgres::{self, PgCursor};
use crate::error::Result;
use crate::server::InteropServer;

use super::coordinator::{ExportCoordinator, ExportResult};
use super::progress::ProgressTracker;

/// Everything one export run needs from the caller.
pub struct ExportJob {
    /// Driver connection URL
    pub url: String,
    /// Optional username override
    pub username: Option<String>,
    /// Optional password
    pub password: Option<String>,
    /// The single SQL query to execute
    pub query: String,
    /// Job identifier, used to name both artifacts
    pub job_id: String,
    /// Directory the artifacts are written into
    pub out_dir: PathBuf,
    /// Whether to show a progress spinner
    pub show_progress: bool,
}

impl ExportJob {
    /// Path of the schema artifact: `<out_dir>/<job_id>_schema.json`.
    pub fn schema_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}_schema.json", self.job_id))
    }

    /// Path of the records artifact: `<out_dir>/<job_id>.json`.
    pub fn records_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.json", self.job_id))
    }

    /// Run the job to completion.
    ///
    /// The interop server, when configured, is started before connecting
    /// and stopped after the export finishes, whether it succeeded or
    /// failed. Server release never masks the export outcome.
    pub async fn run(&self, config: &Config) -> Result<ExportResult> {
        let server = InteropServer::start(&config.server).await?;

        let outcome = self.execute(config).await;

        if let Some(server) = server {
            server.stop().await;
        }

        outcome
    }

    async fn execute(&self, config: &Config) -> Result<ExportResult> {
        let timeout = Duration::from_secs(config.connection.connect_timeout);
        let conn = postgres::connect(
            &self.url,
            self.username.as_deref(),
            self.password.as_deref(),
            timeout,
        )
        .await?;

        let cursor = PgCursor::open(conn, &self.query).await?;
        info!("Export job {} started", self.job_id);

        let tracker = ProgressTracker::new(self.show_progress);
        let mut coordinator = ExportCoordinator::new(
            Box::new(cursor),
            tracker,
            config.export.binary_chunk_size,
            config.export.write_buffer_size,
        );

        coordinator
            .execute(&self.schema_path(), &self.records_path())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let job = ExportJob {
            url: "postgres://localhost/db".to_string(),
            username: None,
            password: None,
            query: "SELECT 1".to_string(),
            job_id: "batch42".to_string(),
            out_dir: PathBuf::from("/tmp/out"),
            show_progress: false,
        };

        assert_eq!(
            job.schema_path(),
            PathBuf::from("/tmp/out/batch42_schema.json")
        );
        assert_eq!(job.records_path(), PathBuf::from("/tmp/out/batch42.json"));
    }
}
