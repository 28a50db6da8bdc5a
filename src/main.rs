//! rowspool - one-shot SQL query export
//!
//! Executes a single SQL query against a relational database and streams
//! the result set to disk as two artifacts: a JSON schema description and
//! an NDJSON records file, one JSON object per row.
//!
//! # Usage
//!
//! ```bash
//! rowspool --url postgres://localhost:5432/app \
//!     -u svc -p secret -j nightly -o /data/out \
//!     "SELECT id, name, avatar FROM users"
//! ```

use tracing::Level;

use rowspool::cli::CliInterface;
use rowspool::error::Result;
use rowspool::export::ExportJob;

/// Application entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // The export either runs to completion or terminates abnormally;
    // partial artifacts are left on disk for the caller to discard.
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands (version, completion)
/// 4. Run the export job
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let job = ExportJob {
        url: cli.connection_url(),
        username: cli.username(),
        password: cli.args().password.clone(),
        query: cli.query()?.to_string(),
        job_id: cli.job_id(),
        out_dir: cli.args().out_dir.clone(),
        show_progress: cli.show_progress(),
    };

    let result = job.run(cli.config()).await?;

    if !cli.args().quiet {
        println!(
            "Exported {} rows ({} bytes) in {} ms",
            result.rows_exported, result.file_size_bytes, result.elapsed_ms
        );
        println!("  schema:  {}", job.schema_path().display());
        println!("  records: {}", job.records_path().display());
    }

    Ok(())
}

/// Initialize logging system based on verbosity level
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    // Build subscriber with level filter
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    // Configure timestamps
    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
