//! Auxiliary interop server lifecycle.
//!
//! Some deployments front the database with a companion server process
//! that must be running while the export talks to it. The guard here owns
//! that process: started before connecting, stopped after the export
//! completes or fails. `kill_on_drop` backs the explicit stop so the child
//! is also reaped on panic or early return.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Running interop server process.
pub struct InteropServer {
    child: Child,
    command: String,
}

impl InteropServer {
    /// Start the configured server, if any.
    ///
    /// Returns `Ok(None)` when no server command is configured. After
    /// spawning, waits the configured startup delay and verifies the
    /// process is still alive.
    pub async fn start(config: &ServerConfig) -> Result<Option<Self>> {
        let Some(command) = &config.command else {
            return Ok(None);
        };

        let mut child = Command::new(command)
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ServerError::SpawnFailed(format!("{command}: {e}")))?;

        if config.startup_wait_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.startup_wait_ms)).await;
        }

        match child.try_wait() {
            Ok(None) => {
                info!("Started interop server: {command}");
                Ok(Some(Self {
                    child,
                    command: command.clone(),
                }))
            }
            Ok(Some(status)) => Err(ServerError::ExitedEarly(status.to_string()).into()),
            Err(e) => Err(ServerError::SpawnFailed(e.to_string()).into()),
        }
    }

    /// Stop the server.
    ///
    /// Infallible by design: release runs on both the success and the
    /// failure path of an export, and must never mask its outcome.
    pub async fn stop(mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill interop server {}: {e}", self.command);
            return;
        }
        info!("Stopped interop server: {}", self.command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(command: Option<&str>, args: &[&str], startup_wait_ms: u64) -> ServerConfig {
        ServerConfig {
            command: command.map(str::to_string),
            args: args.iter().map(|s| s.to_string()).collect(),
            startup_wait_ms,
        }
    }

    #[tokio::test]
    async fn test_no_server_configured() {
        let server = InteropServer::start(&config(None, &[], 0)).await.unwrap();
        assert!(server.is_none());
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let server = InteropServer::start(&config(Some("sleep"), &["30"], 0))
            .await
            .unwrap()
            .expect("server should be running");
        server.stop().await;
    }

    #[tokio::test]
    async fn test_exited_early_is_an_error() {
        let result = InteropServer::start(&config(Some("true"), &[], 200)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let result = InteropServer::start(&config(Some("/nonexistent/interop-server"), &[], 0)).await;
        assert!(result.is_err());
    }
}
