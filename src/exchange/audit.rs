use std::path::{Path, PathBuf};
use chrono::{Local, NaiveDateTime};
use log::error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

pub const EXCHANGE_EVENT: &str = "exchange command executed";

pub fn format_record(at: NaiveDateTime, event: &str) -> String {
    format!("{} - {}\n", at.format("%Y-%m-%d %H:%M:%S%.6f"), event)
}

/// Append-only, best-effort event log. Never rotated or truncated here.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Failures are logged and swallowed.
    pub async fn append(&self, event: &str) {
        if let Err(e) = self.write_line(event).await {
            error!("Failed to append '{}' to audit log {}: {}", event, self.path().display(), e);
        }
    }

    async fn write_line(&self, event: &str) -> std::io::Result<()> {
        let line = format_record(Local::now().naive_local(), event);
        // file handle is dropped (and closed) on every return path
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
