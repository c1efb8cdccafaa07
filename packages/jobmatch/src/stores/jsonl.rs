//! Flat append-only record store: one JSON row array per line.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::Result;
use crate::traits::RecordStore;

/// A local newline-delimited JSON file of string-array rows.
///
/// The file plays the role the remote spreadsheet plays in production:
/// append-only, header row first, no in-place edits.
pub struct JsonlStore {
    path: PathBuf,
    header: Vec<String>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>, header: Vec<String>) -> Self {
        Self {
            path: path.into(),
            header,
        }
    }

    /// Default column header matching the row layout.
    pub fn default_header() -> Vec<String> {
        [
            "title",
            "companyName",
            "location",
            "jobUrl",
            "pay",
            "contractType",
            "source",
            "compositeMatchScore",
            "rationale",
            "generatedAt",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[async_trait]
impl RecordStore for JsonlStore {
    /// Read every row; a missing file reads as just the header.
    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(vec![self.header.clone()]);
            }
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Vec<String>>(line) {
                Ok(row) => rows.push(row),
                Err(e) => warn!(error = %e, "Skipping malformed store row"),
            }
        }
        Ok(rows)
    }

    async fn append_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // First append to a fresh file writes the header line.
        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut buffer = String::new();
        if is_new {
            buffer.push_str(&serde_json::to_string(&self.header)?);
            buffer.push('\n');
        }
        for row in rows {
            buffer.push_str(&serde_json::to_string(row)?);
            buffer.push('\n');
        }
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
