//! Local artifact persistence.
//!
//! Every file the pipeline writes (raw scrape output, batch request and
//! output files, the ranked snapshot) carries an ISO-8601 timestamp so
//! re-runs never overwrite earlier artifacts and any run can be replayed
//! or audited later.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::Result;

/// Render a timestamp for artifact names (e.g. `2025-02-24T02:49:02.972Z`).
pub fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write a pretty-printed JSON artifact, creating the directory if needed.
pub async fn write_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs::create_dir_all(dir).await?;
    fs::write(&path, serde_json::to_vec_pretty(value)?).await?;
    Ok(path)
}

/// Write a raw text artifact (JSONL files), creating the directory if needed.
pub async fn write_text(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs::create_dir_all(dir).await?;
    fs::write(&path, content).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_is_iso_8601_with_millis() {
        let t = Utc.with_ymd_and_hms(2025, 2, 24, 2, 49, 2).unwrap()
            + chrono::Duration::milliseconds(972);
        assert_eq!(timestamp(t), "2025-02-24T02:49:02.972Z");
    }

    #[tokio::test]
    async fn writes_create_missing_directories() {
        let dir = std::env::temp_dir().join(format!("jobmatch-artifacts-{}", std::process::id()));
        let path = write_text(&dir, "probe.jsonl", "{}\n").await.unwrap();
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "{}\n");
        let _ = fs::remove_dir_all(&dir).await;
    }
}
