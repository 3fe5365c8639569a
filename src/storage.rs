//! Uploaded dataset files and their retention.
//!
//! Uploads are parked on disk under a uuid-derived name and deleted by a
//! detached task once the retention window elapses. Cleanup is best-effort:
//! it has no return channel, no synchronization with the replay loop, and a
//! file that is already gone is not an error worth surfacing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;

/// Default retention for uploaded files, in seconds.
pub const DEFAULT_RETENTION_SECONDS: u64 = 600;

/// Bookkeeping for one stored upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadRecord {
    pub path: PathBuf,
    pub uploaded_at: DateTime<Utc>,
}

/// Directory-backed store for uploaded datasets.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    retention: Duration,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, retention: Duration) -> Self {
        UploadStore {
            dir: dir.into(),
            retention,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the raw upload and schedule its deletion.
    pub async fn save(&self, bytes: &[u8]) -> Result<UploadRecord> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("upload-{}.csv", Uuid::new_v4()));
        tokio::fs::write(&path, bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "upload stored");
        self.schedule_cleanup(path.clone());
        Ok(UploadRecord {
            path,
            uploaded_at: Utc::now(),
        })
    }

    /// Fire-and-forget deferred deletion; failures are swallowed.
    fn schedule_cleanup(&self, path: PathBuf) {
        let retention = self.retention;
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "retired upload removed"),
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "upload cleanup skipped")
                }
            }
        });
    }
}
