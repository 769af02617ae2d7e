// src/store/accessor.rs
// External accessor seam: submit query text, get parsed JSON rows back.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::config::CONFIG;
use crate::error::{CoreError, CoreResult};

/// Fixed location of the store under the active user's home directory.
pub const STORE_RELATIVE_PATH: &str = "Library/Messages/chat.db";

pub fn default_store_path() -> CoreResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(STORE_RELATIVE_PATH))
        .ok_or_else(|| CoreError::Store("no home directory".into()))
}

/// Black-box query interface to the message store.
///
/// Implementations execute read-only query text against the file-backed
/// message log. Empty output means no rows, not an error.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Path of the backing store file, for the access gate's probe.
    fn store_path(&self) -> &Path;

    /// Run one read-only query, returning one JSON object per row.
    async fn query_rows(&self, sql: &str) -> CoreResult<Vec<Value>>;
}

/// Production accessor: drives the `sqlite3` CLI in JSON mode.
pub struct SqliteCliStore {
    path: PathBuf,
}

impl SqliteCliStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn at_default_location() -> CoreResult<Self> {
        Ok(Self::new(default_store_path()?))
    }
}

#[async_trait]
impl MessageStore for SqliteCliStore {
    fn store_path(&self) -> &Path {
        &self.path
    }

    async fn query_rows(&self, sql: &str) -> CoreResult<Vec<Value>> {
        let result = tokio::time::timeout(
            CONFIG.query_timeout(),
            Command::new("sqlite3")
                .arg("-json")
                .arg(&self.path)
                .arg(sql)
                .output(),
        )
        .await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(CoreError::Store(format!("sqlite3 failed to start: {e}")));
            }
            Err(_) => {
                return Err(CoreError::Store(format!(
                    "query timed out after {:?}",
                    CONFIG.query_timeout()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Store(format!(
                "sqlite3 exited with {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(stdout)
            .map_err(|e| CoreError::Store(format!("unparseable query output: {e}")))
    }
}
