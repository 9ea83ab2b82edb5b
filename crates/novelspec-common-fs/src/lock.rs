//! Advisory single-writer lock file.
//!
//! The lock is a file created with `create_new`, holding JSON metadata about
//! the holder. It is removed when the [`LockFile`] guard is dropped.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use novelspec_common_core::{Error, ErrorCode, Result, ResultExt};
use serde::{Deserialize, Serialize};

/// Metadata written into the lock file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockMetadata {
    /// Process ID of the lock holder
    pub pid: u32,
    /// When the lock was acquired
    pub started_at: DateTime<Utc>,
    /// What the holder is doing (e.g. "archive add-ch-11")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl LockMetadata {
    pub fn current(context: Option<String>) -> Self {
        Self {
            pid: std::process::id(),
            started_at: Utc::now(),
            context,
        }
    }

    fn describe(&self) -> String {
        match &self.context {
            Some(ctx) => format!("pid {} since {} ({ctx})", self.pid, self.started_at.to_rfc3339()),
            None => format!("pid {} since {}", self.pid, self.started_at.to_rfc3339()),
        }
    }
}

/// Guard for an acquired lock file.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Acquire the lock at `path`, failing with [`Error::Lock`] if it is held.
    pub fn acquire(path: impl AsRef<Path>, context: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            crate::ensure_dir(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let holder = fs::read_to_string(path)
                    .ok()
                    .and_then(|raw| serde_json::from_str::<LockMetadata>(&raw).ok())
                    .map(|meta| meta.describe())
                    .unwrap_or_else(|| "an unknown process".to_string());
                return Err(Error::Lock {
                    holder,
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(Error::io(
                    ErrorCode::FILE_WRITE_ERROR,
                    format!("failed to create lock file: {}", path.display()),
                    path,
                    e,
                ))
            }
        };

        let meta = LockMetadata::current(context);
        let body = serde_json::to_string_pretty(&meta)
            .context("failed to encode lock metadata")?;
        if let Err(e) = file.write_all(body.as_bytes()) {
            let _ = fs::remove_file(path);
            return Err(Error::io(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to write lock file: {}", path.display()),
                path,
                e,
            ));
        }

        tracing::debug!(path = %path.display(), pid = meta.pid, "lock acquired");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}
