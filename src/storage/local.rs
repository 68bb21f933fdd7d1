//! Local filesystem mirror of last-seen content.
//!
//! ## Storage Layout
//!
//! ```text
//! {client}/cache/
//! ├── launcher_boosted.json     # Last boosted creature/boss pair
//! ├── launcher_countdowns.json  # Last countdown list
//! ├── onlinenumbers.json        # Raw login-server answer, read-only
//! ├── boostedcreature.json      # Client-owned, only marked read-only
//! └── eventschedule.json        # Client-owned, only marked read-only
//! ```
//!
//! Read-only files are made writable again before the launcher replaces
//! them.

use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Cache mirror rooted at a directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    pub async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        set_writable(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    pub async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Write JSON, logging instead of failing.
    pub async fn mirror<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.write_json(key, value).await {
            log::debug!("Could not mirror {}: {}", key, e);
        }
    }

    /// Mark an existing file read-only. Missing files are ignored.
    pub async fn set_read_only(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(AppError::Io(e)),
        };
        let mut permissions = metadata.permissions();
        if !permissions.readonly() {
            permissions.set_readonly(true);
            tokio::fs::set_permissions(&path, permissions).await?;
        }
        Ok(())
    }

    /// Mark every listed file that exists read-only.
    pub async fn protect(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.set_read_only(key).await {
                log::warn!("Could not protect {}: {}", key, e);
            }
        }
    }
}

#[allow(clippy::permissions_set_readonly_false)]
async fn set_writable(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.permissions().readonly() => {
            let mut permissions = metadata.permissions();
            permissions.set_readonly(false);
            tokio::fs::set_permissions(path, permissions).await?;
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::Io(e)),
    }
}
