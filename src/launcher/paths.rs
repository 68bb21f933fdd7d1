// src/launcher/paths.rs

//! Filesystem layout of a launcher installation.
//!
//! ```text
//! {base}/
//! ├── launcher(.exe)
//! ├── launcher_config.json   # Copy of the hosted config at last install
//! └── {clientFolder}/
//!     ├── bin/{clientExecutable}
//!     ├── cache/             # Content mirrors
//!     └── client.zip         # Present only during an install
//! ```

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{Config, RemoteConfig};
use crate::storage::LocalStorage;

/// Name of the local copy of the hosted config.
pub const LOCAL_CONFIG_FILE: &str = "launcher_config.json";

/// Resolved paths for one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    /// Directory the launcher lives in
    pub base: PathBuf,
    /// Client folder; `base` itself when the config names none
    pub client: PathBuf,
    pub local_config: PathBuf,
    pub cache: PathBuf,
    /// Download target for the client package
    pub archive: PathBuf,
    /// Client executable, when the config names one
    pub executable: Option<PathBuf>,
}

impl LauncherPaths {
    pub fn new(base: impl Into<PathBuf>, remote: &RemoteConfig, config: &Config) -> Self {
        let base = base.into();
        let client = match remote.folder() {
            Some(folder) => base.join(folder),
            None => base.clone(),
        };
        let executable = remote
            .executable()
            .ok()
            .map(|exe| client.join(&config.client.bin_dir).join(exe));

        Self {
            local_config: base.join(LOCAL_CONFIG_FILE),
            cache: client.join(&config.cache.dir_name),
            archive: client.join(&config.client.archive_name),
            executable,
            client,
            base,
        }
    }

    /// Directory containing the running executable.
    pub fn current_base_dir() -> Result<PathBuf> {
        let exe = std::env::current_exe()?;
        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| AppError::config("cannot determine launcher directory"))
    }

    /// Mirror storage rooted at the cache directory.
    pub fn storage(&self) -> LocalStorage {
        LocalStorage::new(&self.cache)
    }

    /// Whether the client executable is present.
    pub fn executable_exists(&self) -> bool {
        self.executable.as_deref().is_some_and(Path::is_file)
    }
}
