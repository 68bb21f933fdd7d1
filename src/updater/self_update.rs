// src/updater/self_update.rs

//! Launcher self-update.
//!
//! The new binary is downloaded next to the running one, the running one is
//! moved aside to `<exe>.old` and the new one takes its place. The running
//! executable is renamed, never overwritten.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::download::{ProgressFn, download_to_file};
use crate::error::{AppError, Result};
use crate::launcher::LauncherPaths;
use crate::models::RemoteConfig;

/// `path` with `.suffix` appended to its full file name.
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Download the new launcher, swap it in and start it.
///
/// On success the caller should exit so the new launcher takes over.
pub async fn self_update(
    http: &reqwest::Client,
    paths: &LauncherPaths,
    remote: &RemoteConfig,
    remote_json: Option<&str>,
    current_exe: &Path,
    progress: ProgressFn<'_>,
) -> Result<()> {
    let url = remote.launcher_url()?;
    let downloaded = sibling_path(current_exe, "new");
    download_to_file(http, url, &downloaded, progress).await?;

    if let Some(json) = remote_json {
        if let Err(e) = tokio::fs::write(&paths.local_config, json).await {
            log::warn!("Failed to update {}: {}", paths.local_config.display(), e);
        }
    }

    replace_executable(current_exe, &downloaded)?;

    log::info!("Restarting launcher...");
    Command::new(current_exe)
        .current_dir(&paths.base)
        .spawn()
        .map_err(|e| AppError::launch(format!("{}: {}", current_exe.display(), e)))?;
    Ok(())
}

/// Move `current` to `<current>.old` and `downloaded` into its place.
///
/// The previous binary is put back if the second move fails.
pub fn replace_executable(current: &Path, downloaded: &Path) -> Result<PathBuf> {
    let backup = sibling_path(current, "old");
    if backup.exists() {
        fs::remove_file(&backup)?;
    }
    make_executable(downloaded)?;

    fs::rename(current, &backup)?;
    if let Err(e) = fs::rename(downloaded, current) {
        log::error!("Could not move new launcher into place: {}", e);
        fs::rename(&backup, current)?;
        return Err(AppError::install(format!(
            "failed to replace {}: {}",
            current.display(),
            e
        )));
    }
    Ok(backup)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
