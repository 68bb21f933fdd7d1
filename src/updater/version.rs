// src/updater/version.rs

//! Version comparison between the local install and the hosted config.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::launcher::LauncherPaths;
use crate::models::RemoteConfig;

/// Read the local config copy; missing or invalid yields `None`.
pub fn read_local_config(path: &Path) -> Option<RemoteConfig> {
    RemoteConfig::read_local(path)
}

/// New launcher version, if one should be offered.
///
/// Installs without a recorded launcher version are never prompted.
pub fn launcher_update_available(
    local: Option<&RemoteConfig>,
    remote: &RemoteConfig,
) -> Option<String> {
    let current = local?.launcher_version.as_deref()?;
    let latest = remote.launcher_version.as_deref()?;
    if current != latest {
        log::info!("Launcher update available: {} -> {}", current, latest);
        Some(latest.to_string())
    } else {
        None
    }
}

/// Whether the client package must be (re)installed.
///
/// With a local config copy the recorded client version decides; without
/// one, a missing or empty client folder does. The client folder is created
/// if missing.
pub fn client_update_needed(paths: &LauncherPaths, remote: &RemoteConfig) -> Result<bool> {
    let needed = if paths.local_config.is_file() {
        let installed = read_local_config(&paths.local_config)
            .and_then(|local| local.client_version)
            .unwrap_or_default();
        let latest = remote.client_version.clone().unwrap_or_default();
        log::debug!("Client version installed={:?} latest={:?}", installed, latest);
        installed != latest
    } else {
        !paths.client.is_dir() || is_empty_dir(&paths.client)?
    };

    fs::create_dir_all(&paths.client)?;
    Ok(needed)
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
