// src/updater/install.rs

//! Client package installation.
//!
//! Downloads the package into the client folder and unpacks it over the
//! existing install while keeping the user's settings folders intact.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;

use super::download::{ProgressFn, download_to_file};
use super::extract::extract_zip;
use super::version::read_local_config;
use crate::error::{AppError, Result};
use crate::launcher::LauncherPaths;
use crate::models::{ClientConfig, RemoteConfig};
use crate::utils::log;

const TOTAL_STEPS: usize = 8;

/// Download the client package and install it.
///
/// `remote_json` is the hosted config document; it is saved next to the
/// launcher to record the installed version. Returns that version.
pub async fn install_client(
    http: &reqwest::Client,
    paths: &LauncherPaths,
    client: &ClientConfig,
    remote: &RemoteConfig,
    remote_json: &str,
    progress: ProgressFn<'_>,
) -> Result<Option<String>> {
    let url = remote.client_url()?;
    log::step(1, TOTAL_STEPS, "Downloading client package...");
    tokio::fs::create_dir_all(&paths.client).await?;
    download_to_file(http, url, &paths.archive, progress).await?;

    install_from_archive(paths, client, remote, remote_json, progress).await
}

/// Install an already downloaded package at `paths.archive`.
pub async fn install_from_archive(
    paths: &LauncherPaths,
    client: &ClientConfig,
    remote: &RemoteConfig,
    remote_json: &str,
    progress: ProgressFn<'_>,
) -> Result<Option<String>> {
    // Removed on drop unless restoring from it fails.
    let backup = TempDir::new()?;

    log::step(2, TOTAL_STEPS, "Backing up user folders...");
    let preserved = {
        let client_dir = paths.client.clone();
        let backup_dir = backup.path().to_path_buf();
        let names = client.preserve_folders.clone();
        blocking(move || backup_folders(&client_dir, &backup_dir, &names)).await?
    };

    let installed = async {
        if remote.replace_folders {
            log::step(3, TOTAL_STEPS, "Removing replaced folders...");
            let client_dir = paths.client.clone();
            let names: Vec<String> = remote.folders_to_replace().map(str::to_string).collect();
            blocking(move || remove_folders(&client_dir, &names)).await?;
        }

        log::step(4, TOTAL_STEPS, "Extracting files...");
        extract_zip(&paths.archive, &paths.client, progress).await?;
        tokio::fs::remove_file(&paths.archive).await?;

        log::step(5, TOTAL_STEPS, "Saving launcher config...");
        tokio::fs::write(&paths.local_config, remote_json).await?;
        Ok::<(), AppError>(())
    }
    .await;

    log::step(6, TOTAL_STEPS, "Restoring user folders...");
    let restored = {
        let client_dir = paths.client.clone();
        let backup_dir = backup.path().to_path_buf();
        blocking(move || restore_folders(&backup_dir, &client_dir, &preserved)).await
    };
    if let Err(e) = restored {
        if let Err(install_err) = &installed {
            ::log::error!("Install failed: {}", install_err);
        }
        let kept = backup.keep();
        ::log::error!("User folders could not be restored; backup kept at {}", kept.display());
        return Err(e);
    }
    installed?;

    log::step(7, TOTAL_STEPS, "Protecting cache files...");
    paths.storage().protect(&client.protected_cache_files).await;

    log::step(8, TOTAL_STEPS, "Finalizing...");
    let version = read_local_config(&paths.local_config).and_then(|c| c.client_version);
    ::log::info!(
        "Client installed: {}",
        version.as_deref().unwrap_or("unknown version")
    );
    Ok(version)
}

async fn blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::install(format!("background task failed: {e}")))?
}

/// Copy each existing folder into `backup_dir`; returns the names copied.
fn backup_folders(client_dir: &Path, backup_dir: &Path, names: &[String]) -> Result<Vec<String>> {
    let mut copied = Vec::new();
    for name in names {
        let Some(src) = child_folder(client_dir, name) else {
            continue;
        };
        if src.is_dir() {
            copy_dir_all(&src, &backup_dir.join(name))?;
            copied.push(name.clone());
        }
    }
    Ok(copied)
}

fn remove_folders(client_dir: &Path, names: &[String]) -> Result<()> {
    for name in names {
        let Some(path) = child_folder(client_dir, name) else {
            continue;
        };
        if path.is_dir() {
            ::log::info!("Removing {}", path.display());
            fs::remove_dir_all(&path)?;
        }
    }
    Ok(())
}

/// Put backed-up folders back, replacing any extracted copy.
fn restore_folders(backup_dir: &Path, client_dir: &Path, names: &[String]) -> Result<()> {
    for name in names {
        let dst = client_dir.join(name);
        if dst.is_dir() {
            fs::remove_dir_all(&dst)?;
        }
        copy_dir_all(&backup_dir.join(name), &dst)?;
    }
    Ok(())
}

/// `client_dir/name` when `name` is a single plain folder name.
fn child_folder(client_dir: &Path, name: &str) -> Option<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(client_dir.join(name)),
        _ => {
            ::log::warn!("Ignoring folder name {:?}", name);
            None
        }
    }
}

fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;
    use crate::updater::download::no_progress;
    use crate::updater::download::tests::{local_client, serve_once};
    use crate::updater::extract::tests::write_zip;

    const REMOTE_JSON: &str = r#"{
        "clientVersion": "13.40",
        "replaceFolders": true,
        "replaceFolderName": [{ "name": "assets" }, { "name": "../outside" }],
        "clientFolder": "client",
        "clientExecutable": "client.exe"
    }"#;

    fn setup(base: &Path) -> (LauncherPaths, RemoteConfig) {
        let remote = RemoteConfig::parse(REMOTE_JSON).unwrap();
        let paths = LauncherPaths::new(base, &remote, &Config::default());

        fs::create_dir_all(paths.client.join("conf")).unwrap();
        fs::write(paths.client.join("conf/user.cfg"), "volume=3").unwrap();
        fs::create_dir_all(paths.client.join("characterdata/Knight")).unwrap();
        fs::write(paths.client.join("characterdata/Knight/hotkeys"), "F1").unwrap();
        fs::create_dir_all(paths.client.join("assets")).unwrap();
        fs::write(paths.client.join("assets/old.dat"), "old").unwrap();
        fs::create_dir_all(&paths.cache).unwrap();
        fs::write(paths.cache.join("boostedcreature.json"), "{}").unwrap();
        fs::create_dir_all(base.join("outside")).unwrap();

        (paths, remote)
    }

    fn package(path: &Path) {
        write_zip(
            path,
            &[
                ("bin/client.exe", b"exe"),
                ("conf/default.cfg", b"defaults"),
                ("assets/new.dat", b"new"),
            ],
        );
    }

    fn assert_installed(base: &Path, paths: &LauncherPaths) {
        assert!(paths.executable_exists());
        assert!(!paths.archive.exists());
        // Preserved folders come back exactly as they were
        assert_eq!(fs::read_to_string(paths.client.join("conf/user.cfg")).unwrap(), "volume=3");
        assert!(!paths.client.join("conf/default.cfg").exists());
        assert!(paths.client.join("characterdata/Knight/hotkeys").is_file());
        // Replaced folders only hold the new content
        assert!(!paths.client.join("assets/old.dat").exists());
        assert!(paths.client.join("assets/new.dat").is_file());
        assert!(base.join("outside").is_dir());

        assert_eq!(fs::read_to_string(&paths.local_config).unwrap(), REMOTE_JSON);
        assert!(
            fs::metadata(paths.cache.join("boostedcreature.json"))
                .unwrap()
                .permissions()
                .readonly()
        );
    }

    #[tokio::test]
    async fn test_install_from_archive() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (paths, remote) = setup(tmp.path());
        package(&paths.archive);

        let version = install_from_archive(
            &paths,
            &ClientConfig::default(),
            &remote,
            REMOTE_JSON,
            &no_progress,
        )
        .await
        .unwrap();

        assert_eq!(version.as_deref(), Some("13.40"));
        assert_installed(tmp.path(), &paths);
    }

    #[tokio::test]
    async fn test_install_client_downloads_package() {
        let tmp = tempfile::TempDir::new().unwrap();
        let zip_path = tmp.path().join("package.zip");
        package(&zip_path);
        let url = serve_once("200 OK", fs::read(&zip_path).unwrap()).await;

        let (paths, mut remote) = setup(tmp.path());
        remote.new_client_url = Some(url);

        let version = install_client(
            &local_client(),
            &paths,
            &ClientConfig::default(),
            &remote,
            REMOTE_JSON,
            &no_progress,
        )
        .await
        .unwrap();

        assert_eq!(version.as_deref(), Some("13.40"));
        assert_installed(tmp.path(), &paths);
    }

    #[tokio::test]
    async fn test_install_corrupt_archive_keeps_user_folders() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (paths, remote) = setup(tmp.path());
        fs::write(&paths.archive, "garbage").unwrap();

        let result = install_from_archive(
            &paths,
            &ClientConfig::default(),
            &remote,
            REMOTE_JSON,
            &no_progress,
        )
        .await;

        assert!(result.is_err());
        assert!(paths.client.join("conf/user.cfg").is_file());
        assert!(!paths.local_config.exists());
    }

    #[tokio::test]
    async fn test_install_failure_after_extract_restores_user_folders() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (paths, remote) = setup(tmp.path());
        write_zip(
            &paths.archive,
            &[("bin/client.exe", b"exe"), ("conf/user.cfg", b"package default")],
        );
        // Saving the launcher config fails when a directory is in the way
        fs::create_dir_all(&paths.local_config).unwrap();

        let result = install_from_archive(
            &paths,
            &ClientConfig::default(),
            &remote,
            REMOTE_JSON,
            &no_progress,
        )
        .await;

        assert!(matches!(result, Err(AppError::Io(_))));
        assert_eq!(fs::read_to_string(paths.client.join("conf/user.cfg")).unwrap(), "volume=3");
        assert!(paths.client.join("characterdata/Knight/hotkeys").is_file());
    }

    #[test]
    fn test_child_folder_rejects_traversal() {
        let dir = Path::new("/client");
        assert_eq!(child_folder(dir, "assets"), Some(PathBuf::from("/client/assets")));
        assert!(child_folder(dir, "../x").is_none());
        assert!(child_folder(dir, "a/b").is_none());
        assert!(child_folder(dir, "/etc").is_none());
    }
}
