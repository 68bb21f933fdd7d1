// src/launcher/mod.rs

//! Launcher orchestration.
//!
//! Ties the hosted config, the content services and the updater together:
//! the startup sequence (`prepare`), installing and starting the client
//! (`play`) and replacing the launcher itself (`self_update`).

mod paths;

pub use paths::{LOCAL_CONFIG_FILE, LauncherPaths};

use std::path::PathBuf;
use std::process::{Child, Command};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{
    BoostedPair, Config, CountdownEvent, NewsItem, OnlinePlayers, RemoteConfig, UnifiedGameData,
};
use crate::services::{
    BoostedCreatureService, CountdownService, NewsService, OnlinePlayersService, ServiceContext,
    UnifiedDataService,
};
use crate::updater::{self, ProgressFn};
use crate::utils::http::{HttpFetcher, PageFetcher};
use crate::utils::log;

const PREPARE_STEPS: usize = 6;

/// Everything gathered by the startup sequence.
#[derive(Debug, Clone)]
pub struct LaunchState {
    /// Newer launcher version offered by the hosted config
    pub launcher_update: Option<String>,
    pub news: Vec<NewsItem>,
    pub boosted: BoostedPair,
    pub countdowns: Vec<CountdownEvent>,
    pub online: Option<OnlinePlayers>,
    pub client_update_needed: bool,
    /// Client version published by the hosted config
    pub client_version: Option<String>,
}

impl Default for LaunchState {
    fn default() -> Self {
        Self {
            launcher_update: None,
            news: Vec::new(),
            boosted: BoostedPair::placeholder(),
            countdowns: Vec::new(),
            online: None,
            client_update_needed: false,
            client_version: None,
        }
    }
}

/// A launcher bound to one installation directory.
pub struct Launcher {
    config: Arc<Config>,
    http: reqwest::Client,
    paths: LauncherPaths,
    remote: RemoteConfig,
    /// Hosted config document as fetched; `None` when it was unreachable
    remote_json: Option<String>,
    news: NewsService,
    boosted: BoostedCreatureService,
    countdowns: CountdownService,
    online: OnlinePlayersService,
    unified: UnifiedDataService,
}

impl Launcher {
    /// Fetch the hosted config and set up the launcher for `base_dir`.
    pub async fn connect(config: Arc<Config>, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        let http = fetcher.client().clone();
        Self::connect_with(config, base_dir, Arc::new(fetcher), http).await
    }

    /// Like [`Launcher::connect`], with explicit transports.
    ///
    /// `fetcher` serves pages and the hosted config; `http` streams
    /// downloads.
    pub async fn connect_with(
        config: Arc<Config>,
        base_dir: impl Into<PathBuf>,
        fetcher: Arc<dyn PageFetcher>,
        http: reqwest::Client,
    ) -> Result<Self> {
        let base_dir = base_dir.into();
        let url = &config.remote.config_url;

        let (remote, remote_json) = match fetch_remote(fetcher.as_ref(), url).await {
            Ok((remote, json)) => (remote, Some(json)),
            Err(e) => {
                ::log::warn!("Failed to fetch launcher config {}: {}", url, e);
                let local = updater::read_local_config(&base_dir.join(LOCAL_CONFIG_FILE));
                if local.is_some() {
                    ::log::info!("Using local copy of the launcher config");
                }
                (local.unwrap_or_default(), None)
            }
        };

        let paths = LauncherPaths::new(base_dir, &remote, &config);
        let ctx = ServiceContext::with_fetcher(fetcher, config.clone(), Some(paths.storage()))?;

        Ok(Self {
            news: NewsService::new(ctx.clone()),
            boosted: BoostedCreatureService::new(ctx.clone()),
            countdowns: CountdownService::new(ctx.clone()),
            online: OnlinePlayersService::new(ctx.clone()),
            unified: UnifiedDataService::new(ctx),
            config,
            http,
            paths,
            remote,
            remote_json,
        })
    }

    pub fn paths(&self) -> &LauncherPaths {
        &self.paths
    }

    pub fn remote(&self) -> &RemoteConfig {
        &self.remote
    }

    /// Whether the hosted config was reached.
    pub fn is_online(&self) -> bool {
        self.remote_json.is_some()
    }

    pub fn news(&self) -> &NewsService {
        &self.news
    }

    pub fn boosted(&self) -> &BoostedCreatureService {
        &self.boosted
    }

    pub fn countdowns(&self) -> &CountdownService {
        &self.countdowns
    }

    pub fn online(&self) -> &OnlinePlayersService {
        &self.online
    }

    /// News, countdowns and boosted creatures in one pass.
    pub async fn overview(&self, force_refresh: bool) -> UnifiedGameData {
        self.unified.fetch_all(force_refresh).await
    }

    /// Run the startup sequence.
    ///
    /// Every step is independent; one that fails is logged and skipped.
    pub async fn prepare(&self) -> LaunchState {
        let mut state = LaunchState {
            client_version: self.remote.client_version.clone(),
            ..LaunchState::default()
        };

        log::step(1, PREPARE_STEPS, "Checking launcher updates...");
        if self.is_online() {
            let local = updater::read_local_config(&self.paths.local_config);
            state.launcher_update = updater::launcher_update_available(local.as_ref(), &self.remote);
        } else {
            ::log::warn!("Skipping launcher update check: launcher config unavailable");
        }

        log::step(2, PREPARE_STEPS, "Loading news...");
        state.news = self.news.fetch().await;

        log::step(3, PREPARE_STEPS, "Loading boosted creatures...");
        state.boosted = self.boosted.fetch(false).await;

        log::step(4, PREPARE_STEPS, "Loading countdowns...");
        state.countdowns = self.countdowns.fetch(false).await;

        log::step(5, PREPARE_STEPS, "Loading online players...");
        state.online = self.online.fetch(false).await;

        log::step(6, PREPARE_STEPS, "Checking client updates...");
        match updater::client_update_needed(&self.paths, &self.remote) {
            Ok(needed) => state.client_update_needed = needed,
            Err(e) => ::log::warn!("Client update check failed: {}", e),
        }

        state
    }

    /// Install the client if needed, then start it.
    ///
    /// An install happens when `state` says an update is due, the client
    /// folder is missing or the client executable is absent.
    pub async fn play(&self, state: &LaunchState, progress: ProgressFn<'_>) -> Result<Child> {
        if state.client_update_needed || !self.paths.client.is_dir() || !self.paths.executable_exists()
        {
            self.update_client(progress).await?;
        }

        let exe = self
            .paths
            .executable
            .as_ref()
            .ok_or_else(|| AppError::launch("launcher config names no client executable"))?;
        if !exe.is_file() {
            return Err(AppError::launch(format!(
                "client executable not found: {}",
                exe.display()
            )));
        }

        ::log::info!("Starting {}", exe.display());
        let working_dir = exe.parent().unwrap_or(&self.paths.client);
        Command::new(exe)
            .current_dir(working_dir)
            .spawn()
            .map_err(|e| AppError::launch(format!("{}: {}", exe.display(), e)))
    }

    /// Download and install the published client package.
    pub async fn update_client(&self, progress: ProgressFn<'_>) -> Result<Option<String>> {
        let json = self.require_remote_json()?;
        log::header("Updating client");
        updater::install_client(
            &self.http,
            &self.paths,
            &self.config.client,
            &self.remote,
            json,
            progress,
        )
        .await
    }

    /// Replace the running launcher with the published one and start it.
    ///
    /// The caller should exit once this returns `Ok`.
    pub async fn self_update(&self, progress: ProgressFn<'_>) -> Result<()> {
        let json = self.require_remote_json()?;
        let current_exe = std::env::current_exe()?;
        log::header("Updating launcher");
        updater::self_update(
            &self.http,
            &self.paths,
            &self.remote,
            Some(json),
            &current_exe,
            progress,
        )
        .await
    }

    fn require_remote_json(&self) -> Result<&str> {
        self.remote_json
            .as_deref()
            .ok_or_else(|| AppError::config("launcher config could not be fetched"))
    }
}

/// Fetch and parse the hosted config, bypassing caches.
async fn fetch_remote(fetcher: &dyn PageFetcher, url: &str) -> Result<(RemoteConfig, String)> {
    let json = fetcher.get_text_uncached(url).await?;
    let remote = RemoteConfig::parse(&json)?;
    Ok((remote, json))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::services::testing::{self, BASE};
    use crate::updater::no_progress;
    use crate::utils::http::fake::FakeFetcher;

    const REMOTE_URL: &str = "https://config.test/launcher_config.json";

    fn remote_json(client_version: &str, launcher_version: &str) -> String {
        format!(
            r#"{{"clientVersion": "{client_version}", "launcherVersion": "{launcher_version}",
                "clientFolder": "client", "clientExecutable": "start.sh",
                "newClientUrl": "https://files.test/client.zip"}}"#
        )
    }

    fn config() -> Arc<Config> {
        let mut config = testing::config();
        config.remote.config_url = REMOTE_URL.to_string();
        Arc::new(config)
    }

    fn site_fetcher() -> FakeFetcher {
        FakeFetcher::new()
            .with_page(BASE, &testing::home_page("Rat", "Ferumbras"))
            .with_page(
                &format!("{BASE}/?news/archive"),
                &testing::archive_row("0", "01.01.2026", "?news/1", "Welcome"),
            )
            .with_page(&format!("{BASE}/?news/1"), &testing::article_page("Hello"))
            .with_page(&format!("{BASE}/events.txt"), "Raid\n01/01/2030\n")
            .with_page(&format!("{BASE}/login.php"), r#"{"playersonline": 9}"#)
    }

    async fn connect(base: &std::path::Path, fetcher: FakeFetcher) -> Launcher {
        Launcher::connect_with(config(), base, Arc::new(fetcher), reqwest::Client::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_prepare_collects_everything() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join(LOCAL_CONFIG_FILE), remote_json("13.30", "1.0")).unwrap();
        let fetcher = site_fetcher().with_page(REMOTE_URL, &remote_json("13.40", "1.1"));
        let launcher = connect(tmp.path(), fetcher).await;

        let state = launcher.prepare().await;
        assert_eq!(state.launcher_update.as_deref(), Some("1.1"));
        assert_eq!(state.news.len(), 1);
        assert_eq!(state.news[0].content, "Hello");
        assert_eq!(state.boosted.boss.name, "Ferumbras");
        assert_eq!(state.countdowns.len(), 1);
        assert_eq!(state.online.map(|o| o.count), Some(9));
        assert!(state.client_update_needed);
        assert_eq!(state.client_version.as_deref(), Some("13.40"));

        // Mirrors land in the client's cache folder
        assert!(launcher.paths().cache.join("launcher_boosted.json").is_file());
        assert!(launcher.paths().cache.join("launcher_countdowns.json").is_file());
        assert!(!launcher.paths().cache.join("boostedcreature.json").exists());
        assert!(launcher.paths().cache.join("onlinenumbers.json").is_file());
    }

    #[tokio::test]
    async fn test_connect_falls_back_to_local_config() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join(LOCAL_CONFIG_FILE), remote_json("13.40", "1.0")).unwrap();
        let launcher = connect(tmp.path(), site_fetcher()).await;

        assert!(!launcher.is_online());
        assert_eq!(launcher.paths().client, tmp.path().join("client"));

        let state = launcher.prepare().await;
        assert!(state.launcher_update.is_none());
        assert!(matches!(
            launcher.update_client(&no_progress).await,
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_play_without_executable_name_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = site_fetcher().with_page(REMOTE_URL, r#"{"clientVersion": "1"}"#);
        let launcher = connect(tmp.path(), fetcher).await;

        let state = LaunchState::default();
        // No download URL, so the forced install fails first
        assert!(launcher.play(&state, &no_progress).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_play_starts_installed_client() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = site_fetcher().with_page(REMOTE_URL, &remote_json("13.40", "1.0"));
        let launcher = connect(tmp.path(), fetcher).await;

        let exe = launcher.paths().executable.clone().unwrap();
        fs::create_dir_all(exe.parent().unwrap()).unwrap();
        fs::write(&exe, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

        let state = LaunchState {
            client_update_needed: false,
            ..LaunchState::default()
        };
        let mut child = launcher.play(&state, &no_progress).await.unwrap();
        assert!(child.wait().unwrap().success());
    }
}
