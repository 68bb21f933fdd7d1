//! Hosted launcher config (`launcher_config.json`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Versions, download locations and folder layout published by the server.
///
/// The same document is written next to the launcher after each install, so
/// the local copy records what is currently installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteConfig {
    pub launcher_version: Option<String>,
    pub client_version: Option<String>,
    pub new_client_url: Option<String>,
    pub new_launcher_url: Option<String>,
    pub client_folder: Option<String>,
    pub client_executable: Option<String>,
    pub replace_folders: bool,
    pub replace_folder_name: Vec<ReplaceFolder>,
}

/// A client folder wiped before a new package is extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceFolder {
    pub name: String,
}

impl RemoteConfig {
    /// Parse the JSON document.
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a local copy; a missing or unreadable file yields `None`.
    pub fn read_local(path: &Path) -> Option<Self> {
        let json = fs::read_to_string(path).ok()?;
        match Self::parse(&json) {
            Ok(config) => Some(config),
            Err(e) => {
                log::debug!("Ignoring invalid local config {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn client_url(&self) -> Result<&str> {
        non_empty(&self.new_client_url)
            .ok_or_else(|| AppError::config("remote config has no newClientUrl"))
    }

    pub fn launcher_url(&self) -> Result<&str> {
        non_empty(&self.new_launcher_url)
            .ok_or_else(|| AppError::config("remote config has no newLauncherUrl"))
    }

    pub fn executable(&self) -> Result<&str> {
        non_empty(&self.client_executable)
            .ok_or_else(|| AppError::config("remote config has no clientExecutable"))
    }

    /// Client folder name, if the client lives in a subfolder.
    pub fn folder(&self) -> Option<&str> {
        non_empty(&self.client_folder)
    }

    /// Folders to delete before extraction; empty unless `replaceFolders`.
    pub fn folders_to_replace(&self) -> impl Iterator<Item = &str> {
        self.replace_folder_name
            .iter()
            .filter(|_| self.replace_folders)
            .map(|f| f.name.as_str())
            .filter(|name| !name.trim().is_empty())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
