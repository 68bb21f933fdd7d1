// src/updater/download.rs

//! Streaming downloads with progress reporting.

use std::fmt;
use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::utils::size_suffix;

/// Phase of a long-running update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Downloading,
    Extracting,
}

/// A progress report: bytes for downloads, entries for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub stage: ProgressStage,
    pub done: u64,
    pub total: Option<u64>,
    pub percent: Option<u8>,
}

impl Progress {
    pub fn new(stage: ProgressStage, done: u64, total: Option<u64>) -> Self {
        let percent = total
            .filter(|&t| t > 0)
            .map(|t| (done.min(t) * 100 / t) as u8);
        Self {
            stage,
            done,
            total,
            percent,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.stage, self.total, self.percent) {
            (ProgressStage::Downloading, Some(total), _) => {
                write!(f, "{} / {}", size_suffix(self.done), size_suffix(total))
            }
            (ProgressStage::Downloading, None, _) => {
                write!(f, "Downloading... {}", size_suffix(self.done))
            }
            (ProgressStage::Extracting, _, Some(percent)) => {
                write!(f, "Extracting files... {percent}%")
            }
            (ProgressStage::Extracting, _, None) => f.write_str("Extracting files..."),
        }
    }
}

/// Progress callback shared by download and extraction.
pub type ProgressFn<'a> = &'a (dyn Fn(Progress) + Send + Sync);

/// Callback that drops every report.
pub fn no_progress(_: Progress) {}

/// Stream `url` into `dest`, returning the number of bytes written.
///
/// A partially written file is removed on failure.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    progress: ProgressFn<'_>,
) -> Result<u64> {
    let result = stream_to_file(client, url, dest, progress).await;
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(dest).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Could not remove partial download {}: {}", dest.display(), e);
            }
        }
    }
    result
}

async fn stream_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    progress: ProgressFn<'_>,
) -> Result<u64> {
    let mut response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::download(url, format!("server answered {status}")));
    }

    let total = response.content_length();
    log::info!(
        "Downloading {} ({})",
        url,
        total.map_or_else(|| "unknown size".to_string(), size_suffix)
    );

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::File::create(dest).await?;
    let mut done = 0u64;
    progress(Progress::new(ProgressStage::Downloading, 0, total));

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        done += chunk.len() as u64;
        progress(Progress::new(ProgressStage::Downloading, done, total));
    }
    file.flush().await?;

    if let Some(expected) = total {
        if done != expected {
            return Err(AppError::download(
                url,
                format!("received {done} of {expected} bytes"),
            ));
        }
    }
    Ok(done)
}
