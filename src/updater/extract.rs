// src/updater/extract.rs

//! Zip extraction on a blocking thread.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use zip::ZipArchive;

use super::download::{Progress, ProgressFn, ProgressStage};
use crate::error::{AppError, Result};

/// Outcome of an extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub extracted: usize,
    pub skipped: usize,
}

/// Extract `archive` into `dest`, reporting progress per entry.
///
/// Entries with unsafe paths or that cannot be written are logged and
/// skipped. An unreadable archive is an error.
pub async fn extract_zip(archive: &Path, dest: &Path, progress: ProgressFn<'_>) -> Result<ExtractSummary> {
    let (tx, mut rx) = unbounded_channel();
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    let task = tokio::task::spawn_blocking(move || extract_blocking(&archive, &dest, &tx));

    while let Some(report) = rx.recv().await {
        progress(report);
    }

    task.await
        .map_err(|e| AppError::install(format!("extraction task failed: {e}")))?
}

fn extract_blocking(
    archive: &Path,
    dest: &Path,
    progress: &UnboundedSender<Progress>,
) -> Result<ExtractSummary> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    fs::create_dir_all(dest)?;

    let total = zip.len() as u64;
    let mut summary = ExtractSummary::default();
    for index in 0..zip.len() {
        match extract_entry(&mut zip, index, dest) {
            Ok(Some(path)) => {
                log::trace!("Extracted {}", path.display());
                summary.extracted += 1;
            }
            Ok(None) => summary.skipped += 1,
            Err(e) => {
                log::warn!("Error extracting entry {}: {}", index, e);
                summary.skipped += 1;
            }
        }
        // Receiver gone means nobody is listening; keep extracting.
        let _ = progress.send(Progress::new(
            ProgressStage::Extracting,
            index as u64 + 1,
            Some(total),
        ));
    }

    log::info!(
        "Extracted {} entries ({} skipped) into {}",
        summary.extracted,
        summary.skipped,
        dest.display()
    );
    Ok(summary)
}

fn extract_entry<R: Read + std::io::Seek>(
    zip: &mut ZipArchive<R>,
    index: usize,
    dest: &Path,
) -> Result<Option<PathBuf>> {
    let mut entry = zip.by_index(index)?;
    let Some(relative) = entry.enclosed_name() else {
        log::warn!("Skipping entry with unsafe path: {}", entry.name());
        return Ok(None);
    };
    let out = dest.join(relative);

    if entry.is_dir() {
        fs::create_dir_all(&out)?;
        return Ok(Some(out));
    }
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(&out)?;
    std::io::copy(&mut entry, &mut file)?;
    Ok(Some(out))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use zip::write::SimpleFileOptions;

    use super::*;
    use crate::updater::download::no_progress;

    /// Write a zip holding `files`; names ending in `/` become directories.
    pub(crate) fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in files {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[tokio::test]
    async fn test_extract_files_and_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let archive = tmp.path().join("client.zip");
        write_zip(
            &archive,
            &[
                ("bin/", b""),
                ("bin/client.exe", b"exe"),
                ("assets/sprites/a.dat", b"sprite"),
                ("empty/", b""),
            ],
        );
        let dest = tmp.path().join("client");
        let reports = Mutex::new(Vec::new());
        let record = |p: Progress| reports.lock().unwrap().push(p);

        let summary = extract_zip(&archive, &dest, &record).await.unwrap();
        assert_eq!(summary, ExtractSummary { extracted: 4, skipped: 0 });
        assert_eq!(fs::read(dest.join("bin/client.exe")).unwrap(), b"exe");
        assert_eq!(fs::read(dest.join("assets/sprites/a.dat")).unwrap(), b"sprite");
        assert!(dest.join("empty").is_dir());

        let reports = reports.into_inner().unwrap();
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[3].percent, Some(100));
        assert_eq!(reports[3].stage, ProgressStage::Extracting);
    }

    #[tokio::test]
    async fn test_extract_skips_unsafe_paths() {
        let tmp = tempfile::TempDir::new().unwrap();
        let archive = tmp.path().join("client.zip");
        write_zip(&archive, &[("../evil.txt", b"x"), ("ok.txt", b"ok")]);
        let dest = tmp.path().join("client");

        let summary = extract_zip(&archive, &dest, &no_progress).await.unwrap();
        assert_eq!(summary, ExtractSummary { extracted: 1, skipped: 1 });
        assert!(!tmp.path().join("evil.txt").exists());
        assert!(dest.join("ok.txt").is_file());
    }

    #[tokio::test]
    async fn test_extract_corrupt_archive_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let archive = tmp.path().join("client.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract_zip(&archive, &tmp.path().join("out"), &no_progress)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Zip(_)));
    }
}
