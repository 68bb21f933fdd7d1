// src/updater/mod.rs

//! Client and launcher updates.
//!
//! - Version checks against the hosted config (`version`)
//! - Streaming downloads with progress (`download`)
//! - Zip extraction (`extract`)
//! - Client package installation (`install`)
//! - Launcher binary replacement (`self_update`)

pub mod download;
pub mod extract;
pub mod install;
pub mod self_update;
pub mod version;

pub use download::{Progress, ProgressFn, ProgressStage, download_to_file, no_progress};
pub use extract::{ExtractSummary, extract_zip};
pub use install::{install_client, install_from_archive};
pub use self_update::{replace_executable, self_update};
pub use version::{client_update_needed, launcher_update_available, read_local_config};
