// src/services/mod.rs

//! Content services for the launcher.
//!
//! This module contains the fetch-and-extract logic for:
//! - Boosted creature and boss (`BoostedCreatureService`)
//! - News archive and article excerpts (`NewsService`)
//! - Countdown events (`CountdownService`)
//! - Everything above in one pass (`UnifiedDataService`)
//! - Online player count (`OnlinePlayersService`)
//!
//! Every service keeps its last result in a [`TtlCache`] and falls back to
//! stale or built-in data instead of failing.

mod boosted;
pub mod cache;
mod countdown;
mod news;
mod online;
mod unified;

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, Patterns};
use crate::storage::LocalStorage;
use crate::utils::http::PageFetcher;

pub use boosted::{BoostedCreatureService, extract_boosted};
pub use cache::TtlCache;
pub use countdown::{CountdownService, parse_events_script, parse_events_txt};
pub use news::{NewsService, clean_article_content, parse_archive};
pub use online::{OnlinePlayersService, parse_players_online};
pub use unified::UnifiedDataService;

/// Shared handles every content service is built from.
#[derive(Clone)]
pub struct ServiceContext {
    pub fetcher: Arc<dyn PageFetcher>,
    pub config: Arc<Config>,
    pub patterns: Arc<Patterns>,
    /// Mirror for last-seen content; `None` disables mirroring
    pub mirror: Option<LocalStorage>,
}

impl ServiceContext {
    /// Compile the extraction patterns once for all services.
    pub fn with_fetcher(
        fetcher: Arc<dyn PageFetcher>,
        config: Arc<Config>,
        mirror: Option<LocalStorage>,
    ) -> Result<Self> {
        let patterns = Arc::new(config.patterns.compile()?);
        Ok(Self {
            fetcher,
            config,
            patterns,
            mirror,
        })
    }

    fn new_cache<T>(&self) -> TtlCache<T> {
        TtlCache::new(self.config.cache.ttl())
    }
}
