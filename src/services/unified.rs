// src/services/unified.rs

//! Unified data service.
//!
//! Gathers news, countdowns and boosted creatures in as few requests as the
//! site allows: one request when the combined launcher page answers, three
//! concurrent ones otherwise.

use chrono::Utc;
use tokio::sync::Mutex;

use super::boosted::extract_boosted;
use super::countdown::parse_events_script;
use super::news::NewsService;
use super::{ServiceContext, TtlCache};
use crate::error::Result;
use crate::models::{UnifiedGameData, fallback_countdowns};

/// Service fetching every piece of launcher content together.
pub struct UnifiedDataService {
    ctx: ServiceContext,
    news: NewsService,
    cache: Mutex<TtlCache<UnifiedGameData>>,
}

impl UnifiedDataService {
    pub fn new(ctx: ServiceContext) -> Self {
        let cache = Mutex::new(ctx.new_cache());
        let news = NewsService::new(ctx.clone());
        Self { ctx, news, cache }
    }

    /// Fetch all launcher content.
    ///
    /// Fresh cached data is marked `from_cache`. When every source fails the
    /// last result is returned, or the built-in fallback record.
    pub async fn fetch_all(&self, force_refresh: bool) -> UnifiedGameData {
        if !force_refresh {
            if let Some(data) = self.cache.lock().await.fresh(Utc::now()) {
                return UnifiedGameData {
                    from_cache: true,
                    ..data.clone()
                };
            }
        }

        let result = match self.fetch_unified().await {
            Ok(data) => Ok(data),
            Err(e) => {
                log::info!("Unified page unavailable ({}), fetching pages separately", e);
                self.fetch_separately().await
            }
        };

        match result {
            Ok(data) => {
                self.cache.lock().await.store(data.clone(), data.fetched_at);
                data
            }
            Err(e) => {
                log::warn!("Failed to fetch launcher content: {}", e);
                match self.cache.lock().await.stale() {
                    Some(data) => UnifiedGameData {
                        from_cache: true,
                        ..data.clone()
                    },
                    None => UnifiedGameData::fallback(Utc::now()),
                }
            }
        }
    }

    async fn fetch_unified(&self) -> Result<UnifiedGameData> {
        let url = self.ctx.config.site.unified_url();
        let timeout = self.ctx.config.http.unified_timeout();
        let html = self.ctx.fetcher.get_text_with_timeout(&url, timeout).await?;
        Ok(self.assemble(&html, &html, &html).await)
    }

    async fn fetch_separately(&self) -> Result<UnifiedGameData> {
        let site = &self.ctx.config.site;
        let countdowns_url = site.countdowns_url();
        let archive_url = site.news_archive_url();
        let fetcher = &self.ctx.fetcher;

        let (home, countdowns, archive) = tokio::try_join!(
            fetcher.get_text(&site.base_url),
            fetcher.get_text(&countdowns_url),
            fetcher.get_text(&archive_url),
        )?;
        Ok(self.assemble(&home, &countdowns, &archive).await)
    }

    async fn assemble(&self, home: &str, countdowns: &str, archive: &str) -> UnifiedGameData {
        let patterns = &self.ctx.patterns;
        let pair = extract_boosted(home, patterns, &self.ctx.config.site);
        let countdowns = parse_events_script(countdowns, patterns).unwrap_or_else(|| {
            log::debug!("No countdown script found, using built-in schedule");
            fallback_countdowns(Utc::now())
        });
        let news = self.news.collect(archive).await;

        UnifiedGameData {
            news,
            countdowns,
            boosted_creature: pair.creature,
            boosted_boss: pair.boss,
            fetched_at: Utc::now(),
            from_cache: false,
        }
    }
}
