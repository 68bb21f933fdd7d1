// src/services/countdown.rs

//! Countdown service.
//!
//! The schedule is a flat text file of alternating lines:
//!
//! ```text
//! Battle Royale
//! 25/07/2026
//! Castle War
//! 02/08/2026
//! ```
//!
//! Each date is the local midnight the event starts at.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{ServiceContext, TtlCache};
use crate::error::AppError;
use crate::models::{CountdownEvent, Patterns, local_instant};
use crate::storage::COUNTDOWN_MIRROR_FILE;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Service for upcoming event countdowns.
pub struct CountdownService {
    ctx: ServiceContext,
    cache: Mutex<TtlCache<Vec<CountdownEvent>>>,
}

impl CountdownService {
    pub fn new(ctx: ServiceContext) -> Self {
        let cache = Mutex::new(ctx.new_cache());
        Self { ctx, cache }
    }

    /// Get the event schedule.
    ///
    /// A cached schedule is only reused while fresh and non-empty. An error
    /// status from the server yields an empty schedule; a network error
    /// yields the last non-empty schedule, or an empty one.
    pub async fn fetch(&self, force_refresh: bool) -> Vec<CountdownEvent> {
        if !force_refresh {
            let cache = self.cache.lock().await;
            if let Some(events) = cache.fresh(Utc::now()).filter(|events| !events.is_empty()) {
                return events.clone();
            }
        }

        let url = &self.ctx.config.site.events_txt_url;
        let events = match self.ctx.fetcher.get_text(url).await {
            Ok(text) => parse_events_txt(&text),
            Err(AppError::Status { status, .. }) => {
                log::warn!("Event schedule {} answered {}", url, status);
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to fetch event schedule {}: {}", url, e);
                return self
                    .cache
                    .lock()
                    .await
                    .stale()
                    .filter(|events| !events.is_empty())
                    .cloned()
                    .unwrap_or_default();
            }
        };

        log::debug!("Loaded {} countdown events", events.len());
        self.cache.lock().await.store(events.clone(), Utc::now());
        if let Some(storage) = &self.ctx.mirror {
            storage.mirror(COUNTDOWN_MIRROR_FILE, &events).await;
        }
        events
    }
}

/// Parse the name/date line pairs of the schedule file.
///
/// Blank lines are ignored, as are a trailing unpaired line and pairs whose
/// date does not parse.
pub fn parse_events_txt(content: &str) -> Vec<CountdownEvent> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    lines
        .chunks_exact(2)
        .filter_map(|pair| {
            let date = NaiveDate::parse_from_str(pair[1], DATE_FORMAT).ok()?;
            let start = local_instant(date, NaiveTime::MIN)?;
            Some(CountdownEvent::new(pair[0], start))
        })
        .collect()
}

#[derive(Deserialize)]
struct ScriptEvent {
    name: String,
    /// Unix milliseconds
    timestamp: f64,
}

/// Extract the countdown array embedded in a page script.
///
/// Returns `None` when the page has no such block or it is not valid JSON.
pub fn parse_events_script(html: &str, patterns: &Patterns) -> Option<Vec<CountdownEvent>> {
    let json = patterns.countdown_script.captures(html)?.name("events")?;
    let events: Vec<ScriptEvent> = match serde_json::from_str(json.as_str()) {
        Ok(events) => events,
        Err(e) => {
            log::debug!("Invalid countdown script: {}", e);
            return None;
        }
    };

    Some(
        events
            .into_iter()
            .filter_map(|e| CountdownEvent::from_millis(e.name, e.timestamp as i64))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Local, TimeZone};

    use super::*;
    use crate::services::testing::{self, BASE};
    use crate::utils::http::fake::FakeFetcher;

    fn events_url() -> String {
        format!("{BASE}/events.txt")
    }

    #[test]
    fn test_parse_events_txt() {
        let events = parse_events_txt(
            "Battle Royale\r\n25/07/2026\r\n\r\nCastle War\n31/02/2026\nSnowball\n01/12/2026\nOrphan\n",
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "Battle Royale");
        let expected = Local.with_ymd_and_hms(2026, 7, 25, 0, 0, 0).unwrap();
        assert_eq!(events[0].end_time, expected.with_timezone(&Utc));
        assert_eq!(events[0].timestamp_ms, expected.timestamp_millis());
        assert_eq!(events[1].name, "Snowball");
    }

    #[test]
    fn test_parse_events_script() {
        let patterns = testing::config().patterns.compile().unwrap();
        let html = r#"<script>
const events = [{"name": "Raid", "timestamp": 1767225600000}, {"name": "Boss", "timestamp": 1767312000000}];
startCountdowns(events);
</script>"#;

        let events = parse_events_script(html, &patterns).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "Raid");
        assert_eq!(events[1].timestamp_ms, 1_767_312_000_000);
    }

    #[test]
    fn test_parse_events_script_missing_or_invalid() {
        let patterns = testing::config().patterns.compile().unwrap();
        assert!(parse_events_script("<p>no script</p>", &patterns).is_none());
        assert!(parse_events_script("const events = [oops];", &patterns).is_none());
    }

    #[tokio::test]
    async fn test_fetch_caches_non_empty() {
        let fetcher = Arc::new(FakeFetcher::new().with_page(&events_url(), "Raid\n01/01/2030\n"));
        let service = CountdownService::new(testing::context(fetcher.clone()));

        assert_eq!(service.fetch(false).await.len(), 1);
        assert_eq!(service.fetch(false).await.len(), 1);
        assert_eq!(fetcher.hits(&events_url()), 1);
    }

    #[tokio::test]
    async fn test_fetch_empty_schedule_is_refetched() {
        let fetcher = Arc::new(FakeFetcher::new().with_page(&events_url(), ""));
        let service = CountdownService::new(testing::context(fetcher.clone()));

        assert!(service.fetch(false).await.is_empty());
        assert!(service.fetch(false).await.is_empty());
        assert_eq!(fetcher.hits(&events_url()), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_status_gives_empty_list() {
        let fetcher = Arc::new(FakeFetcher::new().with_status(&events_url(), 404));
        let service = CountdownService::new(testing::context(fetcher.clone()));

        assert!(service.fetch(false).await.is_empty());
        assert!(service.fetch(false).await.is_empty());
        assert_eq!(fetcher.hits(&events_url()), 2);
    }

    #[tokio::test]
    async fn test_fetch_network_error_uses_stale() {
        let fetcher = Arc::new(FakeFetcher::new().with_page(&events_url(), "Raid\n01/01/2030\n"));
        let service = CountdownService::new(testing::context(fetcher.clone()));
        service.fetch(false).await;

        fetcher.remove(&events_url());
        let events = service.fetch(true).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Raid");
    }

    #[tokio::test]
    async fn test_fetch_network_error_without_cache_is_empty() {
        let service = CountdownService::new(testing::context(Arc::new(FakeFetcher::new())));
        assert!(service.fetch(false).await.is_empty());
    }
}
