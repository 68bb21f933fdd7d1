//! Aggregate launcher content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::countdown::{CountdownEvent, fallback_countdowns};
use super::creature::{BoostedCreature, BoostedPair};
use super::news::{NewsItem, fallback_news};

/// Everything the launcher shows, fetched in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedGameData {
    pub news: Vec<NewsItem>,
    pub countdowns: Vec<CountdownEvent>,
    pub boosted_creature: BoostedCreature,
    pub boosted_boss: BoostedCreature,
    pub fetched_at: DateTime<Utc>,
    pub from_cache: bool,
}

impl UnifiedGameData {
    /// Built-in content used when nothing was ever fetched.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        let BoostedPair { creature, boss } = BoostedPair::placeholder();
        Self {
            news: fallback_news(now.with_timezone(&chrono::Local).date_naive()),
            countdowns: fallback_countdowns(now),
            boosted_creature: creature,
            boosted_boss: boss,
            fetched_at: now,
            from_cache: false,
        }
    }
}

/// Player count reported by the login server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlinePlayers {
    pub count: u32,
    pub from_cache: bool,
}

/// Status line for an optional player count.
pub fn format_online(players: Option<OnlinePlayers>) -> String {
    match players {
        Some(p) => format!("Players Online: {}", p.count),
        None => "Players Online: Unavailable".to_string(),
    }
}
