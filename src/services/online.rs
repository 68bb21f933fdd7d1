// src/services/online.rs

//! Online player count from the login server.

use serde_json::{Value, json};

use super::ServiceContext;
use crate::error::Result;
use crate::models::OnlinePlayers;
use crate::storage::ONLINE_NUMBERS_FILE;

/// Service for the number of players currently online.
pub struct OnlinePlayersService {
    ctx: ServiceContext,
}

impl OnlinePlayersService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get the online count, preferring the mirrored answer unless forced.
    ///
    /// Returns `None` when the login server cannot be queried.
    pub async fn fetch(&self, force_refresh: bool) -> Option<OnlinePlayers> {
        if !force_refresh {
            if let Some(count) = self.read_mirror().await {
                return Some(OnlinePlayers {
                    count,
                    from_cache: true,
                });
            }
        }

        match self.query().await {
            Ok(count) => Some(OnlinePlayers {
                count,
                from_cache: false,
            }),
            Err(e) => {
                log::warn!("Failed to fetch online players: {}", e);
                None
            }
        }
    }

    async fn read_mirror(&self) -> Option<u32> {
        let storage = self.ctx.mirror.as_ref()?;
        match storage.read_json::<Value>(ONLINE_NUMBERS_FILE).await {
            Ok(Some(value)) => Some(players_online(&value)),
            Ok(None) => None,
            Err(e) => {
                log::debug!("Invalid cached {}, fetching fresh data: {}", ONLINE_NUMBERS_FILE, e);
                None
            }
        }
    }

    async fn query(&self) -> Result<u32> {
        let url = &self.ctx.config.site.login_url;
        let raw = self
            .ctx
            .fetcher
            .post_json(url, &json!({ "type": "cacheinfo" }))
            .await?;
        let count = parse_players_online(&raw)?;

        if let Some(storage) = &self.ctx.mirror {
            let written = match storage.write_bytes(ONLINE_NUMBERS_FILE, raw.as_bytes()).await {
                Ok(()) => storage.set_read_only(ONLINE_NUMBERS_FILE).await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                log::debug!("Could not cache online players: {}", e);
            }
        }
        Ok(count)
    }
}

/// Read `playersonline` from a login-server answer. Missing counts as zero.
pub fn parse_players_online(raw: &str) -> Result<u32> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(players_online(&value))
}

fn players_online(value: &Value) -> u32 {
    match value.get("playersonline") {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
