// src/services/boosted.rs

//! Boosted creature service.
//!
//! Reads today's boosted creature and boss from the image tags on the site's
//! home page.

use chrono::Utc;
use regex::Regex;
use tokio::sync::Mutex;

use super::{ServiceContext, TtlCache};
use crate::models::{BoostedCreature, BoostedPair, CreatureKind, Outfit, Patterns, SiteConfig};
use crate::storage::BOOSTED_MIRROR_FILE;
use crate::utils::resolve;

/// Service for today's boosted creature and boss.
pub struct BoostedCreatureService {
    ctx: ServiceContext,
    cache: Mutex<TtlCache<BoostedPair>>,
}

impl BoostedCreatureService {
    pub fn new(ctx: ServiceContext) -> Self {
        let cache = Mutex::new(ctx.new_cache());
        Self { ctx, cache }
    }

    /// Get the boosted pair, from cache while it is fresh.
    ///
    /// Never fails: on a network error the last known pair is returned, or
    /// placeholders when nothing was ever fetched.
    pub async fn fetch(&self, force_refresh: bool) -> BoostedPair {
        if !force_refresh {
            if let Some(pair) = self.cache.lock().await.fresh(Utc::now()) {
                return pair.clone();
            }
        }

        let site = &self.ctx.config.site;
        match self.ctx.fetcher.get_text(&site.base_url).await {
            Ok(html) => {
                let pair = extract_boosted(&html, &self.ctx.patterns, site);
                log::debug!(
                    "Boosted creature: {}, boss: {}",
                    pair.creature.name,
                    pair.boss.name
                );
                self.cache.lock().await.store(pair.clone(), Utc::now());
                if let Some(storage) = &self.ctx.mirror {
                    storage.mirror(BOOSTED_MIRROR_FILE, &pair).await;
                }
                pair
            }
            Err(e) => {
                log::warn!("Failed to fetch boosted creatures: {}", e);
                self.cache
                    .lock()
                    .await
                    .stale()
                    .cloned()
                    .unwrap_or_else(BoostedPair::placeholder)
            }
        }
    }

    pub async fn force_refresh(&self) -> BoostedPair {
        self.fetch(true).await
    }
}

/// Extract the boosted pair from a page.
///
/// When neither primary pattern matches, the looser alternative pattern is
/// tried for each kind.
pub fn extract_boosted(html: &str, patterns: &Patterns, site: &SiteConfig) -> BoostedPair {
    let mut pair = BoostedPair {
        creature: extract_one(html, &patterns.boosted_creature, CreatureKind::Creature, site)
            .unwrap_or_else(|| BoostedCreature::placeholder(CreatureKind::Creature)),
        boss: extract_one(html, &patterns.boosted_boss, CreatureKind::Boss, site)
            .unwrap_or_else(|| BoostedCreature::placeholder(CreatureKind::Boss)),
    };

    if pair.creature.is_placeholder() && pair.boss.is_placeholder() {
        let kinds = [
            (CreatureKind::Creature, &patterns.boosted_alternative_creature),
            (CreatureKind::Boss, &patterns.boosted_alternative_boss),
        ];
        for (kind, pattern) in kinds {
            if let Some(found) = extract_one(html, pattern, kind, site) {
                match kind {
                    CreatureKind::Creature => pair.creature = found,
                    CreatureKind::Boss => pair.boss = found,
                }
            }
        }
    }

    pair
}

fn extract_one(
    html: &str,
    pattern: &Regex,
    kind: CreatureKind,
    site: &SiteConfig,
) -> Option<BoostedCreature> {
    let caps = pattern.captures(html)?;
    let number = |group: &str| caps.name(group)?.as_str().parse::<u32>().ok();

    let outfit = Outfit {
        id: number("id")?,
        addons: number("addons")?,
        head: number("head")?,
        body: number("body")?,
        legs: number("legs")?,
        feet: number("feet")?,
        mount: number("mount")?,
    };
    let name = caps.name("name")?.as_str().trim();
    if name.is_empty() {
        return None;
    }

    let image_path = outfit.render(&site.outfit_image_path);
    Some(BoostedCreature {
        name: name.to_string(),
        kind,
        image_url: Some(resolve(&site.base_url, &image_path)),
        outfit,
    })
}
