// src/models/mod.rs

//! Domain models for the launcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod countdown;
mod creature;
mod game_data;
mod news;
mod remote;

// Re-export all public types
pub use config::{
    CacheConfig, ClientConfig, Config, HttpConfig, NewsConfig, PatternConfig, Patterns,
    RemoteSourceConfig, SiteConfig,
};
pub use countdown::{CountdownEvent, fallback_countdowns, local_instant};
pub use creature::{BoostedCreature, BoostedPair, CreatureKind, Outfit, PLACEHOLDER_NAME};
pub use game_data::{OnlinePlayers, UnifiedGameData, format_online};
pub use news::{
    NewsCategory, NewsItem, READ_MORE, fallback_news, format_for_display, format_with_highlight,
};
pub use remote::{RemoteConfig, ReplaceFolder};
