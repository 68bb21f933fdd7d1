//! On-disk mirrors of last-seen launcher content.

pub mod local;

// Re-export for convenience
pub use local::LocalStorage;

/// Last boosted creature/boss pair.
pub const BOOSTED_MIRROR_FILE: &str = "launcher_boosted.json";

/// Last countdown list.
pub const COUNTDOWN_MIRROR_FILE: &str = "launcher_countdowns.json";

/// Raw online-player answer from the login server.
pub const ONLINE_NUMBERS_FILE: &str = "onlinenumbers.json";
