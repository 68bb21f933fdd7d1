//! Launcher configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root launcher configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the hosted launcher config lives
    #[serde(default)]
    pub remote: RemoteSourceConfig,

    /// Game-server website locations
    #[serde(default)]
    pub site: SiteConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Content cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// News presentation settings
    #[serde(default)]
    pub news: NewsConfig,

    /// Client package handling
    #[serde(default)]
    pub client: ClientConfig,

    /// Site-specific extraction patterns
    #[serde(default)]
    pub patterns: PatternConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.unified_timeout_secs == 0 {
            return Err(AppError::validation(
                "http.unified_timeout_secs must be > 0",
            ));
        }
        if self.cache.ttl_secs > CacheConfig::MAX_TTL_SECS {
            return Err(AppError::validation(format!(
                "cache.ttl_secs must be at most {}",
                CacheConfig::MAX_TTL_SECS
            )));
        }
        if self.news.limit == 0 {
            return Err(AppError::validation("news.limit must be > 0"));
        }
        if self.client.archive_name.trim().is_empty() {
            return Err(AppError::validation("client.archive_name is empty"));
        }
        url::Url::parse(&self.site.base_url)?;
        url::Url::parse(&self.remote.config_url)?;
        self.patterns.compile()?;
        Ok(())
    }
}

/// Location of the hosted launcher config JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSourceConfig {
    #[serde(default = "defaults::remote_config_url")]
    pub config_url: String,
}

impl Default for RemoteSourceConfig {
    fn default() -> Self {
        Self {
            config_url: defaults::remote_config_url(),
        }
    }
}

/// Game-server website locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site root; also the page carrying the boosted creature images
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    #[serde(default = "defaults::news_archive_path")]
    pub news_archive_path: String,

    #[serde(default = "defaults::countdowns_path")]
    pub countdowns_path: String,

    /// Single page bundling news, countdowns and boosted creatures
    #[serde(default = "defaults::unified_path")]
    pub unified_path: String,

    /// Flat-text countdown source (name line, date line, ...)
    #[serde(default = "defaults::events_txt_url")]
    pub events_txt_url: String,

    /// Login service answering online-player queries
    #[serde(default = "defaults::login_url")]
    pub login_url: String,

    /// Outfit renderer path; `{id}`, `{addons}`, `{head}`, `{body}`,
    /// `{legs}`, `{feet}` and `{mount}` are substituted
    #[serde(default = "defaults::outfit_image_path")]
    pub outfit_image_path: String,
}

impl SiteConfig {
    /// Join a site-relative path onto the base URL.
    pub fn page_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn news_archive_url(&self) -> String {
        self.page_url(&self.news_archive_path)
    }

    pub fn countdowns_url(&self) -> String {
        self.page_url(&self.countdowns_path)
    }

    pub fn unified_url(&self) -> String {
        self.page_url(&self.unified_path)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            news_archive_path: defaults::news_archive_path(),
            countdowns_path: defaults::countdowns_path(),
            unified_path: defaults::unified_path(),
            events_txt_url: defaults::events_txt_url(),
            login_url: defaults::login_url(),
            outfit_image_path: defaults::outfit_image_path(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Longer timeout for the combined unified page
    #[serde(default = "defaults::unified_timeout")]
    pub unified_timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn unified_timeout(&self) -> Duration {
        Duration::from_secs(self.unified_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            unified_timeout_secs: defaults::unified_timeout(),
        }
    }
}

/// Content cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long fetched content is served without refetching
    #[serde(default = "defaults::cache_ttl")]
    pub ttl_secs: u64,

    /// Mirror directory, relative to the client folder
    #[serde(default = "defaults::cache_dir")]
    pub dir_name: String,
}

impl CacheConfig {
    /// Longest accepted `ttl_secs` (30 days).
    pub const MAX_TTL_SECS: u64 = 30 * 24 * 60 * 60;

    /// Cache lifetime, capped at [`CacheConfig::MAX_TTL_SECS`].
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs.min(Self::MAX_TTL_SECS) as i64)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::cache_ttl(),
            dir_name: defaults::cache_dir(),
        }
    }
}

/// News presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Number of archive entries to show
    #[serde(default = "defaults::news_limit")]
    pub limit: usize,

    /// Article excerpt length, in graphemes
    #[serde(default = "defaults::content_max_chars")]
    pub content_max_chars: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            limit: defaults::news_limit(),
            content_max_chars: defaults::content_max_chars(),
        }
    }
}

/// Client package handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// File name the package is downloaded to inside the client folder
    #[serde(default = "defaults::archive_name")]
    pub archive_name: String,

    /// User folders kept across client reinstalls
    #[serde(default = "defaults::preserve_folders")]
    pub preserve_folders: Vec<String>,

    /// Folder holding the client executable
    #[serde(default = "defaults::bin_dir")]
    pub bin_dir: String,

    /// Mirror files marked read-only after an install
    #[serde(default = "defaults::protected_cache_files")]
    pub protected_cache_files: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            archive_name: defaults::archive_name(),
            preserve_folders: defaults::preserve_folders(),
            bin_dir: defaults::bin_dir(),
            protected_cache_files: defaults::protected_cache_files(),
        }
    }
}

/// Regex patterns tied to the game-server markup.
///
/// Boosted patterns must capture `id`, `addons`, `head`, `body`, `legs`,
/// `feet`, `mount` and `name`. The alternative pattern is a template where
/// `{element_id}` becomes `Creature` or `Boss`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default = "defaults::boosted_creature")]
    pub boosted_creature: String,

    #[serde(default = "defaults::boosted_boss")]
    pub boosted_boss: String,

    #[serde(default = "defaults::boosted_alternative")]
    pub boosted_alternative: String,

    /// Archive row; captures `icon`, `date`, `href`, `title`
    #[serde(default = "defaults::news_row")]
    pub news_row: String,

    /// Article body; captures `content`
    #[serde(default = "defaults::news_content")]
    pub news_content: String,

    /// Embedded countdown array; captures `events`
    #[serde(default = "defaults::countdown_script")]
    pub countdown_script: String,
}

/// Compiled form of [`PatternConfig`].
#[derive(Debug, Clone)]
pub struct Patterns {
    pub boosted_creature: Regex,
    pub boosted_boss: Regex,
    pub boosted_alternative_creature: Regex,
    pub boosted_alternative_boss: Regex,
    pub news_row: Regex,
    pub news_content: Regex,
    pub countdown_script: Regex,
}

const OUTFIT_GROUPS: [&str; 8] = [
    "id", "addons", "head", "body", "legs", "feet", "mount", "name",
];

impl PatternConfig {
    /// Compile every pattern and check its capture groups.
    pub fn compile(&self) -> Result<Patterns> {
        let alternative = |element_id: &str| {
            self.boosted_alternative
                .replace("{element_id}", &regex::escape(element_id))
        };

        Ok(Patterns {
            boosted_creature: compile("boosted_creature", &self.boosted_creature, &OUTFIT_GROUPS)?,
            boosted_boss: compile("boosted_boss", &self.boosted_boss, &OUTFIT_GROUPS)?,
            boosted_alternative_creature: compile(
                "boosted_alternative",
                &alternative("Creature"),
                &OUTFIT_GROUPS,
            )?,
            boosted_alternative_boss: compile(
                "boosted_alternative",
                &alternative("Boss"),
                &OUTFIT_GROUPS,
            )?,
            news_row: compile("news_row", &self.news_row, &["icon", "date", "href", "title"])?,
            news_content: compile("news_content", &self.news_content, &["content"])?,
            countdown_script: compile("countdown_script", &self.countdown_script, &["events"])?,
        })
    }
}

fn compile(name: &str, pattern: &str, groups: &[&str]) -> Result<Regex> {
    let regex = Regex::new(pattern).map_err(|e| AppError::pattern(name, e))?;
    let names: Vec<&str> = regex.capture_names().flatten().collect();
    for group in groups {
        if !names.contains(group) {
            return Err(AppError::pattern(
                name,
                format!("missing capture group `{group}`"),
            ));
        }
    }
    Ok(regex)
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            boosted_creature: defaults::boosted_creature(),
            boosted_boss: defaults::boosted_boss(),
            boosted_alternative: defaults::boosted_alternative(),
            news_row: defaults::news_row(),
            news_content: defaults::news_content(),
            countdown_script: defaults::countdown_script(),
        }
    }
}

mod defaults {
    // Remote defaults
    pub fn remote_config_url() -> String {
        "https://gist.githubusercontent.com/pauloandre45/e59926d5c0c8cbc9d225e06db7e446ad/raw/SERVIDOR_launcher_config.json".into()
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://baiak-zika.com".into()
    }
    pub fn news_archive_path() -> String {
        "?news/archive".into()
    }
    pub fn countdowns_path() -> String {
        "?countdowns".into()
    }
    pub fn unified_path() -> String {
        "?apilauncher".into()
    }
    pub fn events_txt_url() -> String {
        "http://baiak-zika.com/events.txt".into()
    }
    pub fn login_url() -> String {
        "http://login.baiak-zika.com/login.php".into()
    }
    pub fn outfit_image_path() -> String {
        "images/animated-outfits/animoutfit.php?id={id}&addons={addons}&head={head}&body={body}&legs={legs}&feet={feet}&mount={mount}".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn unified_timeout() -> u64 {
        15
    }

    // Cache defaults
    pub fn cache_ttl() -> u64 {
        300
    }
    pub fn cache_dir() -> String {
        "cache".into()
    }

    // News defaults
    pub fn news_limit() -> usize {
        3
    }
    pub fn content_max_chars() -> usize {
        150
    }

    // Client defaults
    pub fn archive_name() -> String {
        "client.zip".into()
    }
    pub fn preserve_folders() -> Vec<String> {
        vec!["conf".into(), "characterdata".into()]
    }
    pub fn bin_dir() -> String {
        "bin".into()
    }
    pub fn protected_cache_files() -> Vec<String> {
        vec![
            "eventschedule.json".into(),
            "boostedcreature.json".into(),
            "onlinenumbers.json".into(),
        ]
    }

    // Pattern defaults
    const OUTFIT_QUERY: &str = r"animoutfit\.php\?id=(?P<id>\d+)&addons=(?P<addons>\d+)&head=(?P<head>\d+)&body=(?P<body>\d+)&legs=(?P<legs>\d+)&feet=(?P<feet>\d+)&mount=(?P<mount>\d+)";

    pub fn boosted_creature() -> String {
        format!(
            r#"(?i)<img\s+id="Creature"\s+src="images/animated-outfits/{OUTFIT_QUERY}"\s+alt="[^"]*"\s+title="Today's boosted creature:\s*(?P<name>[^"]+)""#
        )
    }
    pub fn boosted_boss() -> String {
        format!(
            r#"(?i)<img\s+id="Boss"\s+src="images/animated-outfits/{OUTFIT_QUERY}"\s+alt="[^"]*"\s+title="Today's boosted boss:\s*(?P<name>[^"]+)""#
        )
    }
    pub fn boosted_alternative() -> String {
        format!(
            r#"(?i)id="{{element_id}}"[^>]*src="[^"]*{OUTFIT_QUERY}"[^>]*title="[^:]*:\s*(?P<name>[^"]+)""#
        )
    }
    pub fn news_row() -> String {
        r#"(?is)<tr[^>]*>.*?icon_(?P<icon>\d+)_small\.gif.*?(?P<date>\d+\.\d+\.\d+).*?href="(?P<href>[^"]*)">(?P<title>[^<]+)</a>.*?</tr>"#.into()
    }
    pub fn news_content() -> String {
        r#"(?is)<td[^>]*style="padding-left:10px;padding-right:10px;"[^>]*><p>(?P<content>.*?)</p></td>"#.into()
    }
    pub fn countdown_script() -> String {
        r"(?s)const events = (?P<events>\[.*?\]);".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_news_limit() {
        let mut config = Config::default();
        config.news.limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn huge_cache_ttl_is_rejected_and_capped() {
        let config: Config = toml::from_str("[cache]\nttl_secs = 100000000000000000\n").unwrap();
        assert!(config.validate().is_err());
        assert_eq!(config.cache.ttl(), chrono::Duration::days(30));
    }

    #[test]
    fn pattern_without_required_group_is_rejected() {
        let mut patterns = PatternConfig::default();
        patterns.news_content = r"<p>(.*?)</p>".to_string();
        let err = patterns.compile().unwrap_err();
        assert!(matches!(err, AppError::Pattern { ref name, .. } if name == "news_content"));
    }

    #[test]
    fn invalid_regex_names_the_pattern() {
        let mut patterns = PatternConfig::default();
        patterns.news_row = "(?P<icon>[".to_string();
        let err = patterns.compile().unwrap_err();
        assert!(matches!(err, AppError::Pattern { ref name, .. } if name == "news_row"));
    }

    #[test]
    fn alternative_template_is_filled_per_kind() {
        let patterns = PatternConfig::default().compile().unwrap();
        assert!(patterns.boosted_alternative_boss.as_str().contains(r#"id="Boss""#));
        assert!(
            patterns
                .boosted_alternative_creature
                .as_str()
                .contains(r#"id="Creature""#)
        );
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [site]
            base_url = "https://example.org"

            [cache]
            ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.site.base_url, "https://example.org");
        assert_eq!(config.site.news_archive_path, "?news/archive");
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.news.limit, 3);
        assert_eq!(config.client.preserve_folders, vec!["conf", "characterdata"]);
    }

    #[test]
    fn page_urls_join_without_double_slash() {
        let mut site = SiteConfig::default();
        site.base_url = "https://example.org/".to_string();
        assert_eq!(site.news_archive_url(), "https://example.org/?news/archive");
        assert_eq!(site.unified_url(), "https://example.org/?apilauncher");
    }
}
