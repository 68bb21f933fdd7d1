// src/services/news.rs

//! News service.
//!
//! Reads the latest entries from the news archive and fetches a short
//! plain-text excerpt for each article.

use chrono::Local;
use futures::future::join_all;
use scraper::{Html, Node};

use super::ServiceContext;
use crate::models::{NewsItem, Patterns, READ_MORE, SiteConfig, fallback_news};
use crate::utils::{normalize_whitespace, resolve, truncate_graphemes};

/// Service for the news archive.
pub struct NewsService {
    ctx: ServiceContext,
}

impl NewsService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fetch the latest news with article excerpts.
    ///
    /// Falls back to built-in news when the archive cannot be fetched.
    pub async fn fetch(&self) -> Vec<NewsItem> {
        let url = self.ctx.config.site.news_archive_url();
        match self.ctx.fetcher.get_text(&url).await {
            Ok(html) => self.collect(&html).await,
            Err(e) => {
                log::warn!("Failed to fetch news archive {}: {}", url, e);
                fallback_news(Local::now().date_naive())
            }
        }
    }

    /// Absolute link for an archive `href`.
    pub fn resolve_article_url(&self, href: &str) -> String {
        resolve_article_url(&self.ctx.config.site, href)
    }

    /// Parse archive rows from `html`, keep the configured number and fill
    /// in their excerpts concurrently.
    pub(crate) async fn collect(&self, html: &str) -> Vec<NewsItem> {
        let mut items = parse_archive(html, &self.ctx.patterns);
        items.truncate(self.ctx.config.news.limit);
        log::debug!("Found {} news entries", items.len());

        let excerpts = join_all(items.iter().map(|item| self.fetch_excerpt(item))).await;
        for (item, content) in items.iter_mut().zip(excerpts) {
            item.content = content;
        }
        items
    }

    async fn fetch_excerpt(&self, item: &NewsItem) -> String {
        let url = self.resolve_article_url(&item.url);
        match self.ctx.fetcher.get_text(&url).await {
            Ok(html) => clean_article_content(
                &html,
                &self.ctx.patterns,
                self.ctx.config.news.content_max_chars,
            ),
            Err(e) => {
                log::debug!("Failed to fetch article {}: {}", url, e);
                item.unreachable_excerpt()
            }
        }
    }
}

/// Absolute URLs pass through; relative ones are joined onto the site root.
pub fn resolve_article_url(site: &SiteConfig, href: &str) -> String {
    resolve(&site.base_url, href)
}

/// Extract archive rows in page order. Content is left empty.
pub fn parse_archive(html: &str, patterns: &Patterns) -> Vec<NewsItem> {
    patterns
        .news_row
        .captures_iter(html)
        .filter_map(|caps| {
            Some(NewsItem {
                title: caps.name("title")?.as_str().trim().to_string(),
                date: caps.name("date")?.as_str().trim().to_string(),
                content: String::new(),
                url: caps.name("href")?.as_str().to_string(),
                icon_type: caps.name("icon")?.as_str().to_string(),
            })
        })
        .collect()
}

/// Plain-text excerpt of an article page.
///
/// Line breaks become spaces, markup is dropped and entities decoded, then
/// whitespace is collapsed and the text cut to `max_chars` graphemes.
pub fn clean_article_content(html: &str, patterns: &Patterns, max_chars: usize) -> String {
    let Some(body) = patterns
        .news_content
        .captures(html)
        .and_then(|caps| caps.name("content"))
    else {
        return READ_MORE.to_string();
    };

    let fragment = Html::parse_fragment(body.as_str());
    let mut text = String::new();
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push(' '),
            _ => {}
        }
    }

    truncate_graphemes(&normalize_whitespace(&text), max_chars)
}
