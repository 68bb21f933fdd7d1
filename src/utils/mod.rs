//! Utility functions and helpers.

pub mod http;
pub mod log;

use unicode_segmentation::UnicodeSegmentation;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match Url::parse(base_url) {
        Ok(base) => resolve_url(&base, href),
        Err(_) => href.to_string(),
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max` graphemes, appending `...` when shortened.
pub fn truncate_graphemes(text: &str, max: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

const SIZE_SUFFIXES: [&str; 9] = ["bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human-readable byte count, e.g. `1.5 MB`.
pub fn size_suffix(bytes: u64) -> String {
    if bytes == 0 {
        return "0.0 bytes".to_string();
    }
    let mag = ((bytes as f64).log2() / 10.0).floor() as usize;
    let mag = mag.min(SIZE_SUFFIXES.len() - 1);
    let mut value = bytes as f64 / (1u64 << (mag * 10)) as f64;
    let mut mag = mag;
    if value >= 999.95 && mag + 1 < SIZE_SUFFIXES.len() {
        mag += 1;
        value /= 1024.0;
    }
    format!("{:.1} {}", value, SIZE_SUFFIXES[mag])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html"),
            "https://example.com/path/page.html"
        );
        assert_eq!(
            resolve_url(&base, "/root.html"),
            "https://example.com/root.html"
        );
    }

    #[test]
    fn test_resolve_query_href() {
        assert_eq!(
            resolve("https://example.com", "?news/archive/12"),
            "https://example.com/?news/archive/12"
        );
        assert_eq!(
            resolve("https://example.com", "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_truncate_graphemes() {
        assert_eq!(truncate_graphemes("short", 10), "short");
        assert_eq!(truncate_graphemes("exactly", 7), "exactly");
        assert_eq!(truncate_graphemes("abcdef", 3), "abc...");
        assert_eq!(truncate_graphemes("⚔️⚔️⚔️", 2), "⚔️⚔️...");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
    }

    #[test]
    fn test_size_suffix() {
        assert_eq!(size_suffix(0), "0.0 bytes");
        assert_eq!(size_suffix(512), "512.0 bytes");
        assert_eq!(size_suffix(1536), "1.5 KB");
        assert_eq!(size_suffix(5 * 1024 * 1024), "5.0 MB");
    }
}
