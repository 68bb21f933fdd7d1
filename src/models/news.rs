//! News item data structure.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Excerpt used when an article page has no recognizable body.
pub const READ_MORE: &str = "Click to read the full article...";

const EMPTY_NEWS: &str = "No news available at the moment.";
const SEPARATOR_WIDTH: usize = 35;

/// A news entry from the server's news archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    /// Headline
    pub title: String,

    /// Publication date as printed by the site (`dd.mm.yyyy`)
    pub date: String,

    /// Plain-text excerpt of the article
    pub content: String,

    /// Article link as found in the archive (may be site-relative)
    pub url: String,

    /// Site icon code (`icon_<code>_small.gif`)
    pub icon_type: String,
}

/// Category derived from the archive icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsCategory {
    General,
    Announcement,
    Combat,
    Event,
    Technical,
    Other,
}

impl NewsCategory {
    pub fn from_icon(code: &str) -> Self {
        match code {
            "0" => NewsCategory::General,
            "1" => NewsCategory::Announcement,
            "2" => NewsCategory::Combat,
            "3" => NewsCategory::Event,
            "4" => NewsCategory::Technical,
            _ => NewsCategory::Other,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            NewsCategory::General => "🏆",
            NewsCategory::Announcement => "📢",
            NewsCategory::Combat => "⚔️",
            NewsCategory::Event => "🎉",
            NewsCategory::Technical => "🔧",
            NewsCategory::Other => "📰",
        }
    }
}

impl NewsItem {
    pub fn category(&self) -> NewsCategory {
        NewsCategory::from_icon(&self.icon_type)
    }

    /// Excerpt used when the article page itself could not be fetched.
    pub fn unreachable_excerpt(&self) -> String {
        format!("📰 {}\n📅 {}\n\n{}", self.title, self.date, READ_MORE)
    }

    fn render(&self, position: usize, highlighted: Option<bool>) -> String {
        let (prefix, link_text) = match highlighted {
            Some(true) => ("► ", "🔗 NEXT: Click to open this article"),
            Some(false) => ("  ", "🔗 Click to read full article"),
            None => ("", "🔗 Click to read full article"),
        };
        format!(
            "{prefix}[{position}] {} {}\n{}\n\n{}\n\n{link_text}",
            self.category().emoji(),
            self.title,
            self.date,
            self.content
        )
    }
}

/// Render all items as numbered entries separated by a rule.
pub fn format_for_display(items: &[NewsItem]) -> String {
    join_rendered(items.iter().enumerate().map(|(i, item)| item.render(i + 1, None)))
}

/// Like [`format_for_display`], marking the entry at `highlight` as next.
pub fn format_with_highlight(items: &[NewsItem], highlight: usize) -> String {
    join_rendered(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| item.render(i + 1, Some(i == highlight))),
    )
}

fn join_rendered(entries: impl Iterator<Item = String>) -> String {
    let entries: Vec<String> = entries.collect();
    if entries.is_empty() {
        return EMPTY_NEWS.to_string();
    }
    let separator = format!("\n\n{}\n\n", "═".repeat(SEPARATOR_WIDTH));
    entries.join(&separator)
}

/// Built-in news shown when the archive cannot be reached.
pub fn fallback_news(today: NaiveDate) -> Vec<NewsItem> {
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    vec![
        NewsItem {
            title: "Welcome to Baiak-Zika!".to_string(),
            date: today.format("%d.%m.%Y").to_string(),
            content: "🎮 New Features:\n• Enhanced Battle Royale system\n• 1 vs 1 duels with ranking\n• New PvP zones and events\n• Renovated guild system\n\n⚡ Recent Updates:\n• Improved class balance\n• New epic items and equipment\n• Performance optimization\n• Critical bug fixes".to_string(),
            url: String::new(),
            icon_type: "0".to_string(),
        },
        NewsItem {
            title: "Server Updates".to_string(),
            date: yesterday.format("%d.%m.%Y").to_string(),
            content: "📅 Upcoming Events:\n• Guild tournament this weekend\n• Double experience event\n• New epic quest available\n\n⚠️ Important:\nBaiak-Zika can be dangerous. Stay alert!".to_string(),
            url: String::new(),
            icon_type: "3".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, icon: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            date: "01.02.2026".to_string(),
            content: "Body".to_string(),
            url: "?news/1".to_string(),
            icon_type: icon.to_string(),
        }
    }

    #[test]
    fn test_category_from_icon() {
        assert_eq!(sample("a", "2").category(), NewsCategory::Combat);
        assert_eq!(sample("a", "9").category().emoji(), "📰");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_for_display(&[]), "No news available at the moment.");
        assert_eq!(format_with_highlight(&[], 0), "No news available at the moment.");
    }

    #[test]
    fn test_format_numbers_and_separates() {
        let text = format_for_display(&[sample("First", "0"), sample("Second", "3")]);
        assert!(text.starts_with("[1] 🏆 First\n01.02.2026\n\nBody"));
        assert!(text.contains(&"═".repeat(35)));
        assert!(text.contains("[2] 🎉 Second"));
    }

    #[test]
    fn test_format_highlight_marks_one_entry() {
        let text = format_with_highlight(&[sample("First", "0"), sample("Second", "1")], 1);
        assert!(text.starts_with("  [1]"));
        assert!(text.contains("► [2] 📢 Second"));
        assert_eq!(text.matches("NEXT").count(), 1);
    }

    #[test]
    fn test_fallback_news_dates() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let news = fallback_news(today);
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].date, "01.03.2026");
        assert_eq!(news[1].date, "28.02.2026");
    }
}
