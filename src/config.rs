use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Refresh interval in minutes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Per-feed fetch budget in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
    /// Serve the last good snapshot when a refresh fails
    #[serde(default)]
    pub serve_stale_on_error: bool,
    #[serde(default = "default_political_terms")]
    pub political_terms: Vec<String>,
    pub feeds: Vec<FeedSource>,
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    20
}

pub fn default_political_terms() -> Vec<String> {
    [
        "democrat",
        "republican",
        "congress",
        "senate",
        "president",
        "election",
        "vote",
        "political",
        "policy",
        "government",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub category: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(category: &str, url: &str) -> Self {
        Self {
            category: category.to_string(),
            url: url.to_string(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config.normalized())
    }

    /// Load `path` if it exists, otherwise fall back to the built-in registry.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn normalized(mut self) -> Self {
        self.political_terms = self
            .political_terms
            .into_iter()
            .map(|term| term.to_lowercase())
            .filter(|term| !term.trim().is_empty())
            .collect();
        self
    }

    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.saturating_mul(60))
    }

    pub fn fetch_budget(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    /// Feeds grouped by category, in configuration order within a category.
    pub fn categories(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for feed in &self.feeds {
            grouped
                .entry(feed.category.as_str())
                .or_default()
                .push(feed.url.as_str());
        }
        grouped
    }
}

impl Default for Config {
    fn default() -> Self {
        let feeds = vec![
            FeedSource::new("tech", "https://feeds.feedburner.com/TechCrunch"),
            FeedSource::new("tech", "https://www.theverge.com/rss/index.xml"),
            FeedSource::new("hardware", "https://www.anandtech.com/rss/"),
            FeedSource::new("hardware", "https://www.tomshardware.com/feeds/all"),
            FeedSource::new("design", "https://www.smashingmagazine.com/feed/"),
            FeedSource::new("design", "https://alistapart.com/main/feed/"),
            FeedSource::new("science", "https://www.sciencedaily.com/rss/all.xml"),
            FeedSource::new("science", "http://feeds.nature.com/nature/rss/current"),
        ];

        Self {
            refresh_interval: default_refresh_interval(),
            fetch_timeout: default_fetch_timeout(),
            serve_stale_on_error: false,
            political_terms: default_political_terms(),
            feeds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        assert_eq!(default_refresh_interval(), 30);
        assert_eq!(default_fetch_timeout(), 20);
        assert_eq!(default_political_terms().len(), 10);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            refresh_interval = 10
            fetch_timeout = 5

            [[feeds]]
            category = "tech"
            url = "https://example.com/feed.xml"

            [[feeds]]
            category = "science"
            url = "https://example.org/rss"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.refresh_interval, 10);
        assert_eq!(config.fetch_timeout, 5);
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[0].category, "tech");
        assert_eq!(config.feeds[0].url, "https://example.com/feed.xml");
        assert_eq!(config.feeds[1].category, "science");
        assert!(!config.serve_stale_on_error);
    }

    #[test]
    fn test_load_config_with_defaults() {
        let content = r#"
            [[feeds]]
            category = "tech"
            url = "https://example.com/feed.xml"
        "#;

        let config = Config::from_str(content).unwrap();

        assert_eq!(config.refresh_interval, 30);
        assert_eq!(config.refresh_threshold(), Duration::from_secs(30 * 60));
        assert_eq!(config.fetch_budget(), Duration::from_secs(20));
        assert_eq!(config.political_terms, default_political_terms());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.feeds.len(), 8);
        assert_eq!(config.categories().len(), 4);
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let content = "this is not valid toml {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_category() {
        let content = r#"
            [[feeds]]
            url = "https://example.com/feed.xml"
        "#;

        let result = Config::from_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_political_terms_are_lowercased() {
        let content = r#"
            political_terms = ["Senate", "  ", "", "TAX"]
            feeds = []
        "#;

        let config = Config::from_str(content).unwrap();
        assert_eq!(config.political_terms, vec!["senate", "tax"]);
    }

    #[test]
    fn test_huge_refresh_interval_saturates() {
        let content = r#"
            refresh_interval = 9223372036854775807
            feeds = []
        "#;

        let config = Config::from_str(content).unwrap();
        assert_eq!(config.refresh_interval, i64::MAX as u64);
        assert_eq!(config.refresh_threshold(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_categories_grouping_keeps_order() {
        let content = r#"
            [[feeds]]
            category = "design"
            url = "https://a.example.com/feed"

            [[feeds]]
            category = "tech"
            url = "https://b.example.com/feed"

            [[feeds]]
            category = "design"
            url = "https://c.example.com/feed"
        "#;

        let config = Config::from_str(content).unwrap();
        let grouped = config.categories();

        assert_eq!(grouped.len(), 2);
        assert_eq!(
            grouped["design"],
            vec!["https://a.example.com/feed", "https://c.example.com/feed"]
        );
        assert_eq!(grouped["tech"], vec!["https://b.example.com/feed"]);
    }

    #[test]
    fn test_empty_feeds_list() {
        let config = Config::from_str("feeds = []").unwrap();
        assert!(config.feeds.is_empty());
    }
}
