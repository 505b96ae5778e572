use serde::{Deserialize, Serialize};

/// A single accepted story, tagged with the feed and category it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    pub content: Option<String>,
    pub source: String,
    pub category: String,
}
