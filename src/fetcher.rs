use std::time::Duration;

use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::{NewsError, Result};

// Wide enough that html2text never wraps inside a word
const EXCERPT_WIDTH: usize = 10_000;

const DATE_TAGS: [&str; 4] = ["pubDate", "published", "updated", "dc:date"];

/// One parsed feed: its declared title and its entries in document order.
#[derive(Debug, Clone, Default)]
pub struct FetchedFeed {
    pub title: String,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    pub content: Option<String>,
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("CalmNews/1.0 (RSS Aggregator)")
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<FetchedFeed> {
        info!("Fetching feed: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NewsError::Http {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| NewsError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let feed = Self::parse_feed(&bytes).map_err(|message| NewsError::FeedParse {
            url: url.to_string(),
            message,
        })?;

        debug!("Parsed {} entries from '{}'", feed.entries.len(), feed.title);
        Ok(feed)
    }

    /// Parse raw RSS/Atom bytes into a [`FetchedFeed`].
    pub fn parse_feed(bytes: &[u8]) -> std::result::Result<FetchedFeed, String> {
        let parsed = parser::parse(bytes).map_err(|e| e.to_string())?;

        let title = parsed
            .title
            .map(|t| t.content)
            .unwrap_or_default();

        // feed_rs normalizes dates and drops ones it cannot parse, so keep the
        // source text when it lines up entry-for-entry
        let mut raw_dates = Self::extract_dates_from_xml(bytes);
        if raw_dates.len() != parsed.entries.len() {
            raw_dates = vec![None; parsed.entries.len()];
        }

        let entries = parsed
            .entries
            .into_iter()
            .zip(raw_dates)
            .map(|(entry, raw_date)| Self::map_entry(entry, raw_date))
            .collect();

        Ok(FetchedFeed { title, entries })
    }

    fn map_entry(entry: Entry, raw_date: Option<String>) -> FeedEntry {
        let title = entry.title.map(|t| t.content);

        let link = entry.links.first().map(|l| l.href.clone());

        let pub_date = raw_date.or_else(|| {
            entry
                .published
                .or(entry.updated)
                .map(|dt| dt.to_rfc3339())
        });

        // Full body: content:encoded / atom content, else description / summary
        let body = entry
            .content
            .and_then(|c| c.body)
            .or_else(|| entry.summary.map(|s| s.content));

        let content = body.map(|body| {
            let excerpt = Self::excerpt(&body);
            if excerpt.is_empty() {
                body
            } else {
                excerpt
            }
        });

        FeedEntry {
            title,
            link,
            pub_date,
            content,
        }
    }

    /// Plain-text excerpt of an HTML fragment with whitespace collapsed.
    pub fn excerpt(html: &str) -> String {
        let text = html2text::from_read(html.as_bytes(), EXCERPT_WIDTH)
            .unwrap_or_else(|_| html.to_string());

        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Raw date text of every `<item>`/`<entry>` in document order.
    pub fn extract_dates_from_xml(xml_bytes: &[u8]) -> Vec<Option<String>> {
        let xml_str = match std::str::from_utf8(xml_bytes) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        let mut blocks = Self::extract_blocks(xml_str, "item");
        if blocks.is_empty() {
            blocks = Self::extract_blocks(xml_str, "entry");
        }

        blocks
            .into_iter()
            .map(|block| {
                DATE_TAGS
                    .iter()
                    .filter_map(|tag| Self::extract_xml_element(block, tag))
                    .find(|date| !date.is_empty())
            })
            .collect()
    }

    fn extract_blocks<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
        let start_tag = format!("<{}", tag);
        let end_tag = format!("</{}>", tag);
        let mut blocks = Vec::new();
        let mut rest = xml;

        while let Some(pos) = rest.find(&start_tag) {
            let after = &rest[pos + start_tag.len()..];
            // Skip longer names sharing the prefix, e.g. <itemCount>
            if !after.starts_with(|c: char| c == '>' || c == '/' || c.is_whitespace()) {
                rest = after;
                continue;
            }
            let end = after.find(&end_tag).unwrap_or(after.len());
            blocks.push(&after[..end]);
            rest = &after[end..];
        }

        blocks
    }

    pub fn extract_xml_element(xml: &str, tag: &str) -> Option<String> {
        let start_tag = format!("<{}>", tag);
        let end_tag = format!("</{}>", tag);

        let start = xml.find(&start_tag)? + start_tag.len();
        let end = xml[start..].find(&end_tag)? + start;

        let text = xml[start..end].trim();
        let text = text
            .strip_prefix("<![CDATA[")
            .and_then(|t| t.strip_suffix("]]>"))
            .unwrap_or(text);

        Some(text.trim().to_string())
    }
}
