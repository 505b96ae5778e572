use std::time::Duration;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::classifier::Classifier;
use crate::config::{Config, FeedSource};
use crate::error::{NewsError, Result};
use crate::fetcher::{FetchedFeed, Fetcher};
use crate::models::NewsItem;

/// Fetches every configured feed concurrently and merges the non-political
/// entries into one collection.
pub struct Aggregator {
    fetcher: Fetcher,
    sources: Vec<FeedSource>,
    classifier: Classifier,
    fetch_budget: Duration,
}

impl Aggregator {
    pub fn new(
        fetcher: Fetcher,
        sources: Vec<FeedSource>,
        classifier: Classifier,
        fetch_budget: Duration,
    ) -> Self {
        Self {
            fetcher,
            sources,
            classifier,
            fetch_budget,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fetcher = Fetcher::new(config.fetch_budget())?;
        Ok(Self::new(
            fetcher,
            config.feeds.clone(),
            Classifier::new(&config.political_terms),
            config.fetch_budget(),
        ))
    }

    pub async fn aggregate_all(&self) -> Result<Vec<NewsItem>> {
        info!("Aggregating {} feeds", self.sources.len());

        let fetches = self.sources.iter().map(|source| async move {
            let result = self.fetch_with_budget(&source.url).await;
            (source, result)
        });
        let results = join_all(fetches).await;

        let mut items = Vec::new();
        let mut failures = 0;

        for (source, result) in results {
            match result {
                Ok(feed) => {
                    let before = items.len();
                    self.accept_entries(source, feed, &mut items);
                    info!(
                        "Accepted {} items from '{}' ({})",
                        items.len() - before,
                        source.url,
                        source.category
                    );
                }
                Err(e) => {
                    failures += 1;
                    error!("Failed to fetch feed '{}': {}", source.url, e);
                }
            }
        }

        if !self.sources.is_empty() && failures == self.sources.len() {
            return Err(NewsError::AllFeedsFailed(failures));
        }

        if failures > 0 {
            warn!(
                "{} of {} feeds failed, serving partial aggregation",
                failures,
                self.sources.len()
            );
        }

        info!("Aggregation complete: {} items", items.len());
        Ok(items)
    }

    async fn fetch_with_budget(&self, url: &str) -> Result<FetchedFeed> {
        match tokio::time::timeout(self.fetch_budget, self.fetcher.fetch_feed(url)).await {
            Ok(result) => result,
            Err(_) => Err(NewsError::Timeout {
                url: url.to_string(),
                budget: self.fetch_budget,
            }),
        }
    }

    fn accept_entries(&self, source: &FeedSource, feed: FetchedFeed, items: &mut Vec<NewsItem>) {
        for entry in feed.entries {
            let item = NewsItem {
                title: entry.title,
                link: entry.link,
                pub_date: entry.pub_date,
                content: entry.content,
                source: feed.title.clone(),
                category: source.category.clone(),
            };

            if !self.classifier.is_political(&item) {
                items.push(item);
            }
        }
    }
}
