use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::error::{NewsError, Result};
use crate::models::NewsItem;

type SharedRefresh = Shared<BoxFuture<'static, Result<Arc<Vec<NewsItem>>>>>;

#[derive(Clone)]
struct Snapshot {
    items: Arc<Vec<NewsItem>>,
    fetched_at: Instant,
    fetched_at_utc: DateTime<Utc>,
}

/// Last aggregation result plus the refresh state machine around it.
///
/// The snapshot is only replaced by a completed, successful aggregation, and
/// at most one aggregation runs at a time: callers that find the cache stale
/// while a refresh is running wait on that refresh instead of starting one.
pub struct NewsCache {
    aggregator: Arc<Aggregator>,
    threshold: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl NewsCache {
    pub fn new(aggregator: Aggregator, threshold: Duration) -> Arc<Self> {
        Arc::new(Self {
            aggregator: Arc::new(aggregator),
            threshold,
            snapshot: RwLock::new(None),
            in_flight: Mutex::new(None),
        })
    }

    /// Current items, refreshing first if the cache is stale.
    pub async fn get_current_news(self: &Arc<Self>) -> Result<Arc<Vec<NewsItem>>> {
        if let Some(items) = self.fresh_items() {
            return Ok(items);
        }

        let refresh = {
            let mut in_flight = lock(&self.in_flight);
            // A refresh may have landed between the check above and the lock.
            if let Some(items) = self.fresh_items() {
                return Ok(items);
            }
            match in_flight.as_ref() {
                Some(refresh) => {
                    debug!("Joining refresh already in progress");
                    refresh.clone()
                }
                None => {
                    let refresh = self.start_refresh();
                    *in_flight = Some(refresh.clone());
                    refresh
                }
            }
        };

        refresh.await
    }

    /// Replace the snapshot directly, stamped with the current time.
    pub fn prime(&self, items: Vec<NewsItem>) {
        self.store(Arc::new(items));
    }

    /// Last good snapshot regardless of age.
    pub fn stale_items(&self) -> Option<Arc<Vec<NewsItem>>> {
        self.read_snapshot().map(|s| s.items)
    }

    pub fn last_fetched(&self) -> Option<DateTime<Utc>> {
        self.read_snapshot().map(|s| s.fetched_at_utc)
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh_items().is_some()
    }

    fn fresh_items(&self) -> Option<Arc<Vec<NewsItem>>> {
        self.read_snapshot()
            .filter(|s| within_threshold(s.fetched_at.elapsed(), self.threshold))
            .map(|s| s.items)
    }

    fn read_snapshot(&self) -> Option<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, items: Arc<Vec<NewsItem>>) {
        let snapshot = Snapshot {
            items,
            fetched_at: Instant::now(),
            fetched_at_utc: Utc::now(),
        };
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    /// Spawn the aggregation so a caller going away cannot cancel a refresh
    /// other callers are waiting on.
    fn start_refresh(self: &Arc<Self>) -> SharedRefresh {
        info!("News cache is stale, starting refresh");

        let cache = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = cache.aggregator.aggregate_all().await.map(Arc::new);

            let mut in_flight = lock(&cache.in_flight);
            match &result {
                Ok(items) => {
                    info!("News cache refreshed with {} items", items.len());
                    cache.store(Arc::clone(items));
                }
                Err(e) => warn!("News cache refresh failed: {}", e),
            }
            *in_flight = None;
            drop(in_flight);

            result
        });

        let cache = Arc::clone(self);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    *lock(&cache.in_flight) = None;
                    Err(NewsError::RefreshAborted(e.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// A snapshot exactly `threshold` old is still fresh; a zero threshold
/// disables caching.
fn within_threshold(elapsed: Duration, threshold: Duration) -> bool {
    !threshold.is_zero() && elapsed <= threshold
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
