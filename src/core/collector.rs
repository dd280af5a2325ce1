use crate::domain::model::{Collection, Page};
use crate::domain::ports::PageSource;
use crate::utils::error::Result;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub page_size: usize,
    pub request_delay: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            page_size: 8,
            request_delay: Duration::from_millis(500),
            retry_attempts: 0,
            retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EmptyPage,
    NoNextPage,
    CountReached,
    /// The page at `offset` could not be fetched or decoded.
    Aborted { offset: usize, error: String },
}

impl StopReason {
    pub fn is_aborted(&self) -> bool {
        matches!(self, StopReason::Aborted { .. })
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyPage => f.write_str("server returned an empty page"),
            StopReason::NoNextPage => f.write_str("server reported no further page"),
            StopReason::CountReached => f.write_str("reported count reached"),
            StopReason::Aborted { offset, error } => {
                write!(f, "aborted at offset {}: {}", offset, error)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectOutcome {
    pub collection: Collection,
    pub stop: StopReason,
    pub pages_fetched: usize,
}

/// `base * 2^attempt`, saturating at `Duration::MAX`.
pub fn backoff(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt)).unwrap_or(Duration::MAX)
}

pub struct Collector<'a, S: PageSource + ?Sized> {
    source: &'a S,
    options: CollectOptions,
}

impl<'a, S: PageSource + ?Sized> Collector<'a, S> {
    pub fn new(source: &'a S, options: CollectOptions) -> Self {
        Self { source, options }
    }

    /// Walks the listing from offset 0 until the server runs dry, reports no
    /// next page, or the first reported `count` is reached.
    ///
    /// Never fails: a page that cannot be fetched ends the walk and whatever
    /// was gathered so far is returned with [`StopReason::Aborted`].
    pub async fn collect(&self) -> CollectOutcome {
        let page_size = self.options.page_size.max(1);
        let mut collection = Collection::default();
        let mut offset = 0;
        let mut pages_fetched = 0;

        let stop = loop {
            tracing::info!("Fetching offset {}...", offset);
            let page = match self.fetch_with_retry(offset, page_size).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("❌ Error fetching data at offset {}: {}", offset, e);
                    break StopReason::Aborted {
                        offset,
                        error: e.to_string(),
                    };
                }
            };
            pages_fetched += 1;

            let total = *collection.reported_count.get_or_insert_with(|| {
                tracing::info!("Total startups to fetch: {}", page.count);
                page.count
            });

            if page.results.is_empty() {
                tracing::info!("No more results found.");
                break StopReason::EmptyPage;
            }

            let received = page.results.len();
            let room = total.saturating_sub(collection.len());
            if received > room {
                tracing::warn!(
                    "Page at offset {} carries {} records but only {} fit the reported count; dropping the rest",
                    offset,
                    received,
                    room
                );
            }
            collection
                .startups
                .extend(page.results.into_iter().take(room));
            tracing::info!(
                "Got {} startups (Total collected: {}/{})",
                received,
                collection.len(),
                total
            );

            if collection.len() >= total {
                if let Some(next) = &page.next {
                    tracing::warn!(
                        "Reported count reached but server still links a next page ({}); ignoring it",
                        next
                    );
                }
                break StopReason::CountReached;
            }

            if page.next.is_none() {
                break StopReason::NoNextPage;
            }

            offset += page_size;

            if !self.options.request_delay.is_zero() {
                tokio::time::sleep(self.options.request_delay).await;
            }
        };

        tracing::info!(
            "Collection finished ({}): {} startups from {} pages",
            stop,
            collection.len(),
            pages_fetched
        );

        CollectOutcome {
            collection,
            stop,
            pages_fetched,
        }
    }

    async fn fetch_with_retry(&self, offset: usize, limit: usize) -> Result<Page> {
        let mut attempt = 0;
        loop {
            match self.source.fetch_page(offset, limit).await {
                Ok(page) => return Ok(page),
                Err(e) if attempt < self.options.retry_attempts => {
                    let wait = backoff(self.options.retry_delay, attempt);
                    attempt += 1;
                    tracing::warn!(
                        "Attempt {}/{} for offset {} failed: {}; retrying in {:?}",
                        attempt,
                        self.options.retry_attempts + 1,
                        offset,
                        e,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
