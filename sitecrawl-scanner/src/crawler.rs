use crate::config::CrawlerConfig;
use crate::error::{Result, ScanError};
use crate::fetch::{FetchFailure, FetchedPage, Fetcher};
use crate::frontier::{is_same_site, normalize_url, Frontier, FrontierEntry};
use crate::politeness::{effective_delay, HostThrottle};
use crate::result::PageResult;
use crate::robots::RobotsCache;
use futures::future::join_all;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(&PageResult) + Send + Sync>;

/// Receives every successfully fetched HTML page together with its parsed document.
///
/// Called synchronously between network batches, so implementations should
/// not block for long.
pub trait PageHandler: Send + Sync {
    fn on_page(&self, page: &FetchedPage, document: &Html);
}

/// Handler that ignores every page, for crawls that only need status records.
pub struct NoopHandler;

impl PageHandler for NoopHandler {
    fn on_page(&self, _page: &FetchedPage, _document: &Html) {}
}

/// Per-crawl state: robots rules and host throttles start fresh each run.
struct CrawlState {
    robots: Option<RobotsCache>,
    throttle: HostThrottle,
}

pub struct Crawler {
    config: CrawlerConfig,
    fetcher: Fetcher,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config)?;

        Ok(Self {
            config,
            fetcher,
            progress_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Breadth-first crawl of the site behind `start`.
    ///
    /// At most `max_pages` distinct URLs are requested and nothing deeper than
    /// `max_depth` is enqueued. Results come back in frontier order.
    pub async fn crawl<H>(
        &self,
        start: &Url,
        max_depth: u32,
        max_pages: usize,
        handler: &H,
    ) -> Result<Vec<PageResult>>
    where
        H: PageHandler + ?Sized,
    {
        if !matches!(start.scheme(), "http" | "https") || start.host_str().is_none() {
            return Err(ScanError::InvalidUrl(start.to_string()));
        }

        info!(
            "Starting crawl of {} (depth {}, max {} pages, {} concurrent)",
            start, max_depth, max_pages, self.config.max_concurrent
        );

        let state = CrawlState {
            robots: self
                .config
                .respect_robots_txt
                .then(|| RobotsCache::new(self.fetcher.clone(), self.config.user_agent.clone())),
            throttle: HostThrottle::new(),
        };

        let mut start = start.clone();
        start.set_fragment(None);

        let mut frontier = Frontier::new();
        frontier.enqueue(start.clone(), 0).await;

        let mut results = Vec::new();
        let mut dispatched = 0usize;

        while dispatched < max_pages && !frontier.is_empty() {
            let capacity = self.config.max_concurrent.min(max_pages - dispatched);
            let mut batch: Vec<FrontierEntry> = Vec::with_capacity(capacity);

            while batch.len() < capacity {
                let Some(entry) = frontier.pop() else {
                    break;
                };

                if let Some(robots) = &state.robots
                    && !robots.rules_for(&entry.url).await.is_allowed(&entry.url)
                {
                    debug!("Skipping {} (disallowed by robots.txt)", entry.url);
                    let result = PageResult::skipped(
                        entry.url.to_string(),
                        entry.depth,
                        "disallowed by robots.txt",
                    );
                    self.report(&result);
                    results.push(result);
                    continue;
                }

                batch.push(entry);
            }

            if batch.is_empty() {
                break;
            }
            dispatched += batch.len();

            let outcomes = join_all(batch.iter().map(|entry| self.fetch_entry(&state, entry))).await;

            for (entry, outcome) in batch.into_iter().zip(outcomes) {
                let result = match outcome {
                    Ok(page) => {
                        if entry.depth == 0 && page.final_url != page.url {
                            info!("Start URL redirected to {}", page.final_url);
                            start = page.final_url.clone();
                            start.set_fragment(None);
                        }

                        if let Some(reason) = redirect_skip_reason(&frontier, &page, &start).await {
                            debug!("Skipping {} ({} {})", entry.url, reason, page.final_url);
                            let mut result = PageResult::skipped(entry.url.to_string(), entry.depth, reason);
                            result.status_code = Some(page.status);
                            result.attempts = page.attempts;
                            self.report(&result);
                            results.push(result);
                            continue;
                        }

                        let (result, links) = process_page(&page, entry.depth, &start, handler);

                        if entry.depth < max_depth {
                            for link in links {
                                if frontier.enqueue(link.clone(), entry.depth + 1).await {
                                    debug!("Queued {} at depth {}", link, entry.depth + 1);
                                }
                            }
                        }
                        result
                    }
                    Err(FetchFailure { error, attempts }) => {
                        warn!("Failed to fetch {}: {}", entry.url, error);
                        PageResult::with_error(entry.url.to_string(), entry.depth, &error, attempts)
                    }
                };

                self.report(&result);
                results.push(result);
            }
        }

        let fetched = results.iter().filter(|r| r.is_fetched()).count();
        info!(
            "Crawl complete: {} fetched, {} failed, {} skipped",
            fetched,
            results.iter().filter(|r| r.is_failed()).count(),
            results.iter().filter(|r| r.is_skipped()).count()
        );

        Ok(results)
    }

    async fn fetch_entry(
        &self,
        state: &CrawlState,
        entry: &FrontierEntry,
    ) -> std::result::Result<FetchedPage, FetchFailure> {
        let advertised = match &state.robots {
            Some(robots) => robots.rules_for(&entry.url).await.crawl_delay(),
            None => None,
        };
        let delay = effective_delay(self.config.crawl_delay, advertised, self.config.max_crawl_delay);

        state.throttle.wait(&entry.url, delay).await;
        self.fetcher.fetch(&entry.url).await
    }

    fn report(&self, result: &PageResult) {
        if let Some(ref callback) = self.progress_callback {
            callback(result);
        }
    }
}

/// Why a redirected page must not be processed, if it must not.
///
/// The redirect target is claimed in the visited set so it is never fetched
/// again through a later link.
async fn redirect_skip_reason(frontier: &Frontier, page: &FetchedPage, start: &Url) -> Option<&'static str> {
    if page.final_url == page.url {
        return None;
    }
    if !is_same_site(&page.final_url, start) {
        return Some("redirected off-site to");
    }
    if !frontier.mark_visited(&page.final_url).await {
        return Some("redirected to already-visited URL");
    }
    None
}

/// Parse a fetched page, hand it to `handler` and collect its same-site links.
///
/// Kept synchronous: the parsed document never lives across an await point.
fn process_page<H>(page: &FetchedPage, depth: u32, start: &Url, handler: &H) -> (PageResult, Vec<Url>)
where
    H: PageHandler + ?Sized,
{
    let mut result = PageResult::new(page.url.to_string(), depth);
    result.status_code = Some(page.status);
    result.content_type = page.content_type().map(|s| s.to_string());
    result.content_length = Some(page.body.len() as u64);
    result.response_time_ms = page.elapsed.as_millis() as u64;
    result.attempts = page.attempts;

    if !page.is_html() {
        debug!("Not extracting {} (content type {:?})", page.url, result.content_type);
        return (result, Vec::new());
    }

    let document = Html::parse_document(&page.body);
    handler.on_page(page, &document);

    let links = match extract_links(&document, &page.final_url, start) {
        Ok(links) => links,
        Err(e) => {
            warn!("Could not extract links from {}: {}", page.url, e);
            Vec::new()
        }
    };
    result.links_found = links.len();

    (result, links)
}

/// Same-site `<a href>` targets in document order, without duplicates.
pub fn extract_links(document: &Html, base: &Url, start: &Url) -> Result<Vec<Url>> {
    let selector = Selector::parse("a[href]").map_err(|e| ScanError::ParseError(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = normalize_url(base, href) else {
            continue;
        };
        if !is_same_site(&url, start) {
            debug!("Ignoring off-site link {}", url);
            continue;
        }
        if seen.insert(url.as_str().to_string()) {
            links.push(url);
        }
    }

    Ok(links)
}
