// Runs one crawl request end to end: validation, engine, extraction, report

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Serialize;
use serde_json::Value;
use sitecrawl_scanner::{parse_start_url, Crawler, CrawlerConfig, FetchedPage, PageHandler, PageResult, ProgressCallback};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use tracing::info;
use url::Url;

use crate::aggregate::Aggregate;
use crate::error::{Result, SessionError};
use crate::extract::{ExtractorRegistry, PageContext};
use crate::mode::Mode;

pub const DEFAULT_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 5;
pub const DEFAULT_MAX_PAGES: usize = 50;
pub const MAX_PAGES_LIMIT: usize = 500;

/// What to crawl and which modes to extract.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub url: String,
    pub modes: Vec<Mode>,
    pub depth: u32,
    pub max_pages: usize,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>, modes: Vec<Mode>) -> Self {
        Self {
            url: url.into(),
            modes,
            depth: DEFAULT_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Check the request and return the parsed start URL.
    pub fn validate(&self) -> Result<Url> {
        if self.url.trim().is_empty() {
            return Err(SessionError::MissingUrl);
        }
        let start = parse_start_url(&self.url).ok_or_else(|| SessionError::InvalidUrl(self.url.clone()))?;

        if self.modes.is_empty() {
            return Err(SessionError::NoModes);
        }
        if self.depth > MAX_DEPTH {
            return Err(SessionError::OutOfRange {
                field: "depth",
                min: 0,
                max: MAX_DEPTH as i64,
                value: self.depth as f64,
            });
        }
        if self.max_pages == 0 || self.max_pages > MAX_PAGES_LIMIT {
            return Err(SessionError::OutOfRange {
                field: "max_pages",
                min: 1,
                max: MAX_PAGES_LIMIT as i64,
                value: self.max_pages as f64,
            });
        }

        Ok(start)
    }
}

/// Everything a finished crawl produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub url: String,
    pub modes: Vec<Mode>,
    pub depth: u32,
    pub max_pages: usize,
    pub pages_crawled: usize,
    pub pages_failed: usize,
    pub pages_skipped: usize,
    /// Per-mode payloads, serialized as top-level keys named after the mode.
    #[serde(flatten)]
    pub results: BTreeMap<String, Value>,
    pub pages: Vec<PageResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn mode_result(&self, mode: Mode) -> Option<&Value> {
        self.results.get(mode.as_str())
    }

    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Bridges the crawl engine to the extractors and the shared aggregate.
struct ExtractionHandler {
    registry: ExtractorRegistry,
    aggregate: Mutex<Aggregate>,
}

impl PageHandler for ExtractionHandler {
    fn on_page(&self, page: &FetchedPage, document: &Html) {
        let context = PageContext::from_page(page);
        let fragments = self.registry.run(&context, document);

        self.aggregate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add_page(fragments);
    }
}

/// Validate `request`, crawl it with `config` and build the report.
pub async fn execute_crawl(
    config: &CrawlerConfig,
    request: &CrawlRequest,
    progress: Option<ProgressCallback>,
) -> Result<CrawlReport> {
    let registry = ExtractorRegistry::for_modes(&request.modes)?;
    execute_with_registry(config, request, registry, progress).await
}

/// Like [`execute_crawl`] but with a caller-supplied extractor registry.
pub async fn execute_with_registry(
    config: &CrawlerConfig,
    request: &CrawlRequest,
    registry: ExtractorRegistry,
    progress: Option<ProgressCallback>,
) -> Result<CrawlReport> {
    let start = request.validate()?;
    let started_at = Utc::now();

    info!(
        "Crawling {} for modes [{}]",
        start,
        request
            .modes
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut crawler = Crawler::new(config.clone())?;
    if let Some(callback) = progress {
        crawler = crawler.with_progress_callback(callback);
    }

    let handler = ExtractionHandler {
        registry,
        aggregate: Mutex::new(Aggregate::new(&request.modes)),
    };

    let pages = crawler
        .crawl(&start, request.depth, request.max_pages, &handler)
        .await?;

    let aggregate = handler
        .aggregate
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);

    let report = CrawlReport {
        url: request.url.clone(),
        modes: request.modes.clone(),
        depth: request.depth,
        max_pages: request.max_pages,
        pages_crawled: pages.iter().filter(|p| p.is_fetched()).count(),
        pages_failed: pages.iter().filter(|p| p.is_failed()).count(),
        pages_skipped: pages.iter().filter(|p| p.is_skipped()).count(),
        results: aggregate.finalize(),
        pages,
        started_at,
        finished_at: Utc::now(),
    };

    info!(
        "Finished {} in {:.2}s: {} pages crawled, {} failed",
        report.url,
        report.duration_secs(),
        report.pages_crawled,
        report.pages_failed
    );

    Ok(report)
}
