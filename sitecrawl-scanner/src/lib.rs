pub mod config;
pub mod crawler;
pub mod error;
pub mod fetch;
pub mod frontier;
pub mod politeness;
pub mod result;
pub mod robots;

pub use config::CrawlerConfig;
pub use crawler::{Crawler, NoopHandler, PageHandler, ProgressCallback};
pub use error::ScanError;
pub use fetch::{FetchedPage, Fetcher};
pub use frontier::parse_start_url;
pub use result::{PageOutcome, PageResult};
