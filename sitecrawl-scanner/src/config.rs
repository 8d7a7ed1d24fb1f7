use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::error::{Result, ScanError};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; SiteCrawler/0.1; +https://github.com/sitecrawl/sitecrawl)";

pub const ENV_MAX_CONCURRENT: &str = "SITECRAWL_MAX_CONCURRENT";
pub const ENV_REQUEST_TIMEOUT: &str = "SITECRAWL_REQUEST_TIMEOUT";
pub const ENV_USER_AGENT: &str = "SITECRAWL_USER_AGENT";
pub const ENV_CRAWL_DELAY_MS: &str = "SITECRAWL_CRAWL_DELAY_MS";
pub const ENV_MAX_RETRIES: &str = "SITECRAWL_MAX_RETRIES";
pub const ENV_RESPECT_ROBOTS: &str = "SITECRAWL_RESPECT_ROBOTS";

/// Engine settings shared by every crawl started from this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Upper bound on fetches in flight at once.
    pub max_concurrent: usize,
    pub timeout: Duration,
    pub user_agent: String,
    /// Minimum spacing between two requests to the same host.
    pub crawl_delay: Duration,
    /// Ceiling applied to a `Crawl-delay` advertised in robots.txt.
    pub max_crawl_delay: Duration,
    /// Retries after a 429 response before the page is recorded as failed.
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub max_backoff: Duration,
    pub respect_robots_txt: bool,
    pub max_redirects: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            crawl_delay: Duration::from_secs(1),
            max_crawl_delay: Duration::from_secs(10),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            respect_robots_txt: true,
            max_redirects: 5,
        }
    }
}

impl CrawlerConfig {
    /// Defaults overridden by `SITECRAWL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CrawlerConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = parse_var::<usize>(&lookup, ENV_MAX_CONCURRENT) {
            config.max_concurrent = value;
        }

        if let Some(secs) = parse_var::<u64>(&lookup, ENV_REQUEST_TIMEOUT) {
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(agent) = lookup(ENV_USER_AGENT) {
            let agent = agent.trim();
            if !agent.is_empty() {
                config.user_agent = agent.to_string();
            }
        }

        if let Some(ms) = parse_var::<u64>(&lookup, ENV_CRAWL_DELAY_MS) {
            config.crawl_delay = Duration::from_millis(ms);
        }

        if let Some(retries) = parse_var::<u32>(&lookup, ENV_MAX_RETRIES) {
            config.max_retries = retries;
        }

        if let Some(raw) = lookup(ENV_RESPECT_ROBOTS) {
            match raw.trim().to_lowercase().as_str() {
                "0" | "false" | "no" | "off" => config.respect_robots_txt = false,
                "1" | "true" | "yes" | "on" => config.respect_robots_txt = true,
                other => warn!("Ignoring {}={:?}: expected a boolean", ENV_RESPECT_ROBOTS, other),
            }
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(ScanError::Config(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ScanError::Config("timeout must be non-zero".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ScanError::Config("user agent must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_crawl_delay(mut self, delay: Duration) -> Self {
        self.crawl_delay = delay;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff_base: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff_base = backoff_base;
        self
    }

    pub fn with_robots(mut self, respect: bool) -> Self {
        self.respect_robots_txt = respect;
        self
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}
