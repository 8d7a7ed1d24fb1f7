use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

use crate::config::CrawlerConfig;
use crate::error::{Result, ScanError};

/// A successful (2xx) response with its body read.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested.
    pub url: Url,
    /// URL after redirects.
    pub final_url: Url,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
    pub elapsed: Duration,
    pub attempts: u32,
}

impl FetchedPage {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Pages without a content type are given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        self.content_type()
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("xhtml")
            })
            .unwrap_or(true)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A fetch that did not produce a page, with the number of attempts spent.
#[derive(Debug)]
pub struct FetchFailure {
    pub error: ScanError,
    pub attempts: u32,
}

/// HTTP client wrapper applying the retry/backoff policy for 429 responses.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_retries: u32,
    backoff_base: Duration,
    max_backoff: Duration,
}

impl Fetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.timeout / 2)
            .pool_max_idle_per_host(config.max_concurrent)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout,
            max_retries: config.max_retries,
            backoff_base: config.backoff_base,
            max_backoff: config.max_backoff,
        })
    }

    /// Fetch `url`, retrying 429 responses with exponential backoff.
    ///
    /// Non-2xx statuses other than 429, timeouts and connection errors fail
    /// immediately.
    pub async fn fetch(&self, url: &Url) -> std::result::Result<FetchedPage, FetchFailure> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!("Fetching {} (attempt {})", url, attempt);

            let start = Instant::now();
            let response = match self.client.get(url.as_str()).send().await {
                Ok(response) => response,
                Err(e) => {
                    return Err(FetchFailure {
                        error: self.classify(e),
                        attempts: attempt,
                    });
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt > self.max_retries {
                    warn!("Giving up on {} after {} rate-limited attempts", url, attempt);
                    return Err(FetchFailure {
                        error: ScanError::RateLimited {
                            url: url.to_string(),
                            attempts: attempt,
                        },
                        attempts: attempt,
                    });
                }

                let wait = self.backoff_delay(attempt, response.headers());
                warn!(
                    "Rate limited by {} (attempt {}), backing off for {:?}",
                    url, attempt, wait
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                return Err(FetchFailure {
                    error: ScanError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    },
                    attempts: attempt,
                });
            }

            let final_url = response.url().clone();
            let headers = response.headers().clone();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    return Err(FetchFailure {
                        error: self.classify(e),
                        attempts: attempt,
                    });
                }
            };

            return Ok(FetchedPage {
                url: url.clone(),
                final_url,
                status: status.as_u16(),
                headers,
                body,
                elapsed: start.elapsed(),
                attempts: attempt,
            });
        }
    }

    /// Single-attempt GET returning the body of a 2xx response.
    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.classify(e))
    }

    /// `Retry-After` (in seconds) wins over the exponential schedule.
    fn backoff_delay(&self, attempt: u32, headers: &HeaderMap) -> Duration {
        let advertised = headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let delay = advertised.unwrap_or_else(|| {
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
            self.backoff_base.saturating_mul(factor)
        });

        delay.min(self.max_backoff)
    }

    fn classify(&self, error: reqwest::Error) -> ScanError {
        if error.is_timeout() {
            ScanError::Timeout(self.timeout.as_secs())
        } else {
            ScanError::HttpError(error)
        }
    }
}
