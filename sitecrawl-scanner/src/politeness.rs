use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::robots::host_key;

type HostLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Spaces out requests to each host by at least its crawl delay.
///
/// Hosts are keyed by `host:port`; the delay is fixed the first time a host
/// is seen.
#[derive(Default)]
pub struct HostThrottle {
    limiters: RwLock<HashMap<String, Option<Arc<HostLimiter>>>>,
}

impl std::fmt::Debug for HostThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostThrottle").finish_non_exhaustive()
    }
}

impl HostThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until a request to `url` is allowed. A zero delay never waits.
    pub async fn wait(&self, url: &Url, delay: Duration) {
        let key = host_key(url);

        let cached = self.limiters.read().await.get(&key).cloned();
        let limiter = match cached {
            Some(existing) => existing,
            None => {
                let mut limiters = self.limiters.write().await;
                limiters
                    .entry(key.clone())
                    .or_insert_with(|| Self::limiter_for(delay))
                    .clone()
            }
        };

        if let Some(limiter) = limiter {
            debug!("Waiting for politeness slot on {}", key);
            limiter.until_ready().await;
        }
    }

    pub async fn hosts_tracked(&self) -> usize {
        self.limiters.read().await.len()
    }

    fn limiter_for(delay: Duration) -> Option<Arc<HostLimiter>> {
        let quota = Quota::with_period(delay)?.allow_burst(NonZeroU32::MIN);
        Some(Arc::new(RateLimiter::direct(quota)))
    }
}

/// Effective per-host delay: the configured floor, raised by robots.txt up to a cap.
pub fn effective_delay(configured: Duration, advertised: Option<Duration>, cap: Duration) -> Duration {
    match advertised {
        Some(advertised) => configured.max(advertised.min(cap)),
        None => configured,
    }
}
