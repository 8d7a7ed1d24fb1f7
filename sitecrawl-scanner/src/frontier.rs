use std::collections::{HashSet, VecDeque};
use tokio::sync::Mutex;
use url::Url;

/// A URL waiting to be fetched and the depth it was discovered at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// FIFO queue of pending URLs plus the set of every URL ever enqueued.
#[derive(Debug, Default)]
pub struct Frontier {
    visited: Mutex<HashSet<String>>,
    queue: VecDeque<FrontierEntry>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url` as seen. Returns false if it already was.
    pub async fn mark_visited(&self, url: &Url) -> bool {
        let mut visited = self.visited.lock().await;
        visited.insert(url.as_str().to_string())
    }

    /// Queue `url` unless it has been seen before.
    pub async fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        if !self.mark_visited(&url).await {
            return false;
        }
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub async fn visited_count(&self) -> usize {
        self.visited.lock().await.len()
    }
}

/// Resolve `href` against `base` into a crawlable URL.
///
/// Returns `None` for fragments, non-http(s) schemes and unparsable links.
pub fn normalize_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Parse a user-supplied start URL, rejecting anything that is not http(s).
pub fn parse_start_url(raw: &str) -> Option<Url> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Same host and same (effective) port.
pub fn is_same_site(url: &Url, start: &Url) -> bool {
    url.host_str() == start.host_str() && url.port_or_known_default() == start.port_or_known_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://Example.com/docs/index.html").unwrap()
    }

    #[test]
    fn test_normalize_resolves_relative_links() {
        let url = normalize_url(&base(), "../about#team").unwrap();
        assert_eq!(url.as_str(), "https://example.com/about");

        let url = normalize_url(&base(), "guide.html?x=1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/guide.html?x=1");
    }

    #[test]
    fn test_normalize_elides_default_port_and_adds_root_path() {
        let url = normalize_url(&base(), "HTTPS://EXAMPLE.COM:443").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_normalize_skips_non_http_links() {
        for href in ["", "#top", "mailto:a@b.com", "tel:+123", "javascript:void(0)", "data:image/png;base64,AA", "ftp://example.com/file"] {
            assert!(normalize_url(&base(), href).is_none(), "{} should be skipped", href);
        }
    }

    #[test]
    fn test_parse_start_url() {
        assert!(parse_start_url("https://example.com").is_some());
        assert!(parse_start_url("not a url").is_none());
        assert!(parse_start_url("ftp://example.com").is_none());
        assert!(parse_start_url("example.com").is_none());
    }

    #[test]
    fn test_same_site_compares_host_and_port() {
        let start = Url::parse("http://127.0.0.1:8080/").unwrap();

        assert!(is_same_site(&Url::parse("http://127.0.0.1:8080/a").unwrap(), &start));
        assert!(!is_same_site(&Url::parse("http://127.0.0.1:9090/a").unwrap(), &start));
        assert!(!is_same_site(&Url::parse("http://example.com:8080/a").unwrap(), &start));
    }

    #[tokio::test]
    async fn test_frontier_dedups_and_keeps_fifo_order() {
        let mut frontier = Frontier::new();
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://example.com/b").unwrap();

        assert!(frontier.enqueue(a.clone(), 1).await);
        assert!(frontier.enqueue(b.clone(), 1).await);
        assert!(!frontier.enqueue(a.clone(), 2).await);

        assert_eq!(frontier.len(), 2);
        assert_eq!(frontier.visited_count().await, 2);
        assert_eq!(frontier.pop().map(|e| e.url), Some(a));
        assert_eq!(frontier.pop().map(|e| e.url), Some(b));
        assert!(frontier.is_empty());
    }
}
