// robots.txt parsing and per-host rule cache

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::fetch::Fetcher;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    pattern: String,
    allow: bool,
}

/// Rules from the robots.txt group that applies to our user agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    rules: Vec<Rule>,
    crawl_delay: Option<Duration>,
    sitemaps: Vec<String>,
}

#[derive(Debug, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
    crawl_delay: Option<Duration>,
}

impl RobotsRules {
    /// Rules that allow everything (missing or unreachable robots.txt).
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parse `content`, keeping the group addressed to `user_agent`.
    ///
    /// A group naming a token contained in our user agent wins over `*`.
    pub fn parse(content: &str, user_agent: &str) -> Self {
        let user_agent = user_agent.to_lowercase();
        let mut groups: Vec<Group> = Vec::new();
        let mut sitemaps = Vec::new();
        let mut current = Group::default();
        let mut collecting_agents = false;

        for raw_line in content.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let directive = directive.trim().to_lowercase();
            let value = value.trim();

            match directive.as_str() {
                "user-agent" => {
                    if !collecting_agents && !current.agents.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                    current.agents.push(value.to_lowercase());
                    collecting_agents = true;
                }
                "allow" | "disallow" => {
                    collecting_agents = false;
                    if value.is_empty() {
                        // "Disallow:" with no path allows everything
                        continue;
                    }
                    current.rules.push(Rule {
                        pattern: value.to_string(),
                        allow: directive == "allow",
                    });
                }
                "crawl-delay" => {
                    collecting_agents = false;
                    if let Ok(seconds) = value.parse::<f64>()
                        && seconds.is_finite()
                        && seconds >= 0.0
                    {
                        // Out-of-range values saturate
                        current.crawl_delay =
                            Some(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX));
                    }
                }
                "sitemap" => sitemaps.push(value.to_string()),
                _ => {}
            }
        }
        if !current.agents.is_empty() {
            groups.push(current);
        }

        let specific = groups.iter().position(|g| {
            g.agents
                .iter()
                .any(|agent| agent != "*" && !agent.is_empty() && user_agent.contains(agent.as_str()))
        });
        let wildcard = groups
            .iter()
            .position(|g| g.agents.iter().any(|agent| agent == "*"));

        let mut rules = match specific.or(wildcard) {
            Some(index) => {
                let group = groups.swap_remove(index);
                Self {
                    rules: group.rules,
                    crawl_delay: group.crawl_delay,
                    sitemaps: Vec::new(),
                }
            }
            None => Self::default(),
        };
        rules.sitemaps = sitemaps;
        rules
    }

    /// Longest matching pattern decides; on a tie `Allow` wins.
    pub fn is_allowed(&self, url: &Url) -> bool {
        let mut target = url.path().to_string();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }
        self.is_path_allowed(&target)
    }

    pub fn is_path_allowed(&self, path: &str) -> bool {
        if path == "/robots.txt" {
            return true;
        }

        let mut best: Option<(usize, bool)> = None;
        for rule in &self.rules {
            if !pattern_matches(&rule.pattern, path) {
                continue;
            }
            let len = rule.pattern.len();
            best = match best {
                Some((best_len, best_allow)) if best_len > len => Some((best_len, best_allow)),
                Some((best_len, best_allow)) if best_len == len => {
                    Some((best_len, best_allow || rule.allow))
                }
                _ => Some((len, rule.allow)),
            };
        }

        best.map(|(_, allow)| allow).unwrap_or(true)
    }

    pub fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }

    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}

/// robots.txt pattern match: prefix match, `*` wildcard, trailing `$` anchor.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };

    let parts: Vec<&str> = pattern.split('*').collect();
    let mut pos = 0;

    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            if !path.starts_with(part) {
                return false;
            }
            pos = part.len();
            continue;
        }

        let is_last = i == parts.len() - 1;
        if is_last && anchored {
            return path.len() >= pos + part.len() && path.ends_with(part);
        }
        if part.is_empty() {
            continue;
        }
        match path[pos..].find(part) {
            Some(found) => pos += found + part.len(),
            None => return false,
        }
    }

    !anchored || pos == path.len()
}

/// Fetches robots.txt once per host and keeps the parsed rules for the crawl.
#[derive(Debug)]
pub struct RobotsCache {
    fetcher: Fetcher,
    user_agent: String,
    cache: Mutex<HashMap<String, Arc<RobotsRules>>>,
}

impl RobotsCache {
    pub fn new(fetcher: Fetcher, user_agent: impl Into<String>) -> Self {
        Self {
            fetcher,
            user_agent: user_agent.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn rules_for(&self, url: &Url) -> Arc<RobotsRules> {
        let key = host_key(url);

        // Held across the fetch so concurrent callers for one host share a request
        let mut cache = self.cache.lock().await;
        if let Some(rules) = cache.get(&key) {
            return rules.clone();
        }

        let rules = Arc::new(self.fetch_rules(url).await);
        cache.insert(key, rules.clone());
        rules
    }

    async fn fetch_rules(&self, url: &Url) -> RobotsRules {
        let mut robots_url = url.clone();
        robots_url.set_path("/robots.txt");
        robots_url.set_query(None);
        robots_url.set_fragment(None);

        debug!("Fetching {}", robots_url);
        match self.fetcher.fetch_text(&robots_url).await {
            Ok(content) => RobotsRules::parse(&content, &self.user_agent),
            Err(e) => {
                if e.status() != Some(404) {
                    warn!("Could not read {}: {}", robots_url, e);
                }
                RobotsRules::allow_all()
            }
        }
    }
}

pub(crate) fn host_key(url: &Url) -> String {
    match url.port_or_known_default() {
        Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
        None => url.host_str().unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROBOTS: &str = r#"
# comment line
User-agent: *
Disallow: /admin/
Disallow: /private/
Allow: /private/public/

User-agent: SiteCrawler
User-agent: OtherBot
Disallow: /test/
Crawl-delay: 2

Sitemap: https://example.com/sitemap.xml
"#;

    #[test]
    fn test_specific_group_wins_over_wildcard() {
        let rules = RobotsRules::parse(ROBOTS, "Mozilla/5.0 (compatible; SiteCrawler/0.1)");

        assert!(!rules.is_path_allowed("/test/page"));
        assert!(rules.is_path_allowed("/admin/users"));
        assert_eq!(rules.crawl_delay(), Some(Duration::from_secs(2)));
        assert_eq!(rules.sitemaps(), ["https://example.com/sitemap.xml".to_string()]);
    }

    #[test]
    fn test_huge_crawl_delay_saturates() {
        let rules = RobotsRules::parse("User-agent: *\nCrawl-delay: 1e30\n", "bot");
        assert_eq!(rules.crawl_delay(), Some(Duration::MAX));

        let rules = RobotsRules::parse("User-agent: *\nCrawl-delay: inf\nCrawl-delay: -3\n", "bot");
        assert_eq!(rules.crawl_delay(), None);
    }

    #[test]
    fn test_wildcard_group_applies_to_unknown_agents() {
        let rules = RobotsRules::parse(ROBOTS, "UnknownBot/1.0");

        assert!(!rules.is_path_allowed("/admin/users"));
        assert!(!rules.is_path_allowed("/private/data"));
        assert!(rules.is_path_allowed("/private/public/info"));
        assert!(rules.is_path_allowed("/public/page"));
        assert!(rules.is_path_allowed("/test/page"));
        assert_eq!(rules.crawl_delay(), None);
    }

    #[test]
    fn test_wildcards_and_anchors() {
        let rules = RobotsRules::parse(
            "User-agent: *\nDisallow: /*.pdf$\nDisallow: /search*q=\nAllow: /search/help\n",
            "bot",
        );

        assert!(!rules.is_path_allowed("/files/report.pdf"));
        assert!(rules.is_path_allowed("/files/report.pdf.html"));
        assert!(!rules.is_path_allowed("/search?q=rust"));
        assert!(rules.is_path_allowed("/search/help"));
    }

    #[test]
    fn test_empty_disallow_allows_everything() {
        let rules = RobotsRules::parse("User-agent: *\nDisallow:\n", "bot");
        assert!(rules.is_path_allowed("/anything"));
    }

    #[test]
    fn test_query_is_part_of_match_target() {
        let rules = RobotsRules::parse("User-agent: *\nDisallow: /*?sort=\n", "bot");
        let sorted = Url::parse("https://example.com/list?sort=asc").unwrap();
        let plain = Url::parse("https://example.com/list").unwrap();

        assert!(!rules.is_allowed(&sorted));
        assert!(rules.is_allowed(&plain));
    }

    #[test]
    fn test_host_key_includes_port() {
        let url = Url::parse("http://127.0.0.1:8080/page").unwrap();
        assert_eq!(host_key(&url), "127.0.0.1:8080");

        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(host_key(&url), "example.com:443");
    }
}
