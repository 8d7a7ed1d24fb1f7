use regex::Regex;
use scraper::Html;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{attr, matching_links, select_first, text_nodes, to_fragment, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

const LOGO_SELECTORS: [&str; 6] = [
    r#"img[alt*="logo"]"#,
    r#"img[class*="logo"]"#,
    r#"img[id*="logo"]"#,
    ".logo img",
    "#logo img",
    "header img",
];

pub(crate) const MAX_ABOUT_URLS: usize = 3;

const STATEMENT_KEYWORDS: [&str; 6] = ["mission", "vision", "misyon", "vizyon", "değerler", "values"];

#[derive(Debug, Clone, Serialize)]
pub struct BrandInfo {
    pub page_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub about_urls: Vec<String>,
    /// `<keyword>_found` for each statement keyword present in the text.
    #[serde(flatten)]
    pub statements: BTreeMap<String, bool>,
}

pub struct BrandExtractor {
    copyright: Regex,
    about: Regex,
}

impl BrandExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            copyright: Regex::new(r"(?i)©\s*\d{4}\s*(.+?)(?:\.|,|All)")?,
            about: Regex::new(r"(?i)about|hakkinda|kurumsal")?,
        })
    }
}

impl Extractor for BrandExtractor {
    fn mode(&self) -> Mode {
        Mode::Brand
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let mut info = BrandInfo {
            page_url: page.url.to_string(),
            logo_url: None,
            logo_alt: None,
            company_name: None,
            about_urls: matching_links(page, document, &self.about, MAX_ABOUT_URLS)?,
            statements: BTreeMap::new(),
        };

        for css in LOGO_SELECTORS {
            if let Some(logo) = select_first(document, css)?
                && let Some(src) = attr(logo, "src").filter(|s| !s.trim().is_empty())
            {
                info.logo_url = Some(page.resolve(src));
                info.logo_alt = Some(attr(logo, "alt").unwrap_or_default().to_string());
                break;
            }
        }

        let texts = text_nodes(document);

        info.company_name = texts.iter().find_map(|node| {
            self.copyright
                .captures(node.text)
                .and_then(|caps| caps.get(1))
                .map(|name| name.as_str().trim().to_string())
                .filter(|name| !name.is_empty())
        });

        for keyword in STATEMENT_KEYWORDS {
            if texts.iter().any(|node| node.text.to_lowercase().contains(keyword)) {
                info.statements.insert(format!("{}_found", keyword), true);
            }
        }

        to_fragment(&info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::run;
    use serde_json::json;

    fn extract(html: &str) -> serde_json::Value {
        run(&BrandExtractor::new().unwrap(), "https://example.com/", html)
    }

    #[test]
    fn test_finds_logo_and_company_name() {
        let html = r#"<html><body>
            <header><img src="/banner.jpg"></header>
            <div class="brand"><img class="site-logo" src="/img/logo.svg" alt="Acme"></div>
            <a href="/about-us">About</a><a href="/kurumsal">Kurumsal</a><a href="/blog">Blog</a>
            <p>Our Mission is simple.</p>
            <footer>© 2024 Acme Corp. All rights reserved.</footer>
        </body></html>"#;

        let brand = extract(html);

        assert_eq!(brand["logo_url"], json!("https://example.com/img/logo.svg"));
        assert_eq!(brand["logo_alt"], json!("Acme"));
        assert_eq!(brand["company_name"], json!("Acme Corp"));
        assert_eq!(
            brand["about_urls"],
            json!(["https://example.com/about-us", "https://example.com/kurumsal"])
        );
        assert_eq!(brand["mission_found"], json!(true));
        assert!(brand.get("vision_found").is_none());
    }

    #[test]
    fn test_header_image_is_last_resort() {
        let brand = extract(r#"<header><img src="/top.png" alt="Top"></header>"#);
        assert_eq!(brand["logo_url"], json!("https://example.com/top.png"));
    }

    #[test]
    fn test_page_without_brand_signals() {
        let brand = extract("<p>Nothing here</p>");
        assert!(brand.get("logo_url").is_none());
        assert!(brand.get("company_name").is_none());
        assert_eq!(brand["about_urls"], json!([]));
    }
}
