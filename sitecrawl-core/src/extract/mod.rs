// Per-mode extractors run against every fetched HTML page

pub mod brand;
pub mod careers;
pub mod compliance;
pub mod contact;
pub mod images;
pub mod infrastructure;
pub mod legal;
pub mod meta;
pub mod performance;
pub mod references;
pub mod security;
pub mod seo;
pub mod util;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;
use sitecrawl_scanner::FetchedPage;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::ExtractError;
use crate::mode::Mode;

/// A mode's contribution for one page: an array for list modes, an object otherwise.
pub type Fragment = Value;

/// What an extractor may know about a page besides its markup.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// Final URL after redirects; relative links resolve against it.
    pub url: Url,
    pub status: u16,
    /// Lowercased header names; the first value wins for repeated headers.
    pub headers: BTreeMap<String, String>,
    pub body_size: usize,
    pub response_time: Duration,
}

impl PageContext {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            status: 200,
            headers: BTreeMap::new(),
            body_size: 0,
            response_time: Duration::ZERO,
        }
    }

    pub fn from_page(page: &FetchedPage) -> Self {
        let mut headers = BTreeMap::new();
        for (name, value) in page.headers.iter() {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_lowercase())
                    .or_insert_with(|| value.to_string());
            }
        }

        Self {
            url: page.final_url.clone(),
            status: page.status,
            headers,
            body_size: page.body.len(),
            response_time: page.elapsed,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// Resolve a link or asset reference found on this page.
    pub fn resolve(&self, reference: &str) -> String {
        self.url
            .join(reference.trim())
            .map(|u| u.to_string())
            .unwrap_or_else(|_| reference.to_string())
    }
}

pub trait Extractor: Send + Sync {
    fn mode(&self) -> Mode;

    /// Must tolerate malformed markup; a partial or empty fragment is fine.
    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError>;
}

/// The extractors for one crawl, in the order their modes were requested.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn for_modes(modes: &[Mode]) -> Result<Self, ExtractError> {
        let mut registry = Self {
            extractors: Vec::with_capacity(modes.len()),
        };
        for mode in modes {
            registry.register(build(*mode)?);
        }
        Ok(registry)
    }

    /// Add an extractor, replacing any already registered for its mode.
    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        let mode = extractor.mode();
        match self.extractors.iter().position(|e| e.mode() == mode) {
            Some(index) => self.extractors[index] = extractor,
            None => self.extractors.push(extractor),
        }
    }

    pub fn modes(&self) -> Vec<Mode> {
        self.extractors.iter().map(|e| e.mode()).collect()
    }

    /// Run every extractor; failures are logged and leave that mode out.
    pub fn run(&self, page: &PageContext, document: &Html) -> Vec<(Mode, Fragment)> {
        let mut fragments = Vec::with_capacity(self.extractors.len());
        for extractor in &self.extractors {
            let mode = extractor.mode();
            match extractor.extract(page, document) {
                Ok(fragment) => {
                    debug!("Extracted {} from {}", mode, page.url);
                    fragments.push((mode, fragment));
                }
                Err(e) => warn!("{} extractor failed on {}: {}", mode, page.url, e),
            }
        }
        fragments
    }
}

fn build(mode: Mode) -> Result<Box<dyn Extractor>, ExtractError> {
    Ok(match mode {
        Mode::Images => Box::new(images::ImagesExtractor),
        Mode::Meta => Box::new(meta::MetaExtractor),
        Mode::Brand => Box::new(brand::BrandExtractor::new()?),
        Mode::Seo => Box::new(seo::SeoExtractor),
        Mode::Performance => Box::new(performance::PerformanceExtractor),
        Mode::Security => Box::new(security::SecurityExtractor),
        Mode::Compliance => Box::new(compliance::ComplianceExtractor::new()?),
        Mode::Infrastructure => Box::new(infrastructure::InfrastructureExtractor),
        Mode::Legal => Box::new(legal::LegalExtractor::new()?),
        Mode::Careers => Box::new(careers::CareersExtractor::new()?),
        Mode::References => Box::new(references::ReferencesExtractor::new()?),
        Mode::Contact => Box::new(contact::ContactExtractor::new()?),
    })
}

pub(crate) fn to_fragment<T: Serialize>(value: &T) -> Result<Fragment, ExtractError> {
    Ok(serde_json::to_value(value)?)
}

pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn select<'a>(document: &'a Html, css: &str) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let selector = selector(css)?;
    Ok(document.select(&selector).collect())
}

pub(crate) fn select_in<'a>(element: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let selector = selector(css)?;
    Ok(element.select(&selector).collect())
}

pub(crate) fn select_first<'a>(document: &'a Html, css: &str) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let selector = selector(css)?;
    Ok(document.select(&selector).next())
}

/// Whitespace-collapsed text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    util::clean_text(&element.text().collect::<String>())
}

pub(crate) fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

/// `content` of the first `<meta>` matching `css`, or an empty string.
pub(crate) fn meta_content(document: &Html, css: &str) -> Result<String, ExtractError> {
    Ok(select_first(document, css)?
        .and_then(|el| attr(el, "content"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default())
}

/// A text node together with its parent element.
pub(crate) struct TextNode<'a> {
    pub text: &'a str,
    pub parent: Option<ElementRef<'a>>,
}

/// Visible text nodes in document order (script and style contents excluded).
pub(crate) fn text_nodes(document: &Html) -> Vec<TextNode<'_>> {
    document
        .tree
        .nodes()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap);
            if let Some(parent) = parent
                && matches!(parent.value().name(), "script" | "style" | "noscript" | "template")
            {
                return None;
            }
            let text: &str = text;
            if text.trim().is_empty() {
                return None;
            }
            Some(TextNode { text, parent })
        })
        .collect()
}

/// Links whose `href` matches `pattern`, resolved and capped at `limit`.
pub(crate) fn matching_links(
    page: &PageContext,
    document: &Html,
    pattern: &Regex,
    limit: usize,
) -> Result<Vec<String>, ExtractError> {
    Ok(select(document, "a[href]")?
        .into_iter()
        .filter_map(|a| attr(a, "href"))
        .filter(|href| pattern.is_match(href))
        .take(limit)
        .map(|href| page.resolve(href))
        .collect())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn page(url: &str) -> PageContext {
        PageContext::new(Url::parse(url).unwrap())
    }

    pub fn run(extractor: &dyn Extractor, url: &str, html: &str) -> Value {
        let document = Html::parse_document(html);
        extractor.extract(&page(url), &document).unwrap()
    }
}
