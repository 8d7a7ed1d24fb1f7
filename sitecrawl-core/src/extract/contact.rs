use regex::Regex;
use scraper::Html;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{attr, element_text, matching_links, select, text_nodes, to_fragment, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

pub(crate) const MAX_EMAILS: usize = 5;
pub(crate) const MAX_PHONES: usize = 5;
pub(crate) const MAX_CONTACT_PAGES: usize = 3;

const PHONE_PATTERNS: [&str; 4] = [
    r"\+90[\s.-]?\d{3}[\s.-]?\d{3}[\s.-]?\d{2}[\s.-]?\d{2}",
    r"0\d{3}[\s.-]?\d{3}[\s.-]?\d{2}[\s.-]?\d{2}",
    r"\(\d{3}\)[\s.-]?\d{3}[\s.-]?\d{2}[\s.-]?\d{2}",
    r"\+\d{1,3}[\s.-]?\d{3,14}",
];

const SOCIAL_PATTERNS: [(&str, &str); 5] = [
    ("facebook", r"(?i)facebook\.com/[\w.-]+"),
    ("twitter", r"(?i)twitter\.com/[\w.-]+"),
    ("linkedin", r"(?i)linkedin\.com/(?:company|in)/[\w.-]+"),
    ("instagram", r"(?i)instagram\.com/[\w.-]+"),
    ("youtube", r"(?i)youtube\.com/(?:c|channel|user)/[\w.-]+"),
];

const ADDRESS_KEYWORDS: [&str; 4] = ["adres", "address", "konum", "location"];

#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub page_url: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub social_media: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub contact_page_urls: Vec<String>,
}

pub struct ContactExtractor {
    email: Regex,
    phones: Vec<Regex>,
    social: Vec<(&'static str, Regex)>,
    contact_link: Regex,
}

impl ContactExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        let phones = PHONE_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let social = SOCIAL_PATTERNS
            .iter()
            .map(|(platform, p)| Regex::new(p).map(|re| (*platform, re)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            email: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")?,
            phones,
            social,
            contact_link: Regex::new(r"(?i)contact|iletisim|bize.*ulas")?,
        })
    }
}

/// Push `value` unless already present or `out` is full.
fn push_unique(out: &mut Vec<String>, value: &str, limit: usize) {
    if out.len() < limit && !out.iter().any(|v| v == value) {
        out.push(value.to_string());
    }
}

impl Extractor for ContactExtractor {
    fn mode(&self) -> Mode {
        Mode::Contact
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let texts = text_nodes(document);

        let mut emails = Vec::new();
        for node in &texts {
            for found in self.email.find_iter(node.text) {
                push_unique(&mut emails, found.as_str(), MAX_EMAILS);
            }
        }

        let mut phones = Vec::new();
        for pattern in &self.phones {
            for node in &texts {
                for found in pattern.find_iter(node.text) {
                    push_unique(&mut phones, found.as_str().trim(), MAX_PHONES);
                }
            }
        }

        let hrefs: Vec<&str> = select(document, "a[href]")?
            .into_iter()
            .filter_map(|a| attr(a, "href"))
            .collect();

        let social_media = self
            .social
            .iter()
            .filter_map(|(platform, pattern)| {
                hrefs
                    .iter()
                    .find(|href| pattern.is_match(href))
                    .map(|href| (platform.to_string(), href.to_string()))
            })
            .collect();

        let address = ADDRESS_KEYWORDS.iter().find_map(|keyword| {
            texts
                .iter()
                .filter(|node| node.text.to_lowercase().contains(keyword))
                .filter_map(|node| node.parent.map(element_text))
                .find(|text| (21..300).contains(&text.chars().count()))
        });

        let info = ContactInfo {
            page_url: page.url.to_string(),
            emails,
            phones,
            social_media,
            address,
            contact_page_urls: matching_links(page, document, &self.contact_link, MAX_CONTACT_PAGES)?,
        };

        to_fragment(&info)
    }
}
