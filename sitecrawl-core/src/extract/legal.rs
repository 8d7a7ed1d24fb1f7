use regex::Regex;
use scraper::Html;
use serde::Serialize;

use super::{matching_links, text_nodes, to_fragment, util, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

pub(crate) const MAX_LINKS: usize = 3;
const MAX_COPYRIGHT: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct LegalReport {
    pub page_url: String,
    pub privacy_policy_urls: Vec<String>,
    pub terms_urls: Vec<String>,
    pub kvkk_compliance: KvkkMentions,
    pub data_protection_officer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

/// Mentions of Turkey's personal data protection law (KVKK, Law No. 6698).
#[derive(Debug, Clone, Serialize)]
pub struct KvkkMentions {
    pub mentioned: bool,
    pub mention_count: usize,
}

pub struct LegalExtractor {
    privacy: Regex,
    terms: Regex,
    kvkk: Regex,
    dpo: Regex,
    copyright: Regex,
}

impl LegalExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            privacy: Regex::new(r"(?i)privacy|gizlilik|kvkk")?,
            terms: Regex::new(r"(?i)terms|kullanim.*kosul|sozlesme")?,
            kvkk: Regex::new(r"(?i)kvkk|kişisel.*veri|6698")?,
            dpo: Regex::new(r"(?i)veri sorumlusu|data protection officer|dpo")?,
            copyright: Regex::new(r"©.*\d{4}")?,
        })
    }
}

impl Extractor for LegalExtractor {
    fn mode(&self) -> Mode {
        Mode::Legal
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let texts = text_nodes(document);
        let mention_count = texts.iter().filter(|node| self.kvkk.is_match(node.text)).count();

        let report = LegalReport {
            page_url: page.url.to_string(),
            privacy_policy_urls: matching_links(page, document, &self.privacy, MAX_LINKS)?,
            terms_urls: matching_links(page, document, &self.terms, MAX_LINKS)?,
            kvkk_compliance: KvkkMentions {
                mentioned: mention_count > 0,
                mention_count,
            },
            data_protection_officer: texts.iter().any(|node| self.dpo.is_match(node.text)),
            copyright: texts
                .iter()
                .find(|node| self.copyright.is_match(node.text))
                .map(|node| util::truncate_chars(node.text.trim(), MAX_COPYRIGHT)),
        };

        to_fragment(&report)
    }
}
