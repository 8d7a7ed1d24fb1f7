use regex::Regex;
use scraper::Html;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{attr, element_text, select, to_fragment, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

const MAX_CAREER_LINKS: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CareerEntry {
    Link {
        text: String,
        url: String,
    },
    JobPosting {
        #[serde(rename = "type")]
        kind: &'static str,
        title: String,
        company: String,
    },
}

pub struct CareersExtractor {
    career_link: Regex,
}

impl CareersExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            career_link: Regex::new(r"(?i)career|kariyer|job|is.*ilanlari|insan.*kaynak")?,
        })
    }

    /// `JobPosting` objects in a JSON-LD block (top-level object, array or `@graph`).
    fn job_postings(raw: &str) -> Vec<CareerEntry> {
        let data: Value = match serde_json::from_str(raw) {
            Ok(data) => data,
            Err(e) => {
                debug!("Skipping unparsable JSON-LD block: {}", e);
                return Vec::new();
            }
        };

        let candidates: Vec<&Value> = match &data {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => match map.get("@graph") {
                Some(Value::Array(items)) => items.iter().collect(),
                _ => vec![&data],
            },
            _ => Vec::new(),
        };

        candidates
            .into_iter()
            .filter(|item| item.get("@type").and_then(Value::as_str) == Some("JobPosting"))
            .map(|item| CareerEntry::JobPosting {
                kind: "structured_job_posting",
                title: item
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                company: item
                    .pointer("/hiringOrganization/name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect()
    }
}

impl Extractor for CareersExtractor {
    fn mode(&self) -> Mode {
        Mode::Careers
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let mut careers: Vec<CareerEntry> = select(document, "a[href]")?
            .into_iter()
            .filter_map(|a| attr(a, "href").map(|href| (a, href)))
            .filter(|(_, href)| self.career_link.is_match(href))
            .take(MAX_CAREER_LINKS)
            .map(|(a, href)| CareerEntry::Link {
                text: element_text(a),
                url: page.resolve(href),
            })
            .collect();

        for script in select(document, r#"script[type="application/ld+json"]"#)? {
            careers.extend(Self::job_postings(&script.text().collect::<String>()));
        }

        to_fragment(&careers)
    }
}
