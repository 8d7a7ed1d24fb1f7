use scraper::Html;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{attr, element_text, meta_content, select, select_first, to_fragment, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

const TITLE_RANGE: (usize, usize) = (30, 60);
const DESCRIPTION_RANGE: (usize, usize) = (120, 160);
const MAX_SOCIAL_TAGS: usize = 10;
pub(crate) const MAX_SUBHEADINGS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct SeoReport {
    pub page_url: String,
    pub title: LengthCheck,
    pub meta_description: LengthCheck,
    pub meta_keywords: String,
    pub headings: Headings,
    pub images: ImageAltStats,
    pub structured_data: Presence,
    pub canonical_url: String,
    pub robots: String,
    pub open_graph: SocialTags,
    pub twitter_card: SocialTags,
    pub language: String,
    pub mobile_friendly: Viewport,
}

#[derive(Debug, Clone, Serialize)]
pub struct LengthCheck {
    pub content: String,
    pub length: usize,
    pub optimal: bool,
}

impl LengthCheck {
    fn new(content: String, (min, max): (usize, usize)) -> Self {
        let length = content.chars().count();
        Self {
            content,
            length,
            optimal: (min..=max).contains(&length),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageAltStats {
    pub total: usize,
    pub without_alt: usize,
    pub alt_coverage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Presence {
    pub found: bool,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialTags {
    pub found: bool,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Viewport {
    pub viewport_tag: String,
    pub has_viewport: bool,
}

pub struct SeoExtractor;

impl SeoExtractor {
    fn headings(document: &Html, tag: &str, limit: usize) -> Result<Vec<String>, ExtractError> {
        Ok(select(document, tag)?
            .into_iter()
            .take(limit)
            .map(element_text)
            .collect())
    }

    fn social_tags(document: &Html, css: &str, key_attr: &str) -> Result<SocialTags, ExtractError> {
        let elements = select(document, css)?;
        let tags = elements
            .iter()
            .take(MAX_SOCIAL_TAGS)
            .map(|el| {
                (
                    attr(*el, key_attr).unwrap_or_default().to_string(),
                    attr(*el, "content").unwrap_or_default().to_string(),
                )
            })
            .collect();

        Ok(SocialTags {
            found: !elements.is_empty(),
            tags,
        })
    }
}

impl Extractor for SeoExtractor {
    fn mode(&self) -> Mode {
        Mode::Seo
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let title = select_first(document, "title")?
            .map(element_text)
            .unwrap_or_default();

        let images = select(document, "img")?;
        let without_alt = images
            .iter()
            .filter(|img| attr(**img, "alt").is_none_or(|alt| alt.trim().is_empty()))
            .count();
        let alt_coverage = if images.is_empty() {
            "N/A".to_string()
        } else {
            let covered = (images.len() - without_alt) as f64 / images.len() as f64 * 100.0;
            format!("{:.1}%", covered)
        };

        let json_ld = select(document, r#"script[type="application/ld+json"]"#)?.len();
        let viewport = select_first(document, r#"meta[name="viewport"]"#)?;

        let report = SeoReport {
            page_url: page.url.to_string(),
            title: LengthCheck::new(title, TITLE_RANGE),
            meta_description: LengthCheck::new(
                meta_content(document, r#"meta[name="description"]"#)?,
                DESCRIPTION_RANGE,
            ),
            meta_keywords: meta_content(document, r#"meta[name="keywords"]"#)?,
            headings: Headings {
                h1: Self::headings(document, "h1", usize::MAX)?,
                h2: Self::headings(document, "h2", MAX_SUBHEADINGS)?,
                h3: Self::headings(document, "h3", MAX_SUBHEADINGS)?,
            },
            images: ImageAltStats {
                total: images.len(),
                without_alt,
                alt_coverage,
            },
            structured_data: Presence {
                found: json_ld > 0,
                count: json_ld,
            },
            canonical_url: select_first(document, r#"link[rel="canonical"]"#)?
                .and_then(|el| attr(el, "href"))
                .unwrap_or_default()
                .to_string(),
            robots: meta_content(document, r#"meta[name="robots"]"#)?,
            open_graph: Self::social_tags(document, r#"meta[property^="og:"]"#, "property")?,
            twitter_card: Self::social_tags(document, r#"meta[name^="twitter:"]"#, "name")?,
            language: select_first(document, "html")?
                .and_then(|el| attr(el, "lang"))
                .unwrap_or_default()
                .to_string(),
            mobile_friendly: Viewport {
                viewport_tag: viewport
                    .and_then(|el| attr(el, "content"))
                    .unwrap_or_default()
                    .to_string(),
                has_viewport: viewport.is_some(),
            },
        };

        to_fragment(&report)
    }
}
