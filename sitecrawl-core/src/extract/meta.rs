use scraper::Html;
use serde::Serialize;

use super::{element_text, meta_content, select, select_first, to_fragment, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub page_url: String,
    pub title: String,
    pub description: String,
    pub h1: Vec<String>,
    pub og_data: OpenGraph,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    pub image: String,
}

pub struct MetaExtractor;

impl Extractor for MetaExtractor {
    fn mode(&self) -> Mode {
        Mode::Meta
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let title = select_first(document, "title")?
            .map(element_text)
            .unwrap_or_default();

        let h1 = select(document, "h1")?
            .into_iter()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();

        let record = PageMeta {
            page_url: page.url.to_string(),
            title,
            description: meta_content(document, r#"meta[name="description"]"#)?,
            h1,
            og_data: OpenGraph {
                title: meta_content(document, r#"meta[property="og:title"]"#)?,
                description: meta_content(document, r#"meta[property="og:description"]"#)?,
                image: meta_content(document, r#"meta[property="og:image"]"#)?,
            },
        };

        // One record per page
        to_fragment(&[record])
    }
}
