use scraper::Html;
use serde::Serialize;
use std::collections::HashSet;

use super::{attr, select, to_fragment, util, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    pub url: String,
    /// The `src` attribute as written in the markup.
    pub src: String,
    pub alt_text: String,
    pub format: String,
    pub page_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

pub struct ImagesExtractor;

impl Extractor for ImagesExtractor {
    fn mode(&self) -> Mode {
        Mode::Images
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let mut seen = HashSet::new();
        let mut images = Vec::new();

        for img in select(document, "img[src]")? {
            let Some(src) = attr(img, "src").map(str::trim) else {
                continue;
            };
            if src.is_empty() || src.to_ascii_lowercase().starts_with("data:") {
                continue;
            }

            let url = page.resolve(src);
            if !seen.insert(url.clone()) {
                continue;
            }

            let dimensions = match (
                attr(img, "width").and_then(|w| w.trim().parse().ok()),
                attr(img, "height").and_then(|h| h.trim().parse().ok()),
            ) {
                (Some(width), Some(height)) => Some(Dimensions { width, height }),
                _ => None,
            };

            images.push(ImageRecord {
                format: util::image_format(&url).to_string(),
                url,
                src: src.to_string(),
                alt_text: attr(img, "alt").unwrap_or_default().trim().to_string(),
                page_url: page.url.to_string(),
                dimensions,
            });
        }

        to_fragment(&images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::run;
    use serde_json::json;

    #[test]
    fn test_collects_every_image_with_src() {
        let html = r#"<html><body>
            <img src="/a.png" alt="First" width="100" height="50">
            <img src="https://cdn.example.com/b.jpg">
            <img alt="no source">
            <img src="data:image/gif;base64,R0lGOD">
        </body></html>"#;

        let images = run(&ImagesExtractor, "https://example.com/page", html);
        let images = images.as_array().unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["src"], json!("/a.png"));
        assert_eq!(images[0]["url"], json!("https://example.com/a.png"));
        assert_eq!(images[0]["alt_text"], json!("First"));
        assert_eq!(images[0]["format"], json!("png"));
        assert_eq!(images[0]["dimensions"], json!({"width": 100, "height": 50}));
        assert_eq!(images[1]["format"], json!("jpeg"));
        assert!(images[1].get("dimensions").is_none());
        assert_eq!(images[1]["page_url"], json!("https://example.com/page"));
    }

    #[test]
    fn test_duplicate_images_on_one_page_are_collapsed() {
        let html = r#"<img src="/logo.png"><img src="https://example.com/logo.png">"#;
        let images = run(&ImagesExtractor, "https://example.com/", html);
        assert_eq!(images.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_non_numeric_dimensions_are_ignored() {
        let html = r#"<img src="/a.gif" width="100%" height="auto">"#;
        let images = run(&ImagesExtractor, "https://example.com/", html);
        assert!(images[0].get("dimensions").is_none());
    }
}
