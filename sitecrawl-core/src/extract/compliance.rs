use regex::Regex;
use scraper::Html;
use serde::Serialize;

use super::{select, select_first, text_nodes, to_fragment, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

pub(crate) const MAX_ISO_MENTIONS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub page_url: String,
    pub accessibility: Accessibility,
    pub cookie_notice: bool,
    pub iso_certifications: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Accessibility {
    pub images_with_alt: usize,
    pub images_total: usize,
    pub forms_with_labels: usize,
    pub lang_attribute: bool,
    pub skip_navigation: bool,
}

pub struct ComplianceExtractor {
    skip_nav: Regex,
    cookie: Regex,
    iso: Regex,
}

impl ComplianceExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            skip_nav: Regex::new(r"(?i)skip.*nav")?,
            cookie: Regex::new(r"(?i)cookie|çerez|gdpr|consent")?,
            iso: Regex::new(r"ISO[/IEC]*\s*\d{4,5}")?,
        })
    }
}

impl Extractor for ComplianceExtractor {
    fn mode(&self) -> Mode {
        Mode::Compliance
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let texts = text_nodes(document);

        let mut iso_certifications: Vec<String> = Vec::new();
        for mention in texts.iter().flat_map(|node| self.iso.find_iter(node.text)) {
            let mention = mention.as_str().to_string();
            if !iso_certifications.contains(&mention) {
                iso_certifications.push(mention);
            }
            if iso_certifications.len() == MAX_ISO_MENTIONS {
                break;
            }
        }

        let report = ComplianceReport {
            page_url: page.url.to_string(),
            accessibility: Accessibility {
                images_with_alt: select(document, "img[alt]")?.len(),
                images_total: select(document, "img")?.len(),
                forms_with_labels: select(document, "label")?.len(),
                lang_attribute: select_first(document, "html[lang]")?.is_some(),
                skip_navigation: texts.iter().any(|node| self.skip_nav.is_match(node.text)),
            },
            cookie_notice: texts.iter().any(|node| self.cookie.is_match(node.text)),
            iso_certifications,
        };

        to_fragment(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::run;
    use serde_json::json;

    #[test]
    fn test_accessibility_and_certifications() {
        let html = r##"<html lang="en"><body>
            <a href="#main">Skip to navigation</a>
            <img src="a.png" alt="A"><img src="b.png">
            <form><label for="q">Search</label><input id="q"></form>
            <p>We hold ISO 9001 and ISO/IEC 27001 certificates. ISO 9001 audited yearly.</p>
            <div id="banner">This site uses cookies.</div>
        </body></html>"##;

        let report = run(&ComplianceExtractor::new().unwrap(), "https://example.com/", html);

        assert_eq!(
            report["accessibility"],
            json!({
                "images_with_alt": 1,
                "images_total": 2,
                "forms_with_labels": 1,
                "lang_attribute": true,
                "skip_navigation": true
            })
        );
        assert_eq!(report["cookie_notice"], json!(true));
        assert_eq!(report["iso_certifications"], json!(["ISO 9001", "ISO/IEC 27001"]));
    }

    #[test]
    fn test_plain_page() {
        let report = run(&ComplianceExtractor::new().unwrap(), "https://example.com/", "<p>Hello</p>");

        assert_eq!(report["cookie_notice"], json!(false));
        assert_eq!(report["accessibility"]["lang_attribute"], json!(false));
        assert_eq!(report["iso_certifications"], json!([]));
    }
}
