use scraper::Html;
use serde::Serialize;

use super::{to_fragment, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

const NOT_DISCLOSED: &str = "Not disclosed";

/// Header whose presence identifies a CDN, checked in order.
const CDN_HEADERS: [(&str, &str); 4] = [
    ("cf-ray", "Cloudflare"),
    ("x-amz-cf-id", "Amazon CloudFront"),
    ("x-akamai-transformed", "Akamai"),
    ("x-cdn", "Generic CDN"),
];

#[derive(Debug, Clone, Serialize)]
pub struct InfrastructureReport {
    pub server: String,
    pub powered_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdn: Option<String>,
}

pub struct InfrastructureExtractor;

impl Extractor for InfrastructureExtractor {
    fn mode(&self) -> Mode {
        Mode::Infrastructure
    }

    fn extract(&self, page: &PageContext, _document: &Html) -> Result<Fragment, ExtractError> {
        let disclosed = |name: &str| {
            page.header(name)
                .unwrap_or(NOT_DISCLOSED)
                .to_string()
        };

        let report = InfrastructureReport {
            server: disclosed("server"),
            powered_by: disclosed("x-powered-by"),
            cdn: CDN_HEADERS
                .iter()
                .find(|(header, _)| page.header(header).is_some())
                .map(|(_, cdn)| cdn.to_string()),
        };

        to_fragment(&report)
    }
}
