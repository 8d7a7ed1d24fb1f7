// Passive security checks from the response the crawl already received

use scraper::Html;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{to_fragment, util, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

/// Response header and the name it is reported under.
const SECURITY_HEADERS: [(&str, &str); 7] = [
    ("strict-transport-security", "HSTS"),
    ("x-content-type-options", "X-Content-Type-Options"),
    ("x-frame-options", "X-Frame-Options"),
    ("x-xss-protection", "X-XSS-Protection"),
    ("content-security-policy", "CSP"),
    ("referrer-policy", "Referrer-Policy"),
    ("permissions-policy", "Permissions-Policy"),
];

const MAX_HEADER_VALUE: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct SecurityReport {
    pub page_url: String,
    pub https: bool,
    pub headers: BTreeMap<String, HeaderCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl: Option<SslInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderCheck {
    pub present: bool,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SslInfo {
    pub enabled: bool,
    pub url: String,
}

pub struct SecurityExtractor;

impl Extractor for SecurityExtractor {
    fn mode(&self) -> Mode {
        Mode::Security
    }

    fn extract(&self, page: &PageContext, _document: &Html) -> Result<Fragment, ExtractError> {
        let https = page.url.scheme() == "https";

        let headers = SECURITY_HEADERS
            .iter()
            .map(|(header, label)| {
                let check = match page.header(header).filter(|v| !v.is_empty()) {
                    Some(value) => HeaderCheck {
                        present: true,
                        value: util::truncate_chars(value, MAX_HEADER_VALUE),
                    },
                    None => HeaderCheck {
                        present: false,
                        value: "Not set".to_string(),
                    },
                };
                (label.to_string(), check)
            })
            .collect();

        let report = SecurityReport {
            page_url: page.url.to_string(),
            https,
            headers,
            ssl: https.then(|| SslInfo {
                enabled: true,
                url: page.url.to_string(),
            }),
        };

        to_fragment(&report)
    }
}
