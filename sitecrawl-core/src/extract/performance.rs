use scraper::Html;
use serde::Serialize;

use super::{select, to_fragment, util, Extractor, Fragment, PageContext};
use crate::error::ExtractError;
use crate::mode::Mode;

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub page_url: String,
    pub load_time: String,
    pub page_size: String,
    pub status_code: u16,
    pub resource_hints: ResourceHints,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceHints {
    pub preconnect: usize,
    pub prefetch: usize,
    pub preload: usize,
}

/// Timing comes from the crawl's own fetch of the page; nothing is re-requested.
pub struct PerformanceExtractor;

impl Extractor for PerformanceExtractor {
    fn mode(&self) -> Mode {
        Mode::Performance
    }

    fn extract(&self, page: &PageContext, document: &Html) -> Result<Fragment, ExtractError> {
        let count = |rel: &str| -> Result<usize, ExtractError> {
            Ok(select(document, &format!(r#"link[rel~="{}"]"#, rel))?.len())
        };

        let report = PerformanceReport {
            page_url: page.url.to_string(),
            load_time: format!("{:.2}s", page.response_time.as_secs_f64()),
            page_size: util::file_size_str(page.body_size as u64),
            status_code: page.status,
            resource_hints: ResourceHints {
                preconnect: count("preconnect")?,
                prefetch: count("prefetch")?,
                preload: count("preload")?,
            },
        };

        to_fragment(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::page;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_reports_timing_size_and_hints() {
        let mut context = page("https://example.com/");
        context.response_time = Duration::from_millis(1234);
        context.body_size = 2048;

        let document = Html::parse_document(
            r#"<head>
                <link rel="preconnect" href="https://fonts.example.com">
                <link rel="preconnect dns-prefetch" href="https://cdn.example.com">
                <link rel="preload" href="/app.js" as="script">
            </head>"#,
        );
        let report = PerformanceExtractor.extract(&context, &document).unwrap();

        assert_eq!(report["load_time"], json!("1.23s"));
        assert_eq!(report["page_size"], json!("2.0KB"));
        assert_eq!(report["status_code"], json!(200));
        assert_eq!(
            report["resource_hints"],
            json!({"preconnect": 2, "prefetch": 0, "preload": 1})
        );
    }
}
