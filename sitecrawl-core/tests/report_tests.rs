// Tests for report generation functionality

use chrono::{TimeZone, Utc};
use serde_json::json;
use sitecrawl_core::report::{
    generate_csv_report, generate_json_report, generate_markdown_report, generate_report,
    generate_text_report, save_report, ReportFormat,
};
use sitecrawl_core::{CrawlReport, Mode};
use sitecrawl_scanner::{PageOutcome, PageResult};
use std::collections::BTreeMap;

fn page(url: &str, depth: u32, status: Option<u16>, outcome: PageOutcome) -> PageResult {
    PageResult {
        status_code: status,
        outcome,
        content_type: status.map(|_| "text/html".to_string()),
        response_time_ms: 42,
        attempts: 1,
        ..PageResult::new(url.to_string(), depth)
    }
}

fn sample_report() -> CrawlReport {
    let mut results = BTreeMap::new();
    results.insert(
        "images".to_string(),
        json!([{"url": "https://example.com/a.png", "src": "/a.png"}]),
    );
    results.insert(
        "security".to_string(),
        json!({"page_url": "https://example.com/", "security_headers": {}}),
    );

    CrawlReport {
        url: "https://example.com/".to_string(),
        modes: vec![Mode::Images, Mode::Security],
        depth: 1,
        max_pages: 50,
        pages_crawled: 1,
        pages_failed: 1,
        pages_skipped: 1,
        results,
        pages: vec![
            page("https://example.com/", 0, Some(200), PageOutcome::Fetched),
            page(
                "https://example.com/broken",
                1,
                Some(500),
                PageOutcome::Failed {
                    kind: "http_status".to_string(),
                    reason: "HTTP 500, for https://example.com/broken".to_string(),
                },
            ),
            page(
                "https://example.com/private",
                1,
                None,
                PageOutcome::Skipped {
                    reason: "disallowed by robots.txt".to_string(),
                },
            ),
        ],
        started_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        finished_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 3).unwrap(),
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("markdown"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("csv"), Some(ReportFormat::Csv));
    assert_eq!(ReportFormat::from_str("xml"), None);
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_summary() {
    let text = generate_text_report(&sample_report());

    assert!(text.contains("SITECRAWL REPORT"));
    assert!(text.contains("Target:       https://example.com/"));
    assert!(text.contains("Modes:        images, security"));
    assert!(text.contains("Duration:     3.00 seconds"));
    assert!(text.contains("Pages crawled:  1"));
    assert!(text.contains("[images] 1 items"));
    assert!(text.contains("[security] 1 fields"));
}

#[test]
fn test_text_report_page_lines() {
    let text = generate_text_report(&sample_report());

    assert!(text.contains("✓ 200  [fetched d0] 42ms  https://example.com/"));
    assert!(text.contains("✗ 500  [failed (http_status) d1]"));
    assert!(text.contains("- ---  [skipped d1]"));
    assert!(text.contains("    disallowed by robots.txt"));
}

// ============================================================================
// Other Formats
// ============================================================================

#[test]
fn test_json_report_is_output_shape() {
    let json_text = generate_json_report(&sample_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json_text).unwrap();

    assert_eq!(value["url"], json!("https://example.com/"));
    assert_eq!(value["pages_crawled"], json!(1));
    assert_eq!(value["images"][0]["src"], json!("/a.png"));
    assert_eq!(value["pages"][1]["outcome"], json!("failed"));
    assert_eq!(value["pages"][2]["outcome"], json!("skipped"));
    assert_eq!(value["modes"], json!(["images", "security"]));
}

#[test]
fn test_markdown_report() {
    let md = generate_markdown_report(&sample_report());

    assert!(md.starts_with("# Crawl report: https://example.com/"));
    assert!(md.contains("| 1 | 1 | 1 |"));
    assert!(md.contains("### images"));
    assert!(md.contains("| https://example.com/broken | 1 | 500 | failed (http_status) | 42 |"));
}

#[test]
fn test_csv_report_rows() {
    let csv = generate_csv_report(&sample_report());
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("url,depth,status_code,outcome"));
    assert_eq!(lines[1], "https://example.com/,0,200,fetched,,text/html,42,1,0");
    assert_eq!(
        lines[2],
        "https://example.com/broken,1,500,failed,\"HTTP 500, for https://example.com/broken\",text/html,42,1,0"
    );
    assert_eq!(lines[3], "https://example.com/private,1,,skipped,disallowed by robots.txt,,42,1,0");
}

#[test]
fn test_generate_report_dispatch() {
    let report = sample_report();
    let csv = generate_report(&report, ReportFormat::Csv).unwrap();
    assert_eq!(csv, generate_csv_report(&report));
}

#[test]
fn test_save_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");

    save_report("hello report", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello report");
}
