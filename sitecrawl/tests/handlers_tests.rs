use sitecrawl::handlers::*;
use sitecrawl_core::report::ReportFormat;
use sitecrawl_core::{CrawlRequest, Mode, execute_crawl};
use sitecrawl_scanner::CrawlerConfig;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_parse_url_line_with_scheme() {
    let result = parse_url_line("https://example.com");
    assert_eq!(result, Some("https://example.com".to_string()));
}

#[test]
fn test_parse_url_line_without_scheme() {
    let result = parse_url_line("example.com");
    assert_eq!(result, Some("http://example.com".to_string()));
}

#[test]
fn test_parse_url_line_host_and_port() {
    let result = parse_url_line("localhost:8080");
    assert_eq!(result, Some("http://localhost:8080".to_string()));
}

#[test]
fn test_parse_url_line_invalid() {
    let result = parse_url_line("not a valid url!!!");
    assert_eq!(result, None);
}

#[test]
fn test_extract_url_path() {
    assert_eq!(extract_url_path("https://example.com/api/users"), "/api/users");
    assert_eq!(extract_url_path("https://example.com/"), "/");
    assert_eq!(extract_url_path("https://example.com"), "/");
}

#[test]
fn test_load_urls_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "https://example.com")?;
    writeln!(temp_file, "httpbin.org")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "  https://api.example.com  ")?;

    let path = PathBuf::from(temp_file.path());
    let urls = load_urls_from_file(&path)?;

    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], "https://example.com");
    assert_eq!(urls[1], "http://httpbin.org");
    assert_eq!(urls[2], "https://api.example.com");

    Ok(())
}

#[test]
fn test_load_urls_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();

    let path = PathBuf::from(temp_file.path());
    let result = load_urls_from_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("No valid URLs"));
}

#[test]
fn test_load_urls_from_missing_file() {
    let result = load_urls_from_file(&PathBuf::from("/definitely/not/here/hosts.txt"));
    assert!(result.unwrap_err().to_string().contains("Failed to read hosts file"));
}

#[test]
fn test_load_urls_from_source_single_url() {
    let url = Url::parse("https://example.com").unwrap();
    let result = load_urls_from_source(Some(&url), None).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0], "https://example.com/");
}

#[test]
fn test_load_urls_from_source_no_input() {
    let result = load_urls_from_source(None, None);
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Either --url or --hosts-file must be provided")
    );
}

#[test]
fn test_parse_modes() {
    let none: Option<std::slice::Iter<'_, String>> = None;
    assert_eq!(parse_modes(none).unwrap(), vec![Mode::Images, Mode::Meta]);

    let given = vec!["SEO".to_string(), " contact ".to_string(), "seo".to_string()];
    assert_eq!(parse_modes(Some(given.iter())).unwrap(), vec![Mode::Seo, Mode::Contact]);

    let unknown = vec!["weather".to_string()];
    assert!(parse_modes(Some(unknown.iter())).is_err());
}

#[test]
fn test_parse_tool_arguments() {
    assert_eq!(parse_tool_arguments("   ").unwrap(), serde_json::json!({}));
    assert_eq!(
        parse_tool_arguments(r#"{"url": "https://example.com", "modes": ["seo"]}"#).unwrap()["modes"],
        serde_json::json!(["seo"])
    );
    assert!(parse_tool_arguments("{not json").is_err());
}

#[tokio::test]
async fn test_render_and_write_reports() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html><head><title>Home</title></head><body><img src="/a.png"></body></html>"#,
                "text/html",
            ),
        )
        .mount(&server)
        .await;

    let config = CrawlerConfig::default().with_crawl_delay(Duration::ZERO);
    let request = CrawlRequest::new(format!("{}/", server.uri()), vec![Mode::Images]).with_depth(0);
    let first = execute_crawl(&config, &request, None).await.unwrap();
    let second = execute_crawl(&config, &request, None).await.unwrap();
    let reports = vec![first, second];

    let json = render_reports(&reports, ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);

    let single = render_reports(&reports[..1], ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&single).unwrap();
    assert_eq!(value["images"][0]["src"], serde_json::json!("/a.png"));

    let csv = render_reports(&reports, ReportFormat::Csv).unwrap();
    assert_eq!(csv.lines().filter(|l| l.starts_with("url,")).count(), 1);
    assert_eq!(csv.lines().count(), 3);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.csv");
    write_output(&csv, Some(&out), true).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), csv);
}
