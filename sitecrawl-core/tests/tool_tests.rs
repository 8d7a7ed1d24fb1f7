// Tests for the site_crawlAssets tool surface

use serde_json::{Value, json};
use sitecrawl_core::ToolError;
use sitecrawl_core::tool::{self, TOOL_NAME};
use sitecrawl_scanner::CrawlerConfig;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> CrawlerConfig {
    CrawlerConfig::default()
        .with_crawl_delay(Duration::ZERO)
        .with_timeout(Duration::from_secs(5))
}

async fn call(arguments: Value) -> Value {
    let text = tool::call(&test_config(), TOOL_NAME, arguments).await.unwrap();
    serde_json::from_str(&text).unwrap()
}

// ============================================================================
// Error payloads
// ============================================================================

#[tokio::test]
async fn test_missing_url() {
    assert_eq!(call(json!({"modes": ["images"]})).await, json!({"error": "URL is required"}));
    assert_eq!(
        call(json!({"url": "", "modes": ["images"]})).await,
        json!({"error": "URL is required"})
    );
}

#[tokio::test]
async fn test_empty_modes() {
    assert_eq!(
        call(json!({"url": "https://example.com", "modes": []})).await,
        json!({"error": "At least one mode is required"})
    );
    assert_eq!(
        call(json!({"url": "https://example.com"})).await,
        json!({"error": "At least one mode is required"})
    );
}

#[tokio::test]
async fn test_unknown_mode_is_a_crawl_failure() {
    let result = call(json!({"url": "https://example.com", "modes": ["images", "weather"]})).await;

    assert_eq!(result["url"], json!("https://example.com"));
    let message = result["error"].as_str().unwrap();
    assert!(message.starts_with("Crawling failed: "));
    assert!(message.contains("weather"));
}

#[tokio::test]
async fn test_out_of_range_depth() {
    let result = call(json!({"url": "https://example.com", "modes": ["seo"], "depth": 9})).await;
    assert!(result["error"].as_str().unwrap().contains("depth"));
}

#[tokio::test]
async fn test_fractional_depth_is_rejected() {
    let result = call(json!({"url": "https://example.com", "modes": ["seo"], "depth": 1.5})).await;
    assert_eq!(
        result["error"],
        json!("Crawling failed: depth must be between 0 and 5, got 1.5")
    );
}

#[tokio::test]
async fn test_invalid_url() {
    let result = call(json!({"url": "definitely not a url", "modes": ["seo"]})).await;

    assert_eq!(result["url"], json!("definitely not a url"));
    assert!(result["error"].as_str().unwrap().starts_with("Crawling failed: "));
}

#[tokio::test]
async fn test_malformed_arguments() {
    let result = call(json!({"url": "https://example.com", "modes": "images"})).await;
    assert!(result["error"].as_str().unwrap().starts_with("Crawling failed: "));
}

#[tokio::test]
async fn test_unknown_tool_name() {
    let result = tool::call(&test_config(), "site_somethingElse", json!({})).await;
    assert!(matches!(result, Err(ToolError::UnknownTool(name)) if name == "site_somethingElse"));
}

// ============================================================================
// Successful calls
// ============================================================================

#[tokio::test]
async fn test_successful_call_returns_output_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("server", "nginx")
                .set_body_raw(
                    r#"<html><head><title>Acme</title></head><body><img src="/logo.png" alt="Acme"></body></html>"#,
                    "text/html",
                ),
        )
        .mount(&server)
        .await;

    let url = format!("{}/", server.uri());
    let result = call(json!({
        "url": url,
        "modes": ["images", "infrastructure"],
        "depth": 0.0,
        "max_pages": 5
    }))
    .await;

    assert!(result.get("error").is_none());
    assert_eq!(result["url"], json!(url));
    assert_eq!(result["pages_crawled"], json!(1));
    assert_eq!(result["images"].as_array().unwrap().len(), 1);
    assert_eq!(result["infrastructure"]["server"], json!("nginx"));
    assert!(result["pages"].is_array());
    assert!(result.get("seo").is_none());
}
