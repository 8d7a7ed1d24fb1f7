//! The `site_crawlAssets` tool: crawl a site and extract the requested modes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sitecrawl_scanner::CrawlerConfig;
use tracing::warn;

use crate::error::{SessionError, ToolError};
use crate::mode::Mode;
use crate::session::{
    execute_crawl, CrawlRequest, DEFAULT_DEPTH, DEFAULT_MAX_PAGES, MAX_DEPTH, MAX_PAGES_LIMIT,
};

pub const TOOL_NAME: &str = "site_crawlAssets";

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Raw tool arguments. Numbers are taken as JSON numbers, so `1.0` is a valid depth.
#[derive(Debug, Deserialize)]
struct CrawlArguments {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    modes: Vec<String>,
    #[serde(default = "default_depth")]
    depth: f64,
    #[serde(default = "default_max_pages")]
    max_pages: f64,
}

fn default_depth() -> f64 {
    DEFAULT_DEPTH as f64
}

fn default_max_pages() -> f64 {
    DEFAULT_MAX_PAGES as f64
}

pub fn definition() -> ToolDefinition {
    let mode_names: Vec<&str> = Mode::ALL.iter().map(|m| m.as_str()).collect();

    ToolDefinition {
        name: TOOL_NAME.to_string(),
        description: "Crawl a website and extract images, metadata, brand, SEO, performance, \
                      security, compliance, infrastructure, legal, careers, references and \
                      contact information"
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "format": "uri",
                    "description": "Website URL to crawl"
                },
                "modes": {
                    "type": "array",
                    "items": { "type": "string", "enum": mode_names },
                    "minItems": 1,
                    "description": "Extraction modes to run on every page"
                },
                "depth": {
                    "type": "number",
                    "default": DEFAULT_DEPTH,
                    "minimum": 0,
                    "maximum": MAX_DEPTH,
                    "description": "Maximum link depth from the start URL"
                },
                "max_pages": {
                    "type": "number",
                    "default": DEFAULT_MAX_PAGES,
                    "minimum": 1,
                    "maximum": MAX_PAGES_LIMIT,
                    "description": "Maximum number of pages to fetch"
                }
            },
            "required": ["url", "modes"]
        }),
    }
}

fn error_payload(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

fn crawl_failed(reason: impl std::fmt::Display, url: &str) -> Value {
    json!({ "error": format!("Crawling failed: {}", reason), "url": url })
}

/// Build a [`CrawlRequest`] from raw tool arguments.
fn request_from(args: CrawlArguments) -> Result<CrawlRequest, SessionError> {
    let url = args.url.unwrap_or_default();
    if url.trim().is_empty() {
        return Err(SessionError::MissingUrl);
    }
    if args.modes.is_empty() {
        return Err(SessionError::NoModes);
    }

    let modes = Mode::parse_list(&args.modes)?;

    let depth = whole_number_in("depth", args.depth, 0, MAX_DEPTH as i64)?;
    let max_pages = whole_number_in("max_pages", args.max_pages, 1, MAX_PAGES_LIMIT as i64)?;

    Ok(CrawlRequest::new(url, modes)
        .with_depth(depth as u32)
        .with_max_pages(max_pages as usize))
}

fn whole_number_in(field: &'static str, value: f64, min: i64, max: i64) -> Result<i64, SessionError> {
    if value.fract() == 0.0 && value >= min as f64 && value <= max as f64 {
        Ok(value as i64)
    } else {
        Err(SessionError::OutOfRange { field, min, max, value })
    }
}

/// Invoke tool `name` and return its JSON text result.
///
/// Request problems and crawl failures come back as `{"error": ...}` payloads;
/// only an unknown tool name is an `Err`.
pub async fn call(config: &CrawlerConfig, name: &str, arguments: Value) -> Result<String, ToolError> {
    if name != TOOL_NAME {
        return Err(ToolError::UnknownTool(name.to_string()));
    }

    let raw_url = arguments
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let payload = match serde_json::from_value::<CrawlArguments>(arguments) {
        Err(e) => crawl_failed(SessionError::InvalidArguments(e.to_string()), &raw_url),
        Ok(args) => match request_from(args) {
            Err(SessionError::MissingUrl) => error_payload("URL is required"),
            Err(SessionError::NoModes) => error_payload("At least one mode is required"),
            Err(e) => crawl_failed(e, &raw_url),
            Ok(request) => match execute_crawl(config, &request, None).await {
                Ok(report) => serde_json::to_value(&report)?,
                Err(e) => {
                    warn!("Crawl of {} failed: {}", request.url, e);
                    crawl_failed(e, &request.url)
                }
            },
        },
    };

    Ok(serde_json::to_string_pretty(&payload)?)
}
