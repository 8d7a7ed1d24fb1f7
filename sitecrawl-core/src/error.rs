use sitecrawl_scanner::ScanError;
use thiserror::Error;

/// Why a crawl request could not run (or stopped before producing a report).
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("At least one mode is required")]
    NoModes,

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: f64,
    },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Extractor setup failed: {0}")]
    Extractor(#[from] ExtractError),
}

/// A single extractor failing on a single page.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors a tool call cannot express as a JSON error payload.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Could not serialize tool output: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
