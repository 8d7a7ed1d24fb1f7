use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Rate limited by {url} after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ScanError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ScanError::Status { status, .. } => Some(*status),
            ScanError::RateLimited { .. } => Some(429),
            ScanError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short machine-readable kind used in page status records.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::RateLimited { .. } => "rate_limited",
            ScanError::Timeout(_) => "timeout",
            ScanError::Status { .. } => "http_status",
            ScanError::HttpError(_) => "connection",
            ScanError::InvalidUrl(_) => "invalid_url",
            ScanError::ParseError(_) => "parse",
            ScanError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
