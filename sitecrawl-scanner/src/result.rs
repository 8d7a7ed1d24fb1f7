use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// What happened to a frontier entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    Fetched,
    Failed { kind: String, reason: String },
    /// Disallowed by robots.txt; never requested.
    Skipped { reason: String },
}

/// Per-page fetch status record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(flatten)]
    pub outcome: PageOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    pub response_time_ms: u64,
    pub attempts: u32,
    pub links_found: usize,
}

impl PageResult {
    pub fn new(url: String, depth: u32) -> Self {
        Self {
            url,
            depth,
            status_code: None,
            outcome: PageOutcome::Fetched,
            content_type: None,
            content_length: None,
            response_time_ms: 0,
            attempts: 0,
            links_found: 0,
        }
    }

    pub fn with_error(url: String, depth: u32, error: &ScanError, attempts: u32) -> Self {
        Self {
            status_code: error.status(),
            outcome: PageOutcome::Failed {
                kind: error.kind().to_string(),
                reason: error.to_string(),
            },
            attempts,
            ..Self::new(url, depth)
        }
    }

    pub fn skipped(url: String, depth: u32, reason: impl Into<String>) -> Self {
        Self {
            outcome: PageOutcome::Skipped {
                reason: reason.into(),
            },
            ..Self::new(url, depth)
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self.outcome, PageOutcome::Fetched)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PageOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, PageOutcome::Skipped { .. })
    }
}
