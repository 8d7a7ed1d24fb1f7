// Report rendering for finished crawls

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitecrawl_scanner::{PageOutcome, PageResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::session::CrawlReport;

const HEAVY_RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const LIGHT_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

pub fn generate_report(report: &CrawlReport, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => generate_json_report(report),
        ReportFormat::Markdown => Ok(generate_markdown_report(report)),
        ReportFormat::Csv => Ok(generate_csv_report(report)),
    }
}

/// Item count for list modes, populated field count for object modes.
pub fn mode_summary(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("{} items", items.len()),
        Value::Object(fields) => {
            let populated = fields.values().filter(|v| is_populated(v)).count();
            format!("{} fields", populated)
        }
        Value::Null => "none".to_string(),
        other => other.to_string(),
    }
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn outcome_label(page: &PageResult) -> String {
    match &page.outcome {
        PageOutcome::Fetched => "fetched".to_string(),
        PageOutcome::Failed { kind, .. } => format!("failed ({})", kind),
        PageOutcome::Skipped { .. } => "skipped".to_string(),
    }
}

fn status_indicator(page: &PageResult) -> &'static str {
    match (&page.outcome, page.status_code) {
        (PageOutcome::Skipped { .. }, _) => "-",
        (_, Some(200..=299)) => "✓",
        (_, Some(300..=399)) => "→",
        (_, Some(400..=499)) => "⚠",
        (_, Some(_)) => "✗",
        (_, None) => "?",
    }
}

fn status_text(page: &PageResult) -> String {
    page.status_code
        .map(|s| s.to_string())
        .unwrap_or_else(|| "---".to_string())
}

pub fn generate_text_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str(HEAVY_RULE);
    out.push_str("                          SITECRAWL REPORT\n");
    out.push_str(HEAVY_RULE);
    out.push('\n');

    out.push_str(&format!("Target:       {}\n", report.url));
    out.push_str(&format!(
        "Modes:        {}\n",
        report.modes.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
    ));
    out.push_str(&format!("Depth:        {}\n", report.depth));
    out.push_str(&format!("Page Limit:   {}\n", report.max_pages));
    out.push_str(&format!(
        "Started:      {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Duration:     {:.2} seconds\n", report.duration_secs()));
    out.push('\n');

    out.push_str(HEAVY_RULE);
    out.push_str("SUMMARY\n");
    out.push_str(HEAVY_RULE);
    out.push('\n');

    out.push_str(&format!("  Pages crawled:  {}\n", report.pages_crawled));
    out.push_str(&format!("  Pages failed:   {}\n", report.pages_failed));
    out.push_str(&format!("  Pages skipped:  {}\n", report.pages_skipped));
    out.push('\n');

    for (mode, value) in &report.results {
        out.push_str(&format!("  [{}] {}\n", mode, mode_summary(value)));
    }
    out.push('\n');

    out.push_str(HEAVY_RULE);
    out.push_str("PAGES\n");
    out.push_str(HEAVY_RULE);
    out.push('\n');

    if report.pages.is_empty() {
        out.push_str("  (none)\n");
    }

    for page in &report.pages {
        out.push_str(&format!(
            "{} {}  [{} d{}] {}ms  {}\n",
            status_indicator(page),
            status_text(page),
            outcome_label(page),
            page.depth,
            page.response_time_ms,
            page.url
        ));
        match &page.outcome {
            PageOutcome::Failed { reason, .. } | PageOutcome::Skipped { reason } => {
                out.push_str(&format!("    {}\n", reason));
            }
            PageOutcome::Fetched => {}
        }
    }
    out.push('\n');

    out.push_str(LIGHT_RULE);
    out.push_str("Generated by sitecrawl\n");

    out
}

pub fn generate_json_report(report: &CrawlReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn generate_markdown_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Crawl report: {}\n\n", report.url));
    out.push_str(&format!(
        "- **Modes:** {}\n",
        report.modes.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
    ));
    out.push_str(&format!("- **Depth:** {}\n", report.depth));
    out.push_str(&format!("- **Page limit:** {}\n", report.max_pages));
    out.push_str(&format!("- **Started:** {}\n", report.started_at.to_rfc3339()));
    out.push_str(&format!("- **Duration:** {:.2}s\n\n", report.duration_secs()));

    out.push_str("## Summary\n\n");
    out.push_str("| Pages crawled | Pages failed | Pages skipped |\n");
    out.push_str("|---|---|---|\n");
    out.push_str(&format!(
        "| {} | {} | {} |\n\n",
        report.pages_crawled, report.pages_failed, report.pages_skipped
    ));

    out.push_str("## Modes\n\n");
    for (mode, value) in &report.results {
        out.push_str(&format!("### {}\n\n", mode));
        out.push_str(&format!("{}\n\n", mode_summary(value)));
        let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        out.push_str(&format!("```json\n{}\n```\n\n", body));
    }

    out.push_str("## Pages\n\n");
    out.push_str("| URL | Depth | Status | Outcome | Time (ms) |\n");
    out.push_str("|---|---|---|---|---|\n");
    for page in &report.pages {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            page.url,
            page.depth,
            status_text(page),
            outcome_label(page),
            page.response_time_ms
        ));
    }

    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per page in crawl order.
pub fn generate_csv_report(report: &CrawlReport) -> String {
    let mut out = String::from("url,depth,status_code,outcome,reason,content_type,response_time_ms,attempts,links_found\n");

    for page in &report.pages {
        let (outcome, reason) = match &page.outcome {
            PageOutcome::Fetched => ("fetched", ""),
            PageOutcome::Failed { reason, .. } => ("failed", reason.as_str()),
            PageOutcome::Skipped { reason } => ("skipped", reason.as_str()),
        };

        let row = [
            csv_field(&page.url),
            page.depth.to_string(),
            page.status_code.map(|s| s.to_string()).unwrap_or_default(),
            outcome.to_string(),
            csv_field(reason),
            csv_field(page.content_type.as_deref().unwrap_or_default()),
            page.response_time_ms.to_string(),
            page.attempts.to_string(),
            page.links_found.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
