use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitecrawl_core::report::{self, ReportFormat};
use sitecrawl_core::{CrawlReport, CrawlRequest, Mode, execute_crawl, tool};
use sitecrawl_scanner::{CrawlerConfig, PageOutcome, PageResult, ProgressCallback};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

pub const DEFAULT_MODES: [Mode; 2] = [Mode::Images, Mode::Meta];

pub fn print_banner() {
    eprintln!(
        "{} {}",
        "sitecrawl".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    eprintln!("{}", "polite site crawling and extraction".bright_black());
    eprintln!();
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`, or `warn` when quiet).
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

// Helper functions for crawl handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(url: Option<&Url>, hosts_file: Option<&PathBuf>) -> Result<Vec<String>> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        bail!("Either --url or --hosts-file must be provided")
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        bail!("No valid URLs found in {}", path.display());
    }

    Ok(urls)
}

/// Parse a single line as a URL, adding http:// when no web scheme is present
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && matches!(url.scheme(), "http" | "https")
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok_and(|url| url.host_str().is_some()) {
        return Some(with_scheme);
    }

    warn!("Skipping invalid URL '{}'", line);
    None
}

/// Parse `-m` values, falling back to [`DEFAULT_MODES`].
pub fn parse_modes<'a>(values: Option<impl Iterator<Item = &'a String>>) -> Result<Vec<Mode>> {
    let names: Vec<&String> = match values {
        Some(values) => values.filter(|v| !v.trim().is_empty()).collect(),
        None => return Ok(DEFAULT_MODES.to_vec()),
    };
    Ok(Mode::parse_list(&names)?)
}

/// Environment configuration with command-line overrides applied on top.
pub fn build_config(args: &ArgMatches) -> Result<CrawlerConfig> {
    let mut config = CrawlerConfig::from_env();

    if let Some(threads) = args.get_one::<usize>("threads") {
        config = config.with_max_concurrent(*threads);
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        config = config.with_timeout(Duration::from_secs(*timeout));
    }
    if let Some(delay) = args.get_one::<u64>("delay-ms") {
        config = config.with_crawl_delay(Duration::from_millis(*delay));
    }
    if let Some(agent) = args.get_one::<String>("user-agent") {
        config = config.with_user_agent(agent.clone());
    }
    if args.get_flag("ignore-robots") {
        config = config.with_robots(false);
    }

    config.validate()?;
    Ok(config)
}

fn progress_spinner(target: &str) -> Result<(ProgressBar, ProgressCallback)> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Crawling {}...", target));

    let processed = Arc::new(AtomicUsize::new(0));
    let bar = spinner.clone();
    let callback: ProgressCallback = Arc::new(move |page: &PageResult| {
        let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
        bar.set_message(format!("{} pages processed, last: {}", count, extract_url_path(&page.url)));
    });

    Ok((spinner, callback))
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() { "/".to_string() } else { path }
        })
        .unwrap_or_else(|| url.to_string())
}

fn print_summary(report: &CrawlReport) {
    eprintln!(
        "{} {}: {} pages crawled, {} failed, {} skipped in {:.2}s",
        "✓".green().bold(),
        report.url.bright_white(),
        report.pages_crawled.to_string().green(),
        report.pages_failed.to_string().red(),
        report.pages_skipped.to_string().yellow(),
        report.duration_secs()
    );

    for page in report.pages.iter().filter(|p| p.is_failed()) {
        if let PageOutcome::Failed { reason, .. } = &page.outcome {
            eprintln!("  {} {}", "✗".red(), reason);
        }
    }
}

/// Render one or more reports as a single document.
pub fn render_reports(reports: &[CrawlReport], format: ReportFormat) -> Result<String> {
    match (format, reports) {
        (_, []) => Ok(String::new()),
        (ReportFormat::Json, [single]) => Ok(report::generate_json_report(single)?),
        (ReportFormat::Json, many) => Ok(serde_json::to_string_pretty(many)?),
        (ReportFormat::Csv, many) => {
            let mut out = String::new();
            for (i, r) in many.iter().enumerate() {
                let csv = report::generate_csv_report(r);
                // Header only once
                let body = if i == 0 { csv.as_str() } else { csv.split_once('\n').map_or("", |(_, rest)| rest) };
                out.push_str(body);
            }
            Ok(out)
        }
        (format, many) => {
            let rendered = many
                .iter()
                .map(|r| report::generate_report(r, format))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rendered.join("\n"))
        }
    }
}

/// Write `content` to `output` (tilde-expanded) or stdout.
pub fn write_output(content: &str, output: Option<&PathBuf>, quiet: bool) -> Result<()> {
    match output {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            let path = Path::new(&expanded);
            report::save_report(content, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                eprintln!("{} Report saved to {}", "✓".green().bold(), path.display());
            }
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> Result<()> {
    let urls = load_urls_from_source(args.get_one::<Url>("url"), args.get_one::<PathBuf>("hosts-file"))?;
    let modes = parse_modes(args.get_many::<String>("modes"))?;
    let config = build_config(args)?;

    let depth = args.get_one::<u32>("depth").copied().unwrap_or(1);
    let max_pages = args.get_one::<u64>("max-pages").copied().unwrap_or(50) as usize;
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    debug!("Crawl configuration: {:?}", config);

    let mut reports = Vec::with_capacity(urls.len());
    let mut failures = 0;

    for url in &urls {
        let request = CrawlRequest::new(url.clone(), modes.clone())
            .with_depth(depth)
            .with_max_pages(max_pages);

        let (spinner, progress) = if quiet {
            (None, None)
        } else {
            let (spinner, callback) = progress_spinner(url)?;
            (Some(spinner), Some(callback))
        };

        let result = execute_crawl(&config, &request, progress).await;

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match result {
            Ok(report) => {
                if !quiet {
                    print_summary(&report);
                }
                reports.push(report);
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} Crawl of {} failed: {}", "✗".red().bold(), url, e);
            }
        }
    }

    if reports.is_empty() && failures > 0 {
        return Err(anyhow!("All {} crawl(s) failed", failures));
    }

    let rendered = render_reports(&reports, format)?;
    write_output(&rendered, args.get_one::<PathBuf>("output"), quiet)
}

pub fn handle_tool_schema() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&tool::definition())?);
    Ok(())
}

/// Parse tool arguments; an empty input means an empty object.
pub fn parse_tool_arguments(raw: &str) -> Result<serde_json::Value> {
    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(raw).context("Tool arguments must be valid JSON")
}

pub async fn handle_tool_call(args: &ArgMatches) -> Result<()> {
    let raw = match args.get_one::<String>("args") {
        Some(raw) => raw.clone(),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read tool arguments from stdin")?;
            buffer
        }
    };

    let arguments = parse_tool_arguments(&raw)?;
    let name = args
        .get_one::<String>("name")
        .map(String::as_str)
        .unwrap_or(tool::TOOL_NAME);

    let config = CrawlerConfig::from_env();
    let output = tool::call(&config, name, arguments).await?;
    println!("{}", output);
    Ok(())
}

pub fn handle_modes() {
    for mode in Mode::ALL {
        let kind = if mode.is_list() { "list" } else { "object" };
        println!(
            "  {} {} {}",
            format!("{:<16}", mode.as_str()).bright_white().bold(),
            format!("{:<7}", kind).bright_black(),
            mode.description()
        );
    }
}
