use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitecrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitecrawl")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and progress output")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Politely crawl a site (or a list of sites) and extract the requested \
                modes from every page.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The URL to start crawling from")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of URLs to crawl")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-m --"modes" <MODES>)
                        .required(false)
                        .help("Comma-separated extraction modes (default: images,meta)")
                        .value_delimiter(',')
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth from the start URL (0-5)")
                        .value_parser(clap::value_parser!(u32).range(0..=5))
                        .default_value("1"),
                )
                .arg(
                    arg!(-p --"max-pages" <COUNT>)
                        .required(false)
                        .help("Maximum number of pages to fetch per site (1-500)")
                        .value_parser(clap::value_parser!(u64).range(1..=500))
                        .default_value("50"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Number of concurrent fetches (default: SITECRAWL_MAX_CONCURRENT or 5)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds (default: SITECRAWL_REQUEST_TIMEOUT or 30)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"delay-ms" <MILLISECONDS>)
                        .required(false)
                        .help("Minimum delay between requests to the same host")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"user-agent" <AGENT>)
                        .required(false)
                        .help("User-Agent header sent with every request"),
                )
                .arg(
                    arg!(--"ignore-robots")
                        .required(false)
                        .help("Do not fetch or honour robots.txt")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown, csv")
                        .value_parser(["text", "json", "markdown", "csv"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("tool")
                .about("Use the site_crawlAssets tool surface directly")
                .subcommand_required(true)
                .subcommand(command!("schema").about("Print the tool definition as JSON"))
                .subcommand(
                    command!("call")
                        .about("Call the tool with JSON arguments and print its JSON result")
                        .arg(
                            arg!(-a --"args" <JSON>)
                                .required(false)
                                .help("Tool arguments as a JSON object (default: read from stdin)"),
                        )
                        .arg(
                            arg!(-n --"name" <TOOL>)
                                .required(false)
                                .help("Tool name")
                                .default_value("site_crawlAssets"),
                        ),
                ),
        )
        .subcommand(command!("modes").about("List the available extraction modes"))
}
