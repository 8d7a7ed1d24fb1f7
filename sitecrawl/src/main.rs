use colored::Colorize;
use commands::command_argument_builder;
use sitecrawl::handlers::{
    handle_crawl, handle_modes, handle_tool_call, handle_tool_schema, init_tracing, print_banner,
};

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    init_tracing(quiet);

    let result = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command, quiet).await,
        Some(("tool", primary_command)) => match primary_command.subcommand() {
            Some(("schema", _)) => handle_tool_schema(),
            Some(("call", secondary_command)) => handle_tool_call(secondary_command).await,
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("modes", _)) => {
            handle_modes();
            Ok(())
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
