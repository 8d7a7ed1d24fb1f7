pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    build_config, extract_url_path, load_urls_from_file, load_urls_from_source, parse_modes,
    parse_tool_arguments, parse_url_line, render_reports,
};
