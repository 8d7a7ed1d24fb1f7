pub mod aggregate;
pub mod error;
pub mod extract;
pub mod mode;
pub mod report;
pub mod session;
pub mod tool;

pub use aggregate::Aggregate;
pub use error::{ExtractError, SessionError, ToolError};
pub use extract::{Extractor, ExtractorRegistry, PageContext};
pub use mode::Mode;
pub use report::ReportFormat;
pub use session::{execute_crawl, execute_with_registry, CrawlReport, CrawlRequest};
