pub mod config;
pub mod engines;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod report;

pub use error::{HarvestError, Result};
pub use config::Config;
pub use engines::SearchProvider;
pub use fetch::{HttpFetcher, PageFetcher, RetryController};
pub use harvest::{HarvestOrchestrator, ResultSet};
pub use report::RunReport;
