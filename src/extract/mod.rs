pub mod emails;
pub mod links;

pub use emails::extract_emails;
pub use links::{prioritize, CandidateLink, LinkExtractor, LinkPriority};
