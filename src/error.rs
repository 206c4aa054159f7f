use thiserror::Error;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Blocked by target: {0}")]
    Blocked(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Fetch capability unavailable: {0}")]
    FetchUnavailable(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum RecoveryStrategy {
    RetryWithBackoff,
    SkipLink,
    LogAndContinue,
    Abort,
}

impl HarvestError {
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            HarvestError::NetworkError(_) => RecoveryStrategy::RetryWithBackoff,
            HarvestError::Blocked(_) => RecoveryStrategy::RetryWithBackoff,
            HarvestError::ParseError(_) => RecoveryStrategy::LogAndContinue,
            HarvestError::InvalidLink(_) => RecoveryStrategy::SkipLink,
            HarvestError::ConfigError(_) => RecoveryStrategy::Abort,
            HarvestError::StorageError(_) => RecoveryStrategy::LogAndContinue,
            HarvestError::FetchUnavailable(_) => RecoveryStrategy::Abort,
        }
    }
}

// Conversion implementations for common error types
impl From<std::io::Error> for HarvestError {
    fn from(err: std::io::Error) -> Self {
        HarvestError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for HarvestError {
    fn from(err: serde_json::Error) -> Self {
        HarvestError::ParseError(err.to_string())
    }
}

impl From<toml::de::Error> for HarvestError {
    fn from(err: toml::de::Error) -> Self {
        HarvestError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for HarvestError {
    fn from(err: reqwest::Error) -> Self {
        HarvestError::NetworkError(err.to_string())
    }
}

impl From<url::ParseError> for HarvestError {
    fn from(err: url::ParseError) -> Self {
        HarvestError::InvalidLink(err.to_string())
    }
}
