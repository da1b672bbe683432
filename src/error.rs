//! Error types for the reward validation service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewardsError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API error: {code} - {message}")]
    ApiError {
        code: String,
        message: String,
    },

    #[error("Source not configured: {0}")]
    SourceNotConfigured(String),

    #[error("Upstream returned an unusable response: {0}")]
    UpstreamError(String),

    #[error("No active campaign found")]
    NoActiveCampaign,

    #[error("Unsupported event: network={network} action={action}")]
    UnsupportedEvent {
        network: String,
        action: String,
    },

    #[error("Invalid event payload: {0}")]
    InvalidEvent(String),

    #[error("Invalid data: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, RewardsError>;
