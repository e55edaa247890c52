//! Vision processing errors

use thiserror::Error;

/// Errors that can occur during image analysis
#[derive(Debug, Error)]
pub enum VisionError {
    /// Failed to connect to the vision service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the vision service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Analysis failed on the provider side
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Model reply could not be parsed as the expected JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during processing
    #[error("Vision processing timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(30000)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
