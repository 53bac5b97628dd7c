use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Target parameter is missing")]
    MissingTarget,

    #[error("Target device not found in config: {0}")]
    UnknownTarget(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Wrong status code {0}")]
    Status(u16),

    #[error("Deadline exceeded while fetching {0}")]
    DeadlineExceeded(String),

    #[error("Failed to parse timeout from Prometheus header: {0}")]
    InvalidTimeoutHeader(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
