use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid HTTP bind address: {0}")]
    InvalidHttpBindAddress(String),

    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

/// Errors from a single live DNS query through the proxy
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Proxy returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid DNS-over-HTTPS response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QueryError>;
