use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the listings client and scenario runner.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("expectation failed: {0}")]
    Expectation(String),
}

impl Error {
    pub fn expectation(message: impl Into<String>) -> Self {
        Error::Expectation(message.into())
    }

    pub fn is_expectation(&self) -> bool {
        matches!(self, Error::Expectation(_))
    }
}
