use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`DnsQuerier`](crate::querier::DnsQuerier) call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("query timed out")]
    Timeout,

    #[error("query tool unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

impl QueryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, QueryError::Timeout)
    }

    /// A missing tool will not appear on retry
    pub fn is_retryable(&self) -> bool {
        !matches!(self, QueryError::Unavailable(_))
    }
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            QueryError::Timeout
        } else {
            QueryError::Network(err.to_string())
        }
    }
}

/// Errors that stop a validation before a chain could be built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("DNSKEY query for {domain} failed: {source}")]
    TargetQuery {
        domain: String,
        #[source]
        source: QueryError,
    },

    #[error("validation timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid concurrency limit: {0}")]
    InvalidConcurrency(String),

    #[error("Invalid retry count: {0}")]
    InvalidRetries(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, ValidationError>;
