use thiserror::Error;

/// Failure to retrieve a remote table. The only fatal path of a run:
/// everything downstream of a fetched table defaults instead of failing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),
}

/// Invalid configuration, rejected before any row is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown feature column '{0}'")]
    UnknownFeature(String),
    #[error("node counts must be nonzero")]
    ZeroNodeCount,
    #[error("max_rows must be nonzero")]
    ZeroRowCap,
}
