//! Fetcher construction errors

/// Errors that can occur while building an HTTP page fetcher.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The endpoint could not be parsed as an absolute URL.
    #[error("Invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        /// The rejected endpoint string.
        endpoint: String,
        /// The underlying parse failure.
        source: url::ParseError,
    },

    /// The endpoint URL cannot carry query parameters.
    #[error("Endpoint '{0}' cannot be used as a base URL")]
    CannotBeABase(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
