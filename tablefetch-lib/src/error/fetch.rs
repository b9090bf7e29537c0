//! Page fetch error types

/// Coarse error classification exposed to the view layer.
///
/// Both kinds are surfaced the same way: the controller moves to its error
/// state and waits for the user to retry or change parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport-level failure (DNS, refused connection, timeout, abort).
    Network,
    /// The API answered with a non-success status or an unreadable body.
    Server,
}

/// Errors that can occur while fetching a page of rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport failure before a response was received.
    #[error("Network error: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// The request did not complete in time.
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP response from the API.
    #[error("HTTP {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The response body could not be decoded into a page.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl FetchError {
    /// Creates a new network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a new server error.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the view-facing classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::Timeout => ErrorKind::Network,
            Self::Server { .. } | Self::Parse { .. } => ErrorKind::Server,
        }
    }

    /// Returns the HTTP status code if this is a server error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::server(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            Self::parse(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}
