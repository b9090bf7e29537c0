//! Stale response signal

use crate::request::RequestToken;

/// A response arrived for a request that has since been superseded.
///
/// Never surfaced to the view layer; the result is dropped and logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("response for request {token} was superseded by request {current}")]
pub struct StaleResponse {
    /// The token the response belongs to.
    pub token: RequestToken,
    /// The newest token issued at the time the response settled.
    pub current: RequestToken,
}
