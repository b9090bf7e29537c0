//! Stale-response guard for overlapping requests.

use std::fmt;

use crate::error::StaleResponse;

/// Opaque handle identifying one issued request.
///
/// Tokens are generations: a later token always compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tracks the in-flight request and discards results of superseded ones.
///
/// Issuing a request immediately makes every earlier token non-current.
/// Settling a non-current token has no visible effect: the loading flag
/// stays up until the current request settles.
///
/// # Example
///
/// ```
/// use tablefetch_lib::request::RequestSequencer;
///
/// let mut sequencer = RequestSequencer::new();
/// let first = sequencer.issue();
/// let second = sequencer.issue();
///
/// assert!(!sequencer.is_current(first));
/// assert!(sequencer.settle(first).is_err());
/// assert!(sequencer.is_loading());
///
/// assert!(sequencer.settle(second).is_ok());
/// assert!(!sequencer.is_loading());
/// ```
#[derive(Debug, Default)]
pub struct RequestSequencer {
    /// Newest token issued so far.
    latest: u64,
    /// Token of the current request, while it has not settled.
    in_flight: Option<RequestToken>,
}

impl RequestSequencer {
    /// Creates a sequencer with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding any earlier one.
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        let token = RequestToken(self.latest);
        if let Some(previous) = self.in_flight.replace(token) {
            log::debug!("[sequencer] request {} supersedes {}", token, previous);
        }
        token
    }

    /// Returns `true` if no newer request was issued after `token`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    /// Records that the request behind `token` has settled.
    ///
    /// Returns `Err` for a superseded token; the caller must drop the
    /// result without touching any state.
    pub fn settle(&mut self, token: RequestToken) -> Result<(), StaleResponse> {
        if !self.is_current(token) || self.in_flight != Some(token) {
            let stale = StaleResponse {
                token,
                current: RequestToken(self.latest),
            };
            log::debug!("[sequencer] {}", stale);
            return Err(stale);
        }
        self.in_flight = None;
        Ok(())
    }

    /// Returns `true` while the current request has not settled.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns the token of the current unsettled request, if any.
    pub fn in_flight(&self) -> Option<RequestToken> {
        self.in_flight
    }
}
