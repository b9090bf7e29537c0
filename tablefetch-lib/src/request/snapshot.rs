//! View-facing state of a table request.

use std::ops::Range;

use crate::error::ErrorKind;
use crate::error::FetchError;

/// Lifecycle state of a table controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    /// Nothing in flight; the visible rows are up to date.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last current fetch failed; waiting for a retry or a parameter change.
    Error,
}

/// Everything a table view needs to render one frame.
#[derive(Debug, Clone)]
pub struct TableSnapshot<T> {
    /// Deduplicated, filtered and sorted rows.
    pub data: Vec<T>,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Error of the last failed fetch.
    pub error: Option<FetchError>,
    /// Whether "fetch next" is currently offered.
    pub has_next: bool,
    /// Server-reported total for the current query, if known.
    pub total: Option<usize>,
}

impl<T> TableSnapshot<T> {
    /// Returns the classification of the current error, if any.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(FetchError::kind)
    }

    /// Returns `true` when no rows are visible and nothing is loading.
    pub fn is_empty(&self) -> bool {
        !self.loading && self.data.is_empty()
    }

    /// Check if the visible rows are near the end of the data.
    ///
    /// Returns `true` if the last visible row is within `threshold` rows of
    /// the end and "fetch next" is on offer. A virtualized view calls this on
    /// scroll to decide whether to request the next page.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // Load more when within 5 rows of the end
    /// if snapshot.is_near_end(viewport.visible_rows(), 5) {
    ///     table.fetch_next().await;
    /// }
    /// ```
    pub fn is_near_end(&self, visible: Range<usize>, threshold: usize) -> bool {
        if !self.has_next || self.data.is_empty() {
            return false;
        }
        visible.end.saturating_add(threshold) >= self.data.len()
    }
}
