//! Table request state machine.
//!
//! [`TableRequestController`] decides, for every sort/filter change or
//! "fetch next", whether rows must come from the server and how the result
//! is reconciled with what is already buffered. It performs no I/O: every
//! operation that needs the network returns a [`FetchRequest`], and the
//! caller feeds the outcome back through [`TableRequestController::resolve`].
//! The async [`TableRequest`](super::TableRequest) driver does exactly that.

use std::fmt;

use crate::error::FetchError;
use crate::model::TableRow;
use crate::query::Filters;
use crate::query::Page;
use crate::query::PageQuery;
use crate::query::SortDescriptor;

use super::PageAccumulator;
use super::RequestSequencer;
use super::RequestState;
use super::RequestToken;
use super::TableConfig;
use super::TableSnapshot;

/// How the rows of a fetch are reconciled with the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Discard the buffer and start over from offset 0.
    Replace,
    /// Add the rows after the buffered ones.
    Append,
}

/// A fetch the caller must execute on behalf of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Token to pass back to [`TableRequestController::resolve`].
    pub token: RequestToken,
    /// Reconciliation applied when the fetch succeeds.
    pub kind: FetchKind,
    /// Parameters for the page fetcher.
    pub query: PageQuery,
}

/// Outcome of feeding a fetch result back into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The page was applied to the buffer.
    Applied,
    /// The fetch failed; the controller is in its error state.
    Failed,
    /// The request had been superseded; nothing changed.
    Stale,
}

/// Coordinates sorting, filtering and pagination for one table.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use tablefetch_lib::model::TableRow;
/// use tablefetch_lib::query::{Filters, Page, SortDescriptor};
/// use tablefetch_lib::request::{Resolution, TableConfig, TableRequestController};
///
/// #[derive(Clone, Debug)]
/// struct Member { id: u32 }
///
/// impl TableRow for Member {
///     type Id = u32;
///     fn id(&self) -> u32 { self.id }
///     fn compare_column(&self, other: &Self, _column: &str) -> Ordering { self.id.cmp(&other.id) }
/// }
///
/// let mut table = TableRequestController::new(
///     TableConfig::default().with_page_size(2),
///     SortDescriptor::asc("id"),
///     Filters::none(),
/// );
///
/// let request = table.mount();
/// assert_eq!(request.query.offset, 0);
///
/// let page = Page::new(vec![Member { id: 1 }, Member { id: 2 }]).with_total(3);
/// assert_eq!(table.resolve(request.token, Ok(page)), Resolution::Applied);
/// assert!(table.has_next());
///
/// let next = table.fetch_next().unwrap();
/// assert_eq!(next.query.offset, 2);
/// table.resolve(next.token, Ok(Page::new(vec![Member { id: 3 }])));
/// assert_eq!(table.data().len(), 3);
/// assert!(!table.has_next());
/// ```
pub struct TableRequestController<T: TableRow> {
    config: TableConfig,
    sort: SortDescriptor,
    filters: Filters<T>,
    accumulator: PageAccumulator<T>,
    sequencer: RequestSequencer,
    /// The current in-flight request.
    pending: Option<FetchRequest>,
    /// Server filter parameters the buffered rows were fetched under.
    buffer_filters: Vec<(String, String)>,
    error: Option<FetchError>,
    /// Visible rows: the buffer refiltered and re-sorted.
    data: Vec<T>,
    mounted: bool,
}

impl<T: TableRow> TableRequestController<T> {
    /// Creates a controller for the initial sort and filters.
    ///
    /// Nothing is fetched until [`mount`](Self::mount) is called.
    pub fn new(config: TableConfig, sort: SortDescriptor, filters: Filters<T>) -> Self {
        Self {
            config,
            sort,
            filters,
            accumulator: PageAccumulator::new(),
            sequencer: RequestSequencer::new(),
            pending: None,
            buffer_filters: Vec::new(),
            error: None,
            data: Vec::new(),
            mounted: false,
        }
    }

    /// Issues the initial fetch.
    pub fn mount(&mut self) -> FetchRequest {
        self.begin_replace()
    }

    /// Applies new sort and filter values.
    ///
    /// A sort change always refetches from offset 0, and takes precedence
    /// when both change at once. A filter-only change that keeps every
    /// server filter the buffer was fetched under is applied to the buffer
    /// locally when that leaves at least a page of rows or the buffer
    /// already holds every row the server has; otherwise the buffer is
    /// refetched under the new filters. Any change while in the error state
    /// refetches.
    pub fn update(&mut self, sort: SortDescriptor, filters: Filters<T>) -> Option<FetchRequest> {
        let sort_changed = sort != self.sort;
        let filters_changed = !filters.same_as(&self.filters);
        self.sort = sort;
        self.filters = filters;

        if !sort_changed && !filters_changed {
            self.refresh_data();
            return None;
        }

        if sort_changed || self.state() == RequestState::Error || !self.mounted {
            return Some(self.begin_replace());
        }

        // The in-flight replace was built with the old filters.
        if self.pending_kind() == Some(FetchKind::Replace) {
            return Some(self.begin_replace());
        }

        self.refresh_data();
        if !self.narrows_buffer() {
            log::debug!("[table] filters widen the buffered query, refetching");
            return Some(self.begin_replace());
        }

        if self.data.len() >= self.config.page_len() || !self.accumulator.has_more() {
            log::debug!(
                "[table] refiltered {} buffered rows locally to {}",
                self.accumulator.len(),
                self.data.len()
            );
            return None;
        }

        log::debug!(
            "[table] {} rows left after refilter, topping up from server",
            self.data.len()
        );
        Some(self.begin_replace())
    }

    /// Requests the next page.
    ///
    /// Returns `None` unless the controller is idle and more rows exist, so
    /// repeated calls while a page is loading are no-ops. The page is
    /// requested under the server filters of the buffer, so the offset stays
    /// meaningful after a local refilter; the current filters still apply to
    /// the visible rows.
    pub fn fetch_next(&mut self) -> Option<FetchRequest> {
        if !self.has_next() {
            log::trace!("[table] fetch next ignored in state {:?}", self.state());
            return None;
        }

        let token = self.sequencer.issue();
        let mut query = PageQuery::new(
            self.sort.clone(),
            self.accumulator.offset(),
            self.config.page_len(),
        );
        query.filters = self.buffer_filters.clone();
        log::debug!(
            "[table] request {} appends at offset {}",
            token,
            query.offset
        );

        let request = FetchRequest {
            token,
            kind: FetchKind::Append,
            query,
        };
        self.pending = Some(request.clone());
        Some(request)
    }

    /// Refetches from offset 0 with the current parameters.
    pub fn retry(&mut self) -> FetchRequest {
        self.begin_replace()
    }

    /// Applies the outcome of a fetch issued by this controller.
    ///
    /// Results of superseded requests are dropped without any effect. A
    /// failed replace empties the buffer; a failed append keeps it.
    pub fn resolve(&mut self, token: RequestToken, result: Result<Page<T>, FetchError>) -> Resolution {
        if self.sequencer.settle(token).is_err() {
            return Resolution::Stale;
        }

        let Some(request) = self.pending.take() else {
            return Resolution::Stale;
        };
        let kind = request.kind;

        match result {
            Ok(page) => {
                match kind {
                    FetchKind::Replace => {
                        let page = self.finish_replace_page(page);
                        self.accumulator.replace(page);
                        self.buffer_filters = request.query.filters;
                    }
                    FetchKind::Append => {
                        let page = self.finish_append_page(page);
                        self.accumulator.append(page);
                    }
                }
                self.error = None;
                self.refresh_data();
                log::debug!(
                    "[table] request {} applied, {} rows buffered, total {:?}",
                    token,
                    self.accumulator.len(),
                    self.accumulator.total()
                );
                Resolution::Applied
            }
            Err(err) => {
                log::warn!("[table] request {} ({:?}) failed: {}", token, kind, err);
                if kind == FetchKind::Replace {
                    self.accumulator.clear();
                    self.buffer_filters.clear();
                    self.data.clear();
                }
                self.error = Some(err);
                Resolution::Failed
            }
        }
    }

    /// Returns the visible rows.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> RequestState {
        if self.sequencer.is_loading() {
            RequestState::Loading
        } else if self.error.is_some() {
            RequestState::Error
        } else {
            RequestState::Idle
        }
    }

    /// Returns `true` while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.sequencer.is_loading()
    }

    /// Returns the error of the last failed fetch.
    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Returns `true` if "fetch next" is currently on offer.
    pub fn has_next(&self) -> bool {
        self.mounted && self.state() == RequestState::Idle && self.accumulator.has_more()
    }

    /// Returns the number of rows requested under the current sort.
    pub fn offset(&self) -> usize {
        self.accumulator.offset()
    }

    /// Returns the server-reported total, if known.
    pub fn total(&self) -> Option<usize> {
        self.accumulator.total()
    }

    /// Returns the current sort.
    pub fn sort(&self) -> &SortDescriptor {
        &self.sort
    }

    /// Returns the current filters.
    pub fn filters(&self) -> &Filters<T> {
        &self.filters
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Captures the view-facing state.
    pub fn snapshot(&self) -> TableSnapshot<T> {
        TableSnapshot {
            data: self.data.clone(),
            loading: self.is_loading(),
            error: self.error.clone(),
            has_next: self.has_next(),
            total: self.accumulator.total(),
        }
    }

    fn begin_replace(&mut self) -> FetchRequest {
        self.mounted = true;
        self.error = None;
        let token = self.sequencer.issue();
        let query = PageQuery::with_filters(
            self.sort.clone(),
            &self.filters,
            0,
            self.config.replace_limit(),
        );
        log::debug!(
            "[table] request {} replaces rows, sort {} {}",
            token,
            query.sort.column(),
            query.sort.direction()
        );

        let request = FetchRequest {
            token,
            kind: FetchKind::Replace,
            query,
        };
        self.pending = Some(request.clone());
        request
    }

    fn pending_kind(&self) -> Option<FetchKind> {
        self.pending.as_ref().map(|request| request.kind)
    }

    /// Returns `true` if the current filters keep every server filter the
    /// buffer was fetched under, so the buffer holds a superset of the rows
    /// they select.
    fn narrows_buffer(&self) -> bool {
        let params = self.filters.params();
        self.buffer_filters.iter().all(|param| params.contains(param))
    }

    /// Derives the end marker of a replace page and drops the probe row.
    fn finish_replace_page(&self, mut page: Page<T>) -> Page<T> {
        if page.total().is_some() {
            return page;
        }
        let page_size = self.config.page_len();
        if self.config.probe {
            let more = page.truncate(page_size);
            if more {
                log::trace!("[table] dropped probe row, more pages exist");
            }
            page.with_end(!more)
        } else {
            let end = page.len() < page_size;
            page.with_end(end)
        }
    }

    /// Derives the end marker of an appended page.
    fn finish_append_page(&self, page: Page<T>) -> Page<T> {
        if page.total().is_some() {
            return page;
        }
        let end = page.len() < self.config.page_len();
        page.with_end(end)
    }

    fn refresh_data(&mut self) {
        self.data = self.accumulator.refilter(&self.sort, &self.filters);
    }
}

impl<T: TableRow> fmt::Debug for TableRequestController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRequestController")
            .field("config", &self.config)
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("state", &self.state())
            .field("buffered", &self.accumulator.len())
            .field("visible", &self.data.len())
            .finish()
    }
}
