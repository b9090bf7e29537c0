//! Forward-only paginated request.

use futures::Stream;

use crate::error::FetchError;
use crate::fetch::PageFetcher;
use crate::model::TableRow;
use crate::query::Page;
use crate::query::PageQuery;

use super::PageAccumulator;
use super::PaginationConfig;

/// Walks a fixed query page by page, accumulating deduplicated rows.
///
/// Unlike [`TableRequest`](super::TableRequest) there is no sort or filter
/// reconciliation: the query is fixed and pages are only ever appended. Every
/// request asks for one row more than the display limit; a page that comes
/// back without that extra row is the last one.
///
/// # Example
///
/// ```ignore
/// let query = PageQuery::new(SortDescriptor::desc("updatedAt"), 0, 0);
/// let mut shares = PaginatedRequest::new(fetcher, query, PaginationConfig::default());
///
/// while let Some(page) = shares.next().await {
///     let page = page?;
///     println!("loaded {} rows", page.len());
/// }
/// ```
pub struct PaginatedRequest<T: TableRow, F> {
    fetcher: F,
    query: PageQuery,
    limit: usize,
    accumulator: PageAccumulator<T>,
    page: usize,
    loaded: bool,
    /// Set once the end was reached or a fetch failed.
    done: bool,
}

impl<T, F> PaginatedRequest<T, F>
where
    T: TableRow,
    F: PageFetcher<T>,
{
    /// Creates a request for `query`; its offset and limit are ignored.
    pub fn new(fetcher: F, query: PageQuery, config: PaginationConfig) -> Self {
        Self {
            fetcher,
            query,
            limit: config.limit.max(1),
            accumulator: PageAccumulator::new(),
            page: 0,
            loaded: false,
            done: false,
        }
    }

    /// Fetches the next page.
    ///
    /// Returns `None` once the last page was loaded. A failed fetch is
    /// yielded once and ends the iteration.
    pub async fn next(&mut self) -> Option<Result<Page<T>, FetchError>> {
        if self.done {
            return None;
        }

        self.loaded = false;
        let mut query = self.query.at_offset(self.accumulator.offset());
        query.limit = self.limit.saturating_add(1);

        let mut page = match self.fetcher.fetch(&query).await {
            Ok(page) => page,
            Err(err) => {
                log::warn!("[paginated] page {} failed: {}", self.page + 1, err);
                self.done = true;
                return Some(Err(err));
            }
        };

        let more = page.truncate(self.limit);
        let page = page.with_end(!more);
        if !more {
            self.done = true;
        }

        self.accumulator.append(page.clone());
        self.page += 1;
        self.loaded = true;
        log::debug!(
            "[paginated] page {} loaded, {} rows, end {}",
            self.page,
            page.len(),
            page.is_end()
        );

        Some(Ok(page))
    }

    /// Returns every row loaded so far, deduplicated.
    pub fn data(&self) -> &[T] {
        self.accumulator.items()
    }

    /// Returns the number of pages loaded.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the offset of the next page.
    pub fn offset(&self) -> usize {
        self.accumulator.offset()
    }

    /// Returns `true` once the last page has been loaded.
    pub fn is_end(&self) -> bool {
        self.done && self.loaded
    }

    /// Returns `true` if the most recent fetch completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Converts the request into a stream of pages.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<Page<T>, FetchError>> {
        async_stream::stream! {
            while let Some(page) = self.next().await {
                yield page;
            }
        }
    }
}
