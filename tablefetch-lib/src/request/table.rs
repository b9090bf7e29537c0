//! Async driver for a table request controller.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::fetch::PageFetcher;
use crate::model::TableRow;
use crate::query::Filters;
use crate::query::SortDescriptor;

use super::FetchRequest;
use super::Resolution;
use super::TableConfig;
use super::TableRequestController;
use super::TableSnapshot;

/// Runs a [`TableRequestController`] against a [`PageFetcher`].
///
/// All methods take `&self`, so a view can start a sort change while a
/// "fetch next" is still awaiting its page; the controller's stale-response
/// guard keeps the later request authoritative. The controller lock is never
/// held across the fetch.
///
/// This type is cheap to clone (uses `Arc` internally); clones drive the
/// same table.
///
/// # Example
///
/// ```ignore
/// let table = TableRequest::new(fetcher, TableConfig::default(), SortDescriptor::asc("name"), Filters::none());
/// table.mount().await;
///
/// let snapshot = table.snapshot().await;
/// if snapshot.is_near_end(visible_rows, 5) {
///     table.fetch_next().await;
/// }
/// ```
pub struct TableRequest<T: TableRow, F> {
    controller: Arc<Mutex<TableRequestController<T>>>,
    fetcher: Arc<F>,
}

impl<T, F> TableRequest<T, F>
where
    T: TableRow,
    F: PageFetcher<T>,
{
    /// Creates a table for the initial sort and filters.
    pub fn new(fetcher: F, config: TableConfig, sort: SortDescriptor, filters: Filters<T>) -> Self {
        Self::with_controller(fetcher, TableRequestController::new(config, sort, filters))
    }

    /// Wraps an existing controller.
    pub fn with_controller(fetcher: F, controller: TableRequestController<T>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            fetcher: Arc::new(fetcher),
        }
    }

    /// Loads the first page.
    pub async fn mount(&self) -> Resolution {
        let request = self.controller.lock().await.mount();
        self.run(request).await
    }

    /// Applies new sort and filter values.
    ///
    /// Returns `None` when the change was handled locally without a fetch.
    pub async fn update(&self, sort: SortDescriptor, filters: Filters<T>) -> Option<Resolution> {
        let request = self.controller.lock().await.update(sort, filters)?;
        Some(self.run(request).await)
    }

    /// Loads the next page.
    ///
    /// Returns `None` when no next page is on offer, including while another
    /// fetch is in flight.
    pub async fn fetch_next(&self) -> Option<Resolution> {
        let request = self.controller.lock().await.fetch_next()?;
        Some(self.run(request).await)
    }

    /// Refetches from offset 0 with the current parameters.
    pub async fn retry(&self) -> Resolution {
        let request = self.controller.lock().await.retry();
        self.run(request).await
    }

    /// Captures the view-facing state.
    pub async fn snapshot(&self) -> TableSnapshot<T> {
        self.controller.lock().await.snapshot()
    }

    /// Returns the current sort.
    pub async fn sort(&self) -> SortDescriptor {
        self.controller.lock().await.sort().clone()
    }

    /// Returns the current filters.
    pub async fn filters(&self) -> Filters<T> {
        self.controller.lock().await.filters().clone()
    }

    async fn run(&self, request: FetchRequest) -> Resolution {
        let result = self.fetcher.fetch(&request.query).await;
        self.controller.lock().await.resolve(request.token, result)
    }
}

impl<T: TableRow, F> Clone for TableRequest<T, F> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}
