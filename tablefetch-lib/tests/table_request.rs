//! Integration tests for the async table request driver.
//!
//! Fetches are gated on oneshot channels so each test decides exactly when,
//! and in which order, responses arrive.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::pin::pin;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::poll;
use tokio::sync::oneshot;

use tablefetch_lib::error::ErrorKind;
use tablefetch_lib::error::FetchError;
use tablefetch_lib::fetch::PageFetcher;
use tablefetch_lib::model::TableRow;
use tablefetch_lib::query::FilterDescriptor;
use tablefetch_lib::query::Filters;
use tablefetch_lib::query::Page;
use tablefetch_lib::query::PageQuery;
use tablefetch_lib::query::SortDescriptor;
use tablefetch_lib::request::Resolution;
use tablefetch_lib::request::TableConfig;
use tablefetch_lib::request::TableRequest;

#[derive(Debug, Clone, PartialEq)]
struct Member {
    id: u32,
    name: String,
}

impl TableRow for Member {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn compare_column(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "name" => self.name.cmp(&other.name),
            _ => self.id.cmp(&other.id),
        }
    }
}

fn member(id: u32, name: &str) -> Member {
    Member {
        id,
        name: name.to_string(),
    }
}

fn members(ids: impl IntoIterator<Item = u32>) -> Vec<Member> {
    ids.into_iter().map(|id| member(id, &format!("member {id:02}"))).collect()
}

fn ids(rows: &[Member]) -> Vec<u32> {
    rows.iter().map(|m| m.id).collect()
}

type Response = Result<Page<Member>, FetchError>;

/// Fetcher whose responses are released through oneshot gates, in call order.
#[derive(Clone, Default)]
struct GatedFetcher {
    gates: Arc<Mutex<VecDeque<oneshot::Receiver<Response>>>>,
    queries: Arc<Mutex<Vec<PageQuery>>>,
}

impl GatedFetcher {
    /// Queues a gate for the next fetch and returns its sender.
    fn gate(&self) -> oneshot::Sender<Response> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Queues an already released response for the next fetch.
    fn respond(&self, response: Response) {
        let _ = self.gate().send(response);
    }

    fn queries(&self) -> Vec<PageQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher<Member> for GatedFetcher {
    async fn fetch(&self, query: &PageQuery) -> Result<Page<Member>, FetchError> {
        self.queries.lock().unwrap().push(query.clone());
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::network("gate dropped"))),
            None => Err(FetchError::network("no response queued")),
        }
    }
}

fn table(fetcher: &GatedFetcher, page_size: usize) -> TableRequest<Member, GatedFetcher> {
    TableRequest::new(
        fetcher.clone(),
        TableConfig::new().with_page_size(page_size),
        SortDescriptor::asc("name"),
        Filters::none(),
    )
}

// =============================================================================
// Out-of-order responses
// =============================================================================

mod ordering {
    use super::*;

    #[tokio::test]
    async fn test_late_response_for_superseded_sort_is_ignored() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 10);

        let asc_gate = fetcher.gate();
        let mut mount = pin!(table.mount());
        assert!(poll!(mount.as_mut()).is_pending());

        let desc_gate = fetcher.gate();
        let mut resort = pin!(table.update(SortDescriptor::desc("name"), Filters::none()));
        assert!(poll!(resort.as_mut()).is_pending());
        assert!(table.snapshot().await.loading);

        let mut desc_rows = members(1..=3);
        desc_rows.reverse();
        desc_gate.send(Ok(Page::new(desc_rows))).unwrap();
        assert_eq!(resort.await, Some(Resolution::Applied));

        asc_gate.send(Ok(Page::new(members(1..=3)))).unwrap();
        assert_eq!(mount.await, Resolution::Stale);

        let snapshot = table.snapshot().await;
        assert_eq!(ids(&snapshot.data), vec![3, 2, 1]);
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());

        let queries = fetcher.queries();
        assert_eq!(queries.len(), 2);
        assert!(!queries[0].sort.is_descending());
        assert!(queries[1].sort.is_descending());
    }

    #[tokio::test]
    async fn test_append_in_flight_during_sort_change_is_dropped() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 2);

        fetcher.respond(Ok(Page::new(members(1..=3))));
        assert_eq!(table.mount().await, Resolution::Applied);

        let next_gate = fetcher.gate();
        let mut next = pin!(table.fetch_next());
        assert!(poll!(next.as_mut()).is_pending());

        fetcher.respond(Ok(Page::new(vec![member(9, "zed"), member(8, "yan")])));
        assert_eq!(
            table.update(SortDescriptor::desc("name"), Filters::none()).await,
            Some(Resolution::Applied)
        );

        next_gate.send(Ok(Page::new(members(3..=4)))).unwrap();
        assert_eq!(next.await, Some(Resolution::Stale));

        let snapshot = table.snapshot().await;
        assert_eq!(ids(&snapshot.data), vec![9, 8]);
    }

    #[tokio::test]
    async fn test_fetch_next_while_loading_is_noop() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 2);

        fetcher.respond(Ok(Page::new(members(1..=3))));
        table.mount().await;

        let gate = fetcher.gate();
        let mut next = pin!(table.fetch_next());
        assert!(poll!(next.as_mut()).is_pending());

        assert_eq!(table.fetch_next().await, None);
        assert_eq!(fetcher.queries().len(), 2);

        gate.send(Ok(Page::new(members(3..=4)))).unwrap();
        assert_eq!(next.await, Some(Resolution::Applied));
    }
}

// =============================================================================
// Pagination
// =============================================================================

mod pagination {
    use super::*;

    #[tokio::test]
    async fn test_walks_to_the_end_without_duplicates() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 2);

        fetcher.respond(Ok(Page::new(members(1..=3))));
        assert_eq!(table.mount().await, Resolution::Applied);
        let snapshot = table.snapshot().await;
        assert_eq!(ids(&snapshot.data), vec![1, 2]);
        assert!(snapshot.has_next);

        // Row 2 shifted onto the second page server-side.
        fetcher.respond(Ok(Page::new(vec![member(2, "member 02"), member(3, "member 03")])));
        assert_eq!(table.fetch_next().await, Some(Resolution::Applied));
        assert!(table.snapshot().await.has_next);

        fetcher.respond(Ok(Page::new(members(4..=4))));
        assert_eq!(table.fetch_next().await, Some(Resolution::Applied));

        let snapshot = table.snapshot().await;
        assert_eq!(ids(&snapshot.data), vec![1, 2, 3, 4]);
        assert!(!snapshot.has_next);
        assert_eq!(table.fetch_next().await, None);

        let requested: Vec<(usize, usize)> = fetcher
            .queries()
            .iter()
            .map(|q| (q.offset, q.limit))
            .collect();
        assert_eq!(requested, vec![(0, 3), (2, 2), (4, 2)]);
    }

    #[tokio::test]
    async fn test_total_drives_has_next() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 2);

        fetcher.respond(Ok(Page::new(members(1..=2)).with_total(4)));
        table.mount().await;
        let snapshot = table.snapshot().await;
        assert_eq!(snapshot.total, Some(4));
        assert!(snapshot.has_next);

        fetcher.respond(Ok(Page::new(members(3..=4))));
        table.fetch_next().await;
        let snapshot = table.snapshot().await;
        assert_eq!(snapshot.total, Some(4));
        assert!(!snapshot.has_next);
    }
}

// =============================================================================
// Filters
// =============================================================================

mod filters {
    use super::*;

    fn only(id: u32) -> Filters<Member> {
        Filters::none().with(FilterDescriptor::new("id", id.to_string(), move |m: &Member| {
            m.id == id
        }))
    }

    fn even() -> Filters<Member> {
        Filters::none().with(FilterDescriptor::new("parity", "even", |m: &Member| m.id % 2 == 0))
    }

    #[tokio::test]
    async fn test_removing_filter_fetches_the_wider_query() {
        let fetcher = GatedFetcher::default();
        let table = TableRequest::new(
            fetcher.clone(),
            TableConfig::new().with_page_size(10),
            SortDescriptor::asc("name"),
            even(),
        );

        fetcher.respond(Ok(Page::new(members([2, 4, 6])).with_total(3)));
        table.mount().await;
        assert!(!table.snapshot().await.has_next);

        fetcher.respond(Ok(Page::new(members(1..=6)).with_total(6)));
        let resolution = table.update(SortDescriptor::asc("name"), Filters::none()).await;
        assert_eq!(resolution, Some(Resolution::Applied));

        let queries = fetcher.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].filters, vec![("parity".to_string(), "even".to_string())]);
        assert!(queries[1].filters.is_empty());
        assert_eq!(ids(&table.snapshot().await.data), vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_fetch_next_after_local_filter_continues_buffered_query() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 2);

        fetcher.respond(Ok(Page::new(members(1..=4)).with_total(20)));
        table.mount().await;

        assert_eq!(table.update(SortDescriptor::asc("name"), even()).await, None);
        assert_eq!(ids(&table.snapshot().await.data), vec![2, 4]);

        fetcher.respond(Ok(Page::new(members(5..=6))));
        assert_eq!(table.fetch_next().await, Some(Resolution::Applied));

        let queries = fetcher.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].offset, 4);
        assert!(queries[1].filters.is_empty());
        assert_eq!(ids(&table.snapshot().await.data), vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn test_filter_on_complete_buffer_stays_local() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 10);

        fetcher.respond(Ok(Page::new(members(1..=5))));
        table.mount().await;

        let resolution = table.update(SortDescriptor::asc("name"), only(3)).await;
        assert_eq!(resolution, None);
        assert_eq!(fetcher.queries().len(), 1);

        let snapshot = table.snapshot().await;
        assert_eq!(ids(&snapshot.data), vec![3]);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_filter_leaving_short_page_tops_up() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 2);

        fetcher.respond(Ok(Page::new(members(1..=3))));
        table.mount().await;

        fetcher.respond(Ok(Page::new(members(3..=3))));
        let resolution = table.update(SortDescriptor::asc("name"), only(3)).await;
        assert_eq!(resolution, Some(Resolution::Applied));

        let queries = fetcher.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].offset, 0);
        assert_eq!(queries[1].filters, vec![("id".to_string(), "3".to_string())]);
        assert_eq!(ids(&table.snapshot().await.data), vec![3]);
    }
}

// =============================================================================
// Errors
// =============================================================================

mod errors {
    use super::*;

    #[tokio::test]
    async fn test_server_error_then_retry() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 10);

        fetcher.respond(Err(FetchError::server(500, "internal error")));
        assert_eq!(table.mount().await, Resolution::Failed);

        let snapshot = table.snapshot().await;
        assert_eq!(snapshot.error_kind(), Some(ErrorKind::Server));
        assert!(snapshot.data.is_empty());
        assert!(!snapshot.loading);
        assert!(!snapshot.has_next);
        assert_eq!(table.fetch_next().await, None);

        fetcher.respond(Ok(Page::new(members(1..=2))));
        assert_eq!(table.retry().await, Resolution::Applied);

        let snapshot = table.snapshot().await;
        assert!(snapshot.error.is_none());
        assert_eq!(ids(&snapshot.data), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_failed_append_keeps_rows() {
        let fetcher = GatedFetcher::default();
        let table = table(&fetcher, 2);

        fetcher.respond(Ok(Page::new(members(1..=3))));
        table.mount().await;

        fetcher.respond(Err(FetchError::Timeout));
        assert_eq!(table.fetch_next().await, Some(Resolution::Failed));

        let snapshot = table.snapshot().await;
        assert_eq!(snapshot.error_kind(), Some(ErrorKind::Network));
        assert_eq!(ids(&snapshot.data), vec![1, 2]);
    }
}
