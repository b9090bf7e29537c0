//! Page fetching
//!
//! [`PageFetcher`] is the only network-facing seam of the crate. The
//! controllers never talk to a transport directly; they hand a
//! [`PageQuery`] to a fetcher and reconcile whatever page comes back.

mod http;

pub use http::*;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::query::Page;
use crate::query::PageQuery;

/// Trait for page sources.
///
/// From the controller's point of view a fetch is a pure function of its
/// query. Implementations should not retry on their own; failures are
/// surfaced and retried by the user.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tablefetch_lib::fetch::PageFetcher;
///
/// struct Fixed(Vec<Member>);
///
/// #[async_trait]
/// impl PageFetcher<Member> for Fixed {
///     async fn fetch(&self, query: &PageQuery) -> Result<Page<Member>, FetchError> {
///         let rows = self.0.iter().skip(query.offset).take(query.limit).cloned().collect();
///         Ok(Page::new(rows).with_total(self.0.len()))
///     }
/// }
/// ```
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    /// Fetches one page of rows.
    async fn fetch(&self, query: &PageQuery) -> Result<Page<T>, FetchError>;
}

