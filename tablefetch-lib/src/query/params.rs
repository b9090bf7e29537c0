//! Request parameters for one page fetch.

use super::Filters;
use super::SortDescriptor;

/// Everything a fetcher needs to issue one page request.
///
/// # Example
///
/// ```
/// use tablefetch_lib::query::{PageQuery, SortDescriptor};
///
/// let query = PageQuery::new(SortDescriptor::desc("name"), 25, 26)
///     .with_filter("role", "admin");
///
/// assert_eq!(
///     query.to_pairs(),
///     vec![
///         ("sort".to_string(), "name".to_string()),
///         ("direction".to_string(), "DESC".to_string()),
///         ("role".to_string(), "admin".to_string()),
///         ("offset".to_string(), "25".to_string()),
///         ("limit".to_string(), "26".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Column and direction to sort by.
    pub sort: SortDescriptor,
    /// Filter parameters as `(name, value)` pairs.
    pub filters: Vec<(String, String)>,
    /// Number of rows to skip.
    pub offset: usize,
    /// Maximum number of rows to return.
    pub limit: usize,
}

impl PageQuery {
    /// Creates a query with no filters.
    pub fn new(sort: SortDescriptor, offset: usize, limit: usize) -> Self {
        Self {
            sort,
            filters: Vec::new(),
            offset,
            limit,
        }
    }

    /// Creates a query carrying the server parameters of a filter set.
    pub fn with_filters<T>(sort: SortDescriptor, filters: &Filters<T>, offset: usize, limit: usize) -> Self {
        Self {
            sort,
            filters: filters.params(),
            offset,
            limit,
        }
    }

    /// Adds one filter parameter.
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((name.into(), value.into()));
        self
    }

    /// Returns a copy of this query moved to another offset.
    pub fn at_offset(&self, offset: usize) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }

    /// Returns the REST query parameters for this request.
    ///
    /// Order: `sort`, `direction`, filters in insertion order, `offset`,
    /// `limit`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 4);
        pairs.push(("sort".to_string(), self.sort.column().to_string()));
        pairs.push(("direction".to_string(), self.sort.direction().as_param().to_string()));
        pairs.extend(self.filters.iter().cloned());
        pairs.push(("offset".to_string(), self.offset.to_string()));
        pairs.push(("limit".to_string(), self.limit.to_string()));
        pairs
    }
}
