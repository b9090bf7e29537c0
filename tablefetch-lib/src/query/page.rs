//! Page type for paginated fetch results.

/// A page of rows returned by one server request.
///
/// `total`, when present, is the number of rows matching the request's sort
/// and filters on the server. `end` marks that the server has nothing after
/// this page; it is derived by the controller from the probe row or a short
/// page when the server does not report a total.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    total: Option<usize>,
    end: bool,
}

impl<T> Page<T> {
    /// Creates a new page of rows with no pagination info.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total: None,
            end: false,
        }
    }

    /// Sets the total row count reported by the server.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Marks whether this is the last page.
    pub fn with_end(mut self, end: bool) -> Self {
        self.end = end;
        self
    }

    /// Returns a reference to the rows in this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page and returns the rows.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns the total row count, if the server reported it.
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Returns `true` if this page is known to be the last one.
    pub fn is_end(&self) -> bool {
        self.end
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Drops rows beyond `len`, returning `true` if any were dropped.
    pub(crate) fn truncate(&mut self, len: usize) -> bool {
        let trimmed = self.items.len() > len;
        self.items.truncate(len);
        trimmed
    }
}
