//! Request configuration

/// Configuration for a table request controller.
///
/// # Example
///
/// ```
/// use tablefetch_lib::request::TableConfig;
///
/// let config = TableConfig::default()
///     .with_page_size(50)
///     .with_probe(false);
/// assert_eq!(config.page_size, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of rows shown per page and requested per "fetch next".
    ///
    /// Also the threshold below which a filter change tops up the buffer
    /// from the server. Default: 25
    pub page_size: usize,

    /// Whether replace fetches request one extra probe row to learn if more
    /// pages exist when the server reports no total.
    ///
    /// Default: true
    pub probe: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            probe: true,
        }
    }
}

impl TableConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size. Values below 1 are raised to 1.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Enables or disables the probe row.
    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    /// Effective page size; a zero set directly on the field counts as 1.
    pub(crate) fn page_len(&self) -> usize {
        self.page_size.max(1)
    }

    /// Row limit for a fetch that replaces the buffer.
    pub(crate) fn replace_limit(&self) -> usize {
        if self.probe {
            self.page_len().saturating_add(1)
        } else {
            self.page_len()
        }
    }
}

/// Configuration for a forward-only paginated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Number of rows displayed per page. One extra row is always requested
    /// to detect the end.
    ///
    /// Default: 10
    pub limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

impl PaginationConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display limit. Values below 1 are raised to 1.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }
}
