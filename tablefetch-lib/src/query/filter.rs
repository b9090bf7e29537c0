//! Named client-side filters that mirror server-side query parameters.

use std::fmt;
use std::sync::Arc;

/// Predicate evaluated against a buffered row.
type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A named filter with a raw parameter value and an equivalent local
/// predicate.
///
/// The `name`/`value` pair is sent to the server as a query parameter; the
/// predicate lets the controller re-filter rows it already holds without a
/// network call. Two descriptors are equal when their name and value match;
/// the predicate is not compared.
///
/// # Example
///
/// ```
/// use tablefetch_lib::query::FilterDescriptor;
///
/// let even = FilterDescriptor::new("parity", "even", |n: &u32| n % 2 == 0);
/// assert!(even.matches(&4));
/// assert!(!even.matches(&5));
/// assert_eq!(even.name(), "parity");
/// ```
pub struct FilterDescriptor<T> {
    name: String,
    value: String,
    predicate: Predicate<T>,
}

impl<T> FilterDescriptor<T> {
    /// Creates a filter from its parameter name, raw value and predicate.
    pub fn new<F>(name: impl Into<String>, value: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            value: value.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Returns the query parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw query parameter value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Evaluates the predicate against a row.
    pub fn matches(&self, row: &T) -> bool {
        (self.predicate)(row)
    }
}

impl<T> Clone for FilterDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            value: self.value.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> PartialEq for FilterDescriptor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl<T> Eq for FilterDescriptor<T> {}

impl<T> fmt::Debug for FilterDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDescriptor")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// A set of filters combined with logical AND.
///
/// An empty set matches every row.
pub struct Filters<T> {
    filters: Vec<FilterDescriptor<T>>,
}

impl<T> Filters<T> {
    /// Creates an empty filter set.
    pub fn none() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Adds a filter, returning the set for chaining.
    pub fn with(mut self, filter: FilterDescriptor<T>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Returns `true` when every filter matches the row.
    pub fn matches(&self, row: &T) -> bool {
        self.filters.iter().all(|filter| filter.matches(row))
    }

    /// Returns the filters as server query parameters, in insertion order.
    pub fn params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|filter| (filter.name.clone(), filter.value.clone()))
            .collect()
    }

    /// Returns `true` if both sets hold the same `(name, value)` pairs,
    /// regardless of order.
    pub fn same_as(&self, other: &Filters<T>) -> bool {
        let mut ours = self.params();
        let mut theirs = other.params();
        ours.sort();
        theirs.sort();
        ours == theirs
    }

    /// Returns an iterator over the filters.
    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor<T>> {
        self.filters.iter()
    }

    /// Returns the number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if the set holds no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<T> Default for Filters<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> Clone for Filters<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}

impl<T> fmt::Debug for Filters<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.filters.iter()).finish()
    }
}

impl<T> FromIterator<FilterDescriptor<T>> for Filters<T> {
    fn from_iter<I: IntoIterator<Item = FilterDescriptor<T>>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}
