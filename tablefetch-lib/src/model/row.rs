//! TableRow trait for rows managed by a table controller.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for items that can be fetched, deduplicated and sorted by a table
/// controller.
///
/// The controller never interprets business fields. It only needs an
/// identity key for deduplication and a per-column comparison for the local
/// re-sort that follows a filter change.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use tablefetch_lib::model::TableRow;
///
/// #[derive(Clone, Debug)]
/// struct Member {
///     id: u32,
///     name: String,
/// }
///
/// impl TableRow for Member {
///     type Id = u32;
///
///     fn id(&self) -> u32 {
///         self.id
///     }
///
///     fn compare_column(&self, other: &Self, column: &str) -> Ordering {
///         match column {
///             "name" => self.name.cmp(&other.name),
///             _ => self.id.cmp(&other.id),
///         }
///     }
/// }
/// ```
pub trait TableRow: Clone + Send + Sync + 'static {
    /// Identity key used to deduplicate rows across pages.
    type Id: Eq + Hash + Clone + Debug + Send + Sync;

    /// Returns the identity key of this row.
    fn id(&self) -> Self::Id;

    /// Compares two rows by the named column in ascending order.
    ///
    /// Must be a total order for every column the table can be sorted by.
    /// Unknown columns should compare as `Equal` so the stable sort keeps
    /// the existing order.
    fn compare_column(&self, other: &Self, column: &str) -> Ordering;
}
