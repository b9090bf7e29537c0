//! Growing, deduplicated buffer of fetched rows.

use std::collections::HashMap;

use crate::model::TableRow;
use crate::query::Filters;
use crate::query::Page;
use crate::query::SortDescriptor;

/// Owns the rows fetched so far for the current sort.
///
/// Rows are unique by [`TableRow::id`]. A row that arrives again keeps its
/// position but takes the newer value.
#[derive(Debug)]
pub struct PageAccumulator<T: TableRow> {
    items: Vec<T>,
    /// Position of each identity key in `items`.
    index: HashMap<T::Id, usize>,
    total: Option<usize>,
    /// Rows requested from the server under the current sort.
    offset: usize,
    /// The server reported that nothing follows the last page.
    end: bool,
}

impl<T: TableRow> Default for PageAccumulator<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            total: None,
            offset: 0,
            end: false,
        }
    }
}

impl<T: TableRow> PageAccumulator<T> {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every buffered row and adopts `page` as the new buffer.
    pub fn replace(&mut self, page: Page<T>) {
        self.items.clear();
        self.index.clear();
        self.total = page.total();
        self.end = page.is_end();
        self.offset = page.len();
        for item in page.into_items() {
            self.upsert(item);
        }
    }

    /// Adds the rows of `page` after the buffered ones.
    ///
    /// A fresher total from the server wins; otherwise the known total is
    /// kept.
    pub fn append(&mut self, page: Page<T>) {
        if let Some(total) = page.total() {
            self.total = Some(total);
        }
        self.end = page.is_end();
        self.offset += page.len();
        for item in page.into_items() {
            self.upsert(item);
        }
    }

    /// Returns the buffered rows matching `filters`, stable-sorted by `sort`.
    ///
    /// Does not modify the buffer, its offset or its total.
    pub fn refilter(&self, sort: &SortDescriptor, filters: &Filters<T>) -> Vec<T> {
        let mut rows: Vec<T> = self
            .items
            .iter()
            .filter(|row| filters.matches(row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| sort.compare(a, b));
        rows
    }

    /// Returns `true` if the server may hold rows beyond the buffer.
    pub fn has_more(&self) -> bool {
        match self.total {
            Some(total) => self.items.len() < total,
            None => !self.end,
        }
    }

    /// Empties the buffer and forgets the total.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
        self.total = None;
        self.offset = 0;
        self.end = false;
    }

    /// Returns the buffered rows in their last-applied order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the number of buffered rows.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of rows requested so far under the current sort.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the server-reported total, if known.
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    fn upsert(&mut self, item: T) {
        match self.index.get(&item.id()) {
            Some(&position) => self.items[position] = item,
            None => {
                self.index.insert(item.id(), self.items.len());
                self.items.push(item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::*;
    use crate::query::FilterDescriptor;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        name: &'static str,
    }

    impl TableRow for Row {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn compare_column(&self, other: &Self, column: &str) -> Ordering {
            match column {
                "name" => self.name.cmp(other.name),
                "id" => self.id.cmp(&other.id),
                _ => Ordering::Equal,
            }
        }
    }

    fn row(id: u32, name: &'static str) -> Row {
        Row { id, name }
    }

    fn ids(rows: &[Row]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_replace_discards_previous_rows() {
        let mut acc = PageAccumulator::new();
        acc.replace(Page::new(vec![row(1, "a"), row(2, "b")]).with_total(10));
        acc.replace(Page::new(vec![row(3, "c")]).with_total(4));

        assert_eq!(ids(acc.items()), vec![3]);
        assert_eq!(acc.offset(), 1);
        assert_eq!(acc.total(), Some(4));
    }

    #[test]
    fn test_append_dedupes_in_place_latest_wins() {
        let mut acc = PageAccumulator::new();
        acc.replace(Page::new(vec![row(1, "a"), row(2, "b")]));
        acc.append(Page::new(vec![row(2, "B"), row(3, "c")]));

        assert_eq!(ids(acc.items()), vec![1, 2, 3]);
        assert_eq!(acc.items()[1].name, "B");
        assert_eq!(acc.offset(), 4);
    }

    #[test]
    fn test_duplicates_within_one_page() {
        let mut acc = PageAccumulator::new();
        acc.replace(Page::new(vec![row(1, "a"), row(1, "z"), row(2, "b")]));
        assert_eq!(ids(acc.items()), vec![1, 2]);
        assert_eq!(acc.items()[0].name, "z");
    }

    #[test]
    fn test_dedup_over_many_pages() {
        let mut acc = PageAccumulator::new();
        acc.replace(Page::new(vec![row(1, "a"), row(2, "b"), row(3, "c")]));
        for start in 0..20u32 {
            acc.append(Page::new(vec![row(start % 7, "x"), row((start * 3) % 11, "y")]));
        }

        let mut seen = std::collections::HashSet::new();
        assert!(acc.items().iter().all(|r| seen.insert(r.id)));
    }

    #[test]
    fn test_offset_counts_requested_rows() {
        let mut acc = PageAccumulator::new();
        acc.replace(Page::new(vec![row(1, "a"), row(2, "b")]));
        let initial = acc.offset();
        for n in 0..3u32 {
            let base = 10 + n * 2;
            acc.append(Page::new(vec![row(base, "x"), row(base + 1, "y")]));
        }
        assert_eq!(acc.offset(), initial + 3 * 2);
    }

    #[test]
    fn test_append_keeps_known_total() {
        let mut acc = PageAccumulator::new();
        acc.replace(Page::new(vec![row(1, "a")]).with_total(3));
        acc.append(Page::new(vec![row(2, "b")]));
        assert_eq!(acc.total(), Some(3));
        acc.append(Page::new(vec![row(3, "c")]).with_total(5));
        assert_eq!(acc.total(), Some(5));
    }

    #[test]
    fn test_has_more_boundaries() {
        let mut acc = PageAccumulator::<Row>::new();
        assert!(acc.has_more());

        acc.replace(Page::new(vec![row(1, "a"), row(2, "b")]).with_total(2));
        assert!(!acc.has_more());

        acc.replace(Page::new(vec![row(1, "a"), row(2, "b")]).with_total(3));
        assert!(acc.has_more());

        acc.replace(Page::new(vec![row(1, "a")]).with_end(true));
        assert!(!acc.has_more());
    }

    #[test]
    fn test_refilter_is_pure_and_stable() {
        let mut acc = PageAccumulator::new();
        acc.replace(
            Page::new(vec![row(4, "b"), row(1, "a"), row(3, "b"), row(2, "c")]).with_total(9),
        );
        let sort = SortDescriptor::asc("name");
        let filters = Filters::none().with(FilterDescriptor::new("skip", "2", |r: &Row| r.id != 2));

        let first = acc.refilter(&sort, &filters);
        let second = acc.refilter(&sort, &filters);

        assert_eq!(first, second);
        // Equal names keep their buffered order (4 before 3).
        assert_eq!(ids(&first), vec![1, 4, 3]);
        assert_eq!(acc.offset(), 4);
        assert_eq!(acc.total(), Some(9));
        assert_eq!(ids(acc.items()), vec![4, 1, 3, 2]);
    }

    #[test]
    fn test_refilter_descending() {
        let mut acc = PageAccumulator::new();
        acc.replace(Page::new(vec![row(1, "a"), row(2, "c"), row(3, "b")]));
        let rows = acc.refilter(&SortDescriptor::desc("name"), &Filters::none());
        assert_eq!(ids(&rows), vec![2, 3, 1]);
    }

    #[test]
    fn test_clear() {
        let mut acc = PageAccumulator::new();
        acc.replace(Page::new(vec![row(1, "a")]).with_total(1));
        acc.clear();
        assert!(acc.is_empty());
        assert_eq!(acc.total(), None);
        assert_eq!(acc.offset(), 0);
        assert!(acc.has_more());
    }
}
