//! Sort descriptor for table requests.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::ParamError;
use crate::model::TableRow;

/// Sort direction for ordering rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the wire representation (`ASC` / `DESC`).
    pub fn as_param(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

impl FromStr for Direction {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(ParamError::InvalidDirection(s.to_string()))
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Identifies the one column rows are sorted by.
///
/// Multi-column sorting is deliberately unsupported. Changing the sort
/// invalidates every page accumulated so far.
///
/// # Example
///
/// ```
/// use tablefetch_lib::query::SortDescriptor;
///
/// let sort = SortDescriptor::asc("name");
/// assert!(!sort.is_descending());
///
/// // Clicking the same column header flips the direction
/// let sort = sort.toggled("name");
/// assert!(sort.is_descending());
///
/// // Clicking another column sorts it ascending
/// let sort = sort.toggled("email");
/// assert_eq!(sort, SortDescriptor::asc("email"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortDescriptor {
    column: String,
    direction: Direction,
}

impl SortDescriptor {
    /// Creates a sort descriptor.
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Creates an ascending sort on a column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Asc)
    }

    /// Creates a descending sort on a column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Desc)
    }

    /// Returns the sorted column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the sort direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` for a descending sort.
    pub fn is_descending(&self) -> bool {
        self.direction == Direction::Desc
    }

    /// Compares two rows according to this descriptor.
    pub fn compare<T: TableRow>(&self, a: &T, b: &T) -> Ordering {
        let ord = a.compare_column(b, &self.column);
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }

    /// Returns the descriptor that results from clicking a column header.
    ///
    /// The active column flips direction; any other column starts ascending.
    pub fn toggled(&self, column: &str) -> Self {
        if self.column == column {
            Self::new(column, self.direction.reversed())
        } else {
            Self::asc(column)
        }
    }

    /// Decodes the sort from `sort` and `direction` query parameters.
    ///
    /// Missing or empty values fall back to `default`. An unparseable
    /// direction is logged and replaced by the default direction.
    pub fn from_query_pairs<K, V>(
        pairs: impl IntoIterator<Item = (K, V)>,
        default: &SortDescriptor,
    ) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut column = None;
        let mut direction = None;

        for (key, value) in pairs {
            match key.as_ref() {
                "sort" if !value.as_ref().is_empty() => column = Some(value.as_ref().to_string()),
                "direction" if !value.as_ref().is_empty() => {
                    match value.as_ref().parse::<Direction>() {
                        Ok(parsed) => direction = Some(parsed),
                        Err(err) => log::warn!("[sort] ignoring query parameter: {}", err),
                    }
                }
                _ => {}
            }
        }

        Self {
            column: column.unwrap_or_else(|| default.column.clone()),
            direction: direction.unwrap_or(default.direction),
        }
    }

    /// Mirrors this sort into the `sort` and `direction` query parameters
    /// of a URL, preserving every other parameter.
    pub fn write_query(&self, url: &mut Url) {
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "sort" && key != "direction")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let direction = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };

        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair("sort", &self.column)
            .append_pair("direction", direction);
    }
}

impl FromStr for SortDescriptor {
    type Err = ParamError;

    /// Parses `column` or `column:direction`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.split_once(':') {
            Some((column, direction)) => (column, direction.parse()?),
            None => (s, Direction::Asc),
        };
        if column.is_empty() {
            return Err(ParamError::EmptyColumn);
        }
        Ok(Self::new(column, direction))
    }
}
