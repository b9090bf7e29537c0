//! Sort, filter and page types shared by the fetch contract and the
//! request controllers.
//!
//! - [`SortDescriptor`] - Single-column ordering of table rows
//! - [`FilterDescriptor`] / [`Filters`] - Named predicates, AND-combined
//! - [`Page`] - One server response with optional total count
//! - [`PageQuery`] - Everything a fetcher needs to issue one request

mod filter;
mod page;
mod params;
mod sort;

pub use filter::FilterDescriptor;
pub use filter::Filters;
pub use page::Page;
pub use params::PageQuery;
pub use sort::Direction;
pub use sort::SortDescriptor;
