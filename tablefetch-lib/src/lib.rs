//! Paginated table request engine
//!
//! Drives virtualized tables that combine server-side sorting, client-side
//! filtering and offset-based pagination, while guaranteeing unique rows and
//! ignoring responses that arrive after their parameters changed.

pub mod error;
pub mod fetch;
pub mod model;
pub mod query;
pub mod request;
