//! Table request engine.
//!
//! - [`RequestSequencer`] - Discards results of superseded requests
//! - [`PageAccumulator`] - Deduplicated buffer with replace/append/refilter
//! - [`TableRequestController`] - The sans-IO state machine tying them together
//! - [`TableRequest`] - Async driver running a controller against a fetcher
//! - [`PaginatedRequest`] - Forward-only pagination over a fixed query

mod accumulator;
mod config;
mod controller;
mod paginated;
mod sequencer;
mod snapshot;
mod table;

pub use accumulator::PageAccumulator;
pub use config::PaginationConfig;
pub use config::TableConfig;
pub use controller::FetchKind;
pub use controller::FetchRequest;
pub use controller::Resolution;
pub use controller::TableRequestController;
pub use paginated::PaginatedRequest;
pub use sequencer::RequestSequencer;
pub use sequencer::RequestToken;
pub use snapshot::RequestState;
pub use snapshot::TableSnapshot;
pub use table::TableRequest;
