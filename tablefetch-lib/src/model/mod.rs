//! Row model

mod record;
mod row;

pub use record::JsonRecord;
pub use record::RecordId;
pub use row::TableRow;
