//! Query parameter decoding errors

/// Errors raised while decoding sort/filter state from query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// The `direction` parameter was neither `asc` nor `desc`.
    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    /// The sort column was empty.
    #[error("Sort column must not be empty")]
    EmptyColumn,
}
