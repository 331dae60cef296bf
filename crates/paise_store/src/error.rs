//! Errors raised by store implementations.

/// Errors a `StateStore`, `Cache`, or `DataStore` implementation may raise.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying storage backend failed (I/O, connection, serialization...).
    #[error("store backend error: {0}")]
    Backend(String),

    /// A write targeted the reserved `_system.*` partition from outside the core.
    #[error("writes to the reserved `_system` partition are not permitted here")]
    ReservedPartition,

    /// The referenced item does not exist.
    #[error("item not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for paise_model::PaiseError {
    fn from(value: StoreError) -> Self {
        paise_model::PaiseError::Assertion(value.to_string())
    }
}
