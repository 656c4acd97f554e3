use crate::identity::Identity;

/// Errors while reading or writing claim records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The backing store cannot be written from this service (e.g. records live on-chain).
    #[error("claim records are read-only for this store")]
    ReadOnly,
    /// The store has no way to answer for this identity kind.
    #[error("unsupported identity for this store: {0}")]
    Unsupported(Identity),
    /// The system of record could not be reached or answered badly.
    #[error("claim record lookup failed: {0}")]
    Unavailable(String),
}
