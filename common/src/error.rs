use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reading from (or writing to) the job store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("job not found")]
    NotFound,

    /// The store could not be reached or refused the query.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// The store answered with something that is not a job row.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
