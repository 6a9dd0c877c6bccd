use std::future::Future;

use common::{Job, JobId, JobQuery, StoreResult};

/// One page of rows plus the exact number of rows matching the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorePage {
    pub rows: Vec<Job>,
    pub total_count: u64,
}

/// Read access to the `jobs` collection.
///
/// The browser never talks to a store directly; it is handed one, so a
/// remote service and an in-memory set are interchangeable.
pub trait JobStore: Send + Sync {
    /// Runs a filtered, ordered, ranged query.
    fn query_jobs(&self, query: &JobQuery) -> impl Future<Output = StoreResult<StorePage>> + Send;

    /// Fetches one row, `StoreError::NotFound` when there is none.
    fn job_by_id(&self, id: &JobId) -> impl Future<Output = StoreResult<Job>> + Send;

    /// The `tags` column of every row, duplicates included.
    fn tag_lists(&self) -> impl Future<Output = StoreResult<Vec<Vec<String>>>> + Send;
}
