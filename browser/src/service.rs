use std::sync::Arc;

use chrono::NaiveDate;
use common::{
    FilterState, Job, JobId, JobQuery, PAGE_SIZE, PageRequest, PageResult, StoreResult,
    distinct_tags,
};
use tracing::{debug, error, warn};

use crate::store::JobStore;

/// Source of "today" for date filters.
pub type Clock = fn() -> NaiveDate;

/// Turns page requests into store queries and store answers into pages.
pub struct JobService<S> {
    store: Arc<S>,
    page_size: u32,
    clock: Clock,
}

impl<S> Clone for JobService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            page_size: self.page_size,
            clock: self.clock,
        }
    }
}

impl<S: JobStore> JobService<S> {
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    pub fn from_shared(store: Arc<S>) -> Self {
        Self {
            store,
            page_size: PAGE_SIZE,
            clock: common::today,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn request(&self, page: u32, filters: FilterState) -> PageRequest {
        PageRequest::new(page, filters).with_page_size(self.page_size)
    }

    /// Fetches one page, reporting store failures to the caller.
    pub async fn try_fetch_jobs(&self, request: &PageRequest) -> StoreResult<PageResult> {
        let query = JobQuery::from_request(request, (self.clock)());
        let page = self.store.query_jobs(&query).await?;
        debug!(
            page = request.page(),
            rows = page.rows.len(),
            total = page.total_count,
            "fetched jobs"
        );
        Ok(PageResult::new(page.rows, page.total_count, request.limit()))
    }

    /// Fetches one page; a store failure degrades to an empty page.
    pub async fn fetch_jobs(&self, request: &PageRequest) -> PageResult {
        self.try_fetch_jobs(request).await.unwrap_or_else(|e| {
            error!(error = %e, "error fetching jobs");
            PageResult::empty()
        })
    }

    pub async fn fetch_job(&self, id: &JobId) -> StoreResult<Job> {
        self.store.job_by_id(id).await.inspect_err(|e| {
            if e.is_not_found() {
                debug!(%id, "job not found");
            } else {
                error!(%id, error = %e, "error fetching job");
            }
        })
    }

    /// Every tag in use, sorted; empty when the store cannot be read.
    pub async fn fetch_all_tags(&self) -> Vec<String> {
        match self.store.tag_lists().await {
            Ok(lists) => distinct_tags(lists),
            Err(e) => {
                warn!(error = %e, "error fetching tags");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use common::StoreError;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::StorePage;

    struct BrokenStore;

    impl JobStore for BrokenStore {
        async fn query_jobs(&self, _query: &JobQuery) -> StoreResult<StorePage> {
            Err(StoreError::query_failed("connection refused"))
        }

        async fn job_by_id(&self, _id: &JobId) -> StoreResult<Job> {
            Err(StoreError::query_failed("connection refused"))
        }

        async fn tag_lists(&self) -> StoreResult<Vec<Vec<String>>> {
            Err(StoreError::query_failed("connection refused"))
        }
    }

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn job(id: i64, tags: &[&str]) -> Job {
        Job {
            id: JobId::from(id),
            title: format!("Job {id}"),
            company: "Acme".to_string(),
            date_posted: Some(fixed_today()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_empty_page() {
        let service = JobService::new(BrokenStore);
        let request = service.request(1, FilterState::default());

        assert!(service.try_fetch_jobs(&request).await.is_err());
        assert_eq!(service.fetch_jobs(&request).await, PageResult::empty());
        assert!(service.fetch_all_tags().await.is_empty());
        assert!(matches!(
            service.fetch_job(&JobId::from(1)).await,
            Err(StoreError::QueryFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_pages_and_totals() {
        let jobs = (1..=23).map(|id| job(id, &[])).collect();
        let service = JobService::new(MemoryStore::new(jobs)).with_clock(fixed_today);

        let page = service.fetch_jobs(&service.request(3, FilterState::default())).await;
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_count, 23);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_no_matches_means_no_pages() {
        let service = JobService::new(MemoryStore::new(vec![job(1, &["go"])])).with_clock(fixed_today);
        let filters = FilterState {
            search_text: "cobol".to_string(),
            ..FilterState::default()
        };
        let page = service.fetch_jobs(&service.request(1, filters)).await;
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_tag_catalog() {
        let service = JobService::new(MemoryStore::new(vec![
            job(1, &["rust", "backend"]),
            job(2, &[]),
            job(3, &["backend", "aws"]),
        ]));
        assert_eq!(service.fetch_all_tags().await, ["aws", "backend", "rust"]);
    }

    #[tokio::test]
    async fn test_missing_job_is_not_found() {
        let service = JobService::new(MemoryStore::default());
        assert_eq!(
            service.fetch_job(&JobId::from(5)).await,
            Err(StoreError::NotFound)
        );
    }
}
