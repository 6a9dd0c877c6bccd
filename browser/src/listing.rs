//! State behind the job list: which page and filters are shown, and what the
//! store last answered for them.
//!
//! Requests may overlap. Each one is numbered when issued and its answer is
//! applied only if no newer request has been issued since, so a slow stale
//! response can never overwrite a fresher one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::{FilterState, Job, PageRequest, PageResult, StoreResult};
use tracing::{debug, error};

use crate::service::JobService;
use crate::store::JobStore;
use crate::view::{JobCard, LOAD_FAILED_MESSAGE, ListView, Pagination};

pub type JobCountListener = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub current_page: u32,
    pub filters: FilterState,
    pub jobs: Vec<Job>,
    pub total_jobs: u64,
    pub total_pages: u32,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            current_page: 1,
            filters: FilterState::default(),
            jobs: Vec::new(),
            total_jobs: 0,
            total_pages: 0,
            loading: true,
            error: None,
        }
    }
}

/// Proof that a request was issued, handed back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Inner {
    state: ListState,
    issued: u64,
}

pub struct JobListController<S> {
    service: JobService<S>,
    inner: Mutex<Inner>,
    on_job_count: Option<JobCountListener>,
}

impl<S: JobStore> JobListController<S> {
    pub fn new(service: JobService<S>) -> Self {
        Self {
            service,
            inner: Mutex::new(Inner {
                state: ListState::default(),
                issued: 0,
            }),
            on_job_count: None,
        }
    }

    /// Called with the total match count whenever a fresh page lands.
    pub fn on_job_count_change(mut self, listener: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.on_job_count = Some(Arc::new(listener));
        self
    }

    pub fn service(&self) -> &JobService<S> {
        &self.service
    }

    pub fn state(&self) -> ListState {
        self.lock().state.clone()
    }

    pub fn view(&self) -> ListView {
        let inner = self.lock();
        let state = &inner.state;

        if state.loading && state.jobs.is_empty() {
            return ListView::Loading;
        }
        if let Some(message) = &state.error {
            return ListView::Error(message.clone());
        }
        if state.jobs.is_empty() {
            return ListView::Empty;
        }
        ListView::Jobs {
            cards: state.jobs.iter().map(JobCard::from).collect(),
            pagination: Pagination::new(state.current_page, state.total_pages),
            total_jobs: state.total_jobs,
        }
    }

    /// New filters always start again from page 1.
    ///
    /// Returns whether this request's answer was the one applied.
    pub async fn set_filters(&self, filters: FilterState) -> bool {
        let (ticket, request) = self.begin(1, Some(filters));
        self.resolve(ticket, &request).await
    }

    /// Pages through the current filters. Pages past the end come back empty.
    pub async fn change_page(&self, page: u32) -> bool {
        let (ticket, request) = self.begin(page, None);
        self.resolve(ticket, &request).await
    }

    /// Re-requests the page that is currently shown.
    pub async fn refresh(&self) -> bool {
        let page = self.lock().state.current_page;
        self.change_page(page).await
    }

    /// Issues a request: records the page and filters it is for and marks the
    /// list as loading. `filters` of `None` keeps the current ones.
    pub fn begin(&self, page: u32, filters: Option<FilterState>) -> (Ticket, PageRequest) {
        let mut inner = self.lock();
        inner.issued += 1;
        let ticket = Ticket {
            generation: inner.issued,
        };

        let state = &mut inner.state;
        if let Some(filters) = filters {
            state.filters = filters;
        }
        state.current_page = page.max(1);
        state.loading = true;

        let request = self.service.request(state.current_page, state.filters.clone());
        (ticket, request)
    }

    /// Applies the answer to `ticket`'s request unless a newer request has
    /// been issued since. Returns whether it was applied.
    pub fn complete(&self, ticket: Ticket, outcome: StoreResult<PageResult>) -> bool {
        let mut inner = self.lock();
        if ticket.generation != inner.issued {
            debug!(
                generation = ticket.generation,
                latest = inner.issued,
                "discarding stale job page"
            );
            return false;
        }

        let state = &mut inner.state;
        state.loading = false;
        let total = match outcome {
            Ok(page) => {
                state.jobs = page.items;
                state.total_jobs = page.total_count;
                state.total_pages = page.total_pages;
                state.error = None;
                Some(page.total_count)
            }
            Err(e) => {
                error!(error = %e, "error fetching jobs");
                state.jobs.clear();
                state.total_jobs = 0;
                state.total_pages = 0;
                state.error = Some(LOAD_FAILED_MESSAGE.to_string());
                None
            }
        };
        drop(inner);

        if let (Some(total), Some(listener)) = (total, &self.on_job_count) {
            listener(total);
        }
        true
    }

    /// Runs the request `ticket` was issued for and applies its answer.
    pub async fn resolve(&self, ticket: Ticket, request: &PageRequest) -> bool {
        let outcome = self.service.try_fetch_jobs(request).await;
        self.complete(ticket, outcome)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
