//! Shared job-board model: job rows, filter state, paging, and the
//! translation of filters into queries against the `jobs` store.

mod catalog;
mod error;
mod filters;
mod job;
mod page;
pub mod query;
mod text;

pub use catalog::distinct_tags;
pub use error::{StoreError, StoreResult};
pub use filters::{DateFilter, FilterState, ParseDateFilterError, filter_jobs};
pub use job::{Job, JobId, NewJob, parse_posted_date};
pub use page::{PAGE_SIZE, PageRequest, PageResult, newest_first, select_page, total_pages};
pub use query::JobQuery;
pub use text::fold_case;

/// Current calendar date (UTC), the reference point for date filters.
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
