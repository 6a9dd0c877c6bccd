use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filters::{FilterState, filter_jobs};
use crate::job::Job;

/// Jobs shown per page.
pub const PAGE_SIZE: u32 = 10;

/// One page of the filtered listing, as requested by the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based; 0 is read as 1.
    pub page: u32,
    pub page_size: u32,
    pub filters: FilterState,
}

impl PageRequest {
    pub fn new(page: u32, filters: FilterState) -> Self {
        Self {
            page,
            page_size: PAGE_SIZE,
            filters,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn limit(&self) -> u32 {
        self.page_size.max(1)
    }

    /// Zero-based index of the first row on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Inclusive row range `(first, last)` covered by this page.
    pub fn range(&self) -> (u64, u64) {
        let start = self.offset();
        (start, start + u64::from(self.limit()) - 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<Job>,
    pub total_count: u64,
    pub total_pages: u32,
}

impl PageResult {
    pub fn new(items: Vec<Job>, total_count: u64, page_size: u32) -> Self {
        Self {
            items,
            total_count,
            total_pages: total_pages(total_count, page_size),
        }
    }

    /// What a failed fetch degrades to.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `ceil(total / page_size)`, so zero rows means zero pages.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    u32::try_from(total_count.div_ceil(page_size)).unwrap_or(u32::MAX)
}

/// Listing order: newest posting first, undated jobs last, ties by id.
pub fn newest_first(a: &Job, b: &Job) -> Ordering {
    match (a.date_posted, b.date_posted) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

/// Filters, orders and pages an already fetched set of jobs.
pub fn select_page(jobs: &[Job], request: &PageRequest, today: NaiveDate) -> PageResult {
    let mut matching = filter_jobs(jobs, &request.filters, today);
    matching.sort_by(|a, b| newest_first(a, b));

    let total_count = matching.len() as u64;
    let items = matching
        .into_iter()
        .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
        .take(request.limit() as usize)
        .cloned()
        .collect();
    PageResult::new(items, total_count, request.limit())
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;
    use crate::job::JobId;

    fn dated(id: i64, days_ago: Option<u64>) -> Job {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        Job {
            id: JobId::from(id),
            title: format!("Job {id}"),
            company: "Acme".to_string(),
            date_posted: days_ago.map(|d| today - Days::new(d)),
            tags: vec![],
            url: String::new(),
        }
    }

    #[test]
    fn test_select_page_orders_and_slices() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let jobs = vec![
            dated(1, Some(3)),
            dated(2, None),
            dated(3, Some(1)),
            dated(4, Some(3)),
            dated(5, Some(10)),
        ];
        let first = select_page(&jobs, &PageRequest::new(1, FilterState::default()).with_page_size(2), today);
        let ids: Vec<_> = first.items.iter().map(|j| j.id.to_string()).collect();
        assert_eq!(ids, ["3", "1"]);
        assert_eq!(first.total_count, 5);
        assert_eq!(first.total_pages, 3);

        let last = select_page(&jobs, &PageRequest::new(3, FilterState::default()).with_page_size(2), today);
        let ids: Vec<_> = last.items.iter().map(|j| j.id.to_string()).collect();
        assert_eq!(ids, ["2"]);
    }

    #[test]
    fn test_page_past_the_end_is_empty_with_totals() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let jobs = vec![dated(1, Some(1)), dated(2, Some(2))];
        let page = select_page(&jobs, &PageRequest::new(9, FilterState::default()), today);
        assert!(page.is_empty());
        assert_eq!(page.total_count, 2);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
    }

    #[test]
    fn test_request_range() {
        let first = PageRequest::new(1, FilterState::default());
        assert_eq!(first.range(), (0, 9));

        let third = PageRequest::new(3, FilterState::default());
        assert_eq!(third.offset(), 20);
        assert_eq!(third.range(), (20, 29));
    }

    #[test]
    fn test_page_zero_reads_as_first_page() {
        let request = PageRequest::new(0, FilterState::default()).with_page_size(25);
        assert_eq!(request.page(), 1);
        assert_eq!(request.range(), (0, 24));
    }
}
