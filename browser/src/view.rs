//! What the list and detail screens show, independent of how they are drawn.

use std::fmt;

use chrono::NaiveDate;
use common::{Job, JobId, StoreError, StoreResult};
use serde::Serialize;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load jobs. Please try again later.";
pub const NOT_FOUND_MESSAGE: &str = "Job not found";
pub const DETAIL_FAILED_MESSAGE: &str = "Failed to load job details";
pub const EMPTY_MESSAGE: &str = "No jobs found";
pub const EMPTY_HINT: &str = "Try adjusting your filters or search terms";

/// `Oct 9, 2026`
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `October 9, 2026`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// A job as it appears in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCard {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted: Option<String>,
    pub detail_href: String,
    pub apply_url: String,
}

impl From<&Job> for JobCard {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            tags: job.tags.clone(),
            posted: job.date_posted.map(short_date),
            detail_href: format!("/job/{}", job.id),
            apply_url: job.url.clone(),
        }
    }
}

impl fmt::Display for JobCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(posted) = &self.posted {
            write!(f, "  ({posted})")?;
        }
        writeln!(f)?;
        writeln!(f, "  {}", self.company)?;
        if !self.tags.is_empty() {
            writeln!(f, "  [{}]", self.tags.join(", "))?;
        }
        write!(f, "  {}", self.detail_href)
    }
}

/// The full page of a single job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDetail {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub tags: Vec<String>,
    /// Header date, omitted when the job has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted: Option<String>,
    /// Date in the details grid, which always shows something.
    pub posted_label: String,
    pub apply_url: String,
}

impl From<&Job> for JobDetail {
    fn from(job: &Job) -> Self {
        let posted = job.date_posted.map(long_date);
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            tags: job.tags.clone(),
            posted_label: posted.clone().unwrap_or_else(|| "Not specified".to_string()),
            posted,
            apply_url: job.url.clone(),
        }
    }
}

impl fmt::Display for JobDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(posted) = &self.posted {
            writeln!(f, "Posted: {posted}")?;
        }
        writeln!(f, "{}", self.company)?;
        if !self.tags.is_empty() {
            writeln!(f, "[{}]", self.tags.join(", "))?;
        }
        writeln!(f)?;
        writeln!(f, "Company:     {}", self.company)?;
        writeln!(f, "Posted Date: {}", self.posted_label)?;
        write!(f, "Apply: {}", self.apply_url)
    }
}

/// Outcome of opening a job's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Found(JobDetail),
    NotFound,
    Failed,
}

impl DetailView {
    pub fn from_outcome(outcome: &StoreResult<Job>) -> Self {
        match outcome {
            Ok(job) => DetailView::Found(JobDetail::from(job)),
            Err(StoreError::NotFound) => DetailView::NotFound,
            Err(_) => DetailView::Failed,
        }
    }

    /// User-facing error text, `None` when the job was found.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            DetailView::Found(_) => None,
            DetailView::NotFound => Some(NOT_FOUND_MESSAGE),
            DetailView::Failed => Some(DETAIL_FAILED_MESSAGE),
        }
    }
}

/// Page buttons under the listing; absent when there is a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub pages: Vec<u32>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pagination {
    pub fn new(current_page: u32, total_pages: u32) -> Option<Self> {
        if total_pages <= 1 {
            return None;
        }
        Some(Self {
            current_page,
            total_pages,
            pages: (1..=total_pages).collect(),
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
        })
    }
}

/// What the listing area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Error(String),
    Empty,
    Jobs {
        cards: Vec<JobCard>,
        pagination: Option<Pagination>,
        total_jobs: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undated() -> Job {
        Job {
            id: JobId::from(3),
            title: "Platform Engineer".to_string(),
            company: "Acme".to_string(),
            date_posted: None,
            tags: vec![],
            url: "https://acme.example/apply".to_string(),
        }
    }

    #[test]
    fn test_card_without_date_omits_it() {
        let card = JobCard::from(&undated());
        assert_eq!(card.posted, None);
        assert_eq!(card.detail_href, "/job/3");
        assert_eq!(card.to_string(), "Platform Engineer\n  Acme\n  /job/3");
    }

    #[test]
    fn test_detail_without_date_omits_header_date() {
        let detail = JobDetail::from(&undated());
        assert_eq!(detail.posted, None);
        assert_eq!(detail.posted_label, "Not specified");
        let text = detail.to_string();
        assert!(!text.contains("Posted:"));
        assert!(text.contains("Posted Date: Not specified"));
    }

    #[test]
    fn test_dates_are_formatted() {
        let mut job = undated();
        job.date_posted = NaiveDate::from_ymd_opt(2026, 10, 9);
        job.tags = vec!["rust".to_string(), "remote".to_string()];

        let card = JobCard::from(&job);
        assert_eq!(card.posted.as_deref(), Some("Oct 9, 2026"));
        assert!(card.to_string().contains("[rust, remote]"));

        let detail = JobDetail::from(&job);
        assert_eq!(detail.posted.as_deref(), Some("October 9, 2026"));
        assert!(detail.to_string().contains("Posted: October 9, 2026"));
    }

    #[test]
    fn test_card_serialization_skips_missing_date() {
        let json = serde_json::to_value(JobCard::from(&undated())).unwrap();
        assert!(json.get("posted").is_none());
        assert_eq!(json["id"], "3");
    }

    #[test]
    fn test_detail_outcomes() {
        assert_eq!(
            DetailView::from_outcome(&Err(StoreError::NotFound)).message(),
            Some(NOT_FOUND_MESSAGE)
        );
        assert_eq!(
            DetailView::from_outcome(&Err(StoreError::query_failed("timeout"))).message(),
            Some(DETAIL_FAILED_MESSAGE)
        );
        assert!(DetailView::from_outcome(&Ok(undated())).message().is_none());
    }

    #[test]
    fn test_pagination() {
        assert_eq!(Pagination::new(1, 0), None);
        assert_eq!(Pagination::new(1, 1), None);

        let first = Pagination::new(1, 3).unwrap();
        assert_eq!(first.pages, [1, 2, 3]);
        assert!(!first.has_previous);
        assert!(first.has_next);

        let last = Pagination::new(3, 3).unwrap();
        assert!(last.has_previous);
        assert!(!last.has_next);
    }
}
