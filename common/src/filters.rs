use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::job::Job;
use crate::text::fold_case;

/// "Date posted" selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    #[default]
    #[serde(alias = "", alias = "none")]
    Any,
    Today,
    Week,
    Month,
}

impl DateFilter {
    /// How far back from today the window reaches, `None` when unbounded.
    pub fn lookback_days(self) -> Option<u64> {
        match self {
            DateFilter::Any => None,
            DateFilter::Today => Some(0),
            DateFilter::Week => Some(7),
            DateFilter::Month => Some(30),
        }
    }

    /// Earliest posting date still inside the window.
    ///
    /// There is no upper bound: `Today` means "on or after the start of
    /// today".
    pub fn lower_bound(self, today: NaiveDate) -> Option<NaiveDate> {
        let days = self.lookback_days()?;
        Some(today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DateFilter::Any => "any",
            DateFilter::Today => "today",
            DateFilter::Week => "week",
            DateFilter::Month => "month",
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown date filter `{0}`, expected one of: any, today, week, month")]
pub struct ParseDateFilterError(String);

impl FromStr for DateFilter {
    type Err = ParseDateFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" | "none" => Ok(DateFilter::Any),
            "today" => Ok(DateFilter::Today),
            "week" => Ok(DateFilter::Week),
            "month" => Ok(DateFilter::Month),
            _ => Err(ParseDateFilterError(s.to_string())),
        }
    }
}

/// The user's current search, tag and date selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_text: String,
    pub selected_tags: BTreeSet<String>,
    pub date_filter: DateFilter,
}

impl FilterState {
    /// True when no field narrows the result set.
    pub fn is_unfiltered(&self) -> bool {
        self.search_text.is_empty()
            && self.selected_tags.is_empty()
            && self.date_filter == DateFilter::Any
    }

    /// In-memory counterpart of the store query built by
    /// [`JobQuery::from_request`](crate::query::JobQuery::from_request).
    ///
    /// Both must agree on every job: a job without a posting date never
    /// passes an active date filter, because the store compares against
    /// `NULL`.
    pub fn matches(&self, job: &Job, today: NaiveDate) -> bool {
        self.matches_search(job) && self.matches_tags(job) && self.matches_date(job, today)
    }

    fn matches_search(&self, job: &Job) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = fold_case(&self.search_text);
        fold_case(&job.title).contains(&needle) || fold_case(&job.company).contains(&needle)
    }

    fn matches_tags(&self, job: &Job) -> bool {
        self.selected_tags.iter().all(|tag| job.has_tag(tag))
    }

    fn matches_date(&self, job: &Job, today: NaiveDate) -> bool {
        match self.date_filter.lower_bound(today) {
            None => true,
            Some(bound) => job.date_posted.is_some_and(|posted| posted >= bound),
        }
    }
}

/// Keeps the jobs that pass `filters`, in their input order.
pub fn filter_jobs<'a>(jobs: &'a [Job], filters: &FilterState, today: NaiveDate) -> Vec<&'a Job> {
    jobs.iter().filter(|job| filters.matches(job, today)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn job(id: i64, title: &str, company: &str, tags: &[&str], days_ago: Option<u64>) -> Job {
        Job {
            id: JobId::from(id),
            title: title.to_string(),
            company: company.to_string(),
            date_posted: days_ago.map(|d| today() - Days::new(d)),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            url: format!("https://example.com/jobs/{id}"),
        }
    }

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_default_filter_passes_everything() {
        let filters = FilterState::default();
        assert!(filters.is_unfiltered());
        let jobs = vec![
            job(1, "Rust Dev", "Acme", &[], None),
            job(2, "Go Dev", "Initech", &["go"], Some(400)),
        ];
        assert_eq!(filter_jobs(&jobs, &filters, today()).len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_or_company() {
        let filters = FilterState {
            search_text: "ACME".to_string(),
            ..FilterState::default()
        };
        assert!(filters.matches(&job(1, "Backend", "Acme Corp", &[], None), today()));
        assert!(filters.matches(&job(2, "acme tooling lead", "Other", &[], None), today()));
        assert!(!filters.matches(&job(3, "Backend", "Initech", &[], None), today()));
    }

    #[test]
    fn test_search_folds_final_sigma_like_the_store() {
        let filters = FilterState {
            search_text: "ΟΣ".to_string(),
            ..FilterState::default()
        };
        assert!(filters.matches(&job(1, "ΟΔΟΣ", "Acme", &[], None), today()));
    }

    #[test]
    fn test_tags_are_conjunctive() {
        let filters = FilterState {
            selected_tags: tags(&["rust", "remote"]),
            ..FilterState::default()
        };
        assert!(filters.matches(&job(1, "a", "b", &["remote", "rust", "senior"], None), today()));
        assert!(!filters.matches(&job(2, "a", "b", &["rust"], None), today()));
        assert!(!filters.matches(&job(3, "a", "b", &[], None), today()));
    }

    #[test]
    fn test_week_boundary() {
        let filters = FilterState {
            date_filter: DateFilter::Week,
            ..FilterState::default()
        };
        assert!(filters.matches(&job(1, "a", "b", &[], Some(7)), today()));
        assert!(!filters.matches(&job(2, "a", "b", &[], Some(8)), today()));
        assert!(!filters.matches(&job(3, "a", "b", &[], None), today()));
    }

    #[test]
    fn test_today_has_no_upper_bound() {
        let filters = FilterState {
            date_filter: DateFilter::Today,
            ..FilterState::default()
        };
        let mut future = job(1, "a", "b", &[], None);
        future.date_posted = Some(today() + Days::new(2));
        assert!(filters.matches(&future, today()));
        assert!(filters.matches(&job(2, "a", "b", &[], Some(0)), today()));
        assert!(!filters.matches(&job(3, "a", "b", &[], Some(1)), today()));
    }

    #[test]
    fn test_lower_bounds() {
        assert_eq!(DateFilter::Any.lower_bound(today()), None);
        assert_eq!(DateFilter::Today.lower_bound(today()), Some(today()));
        assert_eq!(
            DateFilter::Month.lower_bound(today()),
            NaiveDate::from_ymd_opt(2026, 9, 16)
        );
    }

    #[test]
    fn test_parse_date_filter() {
        assert_eq!("".parse::<DateFilter>(), Ok(DateFilter::Any));
        assert_eq!("Week".parse::<DateFilter>(), Ok(DateFilter::Week));
        assert!("fortnight".parse::<DateFilter>().is_err());
    }
}
