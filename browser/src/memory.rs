//! A job store held entirely in memory.
//!
//! It evaluates [`JobQuery`] values the way the remote store would, which
//! makes it both the offline backend of the server and the stand-in for the
//! remote store in tests.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use common::query::{Column, Order, Predicate};
use common::{Job, JobId, JobQuery, StoreError, StoreResult};

use crate::store::{JobStore, StorePage};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    jobs: Vec<Job>,
}

impl MemoryStore {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    /// Loads a JSON array of job rows.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::query_failed(format!("reading {}: {e}", path.display())))?;
        let jobs: Vec<Job> = serde_json::from_str(&content)
            .map_err(|e| StoreError::decode(format!("parsing {}: {e}", path.display())))?;
        Ok(Self::new(jobs))
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl JobStore for MemoryStore {
    async fn query_jobs(&self, query: &JobQuery) -> StoreResult<StorePage> {
        let mut matching: Vec<&Job> = self
            .jobs
            .iter()
            .filter(|job| query.predicates.iter().all(|p| passes(p, job)))
            .collect();
        matching.sort_by(|a, b| compare(&query.order, a, b));

        let total_count = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(StorePage { rows, total_count })
    }

    async fn job_by_id(&self, id: &JobId) -> StoreResult<Job> {
        self.jobs
            .iter()
            .find(|job| &job.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn tag_lists(&self) -> StoreResult<Vec<Vec<String>>> {
        Ok(self.jobs.iter().map(|job| job.tags.clone()).collect())
    }
}

/// A column value as the store sees it.
enum Cell<'a> {
    Id(&'a JobId),
    Text(&'a str),
    Date(Option<NaiveDate>),
    Array(&'a [String]),
}

fn cell(job: &Job, column: Column) -> Cell<'_> {
    match column {
        Column::Id => Cell::Id(&job.id),
        Column::JobTitle => Cell::Text(&job.title),
        Column::Company => Cell::Text(&job.company),
        Column::Url => Cell::Text(&job.url),
        Column::DatePosted => Cell::Date(job.date_posted),
        Column::Tags => Cell::Array(&job.tags),
    }
}

fn passes(predicate: &Predicate, job: &Job) -> bool {
    match predicate {
        Predicate::AnyIlike { columns, pattern } => columns.iter().any(|&column| match cell(job, column) {
            Cell::Text(value) => pattern.matches_ignore_case(value),
            Cell::Id(id) => pattern.matches_ignore_case(id.as_str()),
            Cell::Date(_) | Cell::Array(_) => false,
        }),
        Predicate::Contains { column, values } => match cell(job, *column) {
            Cell::Array(present) => values.iter().all(|v| present.contains(v)),
            _ => false,
        },
        Predicate::OnOrAfter { column, date } => match cell(job, *column) {
            Cell::Date(posted) => posted.is_some_and(|posted| posted >= *date),
            _ => false,
        },
    }
}

fn compare(order: &[Order], a: &Job, b: &Job) -> Ordering {
    order
        .iter()
        .map(|o| compare_by(o, a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_by(order: &Order, a: &Job, b: &Job) -> Ordering {
    let directed = |ordering: Ordering| if order.descending { ordering.reverse() } else { ordering };
    match (cell(a, order.column), cell(b, order.column)) {
        (Cell::Id(x), Cell::Id(y)) => directed(x.cmp(y)),
        (Cell::Text(x), Cell::Text(y)) => directed(x.cmp(y)),
        (Cell::Date(x), Cell::Date(y)) => match (x, y) {
            (Some(x), Some(y)) => directed(x.cmp(&y)),
            (Some(_), None) if order.nulls_last => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) if order.nulls_last => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}
