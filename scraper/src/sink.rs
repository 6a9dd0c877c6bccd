//! Where scraped jobs end up.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use browser::SupabaseConfig;
use common::query::{self, JOBS_TABLE};
use common::{Job, JobId, NewJob};
use serde::Deserialize;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    Inserted,
    Updated(JobId),
}

#[derive(Deserialize)]
struct IdRow {
    id: JobId,
}

/// Inserts new jobs into the Supabase `jobs` table and updates the ones
/// whose URL is already there.
pub struct SupabaseSink {
    client: reqwest::Client,
    jobs_url: String,
}

impl SupabaseSink {
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            jobs_url: config.rest_url(JOBS_TABLE),
        })
    }

    async fn existing_id(&self, url: &str) -> anyhow::Result<Option<JobId>> {
        let rows: Vec<IdRow> = self
            .client
            .get(&self.jobs_url)
            .query(&query::url_lookup_params(url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows.into_iter().next().map(|row| row.id))
    }

    pub async fn upsert(&self, job: &NewJob) -> anyhow::Result<Saved> {
        match self.existing_id(&job.url).await? {
            Some(id) => {
                self.client
                    .patch(&self.jobs_url)
                    .query(&[query::id_filter(&id)])
                    .json(job)
                    .send()
                    .await?
                    .error_for_status()?;
                info!("🔄 Updated existing job: {} at {} (ID: {})", job.title, job.company, id);
                Ok(Saved::Updated(id))
            }
            None => {
                self.client
                    .post(&self.jobs_url)
                    .json(job)
                    .send()
                    .await?
                    .error_for_status()?;
                info!("➕ Inserted: {} - {}", job.title, job.company);
                Ok(Saved::Inserted)
            }
        }
    }

    /// Saves every job, logging the ones that fail. Returns how many succeeded.
    pub async fn save(&self, jobs: &[NewJob]) -> usize {
        let mut saved = 0;
        for job in jobs {
            match self.upsert(job).await {
                Ok(_) => saved += 1,
                Err(e) => error!("❌ Failed to save {}: {:#}", job.url, e),
            }
        }
        saved
    }
}

/// Writes the whole batch to a JSON file, numbering jobs from 1.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, jobs: &[NewJob]) -> anyhow::Result<usize> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
                info!("📁 Created '{}' directory", dir.display());
            }
        }

        let rows: Vec<Job> = jobs
            .iter()
            .cloned()
            .zip(1_i64..)
            .map(|(job, id)| job.into_job(JobId::from(id)))
            .collect();
        let json = serde_json::to_string_pretty(&rows).context("failed to serialize jobs")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        info!("💾 Saved {} jobs to {}", rows.len(), self.path.display());
        Ok(rows.len())
    }
}
