//! PostgREST client for a Supabase-hosted `jobs` table.

use common::query::{self, JOBS_TABLE};
use common::{Job, JobId, JobQuery, StoreError, StoreResult};
use reqwest::header::CONTENT_RANGE;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::SupabaseConfig;
use crate::store::{JobStore, StorePage};

pub struct SupabaseStore {
    client: reqwest::Client,
    jobs_url: String,
}

#[derive(Deserialize)]
struct TagRow {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig) -> StoreResult<Self> {
        let client = config
            .http_client()
            .map_err(|e| StoreError::query_failed(e.to_string()))?;
        Ok(Self {
            client,
            jobs_url: config.rest_url(JOBS_TABLE),
        })
    }

    async fn get(&self, params: &[(String, String)], count: bool) -> StoreResult<Response> {
        let mut request = self.client.get(&self.jobs_url).query(params);
        if count {
            request = request.header("Prefer", "count=exact");
        }
        request
            .send()
            .await
            .map_err(|e| StoreError::query_failed(format!("request to {} failed: {e}", self.jobs_url)))
    }
}

impl JobStore for SupabaseStore {
    async fn query_jobs(&self, query: &JobQuery) -> StoreResult<StorePage> {
        let params = query.to_params();
        debug!(?params, "querying jobs");

        let response = self.get(&params, true).await?;
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(query::parse_content_range_total);

        // Asking for rows past the end is not an error for the listing.
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(StorePage {
                rows: Vec::new(),
                total_count: total.unwrap_or(0),
            });
        }

        let rows: Vec<Job> = read_json(response).await?;
        let total_count = total.unwrap_or(query.offset + rows.len() as u64);
        Ok(StorePage { rows, total_count })
    }

    async fn job_by_id(&self, id: &JobId) -> StoreResult<Job> {
        let response = self.get(&query::detail_params(id), false).await?;
        // An id the `id` column cannot hold (`abc` against an integer key) is
        // rejected with 400; no row can have it.
        if response.status() == StatusCode::BAD_REQUEST {
            debug!(%id, "store rejected id");
            return Err(StoreError::NotFound);
        }
        let rows: Vec<Job> = read_json(response).await?;
        rows.into_iter().next().ok_or(StoreError::NotFound)
    }

    async fn tag_lists(&self) -> StoreResult<Vec<Vec<String>>> {
        let response = self.get(&query::tag_catalog_params(), false).await?;
        let rows: Vec<TagRow> = read_json(response).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.tags.unwrap_or_default())
            .collect())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::query_failed(format!("{status}: {body}")));
    }
    response
        .json()
        .await
        .map_err(|e| StoreError::decode(e.to_string()))
}
