//! REST API over the job board.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use browser::view::{DETAIL_FAILED_MESSAGE, LOAD_FAILED_MESSAGE};
use browser::{DetailView, JobCard, JobService, JobStore};
use common::{DateFilter, FilterState, JobId, PageResult};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Query parameters for the listing endpoint
#[derive(Debug, Default, Deserialize)]
struct ListParams {
    page: Option<u32>,
    search: Option<String>,
    /// Comma-separated; a job must carry all of them.
    tags: Option<String>,
    date: Option<DateFilter>,
}

impl ListParams {
    fn filters(&self) -> FilterState {
        let selected_tags: BTreeSet<String> = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        FilterState {
            search_text: self.search.clone().unwrap_or_default(),
            selected_tags,
            date_filter: self.date.unwrap_or_default(),
        }
    }
}

/// One page of the listing
#[derive(Debug, Serialize)]
struct JobsResponse {
    page: u32,
    page_size: u32,
    total_count: u64,
    total_pages: u32,
    items: Vec<JobCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

/// Shared application state
struct AppState<S> {
    service: JobService<S>,
}

pub fn router<S: JobStore + 'static>(service: JobService<S>) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/", get(root_handler))
        .route("/api/jobs", get(list_handler::<S>))
        .route("/api/jobs/{id}", get(detail_handler::<S>))
        .route("/api/tags", get(tags_handler::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for GET /api/jobs?page=&search=&tags=&date=
async fn list_handler<S: JobStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> Json<JobsResponse> {
    let request = state.service.request(params.page.unwrap_or(1), params.filters());

    // A failed fetch still answers with a well-formed, empty page.
    let (page, error) = match state.service.try_fetch_jobs(&request).await {
        Ok(page) => (page, None),
        Err(e) => {
            error!(error = %e, "error fetching jobs");
            (PageResult::empty(), Some(LOAD_FAILED_MESSAGE))
        }
    };

    Json(JobsResponse {
        page: request.page(),
        page_size: request.limit(),
        total_count: page.total_count,
        total_pages: page.total_pages,
        items: page.items.iter().map(JobCard::from).collect(),
        error,
    })
}

/// Handler for GET /api/jobs/{id}
async fn detail_handler<S: JobStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Response {
    let outcome = state.service.fetch_job(&JobId::new(id)).await;
    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(e) if e.is_not_found() => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::BAD_GATEWAY,
    };

    match DetailView::from_outcome(&outcome) {
        DetailView::Found(detail) => Json(detail).into_response(),
        view => {
            let error = view.message().unwrap_or(DETAIL_FAILED_MESSAGE);
            (status, Json(ErrorResponse { error })).into_response()
        }
    }
}

/// Handler for GET /api/tags
async fn tags_handler<S: JobStore>(State(state): State<Arc<AppState<S>>>) -> Json<TagsResponse> {
    Json(TagsResponse {
        tags: state.service.fetch_all_tags().await,
    })
}

/// Handler for GET / (root)
async fn root_handler() -> &'static str {
    "🔍 Job Board API\n\nEndpoints:\n  GET /api/jobs?page=<n>&search=<text>&tags=<a,b>&date=<today|week|month> - List jobs\n  GET /api/jobs/<id> - Job details\n  GET /api/tags - All tags\n\nExample:\n  curl 'http://127.0.0.1:3000/api/jobs?search=rust&tags=remote&date=week'"
}
