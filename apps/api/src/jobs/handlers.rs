//! Axum route handlers for listings and the listing cache.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::jobs::refresh::{RefreshReport, RefreshTrigger};
use crate::jobs::repository;
use crate::listings::job_page::{fetch_job_details, JobDetails};
use crate::listings::ScrapeOptions;
use crate::models::cache::CacheInfo;
use crate::models::job::Job;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 500;
const MAX_NEW_JOBS_HOURS: i64 = 24 * 365;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct JobsPage {
    pub jobs: Vec<Job>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Deserialize)]
pub struct NewJobsQuery {
    pub hours: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct NewJobsResponse {
    pub jobs: Vec<Job>,
    pub count: usize,
    pub hours: i64,
}

#[derive(Debug, Serialize)]
pub struct JobDetailsResponse {
    pub job_id: i64,
    #[serde(flatten)]
    pub details: JobDetails,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
///
/// Active listings from the hybrid cache, paginated.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<JobsPage>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let offset = query.offset.unwrap_or(0);

    let all = state.cache.jobs_for_matching(None).await;
    let total = all.len();
    let jobs = all.into_iter().skip(offset).take(limit).collect();

    Ok(Json(JobsPage {
        jobs,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/jobs/new
pub async fn handle_new_jobs(
    State(state): State<AppState>,
    Query(query): Query<NewJobsQuery>,
) -> Result<Json<NewJobsResponse>, AppError> {
    let hours = query.hours.unwrap_or(24);
    if !(1..=MAX_NEW_JOBS_HOURS).contains(&hours) {
        return Err(AppError::Validation(format!(
            "hours must be between 1 and {MAX_NEW_JOBS_HOURS}"
        )));
    }

    let jobs = repository::get_new_jobs_since(state.cache.pool(), hours).await?;
    Ok(Json(NewJobsResponse {
        count: jobs.len(),
        jobs,
        hours,
    }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Job>, AppError> {
    repository::get_job(state.cache.pool(), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// GET /api/v1/jobs/:id/details
///
/// Follows the listing's apply link and extracts description, requirements
/// and skills from the company page.
pub async fn handle_job_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<JobDetailsResponse>, AppError> {
    let job = repository::get_job(state.cache.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    if !job.apply_link.starts_with("http") {
        return Err(AppError::UnprocessableEntity(format!(
            "Job {id} has no apply link to follow"
        )));
    }

    let details = fetch_job_details(&job.apply_link, &state.skills).await?;
    Ok(Json(JobDetailsResponse { job_id: id, details }))
}

/// GET /api/v1/cache
pub async fn handle_cache_info(State(state): State<AppState>) -> Json<CacheInfo> {
    Json(state.cache.cache_info().await)
}

/// POST /api/v1/cache/refresh
///
/// Body: `{"mode": "smart" | "full" | "incremental", "max_days": 7}`, all optional.
pub async fn handle_refresh(
    State(state): State<AppState>,
    body: Option<Json<ScrapeOptions>>,
) -> Result<Json<RefreshReport>, AppError> {
    let options = body.map(|Json(options)| options).unwrap_or_default();
    if options.max_days.is_some_and(|d| d < 0) {
        return Err(AppError::Validation("max_days cannot be negative".to_string()));
    }

    let report = state.refresher.refresh(options, RefreshTrigger::Manual).await;
    Ok(Json(report))
}

/// DELETE /api/v1/cache
pub async fn handle_clear_cache(State(state): State<AppState>) -> Json<Value> {
    let cleared = state.cache.clear().await;
    Json(json!({
        "cleared": cleared,
        "message": if cleared { "Redis cache cleared" } else { "Redis not available" }
    }))
}
