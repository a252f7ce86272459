//! Job endpoints: filtered listing, create/update with injected
//! failures, and the atomic two-record reorder swap.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{Job, JobStatus};
use crate::routes::{paginate, ListResponse};
use crate::state::AppState;

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsQuery {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "crate::routes::empty_as_none")]
    pub status: Option<JobStatus>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// GET /jobs
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<ListResponse<Job>>, AppError> {
    let mut jobs = state.store.list::<Job>()?;

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        jobs.retain(|j| j.title.to_lowercase().contains(&needle));
    }
    if let Some(status) = query.status {
        jobs.retain(|j| j.status == status);
    }
    jobs.sort_by_key(|j| j.order);

    let (items, total) = paginate(jobs, query.page, query.page_size);
    Ok(Json(ListResponse { items, total }))
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub id: Option<String>,
    pub title: String,
    pub slug: String,
    pub status: Option<JobStatus>,
    pub tags: Option<Vec<String>>,
    pub order: Option<i64>,
}

/// POST /jobs
pub async fn handle_create(
    State(state): State<AppState>,
    Json(body): Json<CreateJobRequest>,
) -> Result<Json<Job>, AppError> {
    // Failure roll comes before any store access.
    if state.sim.write_failure() {
        return Err(AppError::Simulated);
    }

    let job = Job {
        id: body.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        title: body.title,
        slug: body.slug,
        status: body.status.unwrap_or(JobStatus::Active),
        tags: Job::dedup_tags(body.tags.unwrap_or_default()),
        // Timestamp default sorts new jobs after any seeded order.
        order: body.order.unwrap_or_else(|| Utc::now().timestamp_millis()),
    };
    state.store.put(&job)?;
    Ok(Json(job))
}

/// PATCH /jobs/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<Job>, AppError> {
    if state.sim.write_failure() {
        return Err(AppError::Simulated);
    }

    let patch = patch
        .as_object()
        .cloned()
        .ok_or_else(|| AppError::Validation("patch body must be a JSON object".to_string()))?;
    let job = state.store.update::<Job>(&id, &patch)?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub from_order: i64,
    pub to_order: i64,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub success: bool,
}

/// PATCH /jobs/:id/reorder
///
/// The check order is load-bearing: existence is validated before the
/// failure roll, so a bad order reference is always a 400 and never
/// counts toward the random-failure rate; the roll in turn happens
/// before the transaction, so an injected failure leaves both records
/// untouched.
pub async fn handle_reorder(
    State(state): State<AppState>,
    Path(_id): Path<String>,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<ReorderResponse>, AppError> {
    let a: Option<Job> = state.store.find_by_field("order", &json!(body.from_order))?;
    let b: Option<Job> = state.store.find_by_field("order", &json!(body.to_order))?;
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(AppError::Validation("invalid order".to_string())),
    };

    if state.sim.reorder_failure() {
        return Err(AppError::Simulated);
    }

    state
        .store
        .swap_job_orders(&a.id, &b.id, body.from_order, body.to_order)?;
    Ok(Json(ReorderResponse { success: true }))
}
