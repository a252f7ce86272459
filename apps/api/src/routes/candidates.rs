//! Candidate endpoints. Listing applies no explicit sort: pages come
//! back in the store's key order (lexicographic by id), which is
//! stable across calls but not insertion order.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{Candidate, Stage};
use crate::routes::{paginate, ListResponse};
use crate::state::AppState;

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    50
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCandidatesQuery {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "crate::routes::empty_as_none")]
    pub stage: Option<Stage>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// GET /candidates
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ListCandidatesQuery>,
) -> Result<Json<ListResponse<Candidate>>, AppError> {
    let mut candidates = state.store.list::<Candidate>()?;

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        candidates.retain(|c| {
            c.name.to_lowercase().contains(&needle) || c.email.to_lowercase().contains(&needle)
        });
    }
    if let Some(stage) = query.stage {
        candidates.retain(|c| c.stage == stage);
    }

    let (items, total) = paginate(candidates, query.page, query.page_size);
    Ok(Json(ListResponse { items, total }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidateRequest {
    pub name: String,
    pub email: String,
    pub job_id: String,
    pub stage: Option<Stage>,
}

/// POST /candidates
pub async fn handle_create(
    State(state): State<AppState>,
    Json(body): Json<CreateCandidateRequest>,
) -> Result<Json<Candidate>, AppError> {
    if state.sim.write_failure() {
        return Err(AppError::Simulated);
    }

    let candidate = Candidate {
        id: Uuid::new_v4().to_string(),
        name: body.name,
        email: body.email,
        job_id: body.job_id,
        stage: body.stage.unwrap_or(Stage::Applied),
    };
    state.store.put(&candidate)?;
    Ok(Json(candidate))
}

/// PATCH /candidates/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<Candidate>, AppError> {
    if state.sim.write_failure() {
        return Err(AppError::Simulated);
    }

    let patch = patch
        .as_object()
        .cloned()
        .ok_or_else(|| AppError::Validation("patch body must be a JSON object".to_string()))?;
    let candidate = state.store.update::<Candidate>(&id, &patch)?;
    Ok(Json(candidate))
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    pub ts: i64,
    pub text: String,
}

/// GET /candidates/:id/timeline
///
/// A fixed three-event placeholder, not an audit log: nothing persists
/// it and candidate mutations never feed into it.
pub async fn handle_timeline(Path(_id): Path<String>) -> Json<Vec<TimelineEvent>> {
    let now = Utc::now();
    let events = [
        (10, "Applied"),
        (5, "Screened"),
        (2, "Technical interview"),
    ]
    .into_iter()
    .map(|(days_ago, text)| TimelineEvent {
        ts: (now - Duration::days(days_ago)).timestamp_millis(),
        text: text.to_string(),
    })
    .collect();
    Json(events)
}
