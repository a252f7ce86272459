pub mod assessments;
pub mod candidates;
pub mod health;
pub mod jobs;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// `{items, total}` envelope for paginated listings. `total` is the
/// filtered, pre-pagination count.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Treats an explicitly empty filter param (`?status=`, `?stage=`) the
/// same as an absent one instead of failing enum deserialization.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Slices one page out of an already filtered and ordered set.
/// Page numbers are 1-based; anything past the end yields an empty page.
fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let start = page
        .max(1)
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(total);
    let len = page_size.min(total - start);
    (items.into_iter().skip(start).take(len).collect(), total)
}

/// Every response, success or failure, is preceded by one simulated
/// network round-trip so callers exercise their loading states.
async fn simulate_latency(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.sim.delay().await;
    next.run(request).await
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/jobs", get(jobs::handle_list).post(jobs::handle_create))
        .route("/jobs/:id", patch(jobs::handle_update))
        .route("/jobs/:id/reorder", patch(jobs::handle_reorder))
        .route(
            "/candidates",
            get(candidates::handle_list).post(candidates::handle_create),
        )
        .route("/candidates/:id", patch(candidates::handle_update))
        .route("/candidates/:id/timeline", get(candidates::handle_timeline))
        .route(
            "/assessments/:job_id",
            get(assessments::handle_get).put(assessments::handle_put),
        )
        .route(
            "/assessments/:job_id/submit",
            post(assessments::handle_submit),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            simulate_latency,
        ))
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_middle_page() {
        let items: Vec<i32> = (0..25).collect();
        let (page, total) = paginate(items, 2, 10);
        assert_eq!(total, 25);
        assert_eq!(page, (10..20).collect::<Vec<i32>>());
    }

    #[test]
    fn test_paginate_short_last_page() {
        let items: Vec<i32> = (0..25).collect();
        let (page, total) = paginate(items, 3, 10);
        assert_eq!(total, 25);
        assert_eq!(page, (20..25).collect::<Vec<i32>>());
    }

    #[test]
    fn test_paginate_past_the_end_is_empty() {
        let items: Vec<i32> = (0..5).collect();
        let (page, total) = paginate(items, 4, 10);
        assert_eq!(total, 5);
        assert!(page.is_empty());
    }

    #[test]
    fn test_paginate_pages_reconstruct_the_set() {
        let items: Vec<i32> = (0..23).collect();
        let mut rebuilt = Vec::new();
        for page in 1..=6 {
            let (chunk, total) = paginate(items.clone(), page, 4);
            assert_eq!(total, 23);
            rebuilt.extend(chunk);
        }
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn test_paginate_page_zero_behaves_like_page_one() {
        let items: Vec<i32> = (0..5).collect();
        let (page, _) = paginate(items, 0, 2);
        assert_eq!(page, vec![0, 1]);
    }
}
