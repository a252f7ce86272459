//! Assessment endpoints. None of these roll for injected failure:
//! the simulation only covers job and candidate writes, and the
//! asymmetry is intentional.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assessment::{Assessment, ResponseEntry};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// GET /assessments/:job_id
///
/// A missing assessment is `null`, never an error.
pub async fn handle_get(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Option<Assessment>>, AppError> {
    Ok(Json(state.store.get(&job_id)?))
}

/// PUT /assessments/:job_id
///
/// Full replace. The body's `responses` (if any) are carried through
/// verbatim; the path's job id always wins over one in the body.
pub async fn handle_put(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(mut body): Json<Assessment>,
) -> Result<Json<OkResponse>, AppError> {
    body.job_id = job_id;
    state.store.put(&body)?;
    Ok(Json(OkResponse { ok: true }))
}

/// POST /assessments/:job_id/submit
///
/// Read-modify-write append. Two submissions racing in truly
/// concurrent execution can lose an update (last write wins on the
/// whole record); this layer does not isolate them.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<OkResponse>, AppError> {
    let mut assessment = state
        .store
        .get::<Assessment>(&job_id)?
        .unwrap_or_else(|| Assessment::shell(&job_id));

    assessment
        .responses
        .get_or_insert_with(Vec::new)
        .push(ResponseEntry {
            id: Uuid::new_v4().to_string(),
            ts: Utc::now().timestamp_millis(),
            response: payload,
        });

    state.store.put(&assessment)?;
    Ok(Json(OkResponse { ok: true }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tempfile::TempDir;

    use crate::models::assessment::{Assessment, ResponseEntry};
    use crate::routes::testing::{app, send};
    use crate::store::Store;

    #[tokio::test]
    async fn test_get_missing_assessment_is_null() {
        let (router, _store, _dir) = app();
        let (status, body) = send(&router, Method::GET, "/assessments/job-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let (router, _store, _dir) = app();
        let form = json!({
            "sections": [{
                "id": "s1",
                "title": "General",
                "questions": [{
                    "id": "q1",
                    "type": "single",
                    "text": "Do you have experience?",
                    "options": ["Yes", "No"],
                    "required": true
                }]
            }]
        });

        let (status, body) =
            send(&router, Method::PUT, "/assessments/job-1", Some(form.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);

        let (_, stored) = send(&router, Method::GET, "/assessments/job-1", None).await;
        assert_eq!(stored["jobId"], "job-1");
        assert_eq!(stored["sections"], form["sections"]);
    }

    #[tokio::test]
    async fn test_path_job_id_wins_over_body() {
        let (router, store, _dir) = app();
        send(
            &router,
            Method::PUT,
            "/assessments/job-1",
            Some(json!({"jobId": "job-9", "sections": []})),
        )
        .await;

        assert!(store.get::<Assessment>("job-1").unwrap().is_some());
        assert!(store.get::<Assessment>("job-9").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_submit_appends_to_responses() {
        let (router, store, _dir) = app();
        send(
            &router,
            Method::PUT,
            "/assessments/job-1",
            Some(json!({"sections": []})),
        )
        .await;

        for answer in ["Yes", "No"] {
            let (status, body) = send(
                &router,
                Method::POST,
                "/assessments/job-1/submit",
                Some(json!({"q1": answer})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["ok"], true);
        }

        let stored = store.get::<Assessment>("job-1").unwrap().unwrap();
        let responses = stored.responses.unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].response, json!({"q1": "Yes"}));
        assert_eq!(responses[1].response, json!({"q1": "No"}));
        assert!(responses[0].ts <= responses[1].ts);
    }

    #[test]
    fn test_racing_submissions_lose_an_update() {
        // The submit path is read-modify-write with no isolation: two
        // callers that read the same snapshot both append and put, and
        // the later put replaces the whole record. This pins the
        // documented last-write-wins limitation.
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("test.redb")).unwrap();
        store.put(&Assessment::shell("job-1")).unwrap();

        let entry = |id: &str| ResponseEntry {
            id: id.to_string(),
            ts: 0,
            response: json!({}),
        };

        let mut first = store.get::<Assessment>("job-1").unwrap().unwrap();
        let mut second = store.get::<Assessment>("job-1").unwrap().unwrap();

        first.responses.get_or_insert_with(Vec::new).push(entry("r1"));
        second.responses.get_or_insert_with(Vec::new).push(entry("r2"));

        store.put(&first).unwrap();
        store.put(&second).unwrap();

        let stored = store.get::<Assessment>("job-1").unwrap().unwrap();
        let responses = stored.responses.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, "r2");
    }

    #[tokio::test]
    async fn test_submit_without_saved_form_starts_a_shell() {
        let (router, store, _dir) = app();

        let (status, _) = send(
            &router,
            Method::POST,
            "/assessments/job-7/submit",
            Some(json!({"q1": "Yes"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let stored = store.get::<Assessment>("job-7").unwrap().unwrap();
        assert!(stored.sections.is_empty());
        assert_eq!(stored.responses.unwrap().len(), 1);
    }
}
