use crate::{error::ApiError, state::AppState};
use axum::{extract::State, Json};
use sched_core::validate;
use serde::Serialize;
use types::GenerateRequest;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

/// Rejects configurations that fail validation instead of queueing them.
#[utoipa::path(
        post,
        path = "/v1/generate",
        request_body = GenerateRequest,
        responses(
            (status = 200, description = "Job enqueued", body = JobCreated),
            (status = 400, description = "Configuration failed validation")
        )
    )]
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<JobCreated>, ApiError> {
    validate(&req).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let id = state.jobs.enqueue(req);
    Ok(Json(JobCreated { job_id: id.0, status: "queued" }))
}
