use axum::Json;
use sched_core::validate;
use serde::Serialize;
use types::GenerateRequest;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = GenerateRequest,
    responses(
    (status = 200, description = "Validation result", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(req): Json<GenerateRequest>) -> Json<ValidationReport> {
    Json(match validate(&req) {
        Ok(()) => ValidationReport { ok: true, errors: vec![] },
        Err(e) => ValidationReport { ok: false, errors: e.messages().to_vec() },
    })
}
