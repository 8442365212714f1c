use axum::Json;
use sched_core::eligibility::review_assignments;
use types::{GenerateRequest, ReviewReport};

#[utoipa::path(
    post,
    path = "/v1/review",
    request_body = GenerateRequest,
    responses(
    (status = 200, description = "Eligible teachers and pending choices per class and subject", body = ReviewReport)
    )
)]
pub async fn review(Json(req): Json<GenerateRequest>) -> Json<ReviewReport> {
    Json(review_assignments(&req))
}
