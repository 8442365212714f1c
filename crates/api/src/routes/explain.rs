use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use sched_core::{audit::audit, fill::fill_report};
use types::{ClassKey, FillReport, GenerateRequest, Grid, Violation};

#[derive(Deserialize, ToSchema)]
pub struct ExplainIn {
    pub request: GenerateRequest,
    pub classes: BTreeMap<ClassKey, Grid>,
}

#[derive(Serialize, ToSchema)]
pub struct ExplainOut {
    pub fill: FillReport,
    pub violations: Vec<Violation>,
}

#[utoipa::path(
    post,
    path = "/v1/explain",
    request_body = ExplainIn,
    responses(
    (status = 200, description = "Fill report and rule violations for a provided schedule", body = ExplainOut)
    )
)]
pub async fn explain(Json(input): Json<ExplainIn>) -> Json<ExplainOut> {
    Json(ExplainOut {
        fill: fill_report(&input.request, &input.classes),
        violations: audit(&input.request, &input.classes),
    })
}
