use crate::state::AppState;
use axum::{extract::State, Json};
use sched_core::teacher_view::teacher_schedules;
use serde::Serialize;
use std::collections::BTreeMap;
use types::{ClassKey, Grid, TeacherGrid, TeacherId};
use utoipa::ToSchema;

/// The latest generated schedule. Empty until a generation succeeds.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOut {
    pub job_id: Option<String>,
    pub classes: BTreeMap<ClassKey, Grid>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherScheduleOut {
    pub job_id: Option<String>,
    pub teachers: BTreeMap<TeacherId, TeacherGrid>,
}

#[utoipa::path(
    get,
    path = "/v1/schedule",
    responses((status = 200, description = "Class grids of the latest schedule", body = ScheduleOut))
)]
pub async fn classes(State(state): State<AppState>) -> Json<ScheduleOut> {
    Json(match state.jobs.latest() {
        Some(latest) => ScheduleOut {
            job_id: Some(latest.job.0),
            classes: latest.result.classes,
        },
        None => ScheduleOut { job_id: None, classes: BTreeMap::new() },
    })
}

#[utoipa::path(
    get,
    path = "/v1/schedule/teachers",
    responses((status = 200, description = "Per-teacher grids derived from the latest schedule", body = TeacherScheduleOut))
)]
pub async fn teachers(State(state): State<AppState>) -> Json<TeacherScheduleOut> {
    let Some(latest) = state.jobs.latest() else {
        return Json(TeacherScheduleOut { job_id: None, teachers: BTreeMap::new() });
    };
    let req = &latest.request;
    let teachers = teacher_schedules(
        &latest.result.classes,
        &req.school.classes(),
        &req.teachers,
        &req.subjects,
        req.school.slots(),
    );
    Json(TeacherScheduleOut { job_id: Some(latest.job.0), teachers })
}
