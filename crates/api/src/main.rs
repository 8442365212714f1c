mod config;
mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod explain;
    pub mod generate;
    pub mod health;
    pub mod jobs;
    pub mod review;
    pub mod schedule;
    pub mod validate;
}

use axum::{
    routing::{get, post},
    Router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::generate::generate,
            routes::jobs::status,
            routes::jobs::result,
            routes::validate::validate_handler,
            routes::review::review,
            routes::explain::explain,
            routes::schedule::classes,
            routes::schedule::teachers,
        ),
        components(schemas(
            types::GenerateRequest, types::GenerateParams, types::GenerateResult,
            types::SchoolConfig, types::GradeSections, types::Subject, types::SubjectRule,
            types::Teacher, types::ManualAssignments, types::Day, types::SlotLabel,
            types::Grid, types::Cell, types::TeacherGrid, types::TeacherCell,
            types::FillReport, types::Shortfall, types::TeacherLoad, types::Violation,
            types::ReviewReport, types::ReviewItem,
            types::TeacherId, types::SubjectId, types::GradeId, types::ClassKey,
            jobs::JobId, jobs::JobStatus,
            routes::validate::ValidationReport,
            routes::generate::JobCreated,
            routes::explain::ExplainIn,
            routes::explain::ExplainOut,
            routes::schedule::ScheduleOut,
            routes::schedule::TeacherScheduleOut
        )),
        tags(
            (name = "timetable", description = "Weekly school timetable API")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cfg = config::ServerConfig::from_env()?;
    let app_state = state::AppState::new_default();

    let app = Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/generate", post(routes::generate::generate))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/review", post(routes::review::review))
        .route("/v1/explain", post(routes::explain::explain))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/schedule", get(routes::schedule::classes))
        .route("/v1/schedule/teachers", get(routes::schedule::teachers))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack(cfg.body_limit))
        .with_state(app_state);

    let addr = cfg.addr();
    tracing::info!(%addr, body_limit = cfg.body_limit, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
